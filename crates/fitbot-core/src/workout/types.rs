use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::MessageRef;

/// Training day type. The token is what travels in callback payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSplit {
    BackTraps,
    ChestCalves,
    Deadlift,
    ShouldersAbs,
    Legs,
    Arms,
}

impl WorkoutSplit {
    pub const ALL: [WorkoutSplit; 6] = [
        WorkoutSplit::BackTraps,
        WorkoutSplit::ChestCalves,
        WorkoutSplit::Deadlift,
        WorkoutSplit::ShouldersAbs,
        WorkoutSplit::Legs,
        WorkoutSplit::Arms,
    ];

    pub fn token(self) -> &'static str {
        match self {
            WorkoutSplit::BackTraps => "back_traps",
            WorkoutSplit::ChestCalves => "chest_calves",
            WorkoutSplit::Deadlift => "deadlift",
            WorkoutSplit::ShouldersAbs => "shoulders_abs",
            WorkoutSplit::Legs => "legs",
            WorkoutSplit::Arms => "arms",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.token() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkoutSplit::BackTraps => "Спина / Шраги",
            WorkoutSplit::ChestCalves => "Грудь / Икры",
            WorkoutSplit::Deadlift => "Становая",
            WorkoutSplit::ShouldersAbs => "Плечи / Пресс",
            WorkoutSplit::Legs => "Ноги",
            WorkoutSplit::Arms => "Руки",
        }
    }
}

/// One line of a logged exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetEntry {
    /// Looked like a set but could not be understood; kept verbatim.
    Raw { raw: String },
    Parsed {
        raw: String,
        weight: Option<f64>,
        reps: Option<u32>,
        sets: Option<u32>,
        note: Option<String>,
    },
}

impl SetEntry {
    pub fn raw(&self) -> &str {
        match self {
            SetEntry::Raw { raw } | SetEntry::Parsed { raw, .. } => raw,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: Vec<SetEntry>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkoutStep {
    #[default]
    ChoosingSplit,
    Collecting,
}

/// In-progress workout for one chat.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutSession {
    pub step: WorkoutStep,
    pub date: NaiveDate,
    pub split: Option<WorkoutSplit>,
    pub exercises: Vec<Exercise>,
    pub current_exercise: Option<String>,
    pub card_message: Option<MessageRef>,
}

impl WorkoutSession {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            step: WorkoutStep::ChoosingSplit,
            date,
            split: None,
            exercises: Vec::new(),
            current_exercise: None,
            card_message: None,
        }
    }

    /// Completed record, once a split is chosen.
    pub fn to_workout(&self) -> Option<Workout> {
        Some(Workout {
            date: self.date,
            split: self.split?,
            exercises: self.exercises.clone(),
        })
    }
}

/// A finished workout as it is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub date: NaiveDate,
    pub split: WorkoutSplit,
    pub exercises: Vec<Exercise>,
}
