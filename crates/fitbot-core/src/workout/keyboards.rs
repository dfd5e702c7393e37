//! Inline keyboards of the workout flow and their callback payloads.

use crate::{
    messaging::types::{InlineButton, InlineKeyboard},
    workout::types::WorkoutSplit,
};

pub const SPLIT_CALLBACK_PREFIX: &str = "split:";
pub const WORKOUT_DONE: &str = "workout:done";
pub const WORKOUT_CANCEL: &str = "workout:cancel";

/// A decoded workout callback payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutCallback {
    Split(WorkoutSplit),
    /// `split:` with a token we do not know.
    UnknownSplit,
    Done,
    Cancel,
}

impl WorkoutCallback {
    /// Returns `None` for payloads that do not belong to the workout flow.
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(token) = data.strip_prefix(SPLIT_CALLBACK_PREFIX) {
            return Some(
                WorkoutSplit::from_token(token)
                    .map(WorkoutCallback::Split)
                    .unwrap_or(WorkoutCallback::UnknownSplit),
            );
        }
        match data {
            WORKOUT_DONE => Some(WorkoutCallback::Done),
            WORKOUT_CANCEL => Some(WorkoutCallback::Cancel),
            _ => None,
        }
    }
}

fn split_button(label: &str, split: WorkoutSplit) -> InlineButton {
    InlineButton::new(label, format!("{SPLIT_CALLBACK_PREFIX}{}", split.token()))
}

/// Six rows, one per split; paired buttons in a row pick the same split.
pub fn split_keyboard() -> InlineKeyboard {
    use WorkoutSplit::*;

    InlineKeyboard::default()
        .row(vec![
            split_button("1. Спина", BackTraps),
            split_button("Шраги", BackTraps),
        ])
        .row(vec![
            split_button("2. Грудь", ChestCalves),
            split_button("Икры", ChestCalves),
        ])
        .row(vec![split_button("3. Становая", Deadlift)])
        .row(vec![
            split_button("4. Плечи", ShouldersAbs),
            split_button("Пресс", ShouldersAbs),
        ])
        .row(vec![
            split_button("5. Ноги верх", Legs),
            split_button("Ноги низ", Legs),
        ])
        .row(vec![
            split_button("6. Бицепс", Arms),
            split_button("Трицепс", Arms),
        ])
}

pub fn control_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![vec![
        InlineButton::new("Готово", WORKOUT_DONE),
        InlineButton::new("Отменить", WORKOUT_CANCEL),
    ]])
}
