//! HTML renderers for the live workout card and the final workout message.

use chrono::NaiveDate;

use crate::{
    formatting::{blockquote, escape_html},
    workout::types::{Exercise, SetEntry, Workout, WorkoutSession, WorkoutStep},
};

pub fn to_card(session: &WorkoutSession) -> String {
    let split = session.split.map(|s| s.label()).unwrap_or("не выбран");
    let mut lines = vec![
        "<b>ТРЕНИРОВКА</b>".to_string(),
        String::new(),
        format!("Дата: <b>{}</b>", human_date(session.date)),
        format!("Тип: <b>{split}</b>"),
        String::new(),
    ];
    push_exercises(&mut lines, &session.exercises);

    if session.step == WorkoutStep::Collecting {
        let current = session.current_exercise.as_deref().unwrap_or("не выбрано");
        lines.push(format!(
            "<i>Текущее упражнение:</i> <b>{}</b>",
            escape_html(current)
        ));
    }

    blockquote(&lines.join("\n"))
}

pub fn to_workout_message(workout: &Workout) -> String {
    let mut lines = vec![
        "<b>Тренировка</b>".to_string(),
        format!("Дата: <b>{}</b>", human_date(workout.date)),
        format!("Тип: <b>{}</b>", workout.split.label()),
        String::new(),
    ];
    push_exercises(&mut lines, &workout.exercises);
    lines.join("\n")
}

fn push_exercises(lines: &mut Vec<String>, exercises: &[Exercise]) {
    for ex in exercises {
        lines.push(format!("<b>{}</b>", escape_html(&ex.name)));
        for set in &ex.sets {
            lines.push(format!("- {}", format_set(set)));
        }
        lines.push(String::new());
    }
}

pub fn format_set(entry: &SetEntry) -> String {
    let SetEntry::Parsed {
        raw,
        weight,
        reps,
        sets,
        note,
    } = entry
    else {
        return escape_html(entry.raw());
    };

    match (weight, sets, reps, note) {
        (Some(w), _, Some(r), _) => format!("{} × {r}", clean_number(*w)),
        (None, Some(s), Some(r), _) => format!("{s} подход(а) по {r}"),
        (_, _, _, Some(n)) => escape_html(n),
        _ => escape_html(raw),
    }
}

/// `80.0` → `80`, `62.5` → `62.5`.
fn clean_number(n: f64) -> String {
    let s = n.to_string();
    match s.split_once('.') {
        Some((int, frac)) if frac.chars().all(|c| c == '0') => int.to_string(),
        _ => s,
    }
}

fn human_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
