//! Free-text parsing of workout messages.
//!
//! Each non-empty line is either an exercise name or a set entry:
//!
//! - `80x10`, `80 кг х 10`, `62,5 × 8 тяжело`: weight × reps (+ note)
//! - `3 подхода по 12`: sets × reps
//! - `- разминка`: a bullet note
//! - anything else starting with a digit is kept as a raw set

use std::sync::OnceLock;

use regex::Regex;

use crate::workout::types::SetEntry;

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedLine {
    Exercise(String),
    Set(SetEntry),
}

fn weight_reps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\d+(?:[.,]\d+)?)\s*(?:кг|kg)?\s*[xх×*]\s*(\d+)(?:\s+(.+))?$")
            .expect("valid regex")
    })
}

fn sets_reps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\d+)\s*подход(?:а|ов)?\s+по\s+(\d+)(?:\s+(.+))?$").expect("valid regex")
    })
}

/// Parse a whole message into lines, skipping blank ones.
pub fn parse_message(text: &str) -> Vec<ParsedLine> {
    text.lines().filter_map(parse_line).collect()
}

pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = strip_bullet(line) {
        if rest.is_empty() {
            return None;
        }
        let entry = parse_numeric(rest).unwrap_or_else(|| SetEntry::Parsed {
            raw: line.to_string(),
            weight: None,
            reps: None,
            sets: None,
            note: Some(rest.to_string()),
        });
        return Some(ParsedLine::Set(entry));
    }

    if let Some(entry) = parse_numeric(line) {
        return Some(ParsedLine::Set(entry));
    }

    if line.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(ParsedLine::Set(SetEntry::Raw {
            raw: line.to_string(),
        }));
    }

    Some(ParsedLine::Exercise(line.to_string()))
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix(['-', '•', '–', '—'])
        .map(|rest| rest.trim_start())
}

fn parse_numeric(text: &str) -> Option<SetEntry> {
    if let Some(caps) = weight_reps_re().captures(text) {
        let weight = caps[1].replace(',', ".").parse::<f64>().ok()?;
        let reps = caps[2].parse::<u32>().ok()?;
        return Some(SetEntry::Parsed {
            raw: text.to_string(),
            weight: Some(weight),
            reps: Some(reps),
            sets: None,
            note: caps.get(3).map(|m| m.as_str().to_string()),
        });
    }

    if let Some(caps) = sets_reps_re().captures(text) {
        let sets = caps[1].parse::<u32>().ok()?;
        let reps = caps[2].parse::<u32>().ok()?;
        return Some(SetEntry::Parsed {
            raw: text.to_string(),
            weight: None,
            reps: Some(reps),
            sets: Some(sets),
            note: caps.get(3).map(|m| m.as_str().to_string()),
        });
    }

    None
}
