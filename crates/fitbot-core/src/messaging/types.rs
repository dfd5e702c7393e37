use crate::domain::{ChatId, MessageRef, Sender};

/// Messenger-neutral incoming update model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    /// Classify a chat message: `/name args` becomes a command, anything
    /// else is plain text. Telegram may append `@botname` to the command.
    pub fn from_text(chat_id: ChatId, from: Option<Sender>, text: &str) -> Self {
        match parse_command(text) {
            Some((name, args)) => IncomingUpdate::Command(Command {
                chat_id,
                from,
                name,
                args,
                raw: text.to_string(),
            }),
            None => IncomingUpdate::Text(TextMessage {
                chat_id,
                from,
                text: text.to_string(),
            }),
        }
    }
}

fn parse_command(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim().to_string();

    let name = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some((name, rest))
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub from: Option<Sender>,
    pub name: String,
    pub args: String,
    /// The message exactly as sent, for flows that treat it as text.
    pub raw: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub from: Option<Sender>,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    /// Chat of the message carrying the button; absent for inline-mode
    /// messages the bot cannot see.
    pub chat_id: Option<ChatId>,
    pub from: Option<Sender>,
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// Inline keyboard (buttons under a message) with callback payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// A keyboard with a single button.
    pub fn single(label: &str, callback_data: &str) -> Self {
        Self {
            rows: vec![vec![InlineButton::new(label, callback_data)]],
        }
    }

    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn callback_data(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .flatten()
            .map(|b| b.callback_data.as_str())
    }
}

/// Custom reply keyboard (replaces the user's keyboard).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub one_time: bool,
    pub resized: bool,
}

impl ReplyKeyboard {
    /// One-shot, resized keyboard with a single button.
    pub fn one_time(label: &str) -> Self {
        Self {
            rows: vec![vec![label.to_string()]],
            one_time: true,
            resized: true,
        }
    }
}

/// Markup attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyMarkup {
    Inline(InlineKeyboard),
    Keyboard(ReplyKeyboard),
    RemoveKeyboard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> IncomingUpdate {
        IncomingUpdate::from_text(ChatId(1), None, text)
    }

    #[test]
    fn commands_strip_bot_name_and_lowercase() {
        let IncomingUpdate::Command(cmd) = classify("/Workout@fit_bot  today ") else {
            panic!("expected a command");
        };
        assert_eq!(cmd.name, "workout");
        assert_eq!(cmd.args, "today");
        assert_eq!(cmd.raw, "/Workout@fit_bot  today ");
    }

    #[test]
    fn plain_text_and_bare_slash_are_text() {
        assert!(matches!(classify("Иван"), IncomingUpdate::Text(_)));
        assert!(matches!(classify("/"), IncomingUpdate::Text(_)));
    }

    #[test]
    fn keyboard_collects_callback_data() {
        let kb = InlineKeyboard::single("Отменить", "cancel_form")
            .row(vec![InlineButton::new("Готово", "workout:done")]);
        let data: Vec<&str> = kb.callback_data().collect();
        assert_eq!(data, vec!["cancel_form", "workout:done"]);
    }
}
