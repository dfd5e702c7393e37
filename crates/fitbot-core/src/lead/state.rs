use crate::domain::MessageRef;

/// Position in the lead form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeadStep {
    #[default]
    Idle,
    Name,
    Phone,
    Email,
    Questions,
}

impl LeadStep {
    /// Human-readable label shown at the bottom of the card.
    pub fn label(self) -> &'static str {
        match self {
            LeadStep::Idle => "ожидание начала",
            LeadStep::Name => "ввод имени",
            LeadStep::Phone => "ввод телефона",
            LeadStep::Email => "ввод email",
            LeadStep::Questions => "вопросы и пожелания",
        }
    }
}

/// Answers collected so far. Every field stays `None` until its step is done.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeadData {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub questions: Option<String>,
}

impl LeadData {
    /// Returns the complete submission once all required fields are present.
    pub fn submission(&self) -> Option<LeadSubmission> {
        Some(LeadSubmission {
            name: self.name.clone()?,
            phone: self.phone.clone()?,
            email: self.email.clone()?,
            questions: self.questions.clone(),
        })
    }
}

/// A finished lead, ready for the manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub questions: Option<String>,
}

/// Per-chat form state. Presence in the store means a form is in progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeadState {
    pub step: LeadStep,
    pub data: LeadData,
    pub card_message: Option<MessageRef>,
}

impl LeadState {
    /// Fresh state positioned at the first question.
    pub fn started() -> Self {
        Self {
            step: LeadStep::Name,
            ..Self::default()
        }
    }
}
