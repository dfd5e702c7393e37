//! Lead-capture form: booking an intensive in four questions.

pub mod flow;
pub mod render;
pub mod state;
pub mod store;
pub mod validate;

pub use flow::{DeliveryConfig, LeadForm, CANCEL_FORM_CALLBACK};
pub use state::{LeadData, LeadState, LeadStep, LeadSubmission};
pub use store::{InMemoryLeadStore, LeadStateStore};
