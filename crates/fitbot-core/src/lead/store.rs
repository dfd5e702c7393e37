use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{domain::ChatId, lead::state::LeadState};

/// Storage for in-progress lead forms, keyed by chat.
///
/// The default implementation is an in-memory map; state is lost on restart.
#[async_trait]
pub trait LeadStateStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Option<LeadState>;
    async fn set(&self, chat_id: ChatId, state: LeadState);
    /// Removes the state and returns it, if there was one.
    async fn delete(&self, chat_id: ChatId) -> Option<LeadState>;
}

#[derive(Default)]
pub struct InMemoryLeadStore {
    inner: Mutex<HashMap<i64, LeadState>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[async_trait]
impl LeadStateStore for InMemoryLeadStore {
    async fn get(&self, chat_id: ChatId) -> Option<LeadState> {
        self.inner.lock().await.get(&chat_id.0).cloned()
    }

    async fn set(&self, chat_id: ChatId, state: LeadState) {
        self.inner.lock().await.insert(chat_id.0, state);
    }

    async fn delete(&self, chat_id: ChatId) -> Option<LeadState> {
        self.inner.lock().await.remove(&chat_id.0)
    }
}
