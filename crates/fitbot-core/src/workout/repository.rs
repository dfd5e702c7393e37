//! Persistence contracts of the workout flow.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{io::AsyncWriteExt, sync::Mutex};

use crate::{
    domain::ChatId,
    errors::Error,
    workout::types::{Workout, WorkoutSession},
    Result,
};

/// Active (unfinished) workout sessions, keyed by chat.
#[async_trait]
pub trait WorkoutSessionRepository: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<WorkoutSession>>;
    async fn save(&self, chat_id: ChatId, session: WorkoutSession) -> Result<()>;
    async fn remove(&self, chat_id: ChatId) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryWorkoutSessions {
    inner: Mutex<HashMap<i64, WorkoutSession>>,
}

impl InMemoryWorkoutSessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutSessionRepository for InMemoryWorkoutSessions {
    async fn get(&self, chat_id: ChatId) -> Result<Option<WorkoutSession>> {
        Ok(self.inner.lock().await.get(&chat_id.0).cloned())
    }

    async fn save(&self, chat_id: ChatId, session: WorkoutSession) -> Result<()> {
        self.inner.lock().await.insert(chat_id.0, session);
        Ok(())
    }

    async fn remove(&self, chat_id: ChatId) -> Result<()> {
        self.inner.lock().await.remove(&chat_id.0);
        Ok(())
    }
}

/// Storage hook behind [`WorkoutRepository`]; receives validated workouts.
#[async_trait]
pub trait WorkoutSink: Send + Sync {
    async fn persist(&self, chat_id: ChatId, workout: &Workout) -> Result<()>;
}

/// Completed workouts: validates, then hands off to the sink.
#[derive(Clone)]
pub struct WorkoutRepository {
    sink: Arc<dyn WorkoutSink>,
}

impl WorkoutRepository {
    pub fn new(sink: Arc<dyn WorkoutSink>) -> Self {
        Self { sink }
    }

    pub async fn save(&self, chat_id: ChatId, workout: &Workout) -> Result<()> {
        validate(chat_id, workout)?;
        self.sink.persist(chat_id, workout).await
    }
}

fn validate(chat_id: ChatId, workout: &Workout) -> Result<()> {
    if chat_id.0 == 0 {
        return Err(Error::Validation("chat id must be a non-zero integer".to_string()));
    }
    if workout.exercises.is_empty() {
        return Err(Error::Validation(
            "workout must contain exercises".to_string(),
        ));
    }
    Ok(())
}

/// Sink for deployments without storage; every save fails.
pub struct UnimplementedSink;

#[async_trait]
impl WorkoutSink for UnimplementedSink {
    async fn persist(&self, chat_id: ChatId, workout: &Workout) -> Result<()> {
        Err(Error::NotImplemented(format!(
            "workout persistence for chat {} ({})",
            chat_id.0, workout.date
        )))
    }
}

#[derive(Serialize)]
struct WorkoutRecord<'a> {
    chat_id: ChatId,
    saved_at: DateTime<Utc>,
    workout: &'a Workout,
}

/// Appends one JSON object per workout to a file.
pub struct JsonlWorkoutSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlWorkoutSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WorkoutSink for JsonlWorkoutSink {
    async fn persist(&self, chat_id: ChatId, workout: &Workout) -> Result<()> {
        let record = WorkoutRecord {
            chat_id,
            saved_at: Utc::now(),
            workout,
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::Storage(format!("open {}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
