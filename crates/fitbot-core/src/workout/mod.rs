//! Workout logging: pick a split, type exercises and sets, save.

pub mod flow;
pub mod format;
pub mod keyboards;
pub mod parser;
pub mod repository;
pub mod types;

pub use flow::WorkoutLog;
pub use repository::{
    InMemoryWorkoutSessions, JsonlWorkoutSink, UnimplementedSink, WorkoutRepository,
    WorkoutSessionRepository, WorkoutSink,
};
pub use types::{Exercise, SetEntry, Workout, WorkoutSession, WorkoutSplit, WorkoutStep};
