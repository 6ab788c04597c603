//! Domain model for habits, tasks, projects and users.
//!
//! # Responsibility
//! - Define the closed record shapes persisted under each store key.
//! - Validate records at the storage boundary instead of trusting them.
//!
//! # Invariants
//! - `Habit::progress.len() == Habit::duration_days` after `normalize()`.
//! - A `Task` lives in exactly one `TaskCollection`.

pub mod habit;
pub mod project;
pub mod task;
pub mod user;
pub mod validation;
