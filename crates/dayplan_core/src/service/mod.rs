//! Session managers over the local store.
//!
//! # Responsibility
//! - Own each in-memory collection for the lifetime of a session.
//! - Mirror every successful mutation to the store before returning.
//!
//! # Invariants
//! - Validation failures leave memory and storage untouched.
//! - Unknown ids are silent no-ops, never errors.
//! - Storage parse failures degrade to default collections at open time.

use crate::model::validation::ValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth;
pub mod habit_tracker;
pub mod planner;
pub mod project_registry;
pub mod query;
pub mod task_list;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a manager operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any mutation.
    Validation(ValidationError),
    /// The mutation happened in memory but could not be written through.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "storage write failed: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl ServiceError {
    /// Whether the error should be shown inline next to the form.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
