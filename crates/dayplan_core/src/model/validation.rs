use std::error::Error;
use std::fmt::{Display, Formatter};

/// Smallest accepted habit duration, in days.
pub const MIN_HABIT_DAYS: u32 = 1;
/// Largest accepted habit duration, in days.
pub const MAX_HABIT_DAYS: u32 = 365;
/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Form input that fails a constraint. The operation is aborted untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    Blank(&'static str),
    /// Habit duration outside `MIN_HABIT_DAYS..=MAX_HABIT_DAYS`.
    DurationOutOfRange(u32),
    /// Task has no category and no default category is registered.
    MissingCategory,
    /// Email does not look like `local@domain.tld`.
    InvalidEmail,
    /// Password shorter than `MIN_PASSWORD_CHARS`.
    PasswordTooShort,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{field} must not be empty"),
            Self::DurationOutOfRange(days) => write!(
                f,
                "duration must be between {MIN_HABIT_DAYS} and {MAX_HABIT_DAYS} days, got {days}"
            ),
            Self::MissingCategory => write!(f, "task category is required"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::PasswordTooShort => write!(
                f,
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{required, ValidationError};

    #[test]
    fn required_trims_and_rejects_whitespace() {
        assert_eq!(required("name", "  Read  ").unwrap(), "Read");
        assert_eq!(
            required("name", " \t ").unwrap_err(),
            ValidationError::Blank("name")
        );
    }
}
