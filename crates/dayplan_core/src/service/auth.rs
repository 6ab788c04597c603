//! Local account lookup.
//!
//! # Responsibility
//! - Register and look up accounts stored under `users`.
//! - Track the signed-in account under `currentUser`.
//!
//! # Invariants
//! - Emails are unique (exact match after trimming).
//! - Managers consume only `AuthSession`; they never mutate users.
//! - Passwords are compared as stored. This is not an access-control layer.

use crate::model::user::User;
use crate::model::validation::{required, ValidationError, MIN_PASSWORD_CHARS};
use crate::store::{keys, KvStore, StoreError};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// What the managers need from the auth collaborator.
pub trait AuthSession {
    fn current_user(&self) -> Option<User>;

    fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }
}

#[derive(Debug)]
pub enum AuthError {
    Validation(ValidationError),
    EmailTaken,
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmailTaken => write!(f, "an account with this email already exists"),
            Self::Store(err) => write!(f, "storage write failed: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::EmailTaken => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Account directory backed by the same store as the managers.
pub struct LocalAuth<S: KvStore> {
    store: S,
}

impl<S: KvStore> LocalAuth<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn users(&self) -> Vec<User> {
        self.store.load_or(keys::USERS, Vec::new())
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// - `Validation` for blank fields, a malformed email or a short password.
    /// - `EmailTaken` when the email is already registered.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = required("name", name)?;
        let email = required("email", email)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ValidationError::PasswordTooShort.into());
        }

        let mut users = self.users();
        if users.iter().any(|user| user.email == email) {
            return Err(AuthError::EmailTaken);
        }
        let user = User {
            email,
            password: password.to_string(),
            name,
            profile_image: None,
        };
        users.push(user.clone());
        self.store.save(keys::USERS, &users)?;
        self.store.save(keys::CURRENT_USER, &user)?;
        info!(
            "event=user_register module=auth status=ok users={}",
            users.len()
        );
        Ok(user)
    }

    /// Signs in when the email and password match a stored account.
    pub fn login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        let email = email.trim();
        let Some(user) = self
            .users()
            .into_iter()
            .find(|user| user.email == email && user.password == password)
        else {
            info!("event=user_login module=auth status=rejected");
            return Ok(false);
        };
        self.store.save(keys::CURRENT_USER, &user)?;
        info!("event=user_login module=auth status=ok");
        Ok(true)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(keys::CURRENT_USER)?;
        info!("event=user_logout module=auth status=ok");
        Ok(())
    }
}

impl<S: KvStore> AuthSession for LocalAuth<S> {
    fn current_user(&self) -> Option<User> {
        self.store.load(keys::CURRENT_USER)
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, AuthSession, LocalAuth};
    use crate::model::validation::ValidationError;
    use crate::store::MemoryKvStore;

    #[test]
    fn register_signs_in_and_rejects_duplicates() {
        let auth = LocalAuth::new(MemoryKvStore::new());
        let user = auth.register("Ana", "ana@example.com", "secret1").unwrap();
        assert!(auth.is_logged_in());
        assert_eq!(auth.current_user().unwrap().email, user.email);

        let err = auth
            .register("Other", " ana@example.com ", "secret2")
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn register_validates_input() {
        let auth = LocalAuth::new(MemoryKvStore::new());
        assert!(matches!(
            auth.register("Ana", "not-an-email", "secret1").unwrap_err(),
            AuthError::Validation(ValidationError::InvalidEmail)
        ));
        assert!(matches!(
            auth.register("Ana", "ana@example.com", "12345").unwrap_err(),
            AuthError::Validation(ValidationError::PasswordTooShort)
        ));
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn login_and_logout_move_the_session() {
        let auth = LocalAuth::new(MemoryKvStore::new());
        auth.register("Ana", "ana@example.com", "secret1").unwrap();
        auth.logout().unwrap();
        assert!(!auth.is_logged_in());

        assert!(!auth.login("ana@example.com", "wrong!").unwrap());
        assert!(!auth.is_logged_in());
        assert!(auth.login("ana@example.com", "secret1").unwrap());
        assert_eq!(
            auth.current_user().unwrap().avatar(),
            crate::model::user::PLACEHOLDER_PROFILE_IMAGE
        );
    }
}
