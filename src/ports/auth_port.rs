//! Authentication port trait.

use crate::domain::error::JournalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}

pub trait AuthPort: Send + Sync {
    fn current_user(&self) -> Option<User>;

    fn sign_in(&self, user_id: &str, email: Option<&str>) -> Result<User, JournalError>;

    /// Sign in under a freshly generated id.
    fn sign_in_anonymously(&self) -> Result<User, JournalError>;

    fn sign_out(&self);
}
