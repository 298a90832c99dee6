//! Domain service for account registration, login and rename.

use thiserror::Error;

use super::password::HashError;
use super::token::TokenError;
use super::user_store::StoreError;

/// Errors specific to account operations.
///
/// `Unauthorized` deliberately does not say whether the username or the
/// password was wrong.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already exists")]
    Conflict,

    #[error("Invalid username or password")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => Self::Conflict,
            StoreError::Database(msg) => Self::Internal(msg),
        }
    }
}

impl From<HashError> for AccountError {
    fn from(err: HashError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of a rename. `matched == false` means no account carried the old
/// username and nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOutcome {
    pub matched: bool,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an account with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] if the username is taken, including
    /// when a concurrent registration wins the race to the store.
    async fn register(&self, username: &str, password: &str) -> Result<(), AccountError>;

    /// Verifies credentials and returns a signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Unauthorized`] for an unknown user or a wrong password.
    async fn login(&self, username: &str, password: &str) -> Result<String, AccountError>;

    /// Changes `current_username` to `new_username`.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Conflict`] if `new_username` belongs to another account.
    async fn rename(
        &self,
        current_username: &str,
        new_username: &str,
    ) -> Result<RenameOutcome, AccountError>;
}
