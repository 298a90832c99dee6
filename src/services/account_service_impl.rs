//! Default implementation of the `AccountService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::account::Account;
use crate::services::account_service::{AccountError, AccountService, RenameOutcome};
use crate::services::password::{HashError, PasswordHasher};
use crate::services::token::TokenIssuer;
use crate::services::user_store::UserStore;

/// Password hashed once at startup; unknown-user logins verify against it so
/// they cost the same as a wrong password.
const DUMMY_PASSWORD: &str = "accounts-dummy-password";

pub struct DefaultAccountService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    dummy_hash: String,
}

impl DefaultAccountService {
    pub async fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Result<Self, HashError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD).await?;

        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }
}

#[async_trait]
impl AccountService for DefaultAccountService {
    async fn register(&self, username: &str, password: &str) -> Result<(), AccountError> {
        // Advisory only: two requests can both pass this check. The store's
        // uniqueness constraint decides, and its Duplicate maps to Conflict.
        if self.store.find_by_username(username).await?.is_some() {
            return Err(AccountError::Conflict);
        }

        let password_hash = self.hasher.hash(password).await?;

        self.store
            .insert(Account {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!("Registered user: {username}");
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, AccountError> {
        let Some(account) = self.store.find_by_username(username).await? else {
            // Result ignored; only the cost matters
            let _ = self.hasher.verify(password, &self.dummy_hash).await;
            warn!("Login rejected for {username}: unknown user");
            return Err(AccountError::Unauthorized);
        };

        if !self.hasher.verify(password, &account.password_hash).await? {
            warn!("Login rejected for {username}: wrong password");
            return Err(AccountError::Unauthorized);
        }

        let token = self.tokens.issue(&account.username)?;

        info!("Issued token for user: {username}");
        Ok(token)
    }

    async fn rename(
        &self,
        current_username: &str,
        new_username: &str,
    ) -> Result<RenameOutcome, AccountError> {
        let matched = self.store.rename(current_username, new_username).await?;

        if matched > 0 {
            info!("Renamed user {current_username} to {new_username}");
        }

        Ok(RenameOutcome {
            matched: matched > 0,
        })
    }
}
