//! Storage seam for accounts.
//!
//! [`AccountService`](super::AccountService) only talks to this trait, so the
//! `SeaORM` store can be swapped for [`InMemoryUserStore`] in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::account::Account;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write would break the one-account-per-username constraint.
    #[error("Username already taken: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the username is already stored.
    async fn insert(&self, account: Account) -> Result<(), StoreError>;

    /// Sets `username = new_username` on the account currently named `current_username`.
    /// Returns the number of matched records (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when `new_username` belongs to another account.
    async fn rename(&self, current_username: &str, new_username: &str) -> Result<u64, StoreError>;
}

/// Process-local store keyed by username. Enforces the same uniqueness rule
/// as the database index.
#[derive(Default)]
pub struct InMemoryUserStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Err(StoreError::Duplicate(account.username));
        }
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    async fn rename(&self, current_username: &str, new_username: &str) -> Result<u64, StoreError> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(current_username) {
            return Ok(0);
        }
        if current_username == new_username {
            return Ok(1);
        }
        if accounts.contains_key(new_username) {
            return Err(StoreError::Duplicate(new_username.to_string()));
        }

        if let Some(mut account) = accounts.remove(current_username) {
            account.username = new_username.to_string();
            accounts.insert(account.username.clone(), account);
        }
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str) -> Account {
        Account {
            username: username.to_string(),
            password_hash: format!("hash-of-{username}"),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate() {
        let store = InMemoryUserStore::new();
        store.insert(account("alice")).await.unwrap();

        let err = store.insert(account("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(name) if name == "alice"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_rename_moves_account() {
        let store = InMemoryUserStore::new();
        store.insert(account("alice")).await.unwrap();

        assert_eq!(store.rename("alice", "alice2").await.unwrap(), 1);
        assert!(store.find_by_username("alice").await.unwrap().is_none());

        let renamed = store.find_by_username("alice2").await.unwrap().unwrap();
        assert_eq!(renamed.password_hash, "hash-of-alice");
    }

    #[tokio::test]
    async fn test_rename_unknown_matches_nothing() {
        let store = InMemoryUserStore::new();
        assert_eq!(store.rename("ghost", "someone").await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rename_onto_existing_is_duplicate() {
        let store = InMemoryUserStore::new();
        store.insert(account("alice")).await.unwrap();
        store.insert(account("bob")).await.unwrap();

        let err = store.rename("alice", "bob").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(
            store.find_by_username("bob").await.unwrap().unwrap().password_hash,
            "hash-of-bob"
        );
        assert!(store.find_by_username("alice").await.unwrap().is_some());
    }
}
