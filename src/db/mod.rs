use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::account::Account;
use crate::services::user_store::{StoreError, UserStore};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl UserStore for Store {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.user_repo().get_by_username(username).await
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        self.user_repo().insert(account).await
    }

    async fn rename(&self, current_username: &str, new_username: &str) -> Result<u64, StoreError> {
        self.user_repo().rename(current_username, new_username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    fn account(username: &str) -> Account {
        Account {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let store = memory_store().await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = memory_store().await;
        store.insert(account("alice")).await.unwrap();

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, account("alice"));
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_index_reports_duplicate() {
        let store = memory_store().await;
        store.insert(account("alice")).await.unwrap();

        let err = store.insert(account("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_rename_counts_matches() {
        let store = memory_store().await;
        store.insert(account("alice")).await.unwrap();

        assert_eq!(store.rename("alice", "alice2").await.unwrap(), 1);
        assert_eq!(store.rename("alice", "alice3").await.unwrap(), 0);
        assert!(store.find_by_username("alice2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rename_collision_is_duplicate() {
        let store = memory_store().await;
        store.insert(account("alice")).await.unwrap();
        store.insert(account("bob")).await.unwrap();

        let err = store.rename("alice", "bob").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(name) if name == "bob"));
        assert!(store.find_by_username("alice").await.unwrap().is_some());
    }
}
