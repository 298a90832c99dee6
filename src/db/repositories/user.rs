use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};

use crate::entities::users;
use crate::models::account::Account;
use crate::services::user_store::StoreError;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get account by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to query user by username: {e}")))?;

        Ok(user.map(Account::from))
    }

    /// Insert a new account. A unique index violation means another request
    /// registered the same username first.
    pub async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let active = users::ActiveModel {
            username: Set(account.username.clone()),
            password_hash: Set(account.password_hash),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| map_write_error(e, &account.username))?;

        Ok(())
    }

    /// Rename in place, returning how many rows matched
    pub async fn rename(&self, current_username: &str, new_username: &str) -> Result<u64, StoreError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Username, Expr::value(new_username))
            .filter(users::Column::Username.eq(current_username))
            .exec(&self.conn)
            .await
            .map_err(|e| map_write_error(e, new_username))?;

        Ok(result.rows_affected)
    }
}

fn map_write_error(err: DbErr, username: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate(username.to_string()),
        _ => StoreError::Database(err.to_string()),
    }
}
