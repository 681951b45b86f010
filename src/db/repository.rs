//! User repository for roleguard.
//!
//! This module provides user persistence on top of the `users` table.

use super::repository_traits::{CredentialStore, StoreError};
use super::user::{NewUser, User};
use super::DbPool;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";

/// Map a sqlx error to a store error, surfacing unique violations.
fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::UniqueViolation
        }
        other => StoreError::Storage(other.to_string()),
    }
}

/// Repository for user records.
#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    /// Create a new UserRepository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID. A duplicate username
    /// yields [`StoreError::UniqueViolation`].
    pub async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    /// Get a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }
}

impl CredentialStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.get_by_username(username).await
    }

    async fn insert(&self, new_user: &NewUser) -> Result<User, StoreError> {
        self.create(new_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Role};

    async fn setup() -> UserRepository {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup().await;

        let user = repo
            .create(&NewUser::new("alice", "hash", Role::Manager))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.role, Role::Manager);
        assert!(!user.created_at.is_empty());
        assert!(!user.updated_at.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_username_is_case_sensitive() {
        let repo = setup().await;
        repo.create(&NewUser::new("Alice", "hash", Role::User))
            .await
            .unwrap();

        let found = repo.get_by_username("Alice").await.unwrap();
        assert_eq!(found.unwrap().username, "Alice");

        assert!(repo.get_by_username("alice").await.unwrap().is_none());
        assert!(repo.get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_usernames_differing_in_case_are_distinct() {
        let repo = setup().await;
        let lower = repo
            .create(&NewUser::new("alice", "hash1", Role::User))
            .await
            .unwrap();
        let upper = repo
            .create(&NewUser::new("Alice", "hash2", Role::Admin))
            .await
            .unwrap();

        assert_ne!(lower.id, upper.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let repo = setup().await;
        repo.create(&NewUser::new("alice", "hash1", Role::User))
            .await
            .unwrap();

        let result = repo.create(&NewUser::new("alice", "hash2", Role::Admin)).await;
        assert_eq!(result.unwrap_err(), StoreError::UniqueViolation);

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_credential_store_impl() {
        let repo = setup().await;

        let inserted = CredentialStore::insert(&repo, &NewUser::new("carol", "hash", Role::Admin))
            .await
            .unwrap();
        let found = repo.find_by_username("carol").await.unwrap().unwrap();

        assert_eq!(found.id, inserted.id);
        assert_eq!(found.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_error() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());
        db.close().await;

        let result = repo.get_by_username("alice").await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
    }
}
