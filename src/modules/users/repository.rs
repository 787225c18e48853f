//! Persistence seam for accounts.
//!
//! [`AccountRepository`] is implemented over PostgreSQL by
//! [`PgAccountRepository`]; tests use the in-memory implementation. Unique
//! indexes on `username`, `email` and `phone` are the only guard against
//! duplicates, so concurrent colliding writes surface as
//! [`RepositoryError::Conflict`].

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use schoolhub_models::{Account, NewAdmin, ProfileUpdate, Role, UserId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("account not found")]
    NotFound,
    #[error("username, email or phone already in use")]
    Conflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account. `password_hash` must already be hashed.
    async fn insert(
        &self,
        admin: &NewAdmin,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, RepositoryError>;

    /// Matches `username = identity` or `email = lower(identity)`.
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError>;

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Account, RepositoryError>;

    async fn set_avatar(&self, id: UserId, url: &str) -> Result<Account, RepositoryError>;

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError>;

    async fn set_refresh_token(
        &self,
        id: UserId,
        token: Option<&str>,
    ) -> Result<(), RepositoryError>;
}

const ACCOUNT_COLUMNS: &str = "id, name, username, phone, email, password, role, avatar, \
                               refresh_token, created_at, updated_at";

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict;
    }
    RepositoryError::Database(e)
}

#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(
        &self,
        admin: &NewAdmin,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (id, name, username, phone, email, password, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ACCOUNT_COLUMNS}"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(UserId::new())
            .bind(&admin.name)
            .bind(&admin.username)
            .bind(&admin.phone)
            .bind(&admin.email)
            .bind(password_hash)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, RepositoryError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users
             WHERE username = $1 OR email = LOWER($1)
             LIMIT 1"
        );

        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");

        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Account, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET name = $2, username = $3, email = $4, phone = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.username)
            .bind(&update.email)
            .bind(&update.phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_avatar(&self, id: UserId, url: &str) -> Result<Account, RepositoryError> {
        let sql = format!(
            "UPDATE users SET avatar = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_refresh_token(
        &self,
        id: UserId,
        token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
