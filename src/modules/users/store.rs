//! Credential store: account persistence plus password hashing.
//!
//! Handlers never see the repository directly. Every write that changes the
//! plaintext password goes through [`CredentialStore::create`] or
//! [`CredentialStore::change_secret`], which are the only places that hash.

use std::sync::Arc;

use tracing::instrument;

use schoolhub_core::{AppError, hash_password, verify_password};
use schoolhub_models::{Account, NewAdmin, ProfileUpdate, Role, UserId};

use super::repository::{AccountRepository, RepositoryError};

pub const DUPLICATE_ACCOUNT: &str = "User with this email, phone, or username already exists";
pub const ADMIN_NOT_FOUND: &str = "Admin not found";

fn map_repository_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found(anyhow::anyhow!(ADMIN_NOT_FOUND)),
        RepositoryError::Conflict => AppError::conflict(DUPLICATE_ACCOUNT),
        RepositoryError::Database(e) => AppError::database(e),
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn AccountRepository>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, admin), fields(username = %admin.username))]
    pub async fn create(&self, admin: NewAdmin, role: Role) -> Result<Account, AppError> {
        let password_hash = hash_password(&admin.password)?;

        self.repo
            .insert(&admin, &password_hash, role)
            .await
            .map_err(map_repository_error)
    }

    pub async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, AppError> {
        self.repo
            .find_by_identity(identity)
            .await
            .map_err(map_repository_error)
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, AppError> {
        self.repo.find_by_id(id).await.map_err(map_repository_error)
    }

    /// Compares `candidate` against the stored bcrypt hash.
    pub fn verify_secret(&self, account: &Account, candidate: &str) -> Result<bool, AppError> {
        verify_password(candidate, &account.password_hash)
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<Account, AppError> {
        self.repo
            .update_profile(id, &update)
            .await
            .map_err(map_repository_error)
    }

    #[instrument(skip(self))]
    pub async fn set_avatar(&self, id: UserId, url: &str) -> Result<Account, AppError> {
        self.repo
            .set_avatar(id, url)
            .await
            .map_err(map_repository_error)
    }

    /// Re-hashes and stores a new plaintext password.
    #[instrument(skip(self, new_plaintext))]
    pub async fn change_secret(&self, id: UserId, new_plaintext: &str) -> Result<(), AppError> {
        let password_hash = hash_password(new_plaintext)?;

        self.repo
            .set_password_hash(id, &password_hash)
            .await
            .map_err(map_repository_error)
    }

    /// Replaces (or clears, with `None`) the stored refresh token.
    #[instrument(skip(self, token), fields(clear = token.is_none()))]
    pub async fn set_refresh_credential(
        &self,
        id: UserId,
        token: Option<&str>,
    ) -> Result<(), AppError> {
        self.repo
            .set_refresh_token(id, token)
            .await
            .map_err(map_repository_error)
    }
}
