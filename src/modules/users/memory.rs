//! In-memory [`AccountRepository`] used by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use schoolhub_models::{Account, NewAdmin, ProfileUpdate, Role, UserId};

use super::repository::{AccountRepository, RepositoryError};

/// Enforces the same uniqueness rules as the `users` table.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `account` as is, bypassing uniqueness checks.
    pub async fn seed(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn collides(
    accounts: &HashMap<UserId, Account>,
    except: Option<UserId>,
    username: &str,
    email: &str,
    phone: &str,
) -> bool {
    accounts.values().any(|a| {
        Some(a.id) != except
            && (a.username == username || a.email == email || a.phone == phone)
    })
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(
        &self,
        admin: &NewAdmin,
        password_hash: &str,
        role: Role,
    ) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;

        if collides(
            &accounts,
            None,
            &admin.username,
            admin.email.as_str(),
            admin.phone.as_str(),
        ) {
            return Err(RepositoryError::Conflict);
        }

        let now = Utc::now();
        let account = Account {
            id: UserId::new(),
            name: admin.name.clone(),
            username: admin.username.clone(),
            phone: admin.phone.clone(),
            email: admin.email.clone(),
            password_hash: password_hash.to_string(),
            role,
            avatar: String::new(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, RepositoryError> {
        let email = identity.to_lowercase();
        let accounts = self.accounts.read().await;

        Ok(accounts
            .values()
            .find(|a| a.username == identity || a.email == email.as_str())
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;

        if !accounts.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if collides(
            &accounts,
            Some(id),
            &update.username,
            update.email.as_str(),
            update.phone.as_str(),
        ) {
            return Err(RepositoryError::Conflict);
        }

        let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        account.name = update.name.clone();
        account.username = update.username.clone();
        account.email = update.email.clone();
        account.phone = update.phone.clone();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn set_avatar(&self, id: UserId, url: &str) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        account.avatar = url.to_string();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        account.password_hash = hash.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn set_refresh_token(
        &self,
        id: UserId,
        token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        account.refresh_token = token.map(str::to_string);
        Ok(())
    }
}
