use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountProfile;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::RegisterAccountCommand;

/// Domain service implementation for account operations.
///
/// Owns password hashing; storage is delegated to the injected repository.
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    password_hasher: auth::PasswordHasher,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service over `repository`.
    pub fn new(repository: Arc<AR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    async fn load(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, AccountError> {
        let password_hash = self.password_hasher.hash(command.password.as_str())?;
        let now = Utc::now();

        let account = Account {
            id: AccountId::new(),
            username: command.username,
            email: command.email,
            phone: command.phone,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(account).await?;
        tracing::info!(account_id = %created.id, username = %created.username, "Account registered");

        Ok(created)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let Some(account) = self.repository.find_by_username(username).await? else {
            self.password_hasher.verify_decoy(password)?;
            tracing::debug!("Login attempt for unknown username");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, &account.password_hash)? {
            tracing::debug!(account_id = %account.id, "Login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(account)
    }

    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        let account = self.load(id).await?;

        if !self
            .password_hasher
            .verify(&command.current_password, &account.password_hash)?
        {
            return Err(AccountError::CurrentPasswordMismatch);
        }

        if self
            .password_hasher
            .verify(command.new_password.as_str(), &account.password_hash)?
        {
            return Err(AccountError::SameAsPrevious);
        }

        let password_hash = self.password_hasher.hash(command.new_password.as_str())?;
        self.repository
            .update_password(id, &password_hash, Utc::now())
            .await?;

        tracing::info!(account_id = %id, "Password changed");
        Ok(())
    }

    async fn get_profile(&self, id: &AccountId) -> Result<AccountProfile, AccountError> {
        self.load(id).await.map(|ref account| account.into())
    }
}
