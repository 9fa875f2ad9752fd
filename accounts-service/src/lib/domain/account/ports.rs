use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountProfile;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::RegisterAccountCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated username, optional email and phone, and password
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `Conflict` - Username, email or phone is already taken (reported in that priority)
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterAccountCommand) -> Result<Account, AccountError>;

    /// Check a username/password pair.
    ///
    /// # Returns
    /// The matching account
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password, indistinguishably
    /// * `DatabaseError` - Database operation failed
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError>;

    /// Replace the password of an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `CurrentPasswordMismatch` - Current password does not match the stored hash
    /// * `SameAsPrevious` - New password equals the current one
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;

    /// Read the non-secret projection of an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_profile(&self, id: &AccountId) -> Result<AccountProfile, AccountError>;
}

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// Uniqueness checks and the insert happen as one atomic unit.
    ///
    /// # Errors
    /// * `Conflict` - Username, then email, then phone already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by exact username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError>;

    /// Store a new password hash.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AccountError>;
}
