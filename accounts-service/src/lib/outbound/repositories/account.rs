use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::errors::ConflictField;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::PhoneNumber;
use crate::domain::account::models::Username;
use crate::domain::account::ports::AccountRepository;

const SELECT_ACCOUNT: &str = r#"
    SELECT id, username, email, phone, password_hash, created_at, updated_at
    FROM accounts
"#;

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// First identifying field of `account` already in use, in priority order.
    async fn find_conflict(
        conn: &mut PgConnection,
        account: &Account,
    ) -> Result<Option<ConflictField>, AccountError> {
        let candidates = [
            (ConflictField::Username, Some(account.username.as_str())),
            (
                ConflictField::Email,
                account.email.as_ref().map(|e| e.as_str()),
            ),
            (
                ConflictField::Phone,
                account.phone.as_ref().map(|p| p.as_str()),
            ),
        ];

        for (field, value) in candidates {
            let Some(value) = value else { continue };

            let query = format!(
                "SELECT EXISTS (SELECT 1 FROM accounts WHERE {} = $1)",
                field
            );
            let taken = sqlx::query_scalar::<_, bool>(&query)
                .bind(value)
                .fetch_one(&mut *conn)
                .await?;

            if taken {
                return Ok(Some(field));
            }
        }

        Ok(None)
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: Option<String>,
    phone: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let corrupt = |e: &dyn std::fmt::Display| {
            AccountError::DatabaseError(format!("Stored account {} is invalid: {}", row.id, e))
        };

        Ok(Account {
            id: AccountId(row.id),
            username: Username::new(row.username).map_err(|e| corrupt(&e))?,
            email: row
                .email
                .map(EmailAddress::new)
                .transpose()
                .map_err(|e| corrupt(&e))?,
            phone: row
                .phone
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|e| corrupt(&e))?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique violation raised by a concurrent insert to the field it guards.
fn map_insert_error(err: sqlx::Error) -> AccountError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("accounts_username_key") => {
                    return AccountError::Conflict(ConflictField::Username)
                }
                Some("accounts_email_key") => return AccountError::Conflict(ConflictField::Email),
                Some("accounts_phone_key") => return AccountError::Conflict(ConflictField::Phone),
                _ => {}
            }
        }
    }
    AccountError::DatabaseError(err.to_string())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        if let Some(field) = Self::find_conflict(&mut *tx, &account).await? {
            tracing::debug!(%field, "Account registration conflict");
            return Err(AccountError::Conflict(field));
        }

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, phone, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_ref().map(|e| e.as_str()))
        .bind(account.phone.as_ref().map(|p| p.as_str()))
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        tx.commit().await.map_err(map_insert_error)?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        sqlx::query_as::<_, AccountRow>(&format!("{SELECT_ACCOUNT} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
