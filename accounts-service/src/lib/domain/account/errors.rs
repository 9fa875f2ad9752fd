use std::fmt;

use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("This field may not be blank.")]
    Blank,

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Enter a valid email address.")]
    InvalidFormat(String),

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize, actual: usize },
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Enter a valid phone number.")]
    InvalidFormat(String),
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize, actual: usize },
}

/// Identifying field whose uniqueness constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
    Phone,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Username => f.write_str("username"),
            ConflictField::Email => f.write_str("email"),
            ConflictField::Phone => f.write_str("phone"),
        }
    }
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    #[error("{0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    // Domain-level errors
    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(ConflictField),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    CurrentPasswordMismatch,

    #[error("New password must be different from the current password")]
    SameAsPrevious,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        AccountError::DatabaseError(err.to_string())
    }
}
