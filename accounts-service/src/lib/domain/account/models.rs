use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::PhoneError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Represents one registered identity. The password is only ever held as
/// an Argon2 PHC hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Non-empty, at most 150 characters, letters, digits and `@ . + - _` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 150;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Blank` - Username is empty
    /// * `TooLong` - Username longer than 150 characters
    /// * `InvalidCharacters` - Contains characters other than letters, digits and `@.+-_`
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length == 0 {
            Err(UsernameError::Blank)
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser, capped at the
/// 254 characters a forward path allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 254;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `TooLong` - Longer than 254 characters
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Phone number type
///
/// Stored normalized: an optional leading `+` followed by 7 to 15 digits.
/// Spaces, dashes, dots and parentheses are accepted on input and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    /// Create a new normalized phone number.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a plausible E.164 style number
    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let normalized: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
        let digit_count = digits.len();

        if digits.chars().all(|c| c.is_ascii_digit())
            && (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digit_count)
        {
            Ok(Self(normalized))
        } else {
            Err(PhoneError::InvalidFormat(phone))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw password that satisfies the length policy.
///
/// Only exists between request parsing and hashing; it is never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 5;

    /// Accept a raw password if it is long enough.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 5 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Read-only view of an account, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountProfile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_string(),
            email: account.email.as_ref().map(|e| e.as_str().to_string()),
            phone: account.phone.as_ref().map(|p| p.as_str().to_string()),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterAccountCommand {
    pub username: Username,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub password: Password,
}

impl RegisterAccountCommand {
    pub fn new(
        username: Username,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        password: Password,
    ) -> Self {
        Self {
            username,
            email,
            phone,
            password,
        }
    }
}

/// Command to replace the password of an authenticated account.
///
/// The new password already satisfies the length policy; the current
/// password is checked against the stored hash by the service.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: Password,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_valid() {
        assert!(Username::new("alice".to_string()).is_ok());
        assert!(Username::new("a".to_string()).is_ok());
        assert!(Username::new("alice.b+c-d_e@corp".to_string()).is_ok());
    }

    #[test]
    fn test_username_blank() {
        assert_eq!(Username::new(String::new()), Err(UsernameError::Blank));
    }

    #[test]
    fn test_username_too_long() {
        let result = Username::new("a".repeat(151));
        assert_eq!(
            result,
            Err(UsernameError::TooLong {
                max: 150,
                actual: 151
            })
        );
    }

    #[test]
    fn test_username_invalid_characters() {
        assert_eq!(
            Username::new("alice smith".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
        assert_eq!(
            Username::new("alice/x".to_string()),
            Err(UsernameError::InvalidCharacters)
        );
    }

    #[test]
    fn test_email() {
        assert!(EmailAddress::new("alice@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_email_too_long() {
        // Well-formed for the parser, but past the 254 character limit
        let long = format!("{}@{}.com", "a".repeat(60), vec!["b".repeat(60); 4].join("."));
        assert!(long.len() > 254);
        assert!(email_address::EmailAddress::is_valid(&long));

        assert_eq!(
            EmailAddress::new(long.clone()),
            Err(EmailError::TooLong {
                max: 254,
                actual: long.len()
            })
        );

        let at_limit = format!("{}@{}.com", "a".repeat(61), vec!["b".repeat(62); 3].join("."));
        assert_eq!(at_limit.len(), 254);
        assert!(EmailAddress::new(at_limit).is_ok());
    }

    #[test]
    fn test_phone_normalized() {
        let phone = PhoneNumber::new("+1 (555) 123-4567".to_string()).unwrap();
        assert_eq!(phone.as_str(), "+15551234567");

        let phone = PhoneNumber::new("0812.345.678".to_string()).unwrap();
        assert_eq!(phone.as_str(), "0812345678");
    }

    #[test]
    fn test_phone_invalid() {
        assert!(PhoneNumber::new("12345".to_string()).is_err());
        assert!(PhoneNumber::new("+1234567890123456".to_string()).is_err());
        assert!(PhoneNumber::new("555-CALL-NOW".to_string()).is_err());
        assert!(PhoneNumber::new("++15551234567".to_string()).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(Password::new("12345".to_string()).is_ok());
        assert_eq!(
            Password::new("1234".to_string()),
            Err(PasswordPolicyError::TooShort { min: 5, actual: 4 })
        );
        // Counted in characters, not bytes
        assert!(Password::new("ééé".to_string()).is_err());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("secret1".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("secret1"));
    }

    #[test]
    fn test_profile_has_no_password_hash() {
        let account = Account {
            id: AccountId::new(),
            username: Username::new("alice".to_string()).unwrap(),
            email: None,
            phone: Some(PhoneNumber::new("+15551234567".to_string()).unwrap()),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let profile = AccountProfile::from(&account);
        let json = serde_json::to_string(&profile).unwrap();

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.phone.as_deref(), Some("+15551234567"));
        assert!(!json.contains("argon2"));
    }
}
