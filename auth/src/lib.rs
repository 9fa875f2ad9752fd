//! Authentication primitives
//!
//! Provides the credential building blocks used by the accounts service:
//! - Password hashing (Argon2id)
//! - JWT encoding and validation
//! - Access/refresh token pairs
//!
//! Services define their own account model and compose these pieces.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenService, TokenSettings};
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", TokenSettings::default());
//!
//! // Login: issue a pair for the account id
//! let pair = tokens.issue("user123").unwrap();
//!
//! // Protected request: recover the account id from the access token
//! let subject = tokens.authenticate(&pair.access_token).unwrap();
//! assert_eq!(subject, "user123");
//!
//! // Renewal: trade the refresh token for a new pair
//! let renewed = tokens.refresh(&pair.refresh_token).unwrap();
//! assert_eq!(tokens.authenticate(&renewed.access_token).unwrap(), "user123");
//! ```

pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenType;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::TokenError;
pub use tokens::TokenPair;
pub use tokens::TokenService;
pub use tokens::TokenSettings;
