//! Access/refresh token pairs.
//!
//! Tokens are self-contained: nothing is stored server side, and a token
//! stops working only when it expires.

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenType;

/// Token lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::minutes(5),
            refresh_token_lifetime: Duration::days(1),
        }
    }
}

/// Access and refresh token minted together for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Token validation and issuance errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Expected {expected} token, got {actual} token")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Failed to issue token: {0}")]
    IssueFailed(String),
}

impl TokenError {
    /// Coarse reason suitable for showing to a client.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Expired => "expired",
            TokenError::Invalid(_) | TokenError::WrongType { .. } => "invalid",
            TokenError::IssueFailed(_) => "internal",
        }
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => TokenError::Expired,
            JwtError::EncodingFailed(msg) => TokenError::IssueFailed(msg),
            JwtError::InvalidSignature | JwtError::DecodingFailed(_) => {
                TokenError::Invalid(err.to_string())
            }
        }
    }
}

/// Issues, refreshes and checks signed bearer tokens.
///
/// The signing secret is fixed at construction and only read afterwards,
/// so one instance can be shared across request handlers behind an `Arc`.
pub struct TokenService {
    jwt_handler: JwtHandler,
    settings: TokenSettings,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `secret` - HS256 signing secret
    /// * `settings` - Access and refresh token lifetimes
    pub fn new(secret: &[u8], settings: TokenSettings) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            settings,
        }
    }

    /// Mint a fresh token pair bound to `subject`.
    ///
    /// # Errors
    /// * `IssueFailed` - Token encoding failed
    pub fn issue(&self, subject: &str) -> Result<TokenPair, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let access = Claims::new(
            subject,
            TokenType::Access,
            now,
            self.settings.access_token_lifetime,
        );
        let refresh = Claims::new(
            subject,
            TokenType::Refresh,
            now,
            self.settings.refresh_token_lifetime,
        );

        Ok(TokenPair {
            access_token: self.jwt_handler.encode(&access)?,
            refresh_token: self.jwt_handler.encode(&refresh)?,
            access_token_expires_at: access.expires_at(),
            refresh_token_expires_at: refresh.expires_at(),
        })
    }

    /// Exchange a valid refresh token for a new pair bound to the same subject.
    ///
    /// Both tokens of the returned pair are new.
    ///
    /// # Errors
    /// * `Expired` - Refresh token is past its expiry
    /// * `Invalid` - Malformed token or bad signature
    /// * `WrongType` - An access token was supplied
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.decode_as(refresh_token, TokenType::Refresh)?;
        self.issue(&claims.sub)
    }

    /// Validate an access token and return its subject.
    ///
    /// # Errors
    /// * `Expired` - Access token is past its expiry
    /// * `Invalid` - Malformed token or bad signature
    /// * `WrongType` - A refresh token was supplied
    pub fn authenticate(&self, access_token: &str) -> Result<String, TokenError> {
        self.decode_as(access_token, TokenType::Access)
            .map(|claims| claims.sub)
    }

    fn decode_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}
