//! Signed JWT encoding and decoding.

pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::Claims;
pub use claims::TokenType;
pub use errors::JwtError;
pub use handler::JwtHandler;
