//! Identity provider integration
//!
//! Tokens are issued by the external identity provider and only verified
//! here:
//! - [`JwtService`] - HS256 verification
//! - [`CurrentUser`] - required authentication extractor
//! - [`OptionalUser`] - anonymous-friendly extractor

pub mod extractor;
pub mod jwt;

pub use extractor::OptionalUser;
pub use jwt::{Claims, CurrentUser, JwtError, JwtService, ROLE_CUSTOMER, ROLE_STAFF};
