//! Authentication adapters.
//!
//! - `jwt` - HS256 tokens for local email/password accounts
//! - `oidc` - third-party OpenID Connect tokens verified against JWKS
//! - `composite` - accepts whichever of the above signed the token
//! - `password` - Argon2id password hashing
//! - `mock` - fixed-token validator for tests

mod composite;
mod jwt;
mod mock;
mod oidc;
mod password;

pub use composite::CompositeSessionValidator;
pub use jwt::LocalJwtService;
pub use mock::MockSessionValidator;
pub use oidc::{OidcConfig, OidcSessionValidator};
pub use password::Argon2PasswordHasher;
