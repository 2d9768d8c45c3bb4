//! Access token issuance for local sign-in.

use serde::Serialize;

use crate::domain::account::UserAccount;
use crate::domain::foundation::{DomainError, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: Timestamp,
}

impl IssuedToken {
    pub fn bearer(access_token: String, expires_at: Timestamp) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_at,
        }
    }
}

/// Mints access tokens that the matching `SessionValidator` accepts.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, account: &UserAccount) -> Result<IssuedToken, DomainError>;
}
