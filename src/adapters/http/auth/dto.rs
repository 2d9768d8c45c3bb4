//! Request and response bodies for `/api/auth`.

use serde::{Deserialize, Serialize};

use crate::application::handlers::auth::{SignedIn, SyncAccountResult};
use crate::domain::account::UserAccount;
use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{IdentityProvider, Timestamp, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account. Never carries the password hash or Stripe ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub provider: IdentityProvider,
    pub tier: SubscriptionTier,
    pub created_at: Timestamp,
}

impl From<&UserAccount> for AccountResponse {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.as_str().to_string(),
            display_name: account.display_name.clone(),
            provider: account.provider,
            tier: account.tier,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_at: Timestamp,
}

impl From<SignedIn> for AuthResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            account: AccountResponse::from(&signed_in.account),
            access_token: signed_in.token.access_token,
            token_type: signed_in.token.token_type.to_string(),
            expires_at: signed_in.token.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub account: AccountResponse,
    pub created: bool,
}

impl From<SyncAccountResult> for SyncResponse {
    fn from(result: SyncAccountResult) -> Self {
        Self {
            account: AccountResponse::from(&result.account),
            created: result.created,
        }
    }
}
