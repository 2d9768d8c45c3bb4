//! Account module - user records for both sign-in paths.

use serde::{Deserialize, Serialize};

use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{IdentityProvider, Timestamp, UserId, ValidationError};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 40;

/// Normalized (trimmed, lowercased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let email = input.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        let (local, domain) = email
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format("email", "missing @"))?;
        if local.is_empty()
            || domain.len() < 3
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || email.chars().any(char::is_whitespace)
        {
            return Err(ValidationError::invalid_format("email", "not a valid address"));
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks length only; strength beyond that is the user's call.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(ValidationError::out_of_range(
            "password",
            MIN_PASSWORD_LENGTH as i64,
            MAX_PASSWORD_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::empty_field("display_name"));
    }
    let len = name.chars().count();
    if len > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::out_of_range(
            "display_name",
            1,
            MAX_DISPLAY_NAME_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    /// PHC string; absent for third-party identities.
    pub password_hash: Option<String>,
    pub provider: IdentityProvider,
    pub tier: SubscriptionTier,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserAccount {
    pub fn local(email: Email, display_name: String, password_hash: String) -> Self {
        let now = Timestamp::now();
        Self {
            id: UserId::generate(),
            email,
            display_name,
            password_hash: Some(password_hash),
            provider: IdentityProvider::Local,
            tier: SubscriptionTier::Free,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Account for an identity established by an external provider.
    pub fn third_party(id: UserId, email: Email, display_name: String) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            email,
            display_name,
            password_hash: None,
            provider: IdentityProvider::ThirdParty,
            tier: SubscriptionTier::Free,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
