//! Token validator for tests that have no identity provider to talk to.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Maps fixed token strings to users. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Registers `token` for a user whose email and name derive from `user_id`.
    ///
    /// Ids that fail `UserId` validation are skipped.
    pub fn with_test_user(self, token: impl Into<String>, user_id: &str) -> Self {
        let Ok(id) = UserId::new(user_id) else {
            return self;
        };
        let user = AuthenticatedUser::new(
            id,
            format!("{}@test.example.com", user_id),
            Some(format!("Player {}", user_id)),
            true,
        );
        self.with_user(token, user)
    }

    /// Every validation returns `error` until `clear_error` is called.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *write(&self.force_error) = None;
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        write(&self.tokens).insert(token.into(), user);
    }

    pub fn remove_token(&self, token: &str) {
        write(&self.tokens).remove(token);
    }
}

// A panicked test thread must not poison the fixture for the rest.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = read(&self.force_error).clone() {
            return Err(error);
        }
        read(&self.tokens).get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
