//! Account handlers - local sign-up and sign-in, third-party provisioning.

mod get_account;
mod login;
mod register;
mod sync_account;

pub use get_account::GetAccountHandler;
pub use login::{LoginCommand, LoginHandler};
pub use register::{RegisterCommand, RegisterHandler, SignedIn};
pub use sync_account::{SyncAccountHandler, SyncAccountResult};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::PasswordHasher;

    /// Reversible stand-in so tests don't pay for argon2.
    pub struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
            match hash.strip_prefix("plain$") {
                Some(stored) => Ok(stored == password),
                None => Err(DomainError::new(ErrorCode::InternalError, "unknown hash format")),
            }
        }
    }
}
