//! Password hashing port for local accounts.

use crate::domain::foundation::DomainError;

/// Hashes and verifies passwords.
///
/// Hashes are self-describing strings (PHC format), so verification needs
/// no other stored parameters.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns `Ok(false)` for a wrong password; errors only on a corrupt hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
