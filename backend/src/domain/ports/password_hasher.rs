//! Driven port turning passwords into stored digests.

use crate::domain::{Password, PasswordHash};

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest for `password`.
    fn hash(&self, password: &Password) -> PasswordHash;

    /// Check `candidate` against a stored digest in constant time.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool;
}
