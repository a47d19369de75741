//! Password hashing adapter.
//!
//! Digests are encoded as `sha256$<iterations>$<salt hex>$<digest hex>` so the
//! iteration count can be raised later without invalidating stored hashes.

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::ports::PasswordHasher;
use crate::domain::{Password, PasswordHash};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Default number of SHA-256 rounds applied to each password.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Salted, iterated SHA-256 password hasher.
#[derive(Debug, Clone, Copy)]
pub struct Sha256PasswordHasher {
    iterations: u32,
}

impl Default for Sha256PasswordHasher {
    fn default() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }
}

impl Sha256PasswordHasher {
    /// Build a hasher applying `iterations` rounds (at least one).
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }
}

fn stretch(salt: &[u8], password: &str, iterations: u32) -> Zeroizing<Vec<u8>> {
    let mut digest = Zeroizing::new(
        Sha256::new()
            .chain_update(salt)
            .chain_update(password.as_bytes())
            .finalize()
            .to_vec(),
    );
    for _ in 1..iterations {
        *digest = Sha256::new()
            .chain_update(salt)
            .chain_update(digest.as_slice())
            .finalize()
            .to_vec();
    }
    digest
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &Password) -> PasswordHash {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = stretch(&salt, password.expose(), self.iterations);
        PasswordHash::new(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest.as_slice())
        ))
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool {
        let mut parts = hash.as_str().split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        let (Ok(iterations), Ok(salt), Ok(expected)) = (
            iterations.parse::<u32>(),
            hex::decode(salt),
            hex::decode(expected),
        ) else {
            return false;
        };
        if iterations == 0 {
            return false;
        }
        let actual = stretch(&salt, candidate, iterations);
        constant_time_eq(actual.as_slice(), &expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Sha256PasswordHasher {
        Sha256PasswordHasher::with_iterations(3)
    }

    #[rstest]
    fn verifies_matching_password(hasher: Sha256PasswordHasher) {
        let hash = hasher.hash(&Password::new("secret").expect("password"));
        assert!(hasher.verify("secret", &hash));
        assert!(!hasher.verify("Secret", &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Sha256PasswordHasher) {
        let password = Password::new("secret").expect("password");
        assert_ne!(hasher.hash(&password), hasher.hash(&password));
    }

    #[rstest]
    fn honours_iterations_recorded_in_the_digest(hasher: Sha256PasswordHasher) {
        let hash = hasher.hash(&Password::new("secret").expect("password"));
        assert!(hash.as_str().starts_with("sha256$3$"));
        assert!(Sha256PasswordHasher::with_iterations(7).verify("secret", &hash));
    }

    #[rstest]
    #[case("")]
    #[case("md5$1$00$00")]
    #[case("sha256$x$00$00")]
    #[case("sha256$0$00$00")]
    #[case("sha256$1$zz$00")]
    #[case("sha256$1$00$00$extra")]
    fn malformed_digests_never_verify(hasher: Sha256PasswordHasher, #[case] encoded: &str) {
        assert!(!hasher.verify("secret", &PasswordHash::new(encoded)));
    }
}
