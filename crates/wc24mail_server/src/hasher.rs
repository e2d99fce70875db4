//! Salted credential digests.
//!
//! Digests are `SHA-512(salt || credential)`, hex encoded. Credentials
//! are only ever compared through their digests.

use crate::salt::Salt;
use sha2::{Digest, Sha512};
use std::sync::Arc;

/// Hashes credentials with the process salt.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    salt: Arc<Salt>,
}

impl CredentialHasher {
    /// Creates a hasher over the given salt.
    pub fn new(salt: Arc<Salt>) -> Self {
        Self { salt }
    }

    /// Returns the lowercase hex digest of `plaintext`.
    pub fn hash(&self, plaintext: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if `submitted` hashes to `stored_digest`.
    pub fn verify(&self, submitted: &str, stored_digest: &str) -> bool {
        self.hash(submitted) == stored_digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::SALT_LEN;

    fn hasher(byte: u8) -> CredentialHasher {
        CredentialHasher::new(Arc::new(Salt::from_bytes([byte; SALT_LEN])))
    }

    #[test]
    fn digest_is_deterministic() {
        let hasher = hasher(1);
        assert_eq!(hasher.hash("abcdefghij123456"), hasher.hash("abcdefghij123456"));
    }

    #[test]
    fn digest_is_hex_sha512() {
        let digest = hasher(1).hash("abcdefghij123456");
        assert_eq!(digest.len(), 128);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_matches_salt_then_credential() {
        let salt = [9u8; SALT_LEN];
        let mut input = salt.to_vec();
        input.extend_from_slice(b"secret");
        let expected = hex::encode(Sha512::digest(&input));

        assert_eq!(hasher(9).hash("secret"), expected);
    }

    #[test]
    fn digest_changes_with_salt() {
        assert_ne!(hasher(1).hash("secret"), hasher(2).hash("secret"));
    }

    #[test]
    fn digest_changes_with_credential() {
        let hasher = hasher(1);
        assert_ne!(hasher.hash("secret-one"), hasher.hash("secret-two"));
    }

    #[test]
    fn verify_against_stored() {
        let hasher = hasher(3);
        let stored = hasher.hash("abcdefghij123456");
        assert!(hasher.verify("abcdefghij123456", &stored));
        assert!(!hasher.verify("abcdefghij123457", &stored));
        assert!(!hasher.verify("abcdefghij123456", "abcdefghij123456"));
    }
}
