//! Hash command implementation.

use std::path::Path;
use std::sync::Arc;
use wc24mail_server::{CredentialHasher, Salt};

/// Prints the salted digest of `credential` under the existing salt.
pub fn run(salt_path: &Path, credential: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", digest(salt_path, credential)?);
    Ok(())
}

fn digest(salt_path: &Path, credential: &str) -> Result<String, Box<dyn std::error::Error>> {
    let salt = Salt::load(salt_path)
        .map_err(|e| format!("unable to load salt from {}: {e}", salt_path.display()))?;
    Ok(CredentialHasher::new(Arc::new(salt)).hash(credential))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_uses_salt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salt.bin");
        let salt = Salt::load_or_generate(&path).unwrap();

        let expected = CredentialHasher::new(Arc::new(salt)).hash("abcdefghij123456");
        assert_eq!(digest(&path, "abcdefghij123456").unwrap(), expected);
    }

    #[test]
    fn digest_requires_salt() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest(&dir.path().join("salt.bin"), "x").unwrap_err();
        assert!(err.to_string().contains("unable to load salt"));
    }
}
