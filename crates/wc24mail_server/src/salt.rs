//! Process-wide password salt.
//!
//! The salt is loaded once at startup, or generated and persisted if the
//! file does not exist yet. Every stored digest depends on it, so an
//! existing salt file is never overwritten.

use crate::error::{ServerError, ServerResult};
use rand::RngCore;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;
use zeroize::Zeroize;

/// Size of the salt in bytes.
pub const SALT_LEN: usize = 128;

/// Default location of the salt file.
pub const DEFAULT_SALT_PATH: &str = "config/salt.bin";

/// A fixed 128-byte secret mixed into every credential digest.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Wraps existing salt bytes.
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Generates a new random salt.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Loads an existing salt from `path`.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        Self::from_file_contents(path, raw)
    }

    /// Loads the salt from `path`, creating it if the file is absent.
    ///
    /// A file of the wrong size is an error rather than being replaced.
    pub fn load_or_generate(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(raw) => Self::from_file_contents(path, raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no salt found, creating");
                let salt = Self::generate();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                write_private(path, salt.as_bytes())?;
                Ok(salt)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn from_file_contents(path: &Path, mut raw: Vec<u8>) -> ServerResult<Self> {
        let bytes: Result<[u8; SALT_LEN], _> = raw.as_slice().try_into();
        let len = raw.len();
        raw.zeroize();
        bytes.map(Self).map_err(|_| {
            ServerError::Salt(format!(
                "{} holds {len} bytes, expected {SALT_LEN}",
                path.display()
            ))
        })
    }

    /// Returns the raw salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Creates `path` readable only by its owner and writes `bytes` to it.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

impl Drop for Salt {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
