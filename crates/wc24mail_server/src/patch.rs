//! Mail configuration patching.
//!
//! Users upload their console's `nwc24msg.cfg` from a browser and get a
//! patched copy back. The transform itself is supplied as a
//! [`ConfigPatcher`]; this module defines its contract and the replies
//! the upload endpoint can produce.

use crate::config::GatewayConfig;
use crate::error::PatchError;
use crate::report::ErrorReporter;
use crate::salt::Salt;
use crate::store::AccountStore;

/// Multipart field holding the uploaded configuration.
pub const UPLOAD_FIELD: &str = "uploaded_config";

/// File name offered for the patched configuration.
pub const PATCHED_FILENAME: &str = "nwc24msg.cfg";

/// Body returned for anything other than an upload.
pub const INSTRUCTIONS: &str =
    "This page doesn't do anything by itself. Try going to the main site.";

/// Everything a patcher may use besides the blob.
pub struct PatchContext<'a> {
    /// Gateway configuration.
    pub config: &'a GatewayConfig,
    /// Account store, for registering the patched console.
    pub store: &'a dyn AccountStore,
    /// Error reporter.
    pub reporter: &'a dyn ErrorReporter,
    /// Process salt for credential digests.
    pub salt: &'a Salt,
}

/// Transforms an uploaded mail configuration.
pub trait ConfigPatcher: Send + Sync {
    /// Returns the patched configuration.
    fn patch(&self, blob: &[u8], ctx: &PatchContext<'_>) -> Result<Vec<u8>, PatchError>;
}

/// Patcher used when none is installed; every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePatcher;

impl ConfigPatcher for UnavailablePatcher {
    fn patch(&self, _blob: &[u8], _ctx: &PatchContext<'_>) -> Result<Vec<u8>, PatchError> {
        Err(PatchError::Unavailable)
    }
}

/// Reply from the patch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchReply {
    /// Console-protocol envelope; the form itself could not be parsed.
    Envelope(String),
    /// The patched configuration, sent as a download.
    Patched(Vec<u8>),
    /// Plain-text failure for the browser.
    Failed(String),
    /// Static text for non-upload requests.
    Instructions,
}

impl PatchReply {
    /// HTTP status code for this reply.
    pub fn status(&self) -> u16 {
        match self {
            PatchReply::Failed(_) => 400,
            _ => 200,
        }
    }

    /// Content type header value.
    pub fn content_type(&self) -> &'static str {
        match self {
            PatchReply::Patched(_) => "application/octet-stream",
            _ => "text/plain; charset=utf-8",
        }
    }

    /// Content disposition header value, for downloads only.
    pub fn content_disposition(&self) -> Option<String> {
        match self {
            PatchReply::Patched(_) => Some(format!("attachment; filename=\"{PATCHED_FILENAME}\"")),
            _ => None,
        }
    }

    /// Consumes the reply, returning its body.
    pub fn into_body(self) -> Vec<u8> {
        match self {
            PatchReply::Envelope(text) | PatchReply::Failed(text) => text.into_bytes(),
            PatchReply::Patched(bytes) => bytes,
            PatchReply::Instructions => INSTRUCTIONS.as_bytes().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use crate::salt::SALT_LEN;
    use crate::store::MemoryAccountStore;

    #[test]
    fn reply_framing() {
        let patched = PatchReply::Patched(vec![1, 2, 3]);
        assert_eq!(patched.status(), 200);
        assert_eq!(patched.content_type(), "application/octet-stream");
        assert_eq!(
            patched.content_disposition().as_deref(),
            Some("attachment; filename=\"nwc24msg.cfg\"")
        );
        assert_eq!(patched.into_body(), vec![1, 2, 3]);

        let failed = PatchReply::Failed("nope".into());
        assert_eq!(failed.status(), 400);
        assert!(failed.content_disposition().is_none());

        let envelope = PatchReply::Envelope("cd=350\nmsg=Failed to parse mail.\n".into());
        assert_eq!(envelope.status(), 200);

        assert_eq!(PatchReply::Instructions.status(), 200);
        assert_eq!(PatchReply::Instructions.into_body(), INSTRUCTIONS.as_bytes());
    }

    #[test]
    fn unavailable_patcher_fails() {
        let config = GatewayConfig::default();
        let store = MemoryAccountStore::new();
        let salt = Salt::from_bytes([0; SALT_LEN]);
        let ctx = PatchContext {
            config: &config,
            store: &store,
            reporter: &NullReporter,
            salt: &salt,
        };

        assert!(matches!(
            UnavailablePatcher.patch(b"WcCf", &ctx),
            Err(PatchError::Unavailable)
        ));
    }
}
