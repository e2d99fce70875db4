//! # WC24 Mail Server
//!
//! Gateway speaking the WiiConnect24 `mail.cgi` protocol.
//!
//! This crate provides:
//! - Account registration and authenticated mail submission
//! - Salted SHA-512 credential digests over a persisted process salt
//! - Browser upload endpoint for patching `nwc24msg.cfg`
//! - An axum router binding everything to HTTP
//!
//! # Architecture
//!
//! [`MailServer`] is transport-agnostic: it takes parsed forms and
//! returns response bodies. Collaborators outside this crate are
//! injected as single-method traits:
//! - [`AccountStore`] for persistence
//! - [`ConfigPatcher`] for the configuration transform
//! - [`wc24mail_protocol::IdentifierChecksum`] for friend code checksums
//! - [`ErrorReporter`] for error forwarding
//!
//! # Salt
//!
//! The salt is loaded or generated once before serving and passed
//! explicitly to everything that hashes:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wc24mail_server::{GatewayConfig, MailServer, Salt};
//!
//! # fn main() -> Result<(), wc24mail_server::ServerError> {
//! let salt = Arc::new(Salt::load_or_generate("config/salt.bin")?);
//! let config = GatewayConfig::from_file("config/config.json")?;
//! let server = MailServer::new(config, salt);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod form;
mod handler;
mod hasher;
pub mod http;
mod patch;
mod report;
mod salt;
mod server;
mod store;

pub use config::{GatewayConfig, DEFAULT_CONFIG_PATH};
pub use error::{PatchError, ServerError, ServerResult, StoreError, StoreResult, UploadError};
pub use form::MailForm;
pub use handler::{HandlerContext, RequestHandler};
pub use hasher::CredentialHasher;
pub use patch::{
    ConfigPatcher, PatchContext, PatchReply, UnavailablePatcher, INSTRUCTIONS, PATCHED_FILENAME,
    UPLOAD_FIELD,
};
pub use report::{ErrorReporter, NullReporter};
pub use salt::{Salt, DEFAULT_SALT_PATH, SALT_LEN};
pub use server::MailServer;
pub use store::{AccountStore, FileAccountStore, MemoryAccountStore, DEFAULT_ACCOUNTS_PATH};
