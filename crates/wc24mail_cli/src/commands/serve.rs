//! Serve command implementation.

use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use wc24mail_server::{
    http, AccountStore, FileAccountStore, GatewayConfig, HandlerContext, MailServer, Salt,
};

/// Loads the salt, opens the account store, binds the listener and serves
/// until shutdown.
///
/// Any failure before the listener is accepting is fatal.
pub async fn run(config: GatewayConfig, salt_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let salt = Arc::new(Salt::load_or_generate(salt_path)?);

    let store = FileAccountStore::open(&config.accounts_file)?;
    store.check()?;
    info!(path = %store.path().display(), accounts = store.len(), "opened account store");

    if config.raven_dsn.is_some() {
        warn!("RavenDSN is configured but no external reporter is built in; errors are only logged");
    }
    if config.support_email.is_empty() {
        warn!("SupportEmail is empty");
    }
    info!("friend codes are checked for format only");

    let bind_to = config.bind_to;
    let context = HandlerContext::new(config, salt).with_store(Arc::new(store));
    let server = Arc::new(MailServer::with_context(context));
    let listener = TcpListener::bind(bind_to).await?;

    info!(addr = %bind_to, "running");
    http::serve(server, listener).await?;
    Ok(())
}
