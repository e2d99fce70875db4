//! Main mail gateway.

use crate::config::GatewayConfig;
use crate::error::UploadError;
use crate::form::MailForm;
use crate::handler::{HandlerContext, RequestHandler};
use crate::patch::PatchReply;
use crate::salt::Salt;
use std::sync::Arc;

/// The mail gateway.
///
/// Transport-agnostic entry point for every endpoint. The [`crate::http`]
/// module binds it to HTTP routes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wc24mail_server::{GatewayConfig, MailForm, MailServer, Salt};
///
/// let salt = Arc::new(Salt::generate());
/// let server = MailServer::new(GatewayConfig::default(), salt);
///
/// let body = server.handle_send(Ok(MailForm::new()));
/// assert_eq!(body, "cd=250\nmsg=An authentication error occurred.\n");
/// ```
pub struct MailServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl MailServer {
    /// Creates a gateway with default collaborators.
    pub fn new(config: GatewayConfig, salt: Arc<Salt>) -> Self {
        Self::with_context(HandlerContext::new(config, salt))
    }

    /// Creates a gateway over a prepared context.
    pub fn with_context(context: HandlerContext) -> Self {
        let context = Arc::new(context);
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Handles `account.cgi`.
    pub fn handle_account(&self, form: &MailForm) -> String {
        self.handler.handle_account(form)
    }

    /// Handles `send.cgi`.
    pub fn handle_send(&self, form: Result<MailForm, UploadError>) -> String {
        self.handler.handle_send(form)
    }

    /// Handles a POST to the patch endpoint.
    pub fn handle_patch_upload(&self, form: Result<MailForm, UploadError>) -> PatchReply {
        self.handler.handle_patch_upload(form)
    }

    /// Handles any other method on the patch endpoint.
    pub fn handle_patch_other(&self) -> PatchReply {
        PatchReply::Instructions
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.context.config
    }

    /// Returns the handler context.
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::UPLOAD_FIELD;
    use crate::salt::SALT_LEN;
    use crate::store::{AccountStore, FileAccountStore, MemoryAccountStore};

    fn create_server() -> MailServer {
        let salt = Arc::new(Salt::from_bytes([1u8; SALT_LEN]));
        MailServer::new(
            GatewayConfig::default().with_support_email("support@example.com"),
            salt,
        )
    }

    #[test]
    fn register_then_send() {
        let server = create_server();
        let body = server.handle_account(&MailForm::new().with_field("mlid", "w1234567890123456"));
        let passwd = body
            .lines()
            .find_map(|line| line.strip_prefix("passwd="))
            .unwrap();

        let form = MailForm::new().with_field(
            "mlid",
            format!("mlid=w1234567890123456\r\npasswd={passwd}"),
        );
        assert_eq!(server.handle_send(Ok(form)), "cd=100\nmsg=Success.\n");
    }

    #[test]
    fn accounts_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let salt = Arc::new(Salt::from_bytes([3u8; SALT_LEN]));
        let start = || {
            let store = FileAccountStore::open(&path).unwrap();
            store.check().unwrap();
            MailServer::with_context(
                HandlerContext::new(GatewayConfig::default(), Arc::clone(&salt))
                    .with_store(Arc::new(store)),
            )
        };

        let server = start();
        let body = server.handle_account(&MailForm::new().with_field("mlid", "w1234567890123456"));
        let passwd = body
            .lines()
            .find_map(|line| line.strip_prefix("passwd="))
            .unwrap()
            .to_string();
        drop(server);

        let restarted = start();
        let form = MailForm::new().with_field(
            "mlid",
            format!("mlid=w1234567890123456\r\npasswd={passwd}"),
        );
        assert_eq!(restarted.handle_send(Ok(form)), "cd=100\nmsg=Success.\n");
    }

    #[test]
    fn patch_without_upload() {
        let server = create_server();
        let reply = server.handle_patch_upload(Ok(MailForm::new()));
        assert_eq!(reply.status(), 400);
        let body = String::from_utf8(reply.into_body()).unwrap();
        assert!(body.contains("support@example.com"));
    }

    #[test]
    fn patch_other_method() {
        let server = create_server();
        assert_eq!(server.handle_patch_other(), PatchReply::Instructions);
    }

    #[test]
    fn shared_store() {
        let store = Arc::new(MemoryAccountStore::new());
        let salt = Arc::new(Salt::from_bytes([2u8; SALT_LEN]));
        let server = MailServer::with_context(
            HandlerContext::new(GatewayConfig::default(), salt).with_store(store.clone()),
        );

        server.handle_account(&MailForm::new().with_field("mlid", "w1234567890123456"));
        assert_eq!(store.len(), 1);
        assert!(!server.config().debug);

        let reply = server
            .handle_patch_upload(Ok(MailForm::new().with_file(UPLOAD_FIELD, vec![0x57])));
        assert_eq!(reply.status(), 400);
    }
}
