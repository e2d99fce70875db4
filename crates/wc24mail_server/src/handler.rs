//! Request handlers for the mail endpoints.

use crate::config::GatewayConfig;
use crate::error::UploadError;
use crate::form::MailForm;
use crate::hasher::CredentialHasher;
use crate::patch::{ConfigPatcher, PatchContext, PatchReply, UnavailablePatcher, UPLOAD_FIELD};
use crate::report::{ErrorReporter, NullReporter};
use crate::salt::Salt;
use crate::store::{AccountStore, MemoryAccountStore};
use rand::Rng;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error};
use wc24mail_protocol::{
    AuthPayload, FormatOnlyChecksum, FriendCodeValidator, IdentifierChecksum, ResponseCodec,
    StatusCode,
};

const AUTH_ERROR_REASON: &str = "An authentication error occurred.";
const PASSWD_LEN: usize = 16;
const MLCHKID_LEN: usize = 32;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Context for request handling.
pub struct HandlerContext {
    /// Gateway configuration.
    pub config: GatewayConfig,
    /// Response envelope builder.
    pub codec: ResponseCodec,
    /// Credential hasher over the process salt.
    pub hasher: CredentialHasher,
    salt: Arc<Salt>,
    store: Arc<dyn AccountStore>,
    reporter: Arc<dyn ErrorReporter>,
    validator: FriendCodeValidator<Arc<dyn IdentifierChecksum>>,
    patcher: Arc<dyn ConfigPatcher>,
}

impl HandlerContext {
    /// Creates a handler context with an in-memory store, no external
    /// reporter, format-only friend code checks and no patcher.
    pub fn new(config: GatewayConfig, salt: Arc<Salt>) -> Self {
        let checksum: Arc<dyn IdentifierChecksum> = Arc::new(FormatOnlyChecksum);
        Self {
            codec: ResponseCodec::new(config.debug),
            hasher: CredentialHasher::new(Arc::clone(&salt)),
            config,
            salt,
            store: Arc::new(MemoryAccountStore::new()),
            reporter: Arc::new(NullReporter),
            validator: FriendCodeValidator::new(checksum),
            patcher: Arc::new(UnavailablePatcher),
        }
    }

    /// Uses the given account store.
    pub fn with_store(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.store = store;
        self
    }

    /// Uses the given error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Uses the given friend code checksum.
    pub fn with_checksum(mut self, checksum: Arc<dyn IdentifierChecksum>) -> Self {
        self.validator = FriendCodeValidator::new(checksum);
        self
    }

    /// Uses the given config patcher.
    pub fn with_patcher(mut self, patcher: Arc<dyn ConfigPatcher>) -> Self {
        self.patcher = patcher;
        self
    }

    /// Returns the account store.
    pub fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }

    /// Returns true if `mlid` is a valid friend code.
    pub fn is_valid_friend_code(&self, mlid: &str) -> bool {
        self.validator.is_valid(mlid)
    }

    /// Logs `error` and forwards it to the reporter.
    pub fn report(&self, reason: &str, error: &dyn Display) {
        error!(reason, "{error}");
        self.reporter.report(reason, error);
    }
}

/// Handler for mail and patch requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles account registration.
    ///
    /// On success the body carries the generated credentials after the
    /// success envelope.
    pub fn handle_account(&self, form: &MailForm) -> String {
        let codec = &self.context.codec;
        let mlid = form.field("mlid").unwrap_or_default();
        if !self.context.is_valid_friend_code(mlid) {
            return codec.general_error(StatusCode::INVALID_FRIEND_CODE, "Invalid Wii Friend Code.");
        }

        let passwd = random_letters(PASSWD_LEN);
        let mlchkid = random_letters(MLCHKID_LEN);
        let hasher = &self.context.hasher;

        match self
            .context
            .store()
            .insert_account(mlid, &hasher.hash(&passwd), &hasher.hash(&mlchkid))
        {
            Ok(true) => {
                debug!(mlid, "registered account");
                format!(
                    "{}mlid={mlid}\npasswd={passwd}\nmlchkid={mlchkid}\n",
                    codec.success()
                )
            }
            Ok(false) => {
                codec.general_error(StatusCode::DUPLICATE_REGISTRATION, "Duplicate registration.")
            }
            Err(e) => {
                self.context.report("Unable to create account", &e);
                codec.general_error(StatusCode::DATABASE_ERROR, "Database error.")
            }
        }
    }

    /// Handles an authenticated mail submission.
    ///
    /// Grammar failures and bad credentials produce the same response.
    pub fn handle_send(&self, form: Result<MailForm, UploadError>) -> String {
        let codec = &self.context.codec;
        let form = match form {
            Ok(form) => form,
            Err(e) => {
                debug!(error = %e, "unable to parse send form");
                return codec.general_error(StatusCode::MALFORMED_REQUEST, "Failed to parse mail.");
            }
        };

        let auth = match AuthPayload::parse_field(form.field("mlid")) {
            Ok(auth) => auth,
            Err(e) => {
                debug!(error = %e, "rejected send credentials");
                return codec.general_error(StatusCode::AUTH_ERROR, AUTH_ERROR_REASON);
            }
        };

        if !self.authenticate(&auth) {
            return codec.general_error(StatusCode::AUTH_ERROR, AUTH_ERROR_REASON);
        }

        debug!(mlid = auth.mlid(), "accepted send");
        codec.success()
    }

    /// Handles a configuration upload.
    pub fn handle_patch_upload(&self, form: Result<MailForm, UploadError>) -> PatchReply {
        let blob = match form {
            Ok(mut form) => form
                .take_file(UPLOAD_FIELD)
                .ok_or_else(|| UploadError::MissingFile(UPLOAD_FIELD.to_string())),
            Err(e) => Err(e),
        };

        let blob = match blob {
            Ok(blob) => blob,
            Err(e) if e.is_malformed_form() => {
                debug!(error = %e, "unable to parse patch form");
                return PatchReply::Envelope(
                    self.context
                        .codec
                        .general_error(StatusCode::MALFORMED_REQUEST, "Failed to parse mail."),
                );
            }
            Err(e) => {
                let reason = match e {
                    UploadError::MissingFile(_) => "Incorrect file",
                    _ => "Unable to read file",
                };
                self.context.report(reason, &e);
                return PatchReply::Failed(self.failure_text("file upload", &e));
            }
        };

        let ctx = PatchContext {
            config: &self.context.config,
            store: self.context.store.as_ref(),
            reporter: self.context.reporter.as_ref(),
            salt: &self.context.salt,
        };

        match self.context.patcher.patch(&blob, &ctx) {
            Ok(patched) => PatchReply::Patched(patched),
            Err(e) => {
                self.context.report("Unable to patch", &e);
                PatchReply::Failed(self.failure_text("patching", &e))
            }
        }
    }

    fn authenticate(&self, auth: &AuthPayload) -> bool {
        if !self.context.is_valid_friend_code(auth.mlid()) {
            return false;
        }

        match self.context.store().passwd_digest(auth.mlid()) {
            Ok(Some(stored)) => self.context.hasher.verify(auth.passwd(), &stored),
            Ok(None) => false,
            Err(e) => {
                self.context.report("Unable to look up account", &e);
                false
            }
        }
    }

    fn failure_text(&self, what: &str, error: &dyn Display) -> String {
        format!(
            "It seems your {what} went awry. Contact our support email: {}\nError: {error}",
            self.context.config.support_email
        )
    }
}

fn random_letters(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(LETTERS[rng.gen_range(0..LETTERS.len())]))
        .collect()
}
