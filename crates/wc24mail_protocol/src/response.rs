//! Response envelopes.
//!
//! Every console-facing reply is a sequence of `key=value` lines
//! terminated by `\n`:
//!
//! ```text
//! cd=<code>
//! msg=<reason>
//! ```
//!
//! Mail-specific errors key the pair by the console's numeric id, e.g.
//! `cd1234567890123456=100`.

use std::fmt;
use tracing::warn;

/// Numeric status code carried in the `cd` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Request succeeded.
    pub const SUCCESS: StatusCode = StatusCode(100);
    /// The identifier is already registered.
    pub const DUPLICATE_REGISTRATION: StatusCode = StatusCode(211);
    /// Reserved authentication-class code.
    pub const AUTH_RESERVED_230: StatusCode = StatusCode(230);
    /// Reserved authentication-class code.
    pub const AUTH_RESERVED_240: StatusCode = StatusCode(240);
    /// Generic authentication error (bad grammar or bad credential).
    pub const AUTH_ERROR: StatusCode = StatusCode(250);
    /// Malformed mail or multipart request.
    pub const MALFORMED_REQUEST: StatusCode = StatusCode(350);
    /// The persistence store failed.
    pub const DATABASE_ERROR: StatusCode = StatusCode(410);
    /// The submitted friend code is not a valid Wii id.
    pub const INVALID_FRIEND_CODE: StatusCode = StatusCode(610);

    /// Creates a status code from its numeric value.
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric value.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Returns true for the success code.
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Returns true for authentication-class codes.
    ///
    /// These are routine (bad logins, probing) and are kept out of the
    /// production log.
    pub const fn is_auth_class(self) -> bool {
        matches!(self.0, 230 | 240 | 250)
    }

    /// Whether a general error with this code is logged as a warning.
    pub const fn should_log(self, debug: bool) -> bool {
        debug || !self.is_auth_class()
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds console-facing response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCodec {
    debug: bool,
}

impl ResponseCodec {
    /// Creates a codec. In debug mode every error code is logged.
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Returns whether the codec logs in debug mode.
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Formats an error that applies to the whole request.
    pub fn general_error(&self, code: impl Into<StatusCode>, reason: &str) -> String {
        let code = code.into();
        if code.should_log(self.debug) {
            warn!(code = code.code(), reason, "encountered error");
        }

        format!("cd={code}\nmsg={reason}\n")
    }

    /// Formats an error scoped to one mail identifier.
    ///
    /// The identifier's leading `w` is dropped to form the key suffix.
    pub fn mail_error(&self, identifier: &str, code: impl Into<StatusCode>, reason: &str) -> String {
        let code = code.into();
        if !code.is_success() {
            warn!(code = code.code(), reason, identifier, "encountered error");
        }

        let mut chars = identifier.chars();
        chars.next();
        let suffix = chars.as_str();
        format!("cd{suffix}={code}\nmsg{suffix}={reason}\n")
    }

    /// Formats the success envelope with `=` as divider.
    pub fn success(&self) -> String {
        self.success_with_divider('=')
    }

    /// Formats the success envelope with a custom divider.
    pub fn success_with_divider(&self, divider: char) -> String {
        format!("cd{divider}100\nmsg{divider}Success.\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Runs `f` under a fresh subscriber and returns what it logged.
    fn logged(f: impl FnOnce()) -> String {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn general_error_format() {
        let codec = ResponseCodec::new(false);
        assert_eq!(
            codec.general_error(StatusCode::AUTH_ERROR, "bad auth"),
            "cd=250\nmsg=bad auth\n"
        );
        assert_eq!(
            codec.general_error(350u16, "Failed to parse mail."),
            "cd=350\nmsg=Failed to parse mail.\n"
        );
    }

    #[test]
    fn mail_error_format() {
        let codec = ResponseCodec::new(false);
        assert_eq!(
            codec.mail_error("w1234567890123456", 100u16, "ok"),
            "cd1234567890123456=100\nmsg1234567890123456=ok\n"
        );
    }

    #[test]
    fn mail_error_empty_identifier() {
        let codec = ResponseCodec::new(true);
        assert_eq!(codec.mail_error("", 350u16, "x"), "cd=350\nmsg=x\n");
    }

    #[test]
    fn success_format() {
        let codec = ResponseCodec::default();
        assert_eq!(codec.success(), "cd=100\nmsg=Success.\n");
        assert_eq!(codec.success_with_divider(':'), "cd:100\nmsg:Success.\n");
    }

    #[test]
    fn auth_codes_suppressed_outside_debug() {
        for code in [
            StatusCode::AUTH_RESERVED_230,
            StatusCode::AUTH_RESERVED_240,
            StatusCode::AUTH_ERROR,
        ] {
            assert!(code.is_auth_class());
            assert!(!code.should_log(false));
            assert!(code.should_log(true));
        }
    }

    #[test]
    fn other_codes_always_logged() {
        assert!(StatusCode::MALFORMED_REQUEST.should_log(false));
        assert!(StatusCode::INVALID_FRIEND_CODE.should_log(false));
        assert!(!StatusCode::MALFORMED_REQUEST.is_auth_class());
    }

    #[test]
    fn auth_errors_silent_in_production() {
        let codec = ResponseCodec::new(false);
        for code in [230u16, 240, 250] {
            let output = logged(|| {
                codec.general_error(code, "An authentication error occurred.");
            });
            assert_eq!(output, "", "code {code} was logged");
        }
    }

    #[test]
    fn auth_errors_logged_in_debug() {
        let codec = ResponseCodec::new(true);
        let output = logged(|| {
            codec.general_error(StatusCode::AUTH_ERROR, "An authentication error occurred.");
        });
        assert!(output.contains("WARN"));
        assert!(output.contains("code=250"));
    }

    #[test]
    fn malformed_request_logged_in_production() {
        let codec = ResponseCodec::new(false);
        let output = logged(|| {
            codec.general_error(StatusCode::MALFORMED_REQUEST, "Failed to parse mail.");
        });
        assert!(output.contains("WARN"));
        assert!(output.contains("code=350"));
    }

    #[test]
    fn mail_error_logs_everything_but_success() {
        let codec = ResponseCodec::new(false);

        let output = logged(|| {
            codec.mail_error("w1234567890123456", StatusCode::SUCCESS, "Success.");
        });
        assert_eq!(output, "");

        let output = logged(|| {
            codec.mail_error("w1234567890123456", StatusCode::AUTH_ERROR, "bad auth");
        });
        assert!(output.contains("WARN"));
        assert!(output.contains("code=250"));
    }

    #[test]
    fn status_code_roundtrip() {
        let code = StatusCode::from(250u16);
        assert_eq!(code, StatusCode::AUTH_ERROR);
        assert_eq!(code.code(), 250);
        assert_eq!(code.to_string(), "250");
        assert!(StatusCode::new(100).is_success());
    }
}
