//! # WC24 Mail Protocol
//!
//! Wire-level pieces of the WiiConnect24 `mail.cgi` protocol.
//!
//! This crate provides:
//! - Response envelopes (`cd=`/`msg=` line pairs) and the status code taxonomy
//! - The authentication payload grammar submitted by the console
//! - Friend code (`mlid`) validation with a pluggable checksum
//!
//! Nothing here performs I/O. The console client only reads response
//! bodies, so every failure the console can observe is expressed as an
//! envelope rather than an HTTP status.
//!
//! ```
//! use wc24mail_protocol::{AuthPayload, ResponseCodec, StatusCode};
//!
//! let codec = ResponseCodec::new(false);
//! let payload = "mlid=w1234567890123456\r\npasswd=abcdefghij123456";
//!
//! let body = match AuthPayload::parse(payload) {
//!     Ok(_) => codec.success(),
//!     Err(_) => codec.general_error(StatusCode::AUTH_ERROR, "An authentication error occurred."),
//! };
//! assert_eq!(body, "cd=100\nmsg=Success.\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod error;
mod friend_code;
mod response;

pub use auth::AuthPayload;
pub use error::ParseError;
pub use friend_code::{
    FormatOnlyChecksum, FriendCodeValidator, IdentifierChecksum, FRIEND_CODE_LEN,
};
pub use response::{ResponseCodec, StatusCode};
