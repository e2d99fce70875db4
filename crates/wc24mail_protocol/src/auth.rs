//! Authentication payload grammar.
//!
//! The console submits its credentials as a single form field holding
//! exactly two CRLF-joined lines:
//!
//! ```text
//! mlid=w<16 digits>
//! passwd=<16 to 32 characters>
//! ```
//!
//! Anything else, including trailing data, is rejected.

use crate::error::ParseError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static AUTH_PAYLOAD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\Amlid=(w[0-9]{16})\r\npasswd=(.{16,32})\z").ok());

/// Credentials extracted from an authentication payload.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthPayload {
    mlid: String,
    passwd: String,
}

impl AuthPayload {
    /// Parses the two-line payload.
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        if payload.is_empty() {
            return Err(ParseError::Empty);
        }

        let captures = AUTH_PAYLOAD
            .as_ref()
            .and_then(|re| re.captures(payload))
            .ok_or(ParseError::Malformed)?;

        match (captures.get(1), captures.get(2)) {
            (Some(mlid), Some(passwd)) => Ok(Self {
                mlid: mlid.as_str().to_string(),
                passwd: passwd.as_str().to_string(),
            }),
            _ => Err(ParseError::Malformed),
        }
    }

    /// Parses an optional form field; an absent field counts as empty.
    pub fn parse_field(field: Option<&str>) -> Result<Self, ParseError> {
        Self::parse(field.unwrap_or_default())
    }

    /// The friend code, including its leading `w`.
    pub fn mlid(&self) -> &str {
        &self.mlid
    }

    /// The plaintext passphrase.
    pub fn passwd(&self) -> &str {
        &self.passwd
    }
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("mlid", &self.mlid)
            .field("passwd", &"<redacted>")
            .finish()
    }
}
