//! Check-id command implementation.

use wc24mail_protocol::{FormatOnlyChecksum, FriendCodeValidator};

/// Reports whether `mlid` is a well-formed friend code.
pub fn run(mlid: &str) -> Result<(), Box<dyn std::error::Error>> {
    if FriendCodeValidator::new(FormatOnlyChecksum).is_valid(mlid) {
        println!("{mlid}: well-formed");
        Ok(())
    } else {
        Err(format!("{mlid}: not a friend code (expected w followed by 16 digits)").into())
    }
}
