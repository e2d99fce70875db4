//! Friend code validation.
//!
//! A friend code is `w` followed by the 16 decimal digits of the
//! console's 64-bit id. Format checks happen here; the checksum over the
//! numeric id is delegated to an [`IdentifierChecksum`].

use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Length of a friend code, including the leading `w`.
pub const FRIEND_CODE_LEN: usize = 17;

static FRIEND_CODE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\Aw[0-9]{16}\z").ok());

/// Checksum predicate over a numeric console id.
pub trait IdentifierChecksum: Send + Sync {
    /// Returns true if the id passes the checksum.
    fn is_valid_id(&self, id: u64) -> bool;
}

impl<T: IdentifierChecksum + ?Sized> IdentifierChecksum for Arc<T> {
    fn is_valid_id(&self, id: u64) -> bool {
        (**self).is_valid_id(id)
    }
}

impl<T: IdentifierChecksum + ?Sized> IdentifierChecksum for Box<T> {
    fn is_valid_id(&self, id: u64) -> bool {
        (**self).is_valid_id(id)
    }
}

/// Accepts every well-formed id.
///
/// Used when no checksum implementation is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOnlyChecksum;

impl IdentifierChecksum for FormatOnlyChecksum {
    fn is_valid_id(&self, _id: u64) -> bool {
        true
    }
}

/// Validates friend codes against format and checksum.
#[derive(Debug, Clone, Default)]
pub struct FriendCodeValidator<C> {
    checksum: C,
}

impl<C: IdentifierChecksum> FriendCodeValidator<C> {
    /// Creates a validator using the given checksum.
    pub fn new(checksum: C) -> Self {
        Self { checksum }
    }

    /// Returns true if `candidate` is a well-formed friend code whose
    /// numeric id passes the checksum.
    pub fn is_valid(&self, candidate: &str) -> bool {
        if candidate.is_empty() || candidate.len() != FRIEND_CODE_LEN {
            return false;
        }

        let well_formed = FRIEND_CODE
            .as_ref()
            .is_some_and(|re| re.is_match(candidate));
        if !well_formed {
            return false;
        }

        // Unreachable after the format check, but a failed parse is still
        // reported as an invalid code.
        let Ok(id) = candidate[1..].parse::<u64>() else {
            return false;
        };

        self.checksum.is_valid_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn friend_code_pattern_compiles() {
        assert!(FRIEND_CODE.is_some());
    }

    struct EvenIds;

    impl IdentifierChecksum for EvenIds {
        fn is_valid_id(&self, id: u64) -> bool {
            id % 2 == 0
        }
    }

    struct OnlyId(u64);

    impl IdentifierChecksum for OnlyId {
        fn is_valid_id(&self, id: u64) -> bool {
            id == self.0
        }
    }

    #[test]
    fn accepts_well_formed() {
        let validator = FriendCodeValidator::new(FormatOnlyChecksum);
        assert!(validator.is_valid("w1234567890123456"));
        assert!(validator.is_valid("w0000000000000000"));
    }

    #[test]
    fn rejects_bad_format() {
        let validator = FriendCodeValidator::new(FormatOnlyChecksum);
        assert!(!validator.is_valid(""));
        assert!(!validator.is_valid("w123"));
        assert!(!validator.is_valid("W1234567890123456"));
        assert!(!validator.is_valid("w123456789012345x"));
        assert!(!validator.is_valid("1w234567890123456"));
        // 17 bytes, but not 17 ASCII characters
        assert!(!validator.is_valid("w12345678901234é"));
    }

    #[test]
    fn delegates_checksum() {
        let validator = FriendCodeValidator::new(EvenIds);
        assert!(validator.is_valid("w1234567890123456"));
        assert!(!validator.is_valid("w1234567890123457"));
    }

    #[test]
    fn checksum_sees_numeric_id() {
        let validator = FriendCodeValidator::new(OnlyId(42));
        assert!(validator.is_valid("w0000000000000042"));
        assert!(!validator.is_valid("w0000000000000043"));
    }

    proptest! {
        #[test]
        fn wrong_length_is_invalid(s in ".{0,40}") {
            prop_assume!(s.len() != FRIEND_CODE_LEN);
            let validator = FriendCodeValidator::new(FormatOnlyChecksum);
            prop_assert!(!validator.is_valid(&s));
        }

        #[test]
        fn checksum_result_is_returned(digits in "[0-9]{16}") {
            let code = format!("w{digits}");
            let id: u64 = digits.parse().unwrap();
            prop_assert!(FriendCodeValidator::new(FormatOnlyChecksum).is_valid(&code));
            prop_assert_eq!(FriendCodeValidator::new(EvenIds).is_valid(&code), id % 2 == 0);
            let shared: Arc<dyn IdentifierChecksum> = Arc::new(OnlyId(u64::MAX));
            prop_assert!(!FriendCodeValidator::new(shared).is_valid(&code));
        }
    }
}
