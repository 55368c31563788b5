//! UUID-shape grammar shared by the handle and path matchers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Length of a hyphenated UUID (8-4-4-4-12).
pub const UUID_LEN: usize = 36;

/// Regex fragment matching one hyphenated UUID, without anchors or captures.
pub const UUID_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static UUID_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", UUID_PATTERN)).expect("valid uuid pattern"));

/// Returns true if `s` is exactly one hyphenated UUID.
pub fn is_uuid_shaped(s: &str) -> bool {
    s.len() == UUID_LEN && UUID_EXACT.is_match(s)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shaped() {
        assert!(is_uuid_shaped("427774b4-340b-11ed-8d66-0242ac110005"));
        assert!(is_uuid_shaped("17B95621-58E8-4676-BC6A-39E928F19D23"));
    }

    #[test]
    fn test_not_uuid_shaped() {
        assert!(!is_uuid_shaped(""));
        // Last group one digit short.
        assert!(!is_uuid_shaped("427774b4-340b-11ed-8d66-0242ac11000"));
        // No hyphens.
        assert!(!is_uuid_shaped("427774b4340b11ed8d660242ac110005"));
        // Hyphens in the wrong places.
        assert!(!is_uuid_shaped("427774b-4340b-11ed-8d66-0242ac110005"));
        // Non-hex digit.
        assert!(!is_uuid_shaped("g27774b4-340b-11ed-8d66-0242ac110005"));
        assert!(!is_uuid_shaped(" 427774b4-340b-11ed-8d66-0242ac110005"));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_generated_uuids_are_shaped(u in strategy::uuid()) {
            prop_assert_eq!(u.len(), UUID_LEN);
            prop_assert!(is_uuid_shaped(&u));
        }

        #[test]
        fn prop_hyphen_free_hex_never_shaped(s in "[0-9a-f]{0,64}") {
            prop_assert!(!is_uuid_shaped(&s));
        }
    }
}
