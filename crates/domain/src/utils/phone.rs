//! Phone number normalization for call-log correlation
//!
//! Call records store numbers in whatever shape the PBX produced
//! (`+998901234567`, `90 123-45-67`, `0901234567`). Matching on the last
//! [`PHONE_TAIL_LEN`] digits ignores country and trunk prefixes.

use std::collections::BTreeSet;

use crate::constants::PHONE_TAIL_LEN;

/// Keep ASCII digits only.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Last seven digits, or all digits when the number is shorter. `None` when
/// the input has no digits.
pub fn phone_tail(raw: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    let start = digits.len().saturating_sub(PHONE_TAIL_LEN);
    Some(digits[start..].to_string())
}

/// Deduplicated tails for a set of numbers.
pub fn phone_tails<'a>(numbers: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    numbers.into_iter().filter_map(phone_tail).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting() {
        assert_eq!(digits_only("+998 (90) 123-45-67"), "998901234567");
        assert_eq!(digits_only("n/a"), "");
    }

    #[test]
    fn tail_is_last_seven_digits() {
        assert_eq!(phone_tail("+998 90 123 45 67").as_deref(), Some("1234567"));
        assert_eq!(phone_tail("12-34").as_deref(), Some("1234"));
        assert_eq!(phone_tail("---"), None);
    }

    #[test]
    fn tails_are_deduplicated() {
        let tails = phone_tails(["+998901234567", "90 123 45 67", "", "71-200-00-00"]);
        assert_eq!(tails.len(), 2);
        assert!(tails.contains("1234567"));
        assert!(tails.contains("2000000"));
    }
}
