//! Phone number normalization for contact sheets.
//!
//! Numbers are stored with a leading `+` international marker. Bare local
//! numbers (10 characters) are assumed to be Indian mobiles.
//!
//! CHANGELOG:
//! - 02/14/2026 - Default country code for 10-character numbers

/// International prefix marker.
pub const INTERNATIONAL_MARKER: char = '+';

/// Country code assumed for bare 10-character numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Normalize a phone number to international form.
///
/// Rules, in order:
/// 1. Trim surrounding whitespace
/// 2. Already starts with `+` -> unchanged
/// 3. Starts with `91` -> prepend `+`
/// 4. Exactly 10 characters -> prepend `+91`
/// 5. Anything else -> trimmed value as is
///
/// Never fails; malformed input comes back trimmed. Idempotent because every
/// rewrite produces a value starting with `+`.
pub fn normalize_phone(raw: &str) -> String {
    let phone = raw.trim();

    if phone.starts_with(INTERNATIONAL_MARKER) {
        return phone.to_string();
    }

    if phone.starts_with(DEFAULT_COUNTRY_CODE) {
        return format!("{}{}", INTERNATIONAL_MARKER, phone);
    }

    if phone.chars().count() == 10 {
        return format!("{}{}{}", INTERNATIONAL_MARKER, DEFAULT_COUNTRY_CODE, phone);
    }

    phone.to_string()
}

/// Phone as used in wa.me links: every `+` removed.
pub fn link_phone(phone: &str) -> String {
    phone.trim().replace(INTERNATIONAL_MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_number_gets_country_code() {
        assert_eq!(normalize_phone("9876543210"), "+919876543210");
    }

    #[test]
    fn test_country_code_gets_marker() {
        assert_eq!(normalize_phone("919876543210"), "+919876543210");
    }

    #[test]
    fn test_marked_number_unchanged() {
        assert_eq!(normalize_phone("+19876543210"), "+19876543210");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize_phone("  9876543210\t"), "+919876543210");
        assert_eq!(normalize_phone(" +44 20 7946 0958 "), "+44 20 7946 0958");
    }

    #[test]
    fn test_malformed_passes_through() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("12345"), "12345");
        assert_eq!(normalize_phone("call me"), "call me");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "9876543210",
            "919876543210",
            "+19876543210",
            "  12345 ",
            "",
            "abcdefghij",
            "0091 98765",
            "91",
        ];
        for raw in samples {
            let once = normalize_phone(raw);
            assert_eq!(normalize_phone(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_link_phone_strips_marker() {
        assert_eq!(link_phone("+919876543210"), "919876543210");
        assert_eq!(link_phone("919876543210"), "919876543210");
    }
}
