//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Normalize a phone number by removing common formatting characters
pub fn normalize_mobile(mobile: &str) -> String {
    mobile
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a mobile number is valid E.164
pub fn is_valid_mobile(mobile: &str) -> bool {
    let normalized = normalize_mobile(mobile);
    E164_REGEX.is_match(&normalized)
}

/// Extract the country prefix from an E.164 number, matching against a
/// list of known prefixes (longest match wins).
///
/// Returns `None` when the number matches no prefix in the list.
pub fn match_country_prefix<'a>(mobile: &str, prefixes: &'a [String]) -> Option<&'a str> {
    let normalized = normalize_mobile(mobile);
    prefixes
        .iter()
        .filter(|p| normalized.starts_with(p.as_str()))
        .max_by_key(|p| p.len())
        .map(|p| p.as_str())
}

/// Mask a mobile number for logging (e.g., +91****3210)
pub fn mask_mobile(mobile: &str) -> String {
    let normalized = normalize_mobile(mobile);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Last four digits of a mobile number, used in audit details so full
/// numbers never reach the durable log.
pub fn mobile_last4(mobile: &str) -> String {
    let normalized = normalize_mobile(mobile);
    if normalized.len() >= 4 {
        normalized[normalized.len() - 4..].to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mobile() {
        assert_eq!(normalize_mobile("+91 98765-43210"), "+919876543210");
        assert_eq!(normalize_mobile("(44) 2071 838750"), "442071838750");
    }

    #[test]
    fn test_is_valid_mobile() {
        assert!(is_valid_mobile("+919876543210"));
        assert!(is_valid_mobile("+442071838750"));
        assert!(!is_valid_mobile("9876543210")); // Missing +
        assert!(!is_valid_mobile("+0123456789")); // Invalid country code
        assert!(!is_valid_mobile("+1")); // Too short
    }

    #[test]
    fn test_match_country_prefix() {
        let allowed = vec!["+91".to_string(), "+44".to_string()];
        assert_eq!(
            match_country_prefix("+919876543210", &allowed),
            Some("+91")
        );
        assert_eq!(
            match_country_prefix("+442071838750", &allowed),
            Some("+44")
        );
        assert_eq!(match_country_prefix("+15551234567", &allowed), None);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let allowed = vec!["+1".to_string(), "+1242".to_string()];
        assert_eq!(
            match_country_prefix("+12425551234", &allowed),
            Some("+1242")
        );
    }

    #[test]
    fn test_mask_mobile() {
        assert_eq!(mask_mobile("+919876543210"), "+91****3210");
        assert_eq!(mask_mobile("12345"), "****");
    }

    #[test]
    fn test_mobile_last4() {
        assert_eq!(mobile_last4("+919876543210"), "3210");
        assert_eq!(mobile_last4("+12"), "+12");
    }
}
