//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// E.164: '+' then 7-15 ASCII digits, first digit 1-9
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").unwrap());

/// Reasons a raw phone string cannot be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    /// Input was empty or whitespace
    Empty,
    /// Input is not an E.164 number
    InvalidFormat,
}

/// Strip visual separators users commonly type (spaces, dashes, dots, parentheses)
fn strip_separators(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '\t'))
        .collect()
}

/// Normalize a raw phone number to E.164.
///
/// A leading `+` is mandatory; no country code is ever assumed.
pub fn normalize_e164(raw: &str) -> Result<String, PhoneError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let normalized = strip_separators(trimmed);
    if E164_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(PhoneError::InvalidFormat)
    }
}

/// Check if a phone number is valid E.164 after normalization
pub fn is_valid_e164(phone: &str) -> bool {
    normalize_e164(phone).is_ok()
}

/// Mask a phone number for logs (e.g., +15****1234)
pub fn mask_phone(phone: &str) -> String {
    let normalized = strip_separators(phone.trim());
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() >= 8 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_valid_numbers() {
        assert_eq!(normalize_e164("+15550001234"), Ok("+15550001234".to_string()));
        assert_eq!(normalize_e164(" +1 (555) 000-1234 "), Ok("+15550001234".to_string()));
        assert_eq!(normalize_e164("+44.7700.900123"), Ok("+447700900123".to_string()));
        assert_eq!(normalize_e164("+1234567"), Ok("+1234567".to_string()));
        assert_eq!(normalize_e164("+123456789012345"), Ok("+123456789012345".to_string()));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert_eq!(normalize_e164(""), Err(PhoneError::Empty));
        assert_eq!(normalize_e164("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_normalize_rejects_bad_shape() {
        assert_eq!(normalize_e164("15550001234"), Err(PhoneError::InvalidFormat)); // Missing +
        assert_eq!(normalize_e164("+05550001234"), Err(PhoneError::InvalidFormat)); // Leading zero
        assert_eq!(normalize_e164("+123456"), Err(PhoneError::InvalidFormat)); // Too short
        assert_eq!(normalize_e164("+1234567890123456"), Err(PhoneError::InvalidFormat)); // Too long
        assert_eq!(normalize_e164("+1555abc1234"), Err(PhoneError::InvalidFormat));
        assert_eq!(normalize_e164("++15550001234"), Err(PhoneError::InvalidFormat));
        // Non-ASCII decimal digits (Arabic-Indic, fullwidth)
        assert_eq!(
            normalize_e164("+1\u{0665}\u{0665}\u{0665}0001234"),
            Err(PhoneError::InvalidFormat)
        );
        assert_eq!(
            normalize_e164("+\u{FF11}5550001234"),
            Err(PhoneError::InvalidFormat)
        );
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+15550001234"), "+15****1234");
        assert_eq!(mask_phone("12345"), "****");
    }

    #[test]
    fn test_is_valid_e164() {
        assert!(is_valid_e164("+8613812345678"));
        assert!(!is_valid_e164("13812345678"));
    }
}
