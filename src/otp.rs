/// One-time-passcode extraction from message content
///
/// A passcode is a standalone run of 4 to 8 decimal digits. Runs embedded
/// in longer digit sequences or glued to word characters do not count.

use regex::Regex;
use std::sync::OnceLock;

const OTP_PATTERN: &str = r"\b[0-9]{4,8}\b";

fn otp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(OTP_PATTERN).expect("OTP pattern is valid"))
}

/// Find the first standalone 4-8 digit run in `text`
///
/// A 9-digit run matches nothing rather than yielding its first 8 digits.
pub fn extract_otp(text: &str) -> Option<String> {
    otp_regex().find(text).map(|m| m.as_str().to_string())
}

/// Scan a message for a passcode, subject first, then body
pub fn extract_from_message(subject: &str, body: &str) -> Option<String> {
    extract_otp(subject).or_else(|| extract_otp(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_code() {
        let body = "Thanks for signing up! Use the verification code: 847392 to continue.";
        assert_eq!(extract_otp(body), Some("847392".to_string()));
    }

    #[test]
    fn test_no_digit_run() {
        assert_eq!(extract_otp("Welcome aboard, enjoy your trial."), None);
    }

    #[test]
    fn test_run_too_short() {
        assert_eq!(extract_otp("gate 123 closed"), None);
    }

    #[test]
    fn test_run_too_long() {
        // 9 digits is not truncated to a match
        assert_eq!(extract_otp("ref 123456789 end"), None);
    }

    #[test]
    fn test_boundary_lengths() {
        assert_eq!(extract_otp("pin 1234"), Some("1234".to_string()));
        assert_eq!(extract_otp("pin 12345678"), Some("12345678".to_string()));
    }

    #[test]
    fn test_glued_to_word_chars() {
        assert_eq!(extract_otp("order id ax39201b"), None);
    }

    #[test]
    fn test_first_of_several_wins() {
        assert_eq!(
            extract_otp("code 5501 or fallback 777812"),
            Some("5501".to_string())
        );
    }

    #[test]
    fn test_subject_scanned_before_body() {
        assert_eq!(
            extract_from_message("Your code is 440022", "backup code 999111"),
            Some("440022".to_string())
        );
        assert_eq!(
            extract_from_message("Welcome!", "backup code 999111"),
            Some("999111".to_string())
        );
    }
}
