//! Format checks for the three identifier schemes. Pure functions, no lookups.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;

const AUTH_ID_LEN: std::ops::RangeInclusive<usize> = 10..=21;
const PLATFORM_HANDLE_LEN: std::ops::RangeInclusive<usize> = 8..=32;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierScheme {
    /// `local@domain.tld`, no MX verification.
    Email,
    /// Numeric id issued by the external auth provider.
    AuthId,
    /// Alphanumeric id on an external music platform.
    PlatformHandle,
}

impl IdentifierScheme {
    pub fn is_valid(self, raw: &str) -> bool {
        match self {
            IdentifierScheme::Email => is_valid_email(raw),
            IdentifierScheme::AuthId => is_valid_auth_id(raw),
            IdentifierScheme::PlatformHandle => is_valid_platform_handle(raw),
        }
    }

    /// Non-string and missing values fail the format check.
    pub fn validate(self, raw: Option<&Value>) -> bool {
        raw.and_then(Value::as_str).is_some_and(|s| self.is_valid(s))
    }
}

impl fmt::Display for IdentifierScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierScheme::Email => "email",
            IdentifierScheme::AuthId => "auth id",
            IdentifierScheme::PlatformHandle => "platform handle",
        })
    }
}

pub fn is_valid_email(raw: &str) -> bool {
    email_pattern().is_match(raw)
}

pub fn is_valid_auth_id(raw: &str) -> bool {
    AUTH_ID_LEN.contains(&raw.len()) && raw.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_platform_handle(raw: &str) -> bool {
    PLATFORM_HANDLE_LEN.contains(&raw.len())
        && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("test@example.com")]
    #[case("first.last+tag@sub.example.co.uk")]
    #[case("a@b.io")]
    fn accepts_well_formed_emails(#[case] raw: &str) {
        assert!(is_valid_email(raw));
    }

    #[rstest]
    #[case::missing_domain("test@")]
    #[case::missing_at("testexample.com")]
    #[case::bad_char_in_domain("test@exa$mple.com")]
    #[case::no_tld("test@example")]
    #[case::one_letter_tld("test@example.c")]
    #[case::empty("")]
    fn rejects_malformed_emails(#[case] raw: &str) {
        assert!(!is_valid_email(raw));
    }

    #[rstest]
    #[case("1465835860573088967", true)]
    #[case("1234567890", true)]
    #[case("123456789012345678901", true)]
    #[case("123456789", false)]
    #[case("1234567890123456789012", false)]
    #[case("1234", false)]
    #[case("146583586@05733597/088967", false)]
    #[case("12345abcde", false)]
    #[case("", false)]
    fn auth_ids_are_digits_within_length_bounds(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(is_valid_auth_id(raw), valid);
    }

    #[rstest]
    #[case("4a0SGxC38bo29VPaHtiFBf", true)]
    #[case("abc_def-", true)]
    #[case("4a0SGx@C38//bo29VPaHtiFBf", false)]
    #[case("4a0SG", false)]
    #[case("4a0SGxCPaf438bo29Va38bHtiFBo2Hti0SGxCFBf9VPa", false)]
    #[case("", false)]
    fn platform_handles_follow_charset_and_length(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(is_valid_platform_handle(raw), valid);
    }

    #[test]
    fn non_string_values_fail_every_scheme() {
        for scheme in [IdentifierScheme::Email, IdentifierScheme::AuthId, IdentifierScheme::PlatformHandle] {
            assert!(!scheme.validate(Some(&json!(12345678901_u64))));
            assert!(!scheme.validate(Some(&json!(null))));
            assert!(!scheme.validate(None));
        }
        assert!(IdentifierScheme::AuthId.validate(Some(&json!("12345678901"))));
    }
}
