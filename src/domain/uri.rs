//! URI well-formedness checks for catalog links.
//!
//! A value is accepted when it is a well-formed absolute URI (has a scheme and
//! parses as a URL) or a well-formed relative reference (only RFC 3986
//! characters, valid percent-escapes, at most one fragment marker).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"))
}

fn uri_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9\-._~!$&'()*+,;=:@/?#\[\]]|%[0-9A-Fa-f]{2})*$")
            .expect("valid uri character regex")
    })
}

/// Returns true if `value` is a well-formed absolute or relative URI.
pub fn is_well_formed(value: &str) -> bool {
    if value.is_empty() || !uri_chars_regex().is_match(value) {
        return false;
    }
    if value.matches('#').count() > 1 {
        return false;
    }
    if scheme_regex().is_match(value) {
        return url::Url::parse(value).is_ok();
    }
    true
}

/// Trim and validate an optional URL.
///
/// Blank input means "no URL" and yields `Ok(None)`.
pub fn normalize_optional(field: &'static str, value: Option<&str>) -> DomainResult<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if !is_well_formed(trimmed) {
        return Err(DomainError::invalid_argument(
            field,
            format!("'{}' is not a well-formed URI", trimmed),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://x.com/a")]
    #[case("http://gitlab.example.com:8080/group/sub?tab=1#readme")]
    #[case("ssh://git@gitlab.example.com/group/repo.git")]
    #[case("mailto:team@example.com")]
    #[case("/groups/platform")]
    #[case("platform/backend")]
    #[case("../sibling")]
    #[case("a%20b")]
    fn accepts_well_formed(#[case] value: &str) {
        assert!(is_well_formed(value), "expected '{}' to be accepted", value);
    }

    #[rstest]
    #[case("not a url")]
    #[case("http://")]
    #[case("a%zz")]
    #[case("a#b#c")]
    #[case("back\\slash")]
    #[case("")]
    fn rejects_malformed(#[case] value: &str) {
        assert!(!is_well_formed(value), "expected '{}' to be rejected", value);
    }

    #[test]
    fn normalize_optional_treats_blank_as_unset() {
        assert_eq!(normalize_optional("url", None).unwrap(), None);
        assert_eq!(normalize_optional("url", Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_optional("url", Some(" https://x.com ")).unwrap(),
            Some("https://x.com".to_string())
        );
        assert!(normalize_optional("url", Some("not a url"))
            .unwrap_err()
            .is_invalid_argument());
    }
}
