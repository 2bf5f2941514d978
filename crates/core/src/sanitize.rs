//! Form input sanitization.
//!
//! Turns an untrusted [`SubmissionInput`] into a [`SanitizedSubmission`] or
//! fails on the first violated rule. Nothing downstream re-validates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Interest, Locale, SanitizedSubmission, SubmissionInput, ValidationError};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
// Letters (any script, the form is fr/ar/en), spaces, hyphens, apostrophes.
static NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}][\p{L} '\-]*$").unwrap());
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").unwrap());
// Moroccan numbering plan: 06/07 local form, or +212/00212 followed by a
// 9-digit subscriber number starting with 6 or 7.
static PHONE_LOCAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[67]\d{8}$").unwrap());
static PHONE_INTL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\+212|00212)[67]\d{8}$").unwrap());

/// Strip markup and normalize whitespace. Angle brackets never survive, so
/// script fragments cannot be smuggled through partial tags.
pub fn clean_text(raw: &str) -> String {
    let without_tags = HTML_TAG.replace_all(raw, " ");
    let without_brackets: String = without_tags
        .chars()
        .filter(|c| *c != '<' && *c != '>' && !c.is_control())
        .collect();
    WHITESPACE_RUN
        .replace_all(&without_brackets, " ")
        .trim()
        .to_string()
}

fn compact_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

fn is_moroccan_phone(compact: &str) -> bool {
    PHONE_LOCAL.is_match(compact) || PHONE_INTL.is_match(compact)
}

/// Validate and normalize a raw submission. Fails with the first violated
/// rule; never returns a partially sanitized record.
pub fn sanitize(raw: &SubmissionInput) -> Result<SanitizedSubmission, ValidationError> {
    let name = clean_text(raw.name.as_deref().unwrap_or(""));
    if name.is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    let name_len = name.chars().count();
    if !(2..=100).contains(&name_len) {
        return Err(ValidationError::new(
            "name",
            "name must be between 2 and 100 characters",
        ));
    }
    if !NAME_CHARS.is_match(&name) {
        return Err(ValidationError::new(
            "name",
            "name may only contain letters, spaces, hyphens and apostrophes",
        ));
    }

    let email = raw
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        return Err(ValidationError::new("email", "email is required"));
    }
    if !EMAIL.is_match(&email) {
        return Err(ValidationError::new("email", "invalid email address"));
    }

    let phone = compact_phone(raw.phone.as_deref().unwrap_or("").trim());
    if phone.is_empty() {
        return Err(ValidationError::new("phone", "phone is required"));
    }
    if !is_moroccan_phone(&phone) {
        return Err(ValidationError::new(
            "phone",
            "phone must be a valid Moroccan mobile number",
        ));
    }

    let interest = raw
        .interest
        .as_deref()
        .and_then(Interest::parse)
        .ok_or_else(|| ValidationError::new("interest", "interest must be one of pos, online, account"))?;

    let company = raw
        .company
        .as_deref()
        .map(clean_text)
        .filter(|c| !c.is_empty());

    let locale = Locale::parse_or_default(raw.locale.as_deref());

    Ok(SanitizedSubmission {
        name,
        company,
        email,
        phone,
        interest,
        locale,
    })
}

/// Maximum accepted User-Agent length. Anything longer is either broken
/// tooling or an attempt to stuff the logs.
pub const MAX_USER_AGENT_LEN: usize = 1000;

/// Coarse bot/replay filter over request metadata. Not authentication.
pub fn validate_request_metadata(
    user_agent: Option<&str>,
    referer: Option<&str>,
) -> Result<(), ValidationError> {
    let ua = user_agent.unwrap_or("").trim();
    if ua.is_empty() {
        return Err(ValidationError::new("user-agent", "user-agent is required"));
    }
    if ua.len() > MAX_USER_AGENT_LEN {
        return Err(ValidationError::new("user-agent", "user-agent too long"));
    }
    if let Some(referer) = referer {
        let referer = referer.trim();
        let rest = referer
            .strip_prefix("https://")
            .or_else(|| referer.strip_prefix("http://"));
        let valid = matches!(rest, Some(rest) if !rest.is_empty() && !rest.contains(' '));
        if !valid {
            return Err(ValidationError::new("referer", "referer is not a valid URL"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, phone: &str, interest: &str) -> SubmissionInput {
        SubmissionInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            interest: Some(interest.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_submission() {
        let sub = sanitize(&input("Jean Dupont", "jean@acme.fr", "0612345678", "pos")).unwrap();
        assert_eq!(sub.name, "Jean Dupont");
        assert_eq!(sub.email, "jean@acme.fr");
        assert_eq!(sub.phone, "0612345678");
        assert_eq!(sub.interest, Interest::Pos);
        assert_eq!(sub.locale, Locale::Fr);
        assert_eq!(sub.company, None);
    }

    #[test]
    fn test_missing_fields_report_field_name() {
        let err = sanitize(&SubmissionInput::default()).unwrap_err();
        assert_eq!(err.field, "name");

        let mut raw = input("Jean Dupont", "", "0612345678", "pos");
        raw.email = None;
        assert_eq!(sanitize(&raw).unwrap_err().field, "email");

        let mut raw = input("Jean Dupont", "jean@acme.fr", "", "pos");
        raw.phone = None;
        assert_eq!(sanitize(&raw).unwrap_err().field, "phone");

        let mut raw = input("Jean Dupont", "jean@acme.fr", "0612345678", "");
        raw.interest = None;
        assert_eq!(sanitize(&raw).unwrap_err().field, "interest");
    }

    #[test]
    fn test_accepted_moroccan_phone_formats() {
        for phone in ["0612345678", "0712345678", "+212612345678", "00212712345678"] {
            let raw = input("Jean Dupont", "jean@acme.fr", phone, "pos");
            assert!(sanitize(&raw).is_ok(), "should accept {phone}");
        }
    }

    #[test]
    fn test_rejected_phone_formats() {
        for phone in [
            "0512345678",
            "+212512345678",
            "061234567",
            "06123456789",
            "0012612345678",
            "abc",
        ] {
            let raw = input("Jean Dupont", "jean@acme.fr", phone, "pos");
            let err = sanitize(&raw).unwrap_err();
            assert_eq!(err.field, "phone", "should reject {phone}");
        }
    }

    #[test]
    fn test_phone_accepts_separators() {
        let raw = input("Jean Dupont", "jean@acme.fr", "06 12 34 56 78", "pos");
        assert_eq!(sanitize(&raw).unwrap().phone, "0612345678");
    }

    #[test]
    fn test_email_normalized_to_lowercase() {
        let raw = input("Jean Dupont", "  Jean@ACME.fr ", "0612345678", "pos");
        assert_eq!(sanitize(&raw).unwrap().email, "jean@acme.fr");
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["plainaddress", "a@b", "a b@c.com", "@acme.fr"] {
            let raw = input("Jean Dupont", email, "0612345678", "pos");
            assert_eq!(sanitize(&raw).unwrap_err().field, "email");
        }
    }

    #[test]
    fn test_clean_text_strips_markup() {
        assert_eq!(clean_text("Jean <b>Dupont</b>"), "Jean Dupont");
        assert_eq!(
            clean_text("Jean<script>alert('x')</script>Dupont"),
            "Jean alert('x') Dupont"
        );
        assert_eq!(clean_text("a < b > c"), "a c");
    }

    #[test]
    fn test_html_stripped_from_name() {
        let raw = input("<b>Jean</b> Dupont", "jean@acme.fr", "0612345678", "pos");
        assert_eq!(sanitize(&raw).unwrap().name, "Jean Dupont");
    }

    #[test]
    fn test_name_with_digits_rejected() {
        let raw = input("Jean 123", "jean@acme.fr", "0612345678", "pos");
        assert_eq!(sanitize(&raw).unwrap_err().field, "name");
    }

    #[test]
    fn test_name_length_bounds() {
        let raw = input("J", "jean@acme.fr", "0612345678", "pos");
        assert_eq!(sanitize(&raw).unwrap_err().field, "name");

        let long = "a".repeat(101);
        let raw = input(&long, "jean@acme.fr", "0612345678", "pos");
        assert_eq!(sanitize(&raw).unwrap_err().field, "name");

        let max = "a".repeat(100);
        let raw = input(&max, "jean@acme.fr", "0612345678", "pos");
        assert!(sanitize(&raw).is_ok());
    }

    #[test]
    fn test_arabic_name_accepted() {
        let raw = input("محمد العلوي", "m@acme.ma", "0712345678", "account");
        assert!(sanitize(&raw).is_ok());
    }

    #[test]
    fn test_company_empty_after_cleaning_becomes_none() {
        let mut raw = input("Jean Dupont", "jean@acme.fr", "0612345678", "pos");
        raw.company = Some("<b></b>  ".to_string());
        assert_eq!(sanitize(&raw).unwrap().company, None);

        raw.company = Some("  Acme <i>SARL</i> ".to_string());
        assert_eq!(sanitize(&raw).unwrap().company.as_deref(), Some("Acme SARL"));
    }

    #[test]
    fn test_metadata_requires_user_agent() {
        assert!(validate_request_metadata(None, None).is_err());
        assert!(validate_request_metadata(Some(""), None).is_err());
        assert!(validate_request_metadata(Some("Mozilla/5.0"), None).is_ok());
    }

    #[test]
    fn test_metadata_rejects_oversized_user_agent() {
        let ua = "a".repeat(MAX_USER_AGENT_LEN + 1);
        assert!(validate_request_metadata(Some(&ua), None).is_err());
    }

    #[test]
    fn test_metadata_referer_validation() {
        let ua = Some("Mozilla/5.0");
        assert!(validate_request_metadata(ua, Some("https://example.ma/fr")).is_ok());
        assert!(validate_request_metadata(ua, Some("http://example.ma")).is_ok());
        assert!(validate_request_metadata(ua, Some("not a url")).is_err());
        assert!(validate_request_metadata(ua, Some("https://")).is_err());
        assert!(validate_request_metadata(ua, Some("ftp://example.ma")).is_err());
    }
}
