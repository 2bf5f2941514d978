use serde::{Deserialize, Serialize};

/// Product interest selected on the contact form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Pos,
    Online,
    Account,
}

impl Interest {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pos" => Some(Interest::Pos),
            "online" => Some(Interest::Online),
            "account" => Some(Interest::Account),
            _ => None,
        }
    }

    /// Label stored in the CRM's Interest_Type field.
    pub fn crm_label(&self) -> &'static str {
        match self {
            Interest::Pos => "POS",
            Interest::Online => "Online",
            Interest::Account => "Account",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::Pos => "pos",
            Interest::Online => "online",
            Interest::Account => "account",
        }
    }
}

/// Landing-page locale. Unknown values fall back to French.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Fr,
    Ar,
    En,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Fr
    }
}

impl Locale {
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "ar" => Locale::Ar,
            Some(v) if v == "en" => Locale::En,
            _ => Locale::Fr,
        }
    }

    /// Label stored in the CRM's Language_Preference field.
    pub fn language_label(&self) -> &'static str {
        match self {
            Locale::Fr => "French",
            Locale::Ar => "Arabic",
            Locale::En => "English",
        }
    }
}

/// Raw, untrusted form submission as posted by the landing page.
///
/// Every field is optional at this layer; the sanitizer decides what is
/// actually acceptable. The CSRF token may travel in the body instead of a
/// header, so it is part of the wire shape too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub locale: Option<String>,
    #[serde(alias = "csrfToken")]
    pub csrf_token: Option<String>,
}

/// A submission that has passed every sanitization rule. Downstream code
/// never re-validates these fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: String,
    pub interest: Interest,
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_parse_known_values() {
        assert_eq!(Interest::parse("pos"), Some(Interest::Pos));
        assert_eq!(Interest::parse(" ONLINE "), Some(Interest::Online));
        assert_eq!(Interest::parse("Account"), Some(Interest::Account));
    }

    #[test]
    fn test_interest_parse_rejects_unknown() {
        assert_eq!(Interest::parse("crypto"), None);
        assert_eq!(Interest::parse(""), None);
    }

    #[test]
    fn test_interest_crm_labels() {
        assert_eq!(Interest::Pos.crm_label(), "POS");
        assert_eq!(Interest::Online.crm_label(), "Online");
        assert_eq!(Interest::Account.crm_label(), "Account");
    }

    #[test]
    fn test_locale_defaults_to_french() {
        assert_eq!(Locale::parse_or_default(None), Locale::Fr);
        assert_eq!(Locale::parse_or_default(Some("de")), Locale::Fr);
        assert_eq!(Locale::parse_or_default(Some("ar")), Locale::Ar);
        assert_eq!(Locale::parse_or_default(Some("EN")), Locale::En);
    }

    #[test]
    fn test_locale_language_labels() {
        assert_eq!(Locale::Fr.language_label(), "French");
        assert_eq!(Locale::Ar.language_label(), "Arabic");
        assert_eq!(Locale::En.language_label(), "English");
    }

    #[test]
    fn test_submission_input_accepts_csrf_token_alias() {
        let input: SubmissionInput =
            serde_json::from_str(r#"{"name":"a","csrfToken":"tok"}"#).unwrap();
        assert_eq!(input.csrf_token.as_deref(), Some("tok"));
    }
}
