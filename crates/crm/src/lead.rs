//! CRM lead wire types.
//!
//! Field names follow the CRM's record schema (`First_Name` style), so the
//! payload serializes straight into the `data` array the record API expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use leadgate_core::types::SanitizedSubmission;

pub const LEAD_SOURCE: &str = "Website Contact Form";
pub const LEAD_STATUS_NEW: &str = "Not Contacted";

/// Fallback for the mandatory Company field when the form left it blank.
const COMPANY_FALLBACK: &str = "Individual";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LeadPayload {
    #[serde(rename = "First_Name")]
    pub first_name: String,
    #[serde(rename = "Last_Name")]
    pub last_name: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Lead_Source")]
    pub lead_source: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Interest_Type")]
    pub interest_type: String,
    #[serde(rename = "Language_Preference")]
    pub language_preference: String,
    #[serde(rename = "Lead_Status")]
    pub lead_status: String,
}

impl LeadPayload {
    pub fn from_submission(sub: &SanitizedSubmission) -> Self {
        let (first_name, last_name) = split_name(&sub.name);
        Self {
            first_name,
            last_name,
            company: sub
                .company
                .clone()
                .unwrap_or_else(|| COMPANY_FALLBACK.to_string()),
            email: sub.email.clone(),
            phone: sub.phone.clone(),
            lead_source: LEAD_SOURCE.to_string(),
            description: format!(
                "Interest: {}\nPreferred language: {}",
                sub.interest.crm_label(),
                sub.locale.language_label()
            ),
            interest_type: sub.interest.crm_label().to_string(),
            language_preference: sub.locale.language_label().to_string(),
            lead_status: LEAD_STATUS_NEW.to_string(),
        }
    }

    /// Rewrite the description for an update: keep whatever the lead already
    /// has and append a timestamped resubmission note.
    pub fn append_update_note(&mut self, existing: Option<&str>, at: DateTime<Utc>) {
        let note = format!(
            "Updated via contact form at {} (interest: {})",
            at.to_rfc3339(),
            self.interest_type
        );
        self.description = match existing.filter(|d| !d.trim().is_empty()) {
            Some(existing) => format!("{}\n{}", existing, note),
            None => note,
        };
    }
}

/// The whole name goes to Last_Name when there is a single word; the CRM
/// mandates Last_Name, not First_Name.
fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (String::new(), name.to_string()),
    }
}

/// A lead as returned by the search endpoint. Only the fields this pipeline
/// reads; the CRM record carries plenty more.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub data: Vec<LeadRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordEnvelope {
    #[serde(default)]
    pub data: Vec<RecordResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordResult {
    pub code: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<RecordDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordDetails {
    #[serde(default)]
    pub id: Option<String>,
}

impl RecordResult {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success") || self.code.eq_ignore_ascii_case("success")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgate_core::types::{Interest, Locale};

    fn submission() -> SanitizedSubmission {
        SanitizedSubmission {
            name: "Jean Dupont".to_string(),
            company: None,
            email: "jean@acme.fr".to_string(),
            phone: "0612345678".to_string(),
            interest: Interest::Pos,
            locale: Locale::Fr,
        }
    }

    #[test]
    fn test_payload_from_submission() {
        let payload = LeadPayload::from_submission(&submission());
        assert_eq!(payload.first_name, "Jean");
        assert_eq!(payload.last_name, "Dupont");
        assert_eq!(payload.company, "Individual");
        assert_eq!(payload.interest_type, "POS");
        assert_eq!(payload.language_preference, "French");
        assert_eq!(payload.lead_source, "Website Contact Form");
        assert_eq!(payload.lead_status, "Not Contacted");
    }

    #[test]
    fn test_single_word_name_goes_to_last_name() {
        let mut sub = submission();
        sub.name = "Cher".to_string();
        let payload = LeadPayload::from_submission(&sub);
        assert_eq!(payload.first_name, "");
        assert_eq!(payload.last_name, "Cher");
    }

    #[test]
    fn test_company_carried_when_present() {
        let mut sub = submission();
        sub.company = Some("Acme SARL".to_string());
        assert_eq!(LeadPayload::from_submission(&sub).company, "Acme SARL");
    }

    #[test]
    fn test_serializes_with_crm_field_names() {
        let payload = LeadPayload::from_submission(&submission());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["First_Name"], "Jean");
        assert_eq!(json["Interest_Type"], "POS");
        assert_eq!(json["Language_Preference"], "French");
        assert_eq!(json["Lead_Status"], "Not Contacted");
    }

    #[test]
    fn test_append_update_note_keeps_existing_description() {
        let mut payload = LeadPayload::from_submission(&submission());
        let at = "2026-08-25T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        payload.append_update_note(Some("Original note"), at);
        assert!(payload.description.starts_with("Original note\n"));
        assert!(payload.description.contains("2026-08-25T10:00:00"));
        assert!(payload.description.contains("interest: POS"));
    }

    #[test]
    fn test_append_update_note_without_existing() {
        let mut payload = LeadPayload::from_submission(&submission());
        let at = Utc::now();
        payload.append_update_note(None, at);
        assert!(payload.description.starts_with("Updated via contact form"));
    }

    #[test]
    fn test_search_envelope_parses() {
        let json = r#"{"data":[{"id":"1234","Email":"jean@acme.fr","Description":"note"}]}"#;
        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].id, "1234");
        assert_eq!(envelope.data[0].description.as_deref(), Some("note"));
    }

    #[test]
    fn test_record_envelope_success() {
        let json = r#"{"data":[{"code":"SUCCESS","status":"success","message":"record added","details":{"id":"5678"}}]}"#;
        let envelope: RecordEnvelope = serde_json::from_str(json).unwrap();
        let result = &envelope.data[0];
        assert!(result.is_success());
        assert_eq!(result.details.as_ref().unwrap().id.as_deref(), Some("5678"));
    }

    #[test]
    fn test_record_envelope_failure() {
        let json = r#"{"data":[{"code":"MANDATORY_NOT_FOUND","status":"error","message":"required field not found"}]}"#;
        let envelope: RecordEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.data[0].is_success());
    }
}
