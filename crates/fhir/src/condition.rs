//! FHIR `Condition` wire models and translation helpers.
//!
//! Conditions are read from a search bundle (`Condition?patient.identifier=...`) and
//! flattened to what the conditions overview shows: display text, onset and status.

use crate::bundle::search_resources;
use crate::datetime::parse_fhir_datetime;
use crate::FhirError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Clinical status of a condition (`condition-clinical` value set).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClinicalStatus {
    Active,
    Recurrence,
    Relapse,
    Inactive,
    Remission,
    Resolved,
    /// Status absent from the resource.
    Unknown,
    /// A code outside the value set, kept verbatim.
    Other(String),
}

impl ClinicalStatus {
    fn from_wire(code: Option<&str>) -> Self {
        match code {
            Some("active") => ClinicalStatus::Active,
            Some("recurrence") => ClinicalStatus::Recurrence,
            Some("relapse") => ClinicalStatus::Relapse,
            Some("inactive") => ClinicalStatus::Inactive,
            Some("remission") => ClinicalStatus::Remission,
            Some("resolved") => ClinicalStatus::Resolved,
            Some(other) => ClinicalStatus::Other(other.to_string()),
            None => ClinicalStatus::Unknown,
        }
    }
}

/// Domain-level carrier for a single condition.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionData {
    pub id: String,

    /// Human readable concept name.
    pub display: String,

    pub clinical_status: ClinicalStatus,

    /// When the condition started, if recorded.
    pub onset: Option<DateTime<Utc>>,

    /// When the condition was entered into the record.
    pub recorded: Option<DateTime<Utc>>,
}

// ============================================================================
// Public Condition operations
// ============================================================================

/// Condition resource operations.
pub struct Condition;

impl Condition {
    /// Translate a `Condition` search response into domain carriers, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the body is not a search bundle, an entry does not match the
    /// wire schema, or a condition has no usable name.
    pub fn from_search_bundle(body: Value) -> Result<Vec<ConditionData>, FhirError> {
        search_resources::<ConditionWire>(body, "Condition")?
            .into_iter()
            .map(wire_to_domain)
            .collect()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct ConditionWire {
    id: String,

    #[serde(rename = "clinicalStatus", default)]
    clinical_status: Option<CodeableConceptWire>,

    #[serde(default)]
    code: Option<CodeableConceptWire>,

    #[serde(rename = "onsetDateTime", default)]
    onset_date_time: Option<String>,

    #[serde(rename = "recordedDate", default)]
    recorded_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CodeableConceptWire {
    #[serde(default)]
    pub coding: Vec<CodingWire>,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CodingWire {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: ConditionWire) -> Result<ConditionData, FhirError> {
    let display = wire
        .code
        .as_ref()
        .and_then(concept_display)
        .ok_or_else(|| FhirError::Translation(format!("Condition {} has no name", wire.id)))?;

    let status_code = wire
        .clinical_status
        .as_ref()
        .and_then(|c| c.coding.first())
        .and_then(|c| c.code.as_deref());

    Ok(ConditionData {
        clinical_status: ClinicalStatus::from_wire(status_code),
        onset: wire.onset_date_time.as_deref().and_then(parse_fhir_datetime),
        recorded: wire.recorded_date.as_deref().and_then(parse_fhir_datetime),
        display,
        id: wire.id,
    })
}

/// `text`, then the first coding `display`, then the first coding `code`.
fn concept_display(concept: &CodeableConceptWire) -> Option<String> {
    let non_blank = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());

    non_blank(&concept.text)
        .or_else(|| concept.coding.iter().find_map(|c| non_blank(&c.display)))
        .or_else(|| concept.coding.iter().find_map(|c| non_blank(&c.code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    fn condition(id: &str, text: &str, status: &str, onset: &str) -> Value {
        json!({
            "resource": {
                "resourceType": "Condition",
                "id": id,
                "clinicalStatus": {"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                    "code": status
                }]},
                "code": {"coding": [{"code": "138571AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "display": text}], "text": text},
                "subject": {"reference": "Patient/8673ee4f-e2ab-4077-ba55-4980f408773e"},
                "onsetDateTime": onset,
                "recordedDate": "2021-05-19T09:49:42+00:00"
            }
        })
    }

    #[test]
    fn parses_search_bundle() {
        let body = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 2,
            "entry": [
                condition("c1", "HIV Positive", "active", "2021-02-14T00:00:00+00:00"),
                condition("c2", "Hypertension", "inactive", "2019-06")
            ]
        });

        let conditions = Condition::from_search_bundle(body).expect("parse bundle");
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].display, "HIV Positive");
        assert_eq!(conditions[0].clinical_status, ClinicalStatus::Active);
        assert_eq!(conditions[0].onset.map(|d| d.year()), Some(2021));
        assert_eq!(conditions[1].clinical_status, ClinicalStatus::Inactive);
        assert_eq!(conditions[1].onset.map(|d| d.month()), Some(6));
        assert!(conditions[1].recorded.is_some());
    }

    #[test]
    fn falls_back_to_coding_display() {
        let body = json!({
            "resourceType": "Bundle",
            "entry": [{"resource": {
                "resourceType": "Condition",
                "id": "c1",
                "code": {"coding": [{"code": "116128AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "display": "Malaria sevère"}]}
            }}]
        });
        let conditions = Condition::from_search_bundle(body).expect("parse bundle");
        assert_eq!(conditions[0].display, "Malaria sevère");
        assert_eq!(conditions[0].clinical_status, ClinicalStatus::Unknown);
        assert!(conditions[0].onset.is_none());
    }

    #[test]
    fn keeps_unknown_status_codes() {
        let body = json!({"resourceType": "Bundle", "entry": [condition("c1", "Anaemia", "provisional", "2020")]});
        let conditions = Condition::from_search_bundle(body).expect("parse bundle");
        assert_eq!(
            conditions[0].clinical_status,
            ClinicalStatus::Other("provisional".into())
        );
    }

    #[test]
    fn rejects_condition_without_name() {
        let body = json!({"resourceType": "Bundle", "entry": [{"resource": {"resourceType": "Condition", "id": "c9"}}]});
        let err = Condition::from_search_bundle(body).expect_err("no name");
        assert!(matches!(err, FhirError::Translation(msg) if msg.contains("c9")));
    }

    #[test]
    fn empty_search_is_empty() {
        let conditions = Condition::from_search_bundle(json!([])).expect("empty body");
        assert!(conditions.is_empty());
    }
}
