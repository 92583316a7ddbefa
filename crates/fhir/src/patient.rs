//! FHIR-aligned patient wire models and translation helpers.
//!
//! The chart only needs a handful of patient fields: the logical id (a UUID used for
//! observation queries), the identifier list (the first identifier is the lookup key for
//! condition queries) and the display name.
//!
//! Responsibilities:
//! - Define public domain-level types for chart use
//! - Define a wire model for deserialisation of the server's JSON
//! - Provide translation helpers from the wire model to the domain carrier

use crate::datetime::parse_fhir_datetime;
use crate::{decode_wire, FhirError};
use chrono::NaiveDate;
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Purpose of a human name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameUse {
    /// Official name.
    Official,
    /// Usual/preferred name.
    Usual,
    /// Temporary name.
    Temp,
    /// Nickname or informal name.
    Nickname,
    /// Anonymous name.
    Anonymous,
    /// Old name (no longer in use).
    Old,
    /// Maiden name.
    Maiden,
}

impl NameUse {
    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "official" => Some(NameUse::Official),
            "usual" => Some(NameUse::Usual),
            "temp" => Some(NameUse::Temp),
            "nickname" => Some(NameUse::Nickname),
            "anonymous" => Some(NameUse::Anonymous),
            "old" => Some(NameUse::Old),
            "maiden" => Some(NameUse::Maiden),
            _ => None,
        }
    }
}

/// A business identifier attached to the patient (for example an OpenMRS ID).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientIdentifier {
    /// The identifier value, used verbatim in search queries.
    pub value: String,

    /// Identifier type label (`type.text`), if present.
    pub type_text: Option<String>,

    /// FHIR identifier use (`usual`, `official`, ...), if present.
    pub use_type: Option<String>,
}

/// Domain-level carrier for patient data (flat structure).
///
/// The wire format supports multiple names; this flat structure extracts the first
/// (primary) name, matching what a chart banner shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Logical resource id (the OpenMRS patient UUID).
    pub id: String,

    /// Identifiers in server order.
    pub identifiers: Vec<PatientIdentifier>,

    /// Purpose of the primary name.
    pub use_type: Option<NameUse>,

    /// Family name (surname).
    pub family: Option<String>,

    /// Given names (first name, middle names).
    pub given: Vec<String>,

    /// Administrative gender as sent by the server.
    pub gender: Option<String>,

    pub birth_date: Option<NaiveDate>,
}

impl PatientData {
    /// The value of the first identifier, which condition searches key on.
    pub fn primary_identifier(&self) -> Option<&str> {
        self.identifiers.first().map(|i| i.value.as_str())
    }

    /// Given names followed by the family name, space separated.
    pub fn display_name(&self) -> String {
        self.given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON,
    /// - any modelled field has an unexpected type,
    /// - resourceType is not "Patient".
    pub fn parse(json_text: &str) -> Result<PatientData, FhirError> {
        let value: serde_json::Value = serde_json::from_str(json_text)?;
        Self::from_value(value)
    }

    /// Translate an already-parsed JSON value into [`PatientData`].
    ///
    /// # Errors
    ///
    /// Same as [`Patient::parse`], minus JSON syntax errors.
    pub fn from_value(value: serde_json::Value) -> Result<PatientData, FhirError> {
        let wire: PatientWire = decode_wire(value, "Patient")?;

        if wire.resource_type != "Patient" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                wire.resource_type
            )));
        }

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    id: String,

    #[serde(default)]
    identifier: Vec<IdentifierWire>,

    #[serde(default)]
    name: Vec<HumanNameWire>,

    #[serde(default)]
    gender: Option<String>,

    #[serde(rename = "birthDate", default)]
    birth_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct IdentifierWire {
    #[serde(rename = "use", default)]
    use_type: Option<String>,

    #[serde(rename = "type", default)]
    type_concept: Option<IdentifierTypeWire>,

    #[serde(default)]
    value: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct IdentifierTypeWire {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct HumanNameWire {
    #[serde(rename = "use", default)]
    use_type: Option<String>,

    #[serde(default)]
    family: Option<String>,

    #[serde(default)]
    given: Vec<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> Result<PatientData, FhirError> {
    if wire.id.trim().is_empty() {
        return Err(FhirError::InvalidInput("Patient id cannot be empty".into()));
    }

    // Identifiers without a value cannot be searched on.
    let identifiers = wire
        .identifier
        .into_iter()
        .filter_map(|i| {
            let value = i.value.filter(|v| !v.trim().is_empty())?;
            Some(PatientIdentifier {
                value,
                type_text: i.type_concept.and_then(|t| t.text),
                use_type: i.use_type,
            })
        })
        .collect();

    let first_name = wire.name.into_iter().next();

    let birth_date = match wire.birth_date {
        Some(raw) => Some(
            parse_fhir_datetime(&raw)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| FhirError::Translation(format!("Invalid birthDate '{raw}'")))?,
        ),
        None => None,
    };

    Ok(PatientData {
        id: wire.id,
        identifiers,
        use_type: first_name
            .as_ref()
            .and_then(|n| n.use_type.as_deref())
            .and_then(NameUse::from_wire),
        family: first_name.as_ref().and_then(|n| n.family.clone()),
        given: first_name.map(|n| n.given).unwrap_or_default(),
        gender: wire.gender,
        birth_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "resourceType": "Patient",
        "id": "8673ee4f-e2ab-4077-ba55-4980f408773e",
        "extension": [{"url": "http://fhir-es.transcendinsights.com/stu3/StructureDefinition/resource-date-created", "valueDateTime": "2017-01-18T09:42:40+00:00"}],
        "identifier": [
            {"id": "1f0ad7a1", "use": "usual", "type": {"text": "OpenMRS ID"}, "value": "100GEJ"},
            {"id": "1f0ad7a2", "use": "secondary", "type": {"text": "Old Identification Number"}, "value": "100732HE"}
        ],
        "active": true,
        "name": [
            {"id": "efdb246f", "family": "Wilson", "given": ["John"]},
            {"use": "nickname", "given": ["Johnny"]}
        ],
        "gender": "male",
        "birthDate": "1972-04-04",
        "deceasedBoolean": false
    }"#;

    #[test]
    fn parses_openmrs_patient() {
        let patient = Patient::parse(SAMPLE).expect("parse patient");
        assert_eq!(patient.id, "8673ee4f-e2ab-4077-ba55-4980f408773e");
        assert_eq!(patient.primary_identifier(), Some("100GEJ"));
        assert_eq!(patient.identifiers.len(), 2);
        assert_eq!(
            patient.identifiers[1].type_text.as_deref(),
            Some("Old Identification Number")
        );
        assert_eq!(patient.display_name(), "John Wilson");
        assert_eq!(patient.gender.as_deref(), Some("male"));
        assert_eq!(
            patient.birth_date,
            NaiveDate::from_ymd_opt(1972, 4, 4)
        );
    }

    #[test]
    fn primary_identifier_skips_blank_values() {
        let input = r#"{"resourceType": "Patient", "id": "p1",
            "identifier": [{"value": " "}, {"value": "100GEJ"}]}"#;
        let patient = Patient::parse(input).expect("parse patient");
        assert_eq!(patient.primary_identifier(), Some("100GEJ"));
    }

    #[test]
    fn parses_minimal_patient() {
        let patient = Patient::parse(r#"{"resourceType": "Patient", "id": "p1"}"#)
            .expect("minimal patient");
        assert!(patient.primary_identifier().is_none());
        assert!(patient.given.is_empty());
        assert_eq!(patient.display_name(), "");
    }

    #[test]
    fn rejects_invalid_resource_type() {
        let err = Patient::parse(r#"{"resourceType": "Practitioner", "id": "x"}"#)
            .expect_err("should reject resourceType");
        match err {
            FhirError::InvalidInput(msg) => {
                assert!(msg.contains("Patient"));
                assert!(msg.contains("Practitioner"));
            }
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn reports_path_for_wrong_types() {
        let input = r#"{"resourceType": "Patient", "id": "p1",
            "name": [{"given": "John"}]}"#;
        let err = Patient::parse(input).expect_err("given must be an array");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("given"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_birth_date() {
        let input = r#"{"resourceType": "Patient", "id": "p1", "birthDate": "04/04/1972"}"#;
        let err = Patient::parse(input).expect_err("bad birth date");
        assert!(matches!(err, FhirError::Translation(msg) if msg.contains("birthDate")));
    }
}
