//! FHIR `Observation` wire models and translation helpers.
//!
//! Vital signs and biometrics are stored server-side as one `Observation` per measurement.
//! This module flattens each observation to its concept codes, value and timestamp; grouping
//! observations into readings is a chart concern and lives in the core crate.

use crate::bundle::search_resources;
use crate::condition::CodeableConceptWire;
use crate::datetime::parse_fhir_datetime;
use crate::FhirError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Public domain-level types
// ============================================================================

/// The value carried by an observation.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservationValue {
    Quantity { value: f64, unit: Option<String> },
    Text(String),
}

impl ObservationValue {
    /// The numeric value, if this is a quantity.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ObservationValue::Quantity { value, .. } => Some(*value),
            ObservationValue::Text(_) => None,
        }
    }
}

/// Domain-level carrier for a single observation.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationData {
    pub id: String,

    /// Every `code.coding[].code`, in wire order. OpenMRS sends the concept UUID first,
    /// followed by mappings (LOINC, CIEL).
    pub codes: Vec<String>,

    pub value: Option<ObservationValue>,

    /// `effectiveDateTime`, falling back to `issued`.
    pub effective: Option<DateTime<Utc>>,
}

// ============================================================================
// Public Observation operations
// ============================================================================

/// Observation resource operations.
pub struct Observation;

impl Observation {
    /// Translate an `Observation` search response into domain carriers, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the body is not a search bundle or an entry does not match the
    /// wire schema.
    pub fn from_search_bundle(body: Value) -> Result<Vec<ObservationData>, FhirError> {
        Ok(search_resources::<ObservationWire>(body, "Observation")?
            .into_iter()
            .map(wire_to_domain)
            .collect())
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct ObservationWire {
    id: String,

    #[serde(default)]
    code: Option<CodeableConceptWire>,

    #[serde(rename = "valueQuantity", default)]
    value_quantity: Option<QuantityWire>,

    #[serde(rename = "valueString", default)]
    value_string: Option<String>,

    #[serde(rename = "effectiveDateTime", default)]
    effective_date_time: Option<String>,

    #[serde(default)]
    issued: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct QuantityWire {
    #[serde(default)]
    value: Option<f64>,

    #[serde(default)]
    unit: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: ObservationWire) -> ObservationData {
    let codes = wire
        .code
        .map(|c| c.coding.into_iter().filter_map(|c| c.code).collect())
        .unwrap_or_default();

    let value = match (wire.value_quantity, wire.value_string) {
        (Some(QuantityWire {
            value: Some(value),
            unit,
        }), _) => Some(ObservationValue::Quantity { value, unit }),
        (_, Some(text)) => Some(ObservationValue::Text(text)),
        _ => None,
    };

    let effective = wire
        .effective_date_time
        .as_deref()
        .and_then(parse_fhir_datetime)
        .or_else(|| wire.issued.as_deref().and_then(parse_fhir_datetime));

    ObservationData {
        id: wire.id,
        codes,
        value,
        effective,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    #[test]
    fn parses_quantity_observation() {
        let body = json!({
            "resourceType": "Bundle",
            "entry": [{"resource": {
                "resourceType": "Observation",
                "id": "o1",
                "status": "final",
                "code": {"coding": [
                    {"code": "5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "display": "Systolic blood pressure"},
                    {"system": "http://loinc.org", "code": "8480-6"}
                ]},
                "encounter": {"reference": "Encounter/e1", "type": "Encounter"},
                "effectiveDateTime": "2021-05-19T09:49:42+00:00",
                "valueQuantity": {"value": 121, "unit": "mmHg", "system": "http://unitsofmeasure.org"}
            }}]
        });

        let observations = Observation::from_search_bundle(body).expect("parse bundle");
        let obs = &observations[0];
        assert_eq!(obs.id, "o1");
        assert_eq!(obs.codes, vec!["5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "8480-6"]);
        assert_eq!(
            obs.value,
            Some(ObservationValue::Quantity {
                value: 121.0,
                unit: Some("mmHg".into())
            })
        );
        assert_eq!(obs.value.as_ref().and_then(|v| v.as_number()), Some(121.0));
        assert_eq!(obs.effective.map(|d| d.hour()), Some(9));
    }

    #[test]
    fn falls_back_to_issued_and_string_values() {
        let body = json!({
            "resourceType": "Bundle",
            "entry": [{"resource": {
                "resourceType": "Observation",
                "id": "o2",
                "code": {"coding": [{"code": "165095AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}]},
                "issued": "2021-05-10T15:02:00.000+0000",
                "valueString": "Patient looks well"
            }}]
        });

        let observations = Observation::from_search_bundle(body).expect("parse bundle");
        let obs = &observations[0];
        assert_eq!(obs.value, Some(ObservationValue::Text("Patient looks well".into())));
        assert!(obs.value.as_ref().and_then(|v| v.as_number()).is_none());
        assert_eq!(obs.effective.map(|d| d.hour()), Some(15));
    }

    #[test]
    fn observation_without_value_is_kept() {
        let body = json!({
            "resourceType": "Bundle",
            "entry": [{"resource": {"resourceType": "Observation", "id": "o3", "valueQuantity": {"unit": "kg"}}}]
        });
        let observations = Observation::from_search_bundle(body).expect("parse bundle");
        assert!(observations[0].value.is_none());
        assert!(observations[0].codes.is_empty());
    }
}
