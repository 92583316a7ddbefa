//! Concept identifiers and concept metadata for vital signs and biometrics.
//!
//! Every field on the vitals form is stored server-side as an observation against a concept.
//! The [`ConceptMap`] is configuration: a fixed lookup from field to concept UUID. The
//! [`ConceptMetadataIndex`] is fetched from the server and carries units and reference ranges
//! for the same concepts.

use crate::config::ChartConfig;
use crate::constants::VITALS_CONCEPT_SET_QUERY;
use crate::fetcher::ChartFetcher;
use crate::interpretation::ReferenceRange;
use crate::ChartResult;
use chart_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Fields
// ============================================================================

/// A single input on the vitals and biometrics form.
///
/// Serialises to the camelCase key used in the save payload (`systolicBloodPressure`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BiometricsField {
    SystolicBloodPressure,
    DiastolicBloodPressure,
    Pulse,
    OxygenSaturation,
    RespiratoryRate,
    Temperature,
    GeneralPatientNote,
    Weight,
    Height,
    MidUpperArmCircumference,
}

impl BiometricsField {
    /// All fields in form order.
    pub const ALL: [BiometricsField; 10] = [
        BiometricsField::SystolicBloodPressure,
        BiometricsField::DiastolicBloodPressure,
        BiometricsField::Pulse,
        BiometricsField::OxygenSaturation,
        BiometricsField::RespiratoryRate,
        BiometricsField::Temperature,
        BiometricsField::GeneralPatientNote,
        BiometricsField::Weight,
        BiometricsField::Height,
        BiometricsField::MidUpperArmCircumference,
    ];

    /// The payload key for this field.
    pub fn key(self) -> &'static str {
        match self {
            BiometricsField::SystolicBloodPressure => "systolicBloodPressure",
            BiometricsField::DiastolicBloodPressure => "diastolicBloodPressure",
            BiometricsField::Pulse => "pulse",
            BiometricsField::OxygenSaturation => "oxygenSaturation",
            BiometricsField::RespiratoryRate => "respiratoryRate",
            BiometricsField::Temperature => "temperature",
            BiometricsField::GeneralPatientNote => "generalPatientNote",
            BiometricsField::Weight => "weight",
            BiometricsField::Height => "height",
            BiometricsField::MidUpperArmCircumference => "midUpperArmCircumference",
        }
    }

    /// The input title shown next to the field.
    pub fn title(self) -> &'static str {
        match self {
            BiometricsField::SystolicBloodPressure => "Systolic",
            BiometricsField::DiastolicBloodPressure => "Diastolic",
            BiometricsField::Pulse => "Pulse",
            BiometricsField::OxygenSaturation => "Oxygen Saturation",
            BiometricsField::RespiratoryRate => "Respiration Rate",
            BiometricsField::Temperature => "Temperature",
            BiometricsField::GeneralPatientNote => "Notes",
            BiometricsField::Weight => "Weight",
            BiometricsField::Height => "Height",
            BiometricsField::MidUpperArmCircumference => "MUAC",
        }
    }

    /// Every field except the free-text note holds a number.
    pub fn is_numeric(self) -> bool {
        !matches!(self, BiometricsField::GeneralPatientNote)
    }

    /// Look a field up by its payload key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

// ============================================================================
// Concept map
// ============================================================================

/// Fixed mapping from each form field to its concept UUID.
///
/// Serialises with the `<field>Uuid` keys the save call and the configuration file use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConceptMap {
    pub systolic_blood_pressure_uuid: NonEmptyText,
    pub diastolic_blood_pressure_uuid: NonEmptyText,
    pub pulse_uuid: NonEmptyText,
    pub temperature_uuid: NonEmptyText,
    pub oxygen_saturation_uuid: NonEmptyText,
    pub height_uuid: NonEmptyText,
    pub weight_uuid: NonEmptyText,
    pub respiratory_rate_uuid: NonEmptyText,
    pub mid_upper_arm_circumference_uuid: NonEmptyText,
    pub general_patient_note_uuid: NonEmptyText,
}

impl ConceptMap {
    /// The concept UUID recorded for `field`.
    pub fn uuid_for(&self, field: BiometricsField) -> &str {
        let uuid = match field {
            BiometricsField::SystolicBloodPressure => &self.systolic_blood_pressure_uuid,
            BiometricsField::DiastolicBloodPressure => &self.diastolic_blood_pressure_uuid,
            BiometricsField::Pulse => &self.pulse_uuid,
            BiometricsField::OxygenSaturation => &self.oxygen_saturation_uuid,
            BiometricsField::RespiratoryRate => &self.respiratory_rate_uuid,
            BiometricsField::Temperature => &self.temperature_uuid,
            BiometricsField::GeneralPatientNote => &self.general_patient_note_uuid,
            BiometricsField::Weight => &self.weight_uuid,
            BiometricsField::Height => &self.height_uuid,
            BiometricsField::MidUpperArmCircumference => &self.mid_upper_arm_circumference_uuid,
        };
        uuid.as_str()
    }

    /// The field whose concept UUID is `uuid`, if any.
    pub fn field_for(&self, uuid: &str) -> Option<BiometricsField> {
        BiometricsField::ALL
            .into_iter()
            .find(|f| self.uuid_for(*f) == uuid)
    }

    /// Concept UUIDs of every numeric field, in form order.
    pub fn numeric_uuids(&self) -> Vec<&str> {
        BiometricsField::ALL
            .into_iter()
            .filter(|f| f.is_numeric())
            .map(|f| self.uuid_for(f))
            .collect()
    }
}

impl Default for ConceptMap {
    /// CIEL concept identifiers.
    fn default() -> Self {
        let ciel = NonEmptyText::ciel_concept;
        Self {
            systolic_blood_pressure_uuid: ciel(5085),
            diastolic_blood_pressure_uuid: ciel(5086),
            pulse_uuid: ciel(5087),
            temperature_uuid: ciel(5088),
            oxygen_saturation_uuid: ciel(5092),
            height_uuid: ciel(5090),
            weight_uuid: ciel(5089),
            respiratory_rate_uuid: ciel(5242),
            mid_upper_arm_circumference_uuid: ciel(1343),
            general_patient_note_uuid: ciel(165095),
        }
    }
}

// ============================================================================
// Concept metadata
// ============================================================================

/// Units and reference ranges for one concept, as the concept REST resource reports them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMetadata {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub hi_absolute: Option<f64>,
    #[serde(default)]
    pub hi_critical: Option<f64>,
    #[serde(default)]
    pub hi_normal: Option<f64>,
    #[serde(default)]
    pub low_normal: Option<f64>,
    #[serde(default)]
    pub low_critical: Option<f64>,
    #[serde(default)]
    pub low_absolute: Option<f64>,
}

impl ConceptMetadata {
    pub fn reference_range(&self) -> ReferenceRange {
        ReferenceRange {
            low_absolute: self.low_absolute,
            low_critical: self.low_critical,
            low_normal: self.low_normal,
            hi_normal: self.hi_normal,
            hi_critical: self.hi_critical,
            hi_absolute: self.hi_absolute,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConceptSearchWire {
    #[serde(default)]
    results: Vec<ConceptSetWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConceptSetWire {
    #[serde(default)]
    set_members: Vec<ConceptMetadata>,
}

/// Concept metadata keyed by form field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConceptMetadataIndex {
    by_field: BTreeMap<BiometricsField, ConceptMetadata>,
}

impl ConceptMetadataIndex {
    /// Index `metadata` by the fields of `concepts`. Concepts that no field maps to are dropped.
    pub fn new(concepts: &ConceptMap, metadata: impl IntoIterator<Item = ConceptMetadata>) -> Self {
        let by_field = metadata
            .into_iter()
            .filter_map(|m| concepts.field_for(&m.uuid).map(|field| (field, m)))
            .collect();
        Self { by_field }
    }

    /// Decode a concept search response (`results[].setMembers[]`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChartError::Json`] if the body does not have the expected shape.
    pub fn from_search_response(
        concepts: &ConceptMap,
        body: serde_json::Value,
    ) -> ChartResult<Self> {
        let wire: ConceptSearchWire = serde_json::from_value(body)?;
        let members = wire.results.into_iter().flat_map(|r| r.set_members);
        Ok(Self::new(concepts, members))
    }

    pub fn get(&self, field: BiometricsField) -> Option<&ConceptMetadata> {
        self.by_field.get(&field)
    }

    pub fn units(&self, field: BiometricsField) -> Option<&str> {
        self.get(field).and_then(|m| m.units.as_deref())
    }

    pub fn reference_range(&self, field: BiometricsField) -> Option<ReferenceRange> {
        self.get(field).map(ConceptMetadata::reference_range)
    }
}

/// Path of the concept search that returns vital sign metadata.
pub fn concept_metadata_path(rest_base: &str) -> String {
    format!(
        "{rest_base}/concept?q={VITALS_CONCEPT_SET_QUERY}&v=custom:(setMembers:(uuid,display,hiNormal,hiAbsolute,hiCritical,lowNormal,lowAbsolute,lowCritical,units))"
    )
}

/// Fetch concept metadata for the configured vitals concepts.
///
/// # Errors
///
/// Returns the fetcher's error, or [`crate::ChartError::Json`] for an unexpected body.
pub async fn fetch_concept_metadata<F>(
    fetcher: &F,
    config: &ChartConfig,
) -> ChartResult<ConceptMetadataIndex>
where
    F: ChartFetcher + ?Sized,
{
    let path = concept_metadata_path(config.rest_base_path());
    tracing::debug!("fetching concept metadata: {path}");
    let body = fetcher.get(&path).await?;
    ConceptMetadataIndex::from_search_response(config.concepts(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_map_uses_ciel_identifiers() {
        let map = ConceptMap::default();
        assert_eq!(
            map.uuid_for(BiometricsField::SystolicBloodPressure),
            "5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
        );
        assert_eq!(
            map.uuid_for(BiometricsField::GeneralPatientNote),
            "165095AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
        );
        assert_eq!(map.uuid_for(BiometricsField::Height).len(), 36);
    }

    #[test]
    fn concept_map_serialises_with_uuid_keys() {
        let value = serde_json::to_value(ConceptMap::default()).expect("serialise");
        assert_eq!(
            value,
            json!({
                "diastolicBloodPressureUuid": "5086AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "generalPatientNoteUuid": "165095AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "heightUuid": "5090AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "midUpperArmCircumferenceUuid": "1343AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "oxygenSaturationUuid": "5092AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "pulseUuid": "5087AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "respiratoryRateUuid": "5242AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "systolicBloodPressureUuid": "5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "temperatureUuid": "5088AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                "weightUuid": "5089AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
            })
        );
    }

    #[test]
    fn field_lookup_by_uuid_and_key() {
        let map = ConceptMap::default();
        assert_eq!(
            map.field_for("5242AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            Some(BiometricsField::RespiratoryRate)
        );
        assert_eq!(map.field_for("unknown"), None);
        assert_eq!(
            BiometricsField::from_key("midUpperArmCircumference"),
            Some(BiometricsField::MidUpperArmCircumference)
        );
        assert_eq!(BiometricsField::from_key("bmi"), None);
    }

    #[test]
    fn numeric_uuids_exclude_the_note() {
        let map = ConceptMap::default();
        let uuids = map.numeric_uuids();
        assert_eq!(uuids.len(), 9);
        assert!(!uuids.contains(&"165095AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
    }

    #[test]
    fn indexes_concept_search_response() {
        let body = json!({
            "results": [{
                "setMembers": [
                    {"uuid": "5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "display": "Systolic blood pressure",
                     "hiNormal": 140, "hiAbsolute": 250, "hiCritical": null,
                     "lowNormal": 100, "lowAbsolute": 0, "lowCritical": null, "units": "mmHg"},
                    {"uuid": "5088AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "display": "Temperature (C)",
                     "hiNormal": 37.5, "hiAbsolute": 43, "lowNormal": 36.5, "lowAbsolute": 25, "units": "DEG C"},
                    {"uuid": "not-a-vital", "display": "Something else"}
                ]
            }]
        });

        let index = ConceptMetadataIndex::from_search_response(&ConceptMap::default(), body)
            .expect("decode metadata");
        assert_eq!(index.units(BiometricsField::SystolicBloodPressure), Some("mmHg"));
        assert_eq!(index.units(BiometricsField::Temperature), Some("DEG C"));
        assert!(index.get(BiometricsField::Pulse).is_none());

        let range = index
            .reference_range(BiometricsField::SystolicBloodPressure)
            .expect("range");
        assert_eq!(range.hi_normal, Some(140.0));
        assert_eq!(range.low_absolute, Some(0.0));
        assert_eq!(range.hi_critical, None);
    }

    #[test]
    fn metadata_path_names_vital_signs_set() {
        let path = concept_metadata_path("/ws/rest/v1");
        assert!(path.starts_with("/ws/rest/v1/concept?q=VITALS SIGNS&v=custom:(setMembers:("));
        assert!(path.contains("hiAbsolute"));
    }
}
