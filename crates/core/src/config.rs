//! Chart runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into overviews and
//! forms. Nothing in this crate reads environment variables while handling a request.
//!
//! The optional YAML file uses the same camelCase keys as the OpenMRS frontend
//! configuration, so an existing config block can be pasted in:
//!
//! ```yaml
//! pageSize: 5
//! concepts:
//!   systolicBloodPressureUuid: 5085AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA
//!   # ...
//! vitals:
//!   encounterTypeUuid: 67a71486-1a54-468f-ac3e-7091a9a79584
//!   formUuid: 9f26aad4-244a-46ca-be49-1196df1a8c9a
//! biometrics:
//!   heightUnit: cm
//!   weightUnit: kg
//! ```

use crate::concepts::ConceptMap;
use crate::constants::{
    DEFAULT_BMI_UNIT, DEFAULT_FHIR_BASE_PATH, DEFAULT_PAGE_SIZE, DEFAULT_REST_BASE_PATH,
    DEFAULT_VITALS_ENCOUNTER_TYPE_UUID, DEFAULT_VITALS_FORM_UUID,
};
use crate::{ChartError, ChartResult};
use chart_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

// ============================================================================
// Units
// ============================================================================

/// Unit the height field is entered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightUnit {
    #[default]
    #[serde(rename = "cm")]
    Centimetre,
    #[serde(rename = "m")]
    Metre,
    #[serde(rename = "in")]
    Inch,
}

impl HeightUnit {
    pub fn to_metres(self, value: f64) -> f64 {
        match self {
            HeightUnit::Centimetre => value / 100.0,
            HeightUnit::Metre => value,
            HeightUnit::Inch => value * 0.0254,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            HeightUnit::Centimetre => "cm",
            HeightUnit::Metre => "m",
            HeightUnit::Inch => "in",
        }
    }
}

/// Unit the weight field is entered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
}

impl WeightUnit {
    pub fn to_kilograms(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kilogram => value,
            WeightUnit::Pound => value * 0.453_592_37,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "lb",
        }
    }
}

/// Units used by the biometrics fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BiometricsUnits {
    pub bmi_unit: String,
    pub height_unit: HeightUnit,
    pub weight_unit: WeightUnit,
}

impl Default for BiometricsUnits {
    fn default() -> Self {
        Self {
            bmi_unit: DEFAULT_BMI_UNIT.into(),
            height_unit: HeightUnit::default(),
            weight_unit: WeightUnit::default(),
        }
    }
}

/// Identifiers recorded against every vitals encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VitalsEncounterConfig {
    pub encounter_type_uuid: NonEmptyText,
    pub form_uuid: NonEmptyText,
}

impl Default for VitalsEncounterConfig {
    fn default() -> Self {
        match (
            NonEmptyText::new(DEFAULT_VITALS_ENCOUNTER_TYPE_UUID),
            NonEmptyText::new(DEFAULT_VITALS_FORM_UUID),
        ) {
            (Ok(encounter_type_uuid), Ok(form_uuid)) => Self {
                encounter_type_uuid,
                form_uuid,
            },
            _ => unreachable!("default vitals identifiers are non-empty constants"),
        }
    }
}

// ============================================================================
// Chart configuration
// ============================================================================

/// On-disk shape of the configuration file. Every key is optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct ConfigFile {
    fhir_base_path: String,
    rest_base_path: String,
    page_size: usize,
    concepts: ConceptMap,
    vitals: VitalsEncounterConfig,
    biometrics: BiometricsUnits,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            fhir_base_path: DEFAULT_FHIR_BASE_PATH.into(),
            rest_base_path: DEFAULT_REST_BASE_PATH.into(),
            page_size: DEFAULT_PAGE_SIZE,
            concepts: ConceptMap::default(),
            vitals: VitalsEncounterConfig::default(),
            biometrics: BiometricsUnits::default(),
        }
    }
}

/// Chart configuration resolved at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    fhir_base_path: String,
    rest_base_path: String,
    page_size: NonZeroUsize,
    concepts: ConceptMap,
    vitals: VitalsEncounterConfig,
    biometrics: BiometricsUnits,
}

impl ChartConfig {
    /// Create a new `ChartConfig`.
    ///
    /// Base paths are normalised to start with `/` and carry no trailing `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidInput`] if `page_size` is zero or a base path is blank.
    pub fn new(
        fhir_base_path: &str,
        rest_base_path: &str,
        page_size: usize,
        concepts: ConceptMap,
        vitals: VitalsEncounterConfig,
        biometrics: BiometricsUnits,
    ) -> ChartResult<Self> {
        let page_size = NonZeroUsize::new(page_size)
            .ok_or_else(|| ChartError::InvalidInput("pageSize must be at least 1".into()))?;

        Ok(Self {
            fhir_base_path: normalise_base_path("fhirBasePath", fhir_base_path)?,
            rest_base_path: normalise_base_path("restBasePath", rest_base_path)?,
            page_size,
            concepts,
            vitals,
            biometrics,
        })
    }

    /// Parse configuration from YAML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::ConfigParse`] for malformed YAML or unknown keys, and
    /// [`ChartError::InvalidInput`] for values that fail validation.
    pub fn from_yaml_str(yaml_text: &str) -> ChartResult<Self> {
        let file: ConfigFile = if yaml_text.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml_text).map_err(ChartError::ConfigParse)?
        };

        Self::new(
            &file.fhir_base_path,
            &file.rest_base_path,
            file.page_size,
            file.concepts,
            file.vitals,
            file.biometrics,
        )
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::ConfigRead`] if the file cannot be read, otherwise as
    /// [`ChartConfig::from_yaml_str`].
    pub fn load(path: &Path) -> ChartResult<Self> {
        let text = std::fs::read_to_string(path).map_err(ChartError::ConfigRead)?;
        tracing::debug!("loaded chart configuration from {}", path.display());
        Self::from_yaml_str(&text)
    }

    pub fn fhir_base_path(&self) -> &str {
        &self.fhir_base_path
    }

    pub fn rest_base_path(&self) -> &str {
        &self.rest_base_path
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn concepts(&self) -> &ConceptMap {
        &self.concepts
    }

    pub fn vitals(&self) -> &VitalsEncounterConfig {
        &self.vitals
    }

    pub fn biometrics(&self) -> &BiometricsUnits {
        &self.biometrics
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        let file = ConfigFile::default();
        Self {
            fhir_base_path: file.fhir_base_path,
            rest_base_path: file.rest_base_path,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            concepts: file.concepts,
            vitals: file.vitals,
            biometrics: file.biometrics,
        }
    }
}

fn normalise_base_path(name: &str, value: &str) -> ChartResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ChartError::InvalidInput(format!("{name} cannot be empty")));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concepts::BiometricsField;
    use std::io::Write;

    #[test]
    fn empty_yaml_gives_defaults() {
        let cfg = ChartConfig::from_yaml_str("").expect("defaults");
        assert_eq!(cfg, ChartConfig::default());
        assert_eq!(cfg.fhir_base_path(), "/ws/fhir2/R4");
        assert_eq!(cfg.rest_base_path(), "/ws/rest/v1");
        assert_eq!(cfg.page_size().get(), 5);
        assert_eq!(cfg.biometrics().height_unit, HeightUnit::Centimetre);
        assert_eq!(cfg.biometrics().bmi_unit, "kg / m²");
    }

    #[test]
    fn partial_yaml_overrides_selected_keys() {
        let yaml = r#"
pageSize: 10
fhirBasePath: openmrs/ws/fhir2/R4/
biometrics:
  heightUnit: m
  weightUnit: lb
"#;
        let cfg = ChartConfig::from_yaml_str(yaml).expect("parse");
        assert_eq!(cfg.page_size().get(), 10);
        assert_eq!(cfg.fhir_base_path(), "/openmrs/ws/fhir2/R4");
        assert_eq!(cfg.biometrics().height_unit, HeightUnit::Metre);
        assert_eq!(cfg.biometrics().weight_unit, WeightUnit::Pound);
        assert_eq!(cfg.biometrics().bmi_unit, "kg / m²");
        assert_eq!(cfg.concepts(), &ConceptMap::default());
    }

    #[test]
    fn concept_map_must_be_complete() {
        let yaml = r#"
concepts:
  systolicBloodPressureUuid: abc
"#;
        let err = ChartConfig::from_yaml_str(yaml).expect_err("incomplete concept map");
        assert!(matches!(err, ChartError::ConfigParse(_)));
    }

    #[test]
    fn rejects_unknown_keys_and_zero_page_size() {
        let err = ChartConfig::from_yaml_str("pageSise: 5").expect_err("typo");
        assert!(matches!(err, ChartError::ConfigParse(_)));

        let err = ChartConfig::from_yaml_str("pageSize: 0").expect_err("zero");
        assert!(matches!(err, ChartError::InvalidInput(msg) if msg.contains("pageSize")));
    }

    #[test]
    fn rejects_blank_base_path() {
        let err = ChartConfig::from_yaml_str("restBasePath: '  /'").expect_err("blank");
        assert!(matches!(err, ChartError::InvalidInput(msg) if msg.contains("restBasePath")));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "vitals:\n  encounterTypeUuid: enc-type\n  formUuid: form-1\nconcepts:\n  systolicBloodPressureUuid: s\n  diastolicBloodPressureUuid: d\n  pulseUuid: p\n  temperatureUuid: t\n  oxygenSaturationUuid: o\n  heightUuid: h\n  weightUuid: w\n  respiratoryRateUuid: r\n  midUpperArmCircumferenceUuid: m\n  generalPatientNoteUuid: n"
        )
        .expect("write config");

        let cfg = ChartConfig::load(file.path()).expect("load");
        assert_eq!(cfg.vitals().encounter_type_uuid.as_str(), "enc-type");
        assert_eq!(cfg.vitals().form_uuid.as_str(), "form-1");
        assert_eq!(cfg.concepts().uuid_for(BiometricsField::Weight), "w");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ChartConfig::load(&dir.path().join("absent.yaml")).expect_err("missing");
        assert!(matches!(err, ChartError::ConfigRead(_)));
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(HeightUnit::Centimetre.to_metres(165.0), 1.65);
        assert!((HeightUnit::Inch.to_metres(65.0) - 1.651).abs() < 1e-9);
        assert!((WeightUnit::Pound.to_kilograms(154.0) - 69.853_225).abs() < 1e-5);
    }
}
