//! FHIR R4 wire/boundary support for the patient chart.
//!
//! This crate provides **wire models** and **translation helpers** for the FHIR JSON
//! resources the chart reads from the server:
//! - `Patient` (identifiers used as lookup keys)
//! - `Condition` search bundles
//! - `Observation` search bundles (vital signs and biometrics)
//!
//! This crate focuses on:
//! - serialisation/deserialisation of the JSON wire format
//! - translation between wire structs and flat domain-level carriers
//! - tolerant date parsing for FHIR `date`/`dateTime` values
//!
//! Wire structs stay private. Callers only see the `*Data` domain types.
//!
//! Server responses routinely carry fields this crate does not model (extensions, `meta`,
//! narrative text), so unlike on-disk formats the wire structs here do not deny unknown keys.

pub mod bundle;
pub mod condition;
pub mod datetime;
pub mod observation;
pub mod patient;

// Re-export facades
pub use condition::Condition;
pub use observation::Observation;
pub use patient::Patient;

// Re-export public domain-level types
pub use condition::{ClinicalStatus, ConditionData};
pub use observation::{ObservationData, ObservationValue};
pub use patient::{NameUse, PatientData, PatientIdentifier};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialize a JSON value into a wire struct, reporting the failing field path.
///
/// `what` names the resource for the error message (e.g. `"Condition"`).
pub(crate) fn decode_wire<T>(value: serde_json::Value, what: &str) -> FhirResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path.as_str()
        };
        FhirError::Translation(format!("{what} schema mismatch at {path}: {source}"))
    })
}
