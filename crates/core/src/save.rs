//! Persisting a vitals and biometrics encounter.

use crate::abort::AbortHandle;
use crate::concepts::{BiometricsField, ConceptMap};
use crate::fetcher::{ChartFetcher, SaveResponse};
use crate::{ChartError, ChartResult};
use async_trait::async_trait;
use chart_types::NumericText;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Entered field values, keyed by field, text exactly as typed.
///
/// Serialises as an object keyed by the payload names (`systolicBloodPressure`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VitalsValues(BTreeMap<BiometricsField, String>);

impl VitalsValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: BiometricsField, text: impl Into<String>) {
        self.0.insert(field, text.into());
    }

    pub fn get(&self, field: BiometricsField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BiometricsField, &str)> {
        self.0.iter().map(|(field, text)| (*field, text.as_str()))
    }
}

impl FromIterator<(BiometricsField, String)> for VitalsValues {
    fn from_iter<I: IntoIterator<Item = (BiometricsField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Everything one save call carries, apart from its cancellation handle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVitalsRequest {
    pub encounter_type_uuid: String,
    pub form_uuid: String,
    pub concepts: ConceptMap,
    pub patient_uuid: Uuid,
    pub values: VitalsValues,
    pub encounter_datetime: DateTime<Utc>,
    pub location_uuid: Option<String>,
}

/// Persists a vitals encounter.
#[async_trait]
pub trait VitalsSaver: Send + Sync {
    /// Save `request`, giving up if `abort` fires first.
    ///
    /// Returns the server's response whatever its status; only failures to get a response
    /// are errors.
    async fn save_patient_vitals(
        &self,
        request: &SaveVitalsRequest,
        abort: AbortHandle,
    ) -> ChartResult<SaveResponse>;
}

/// Saves vitals by creating an encounter with one observation per entered field.
#[derive(Clone, Debug)]
pub struct EncounterVitalsSaver<F> {
    fetcher: F,
    rest_base: String,
}

impl<F: ChartFetcher> EncounterVitalsSaver<F> {
    pub fn new(fetcher: F, rest_base: impl Into<String>) -> Self {
        Self {
            fetcher,
            rest_base: rest_base.into(),
        }
    }
}

/// Build the encounter resource for `request`.
///
/// Numeric fields become numeric observation values; the note is sent as text.
///
/// # Errors
///
/// Returns [`ChartError::Text`] if a numeric field does not parse.
pub fn encounter_payload(request: &SaveVitalsRequest) -> ChartResult<Value> {
    let mut obs = Vec::with_capacity(request.values.len());
    for (field, text) in request.values.iter() {
        let value = if field.is_numeric() {
            json!(NumericText::parse(text)?.value())
        } else {
            json!(text)
        };
        obs.push(json!({
            "concept": request.concepts.uuid_for(field),
            "value": value,
        }));
    }

    let mut payload = json!({
        "patient": request.patient_uuid,
        "encounterDatetime": request
            .encounter_datetime
            .format("%Y-%m-%dT%H:%M:%S%.3f%z")
            .to_string(),
        "encounterType": request.encounter_type_uuid,
        "form": request.form_uuid,
        "obs": obs,
    });
    if let Some(location) = &request.location_uuid {
        payload["location"] = json!(location);
    }
    Ok(payload)
}

#[async_trait]
impl<F: ChartFetcher> VitalsSaver for EncounterVitalsSaver<F> {
    async fn save_patient_vitals(
        &self,
        request: &SaveVitalsRequest,
        abort: AbortHandle,
    ) -> ChartResult<SaveResponse> {
        let payload = encounter_payload(request)?;
        let path = format!("{}/encounter", self.rest_base);
        tracing::info!(
            "saving {} vitals observations for patient {}",
            request.values.len(),
            request.patient_uuid
        );

        if abort.is_aborted() {
            return Err(ChartError::Cancelled);
        }
        let response = self.fetcher.post(&path, &payload, &abort).await?;
        tracing::info!("encounter save answered with status {}", response.status);
        Ok(response)
    }
}
