//! The vitals and biometrics entry form.
//!
//! Field values are free text. Everything derived from them (BMI, interpretations, field
//! errors, the value bundle) is recomputed from the current text on every read, so there is
//! no cached state to keep in step with edits.
//!
//! Submission is split in two so callers can race the save against their own cancellation:
//! [`BiometricsForm::prepare_submission`] validates and marks the form pending,
//! [`BiometricsForm::finish_submission`] applies the outcome. [`BiometricsForm::submit`]
//! runs both around a [`VitalsSaver`].

use crate::abort::AbortHandle;
use crate::concepts::{BiometricsField, ConceptMetadataIndex};
use crate::config::{BiometricsUnits, ChartConfig};
use crate::constants::{
    HTTP_CREATED, VITALS_FORM_WORKSPACE, VITALS_SAVED_TITLE, VITALS_SAVE_FAILED_TITLE,
};
use crate::fetcher::SaveResponse;
use crate::interpretation::{Interpretation, BMI_REFERENCE_RANGE};
use crate::save::{SaveVitalsRequest, VitalsSaver, VitalsValues};
use crate::session::Session;
use crate::workspace::WorkspaceLauncher;
use crate::{ChartError, ChartResult};
use chart_types::NumericText;
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// BMI
// ============================================================================

/// Body mass index from `weight` and `height` in the configured units, rounded to one
/// decimal place.
///
/// Returns `None` unless both measurements are positive.
pub fn calculate_bmi(weight: f64, height: f64, units: &BiometricsUnits) -> Option<f64> {
    if !(weight > 0.0 && height > 0.0) {
        return None;
    }
    let kilograms = units.weight_unit.to_kilograms(weight);
    let metres = units.height_unit.to_metres(height);
    let bmi = kilograms / (metres * metres);
    bmi.is_finite().then(|| (bmi * 10.0).round() / 10.0)
}

/// A derived BMI with its display text and classification.
#[derive(Clone, Debug, PartialEq)]
pub struct Bmi {
    pub value: f64,
    /// One decimal place, e.g. `25.7`.
    pub display: String,
    pub interpretation: Interpretation,
}

impl Bmi {
    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            display: format!("{value:.1}"),
            interpretation: BMI_REFERENCE_RANGE.interpret(value),
        }
    }

    /// `danger` when the BMI is outside the normal band.
    pub fn css_class(&self) -> Option<&'static str> {
        self.interpretation.css_class()
    }
}

// ============================================================================
// Form outcome types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Message raised to the user after a save attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

/// A field whose text cannot be submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: BiometricsField,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field.title(), self.message)
    }
}

/// A validated save waiting to be sent.
#[derive(Clone, Debug)]
pub struct PendingSave {
    pub request: SaveVitalsRequest,
    pub abort: AbortHandle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The encounter was created and the workspace closed.
    Saved,
    /// The save failed; the entered values are kept for a retry.
    Failed,
}

// ============================================================================
// Form
// ============================================================================

/// Field state for one patient's vitals and biometrics entry.
#[derive(Clone, Debug)]
pub struct BiometricsForm {
    patient_uuid: Uuid,
    units: BiometricsUnits,
    metadata: Option<ConceptMetadataIndex>,
    values: BTreeMap<BiometricsField, String>,
    pending: Option<AbortHandle>,
    notification: Option<Notification>,
}

impl BiometricsForm {
    pub fn new(patient_uuid: Uuid, units: BiometricsUnits) -> Self {
        Self {
            patient_uuid,
            units,
            metadata: None,
            values: BTreeMap::new(),
            pending: None,
            notification: None,
        }
    }

    /// Attach concept metadata for field interpretation and absolute-range validation.
    pub fn with_metadata(mut self, metadata: ConceptMetadataIndex) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn patient_uuid(&self) -> Uuid {
        self.patient_uuid
    }

    /// Replace the text of `field`.
    pub fn set(&mut self, field: BiometricsField, text: impl Into<String>) {
        self.values.insert(field, text.into());
    }

    pub fn clear(&mut self, field: BiometricsField) {
        self.values.remove(&field);
    }

    /// Current text of `field`; empty if never set.
    pub fn value(&self, field: BiometricsField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    fn number(&self, field: BiometricsField) -> Option<f64> {
        NumericText::parse(self.value(field))
            .ok()
            .map(|n| n.value())
    }

    /// BMI from the current weight and height, if both are positive numbers.
    pub fn bmi(&self) -> Option<Bmi> {
        let weight = self.number(BiometricsField::Weight)?;
        let height = self.number(BiometricsField::Height)?;
        calculate_bmi(weight, height, &self.units).map(Bmi::from_value)
    }

    /// How the current value of `field` reads against its concept's reference range.
    pub fn field_interpretation(&self, field: BiometricsField) -> Option<Interpretation> {
        if !field.is_numeric() {
            return None;
        }
        let range = self.metadata.as_ref()?.reference_range(field)?;
        self.number(field).map(|value| range.interpret(value))
    }

    /// Problems that block submission, in form order.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for field in BiometricsField::ALL.into_iter().filter(|f| f.is_numeric()) {
            let text = self.value(field);
            if text.trim().is_empty() {
                continue;
            }
            let value = match NumericText::parse(text) {
                Ok(number) => number.value(),
                Err(_) => {
                    errors.push(FieldError {
                        field,
                        message: format!("'{}' is not a number", text.trim()),
                    });
                    continue;
                }
            };
            let range = self
                .metadata
                .as_ref()
                .and_then(|m| m.reference_range(field))
                .unwrap_or_default();
            if !range.within_absolute(value) {
                let low = range.low_absolute.map_or("-".to_string(), |v| v.to_string());
                let high = range.hi_absolute.map_or("-".to_string(), |v| v.to_string());
                errors.push(FieldError {
                    field,
                    message: format!("value must be between {low} and {high}"),
                });
            }
        }
        errors
    }

    /// Every non-blank field, text exactly as typed.
    pub fn value_bundle(&self) -> VitalsValues {
        self.values
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(field, text)| (*field, text.clone()))
            .collect()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel the in-flight save, if any.
    pub fn abort_pending(&self) {
        if let Some(abort) = &self.pending {
            abort.abort();
        }
    }

    /// The notification raised by the last save attempt.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Validate the form and mark it pending.
    ///
    /// Each call creates a fresh cancellation handle.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ChartError::SavePending`] while an earlier save is in flight,
    /// - [`ChartError::MissingSession`] without a session location,
    /// - [`ChartError::InvalidInput`] if any field is invalid or nothing was entered.
    pub fn prepare_submission(
        &mut self,
        session: &Session,
        config: &ChartConfig,
    ) -> ChartResult<PendingSave> {
        if self.is_pending() {
            return Err(ChartError::SavePending);
        }
        let location_uuid = session
            .location_uuid()
            .ok_or(ChartError::MissingSession)?
            .to_string();

        let errors = self.field_errors();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(ChartError::InvalidInput(messages.join("; ")));
        }

        let values = self.value_bundle();
        if values.is_empty() {
            return Err(ChartError::InvalidInput(
                "no vitals or biometrics were entered".into(),
            ));
        }

        let abort = AbortHandle::new();
        let request = SaveVitalsRequest {
            encounter_type_uuid: config.vitals().encounter_type_uuid.to_string(),
            form_uuid: config.vitals().form_uuid.to_string(),
            concepts: config.concepts().clone(),
            patient_uuid: self.patient_uuid,
            values,
            encounter_datetime: Utc::now(),
            location_uuid: Some(location_uuid),
        };

        self.pending = Some(abort.clone());
        self.notification = None;
        Ok(PendingSave { request, abort })
    }

    /// Apply the result of a save. Always clears the pending flag.
    ///
    /// Only `201 Created` counts as saved; it closes the form workspace. Anything else keeps
    /// the entered values so the user can retry.
    pub fn finish_submission<L>(
        &mut self,
        result: ChartResult<SaveResponse>,
        launcher: &L,
    ) -> SubmitOutcome
    where
        L: WorkspaceLauncher + ?Sized,
    {
        self.pending = None;

        let failure = match result {
            Ok(response) if response.status == HTTP_CREATED => {
                tracing::info!("vitals saved for patient {}", self.patient_uuid);
                self.notification = Some(Notification {
                    kind: NotificationKind::Success,
                    title: VITALS_SAVED_TITLE.into(),
                    description: "They are now visible on the Vitals and Biometrics page".into(),
                });
                launcher.close(VITALS_FORM_WORKSPACE);
                return SubmitOutcome::Saved;
            }
            Ok(response) => format!("server responded with status {}", response.status),
            Err(err) => err.to_string(),
        };

        tracing::warn!("saving vitals failed: {failure}");
        self.notification = Some(Notification {
            kind: NotificationKind::Error,
            title: VITALS_SAVE_FAILED_TITLE.into(),
            description: failure,
        });
        SubmitOutcome::Failed
    }

    /// Validate, save through `saver` and apply the outcome.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`BiometricsForm::prepare_submission`]; in that case no save is
    /// attempted. Save failures are not errors: they are reported as
    /// [`SubmitOutcome::Failed`] with an error notification.
    pub async fn submit<S, L>(
        &mut self,
        saver: &S,
        session: &Session,
        config: &ChartConfig,
        launcher: &L,
    ) -> ChartResult<SubmitOutcome>
    where
        S: VitalsSaver + ?Sized,
        L: WorkspaceLauncher + ?Sized,
    {
        let PendingSave { request, abort } = self.prepare_submission(session, config)?;
        let result = saver.save_patient_vitals(&request, abort).await;
        Ok(self.finish_submission(result, launcher))
    }
}
