//! # Chart Core
//!
//! Core logic for the patient chart: everything between the HTTP layer and whatever renders
//! the chart.
//!
//! This crate contains:
//! - Overviews (conditions, vitals) with an explicit loading/failed/loaded lifecycle and
//!   pure pagination over the loaded records
//! - The vitals and biometrics form: free-text fields, BMI derivation, reference-range
//!   interpretation and submission
//! - Configuration resolved once at startup (concept identifiers, units, page size)
//!
//! **No transport concerns**: outbound HTTP sits behind [`ChartFetcher`], navigation behind
//! [`WorkspaceLauncher`] and saving behind [`VitalsSaver`]. The `openmrs-client` crate
//! provides the HTTP implementation.

pub mod abort;
pub mod biometrics;
pub mod concepts;
pub mod conditions;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod fetcher;
pub mod interpretation;
pub mod overview;
pub mod pagination;
pub mod save;
pub mod session;
pub mod vitals;
pub mod workspace;

pub use abort::AbortHandle;
pub use biometrics::{
    calculate_bmi, Bmi, BiometricsForm, FieldError, Notification, NotificationKind,
    PendingSave, SubmitOutcome,
};
pub use concepts::{
    fetch_concept_metadata, BiometricsField, ConceptMap, ConceptMetadata, ConceptMetadataIndex,
};
pub use conditions::ConditionsOverview;
pub use config::{BiometricsUnits, ChartConfig, HeightUnit, VitalsEncounterConfig, WeightUnit};
pub use error::{ChartError, ChartResult};
pub use fetch::FetchState;
pub use fetcher::{ChartFetcher, SaveResponse};
pub use interpretation::{Interpretation, ReferenceRange};
pub use overview::{
    EmptyState, ErrorPanel, Overview, OverviewBody, OverviewKind, OverviewView, TableView,
};
pub use pagination::{paginate, Page};
pub use save::{EncounterVitalsSaver, SaveVitalsRequest, VitalsSaver, VitalsValues};
pub use session::{fetch_session, Session, SessionLocation, SessionUser};
pub use vitals::{
    ChartPoint, ChartSeries, ChartVital, VitalsChart, VitalsOverview, VitalsRecord,
    VitalsViewMode,
};
pub use workspace::WorkspaceLauncher;

// Re-export the text primitives so callers do not need a direct dependency.
pub use chart_types::{NonEmptyText, NumericText, TextError};

#[cfg(test)]
pub(crate) mod test_support;
