//! Vitals overview.
//!
//! The server stores one observation per measurement. Observations sharing an effective
//! time were taken together and are shown as one row (a reading).
//!
//! The panel has two presentations over the same readings: the paginated table, and a
//! chart of one selected vital over time.

use crate::concepts::{BiometricsField, ConceptMap, ConceptMetadataIndex};
use crate::config::ChartConfig;
use crate::constants::{VITALS_FORM_WORKSPACE, VITALS_OBSERVATION_COUNT};
use crate::overview::{Overview, OverviewKind};
use crate::ChartResult;
use chrono::{DateTime, Utc};
use fhir::{Observation, ObservationData};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The vitals panel for one patient.
pub type VitalsOverview = Overview<VitalsKind>;

/// One reading: every measurement taken at the same instant.
#[derive(Clone, Debug, PartialEq)]
pub struct VitalsRecord {
    pub date: DateTime<Utc>,
    pub measurements: BTreeMap<BiometricsField, f64>,
}

impl VitalsRecord {
    pub fn get(&self, field: BiometricsField) -> Option<f64> {
        self.measurements.get(&field).copied()
    }
}

/// Observation search for a patient's vitals and biometrics concepts.
#[derive(Clone, Debug, PartialEq)]
pub struct VitalsKind {
    fhir_base: String,
    patient_uuid: Uuid,
    concepts: ConceptMap,
    metadata: Option<ConceptMetadataIndex>,
    mode: VitalsViewMode,
    chart_vital: ChartVital,
}

impl VitalsKind {
    pub fn new(fhir_base: impl Into<String>, patient_uuid: Uuid, concepts: ConceptMap) -> Self {
        Self {
            fhir_base: fhir_base.into(),
            patient_uuid,
            concepts,
            metadata: None,
            mode: VitalsViewMode::default(),
            chart_vital: ChartVital::default(),
        }
    }

    /// Attach concept metadata so column headers show units.
    pub fn with_metadata(mut self, metadata: ConceptMetadataIndex) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn header(&self, title: &str, field: BiometricsField) -> String {
        match self.metadata.as_ref().and_then(|m| m.units(field)) {
            Some(units) => format!("{title} ({units})"),
            None => title.to_string(),
        }
    }
}

impl VitalsOverview {
    /// Vitals overview for the patient with FHIR id `patient_uuid`.
    pub fn for_patient(
        config: &ChartConfig,
        patient_uuid: Uuid,
        metadata: Option<ConceptMetadataIndex>,
    ) -> Self {
        let mut kind = VitalsKind::new(
            config.fhir_base_path(),
            patient_uuid,
            config.concepts().clone(),
        );
        if let Some(metadata) = metadata {
            kind = kind.with_metadata(metadata);
        }
        Overview::new(kind, config.page_size())
    }

    pub fn view_mode(&self) -> VitalsViewMode {
        self.kind().mode
    }

    /// Switch between the table and the chart. Keeps the page cursor.
    pub fn set_view_mode(&mut self, mode: VitalsViewMode) {
        self.kind_mut().mode = mode;
    }

    pub fn chart_vital(&self) -> ChartVital {
        self.kind().chart_vital
    }

    pub fn select_chart_vital(&mut self, vital: ChartVital) {
        self.kind_mut().chart_vital = vital;
    }

    /// Chart of the selected vital over every loaded reading.
    ///
    /// `None` until readings have loaded, and when there are none.
    pub fn chart(&self) -> Option<VitalsChart> {
        let readings = self.state().records().filter(|r| !r.is_empty())?;
        let kind = self.kind();
        let vital = kind.chart_vital;
        Some(VitalsChart {
            vital,
            title: kind.header(vital.title(), vital.fields()[0]),
            series: chart_series(readings, vital),
        })
    }
}

// ============================================================================
// Chart view
// ============================================================================

/// How the vitals panel presents its readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VitalsViewMode {
    #[default]
    Table,
    Chart,
}

impl VitalsViewMode {
    pub const ALL: [VitalsViewMode; 2] = [VitalsViewMode::Table, VitalsViewMode::Chart];

    /// Label of the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            VitalsViewMode::Table => "Table view",
            VitalsViewMode::Chart => "Chart view",
        }
    }
}

/// A vital that can be charted. Blood pressure plots systolic and diastolic together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartVital {
    #[default]
    BloodPressure,
    OxygenSaturation,
    Temperature,
    RespiratoryRate,
    Pulse,
}

impl ChartVital {
    pub const ALL: [ChartVital; 5] = [
        ChartVital::BloodPressure,
        ChartVital::OxygenSaturation,
        ChartVital::Temperature,
        ChartVital::RespiratoryRate,
        ChartVital::Pulse,
    ];

    /// Same short titles as the table columns.
    pub fn title(self) -> &'static str {
        match self {
            ChartVital::BloodPressure => "BP",
            ChartVital::OxygenSaturation => "SpO2",
            ChartVital::Temperature => "Temp",
            ChartVital::RespiratoryRate => "R. Rate",
            ChartVital::Pulse => "Pulse",
        }
    }

    /// Fields plotted for this vital, one series each. Never empty.
    pub fn fields(self) -> &'static [BiometricsField] {
        match self {
            ChartVital::BloodPressure => &[
                BiometricsField::SystolicBloodPressure,
                BiometricsField::DiastolicBloodPressure,
            ],
            ChartVital::OxygenSaturation => &[BiometricsField::OxygenSaturation],
            ChartVital::Temperature => &[BiometricsField::Temperature],
            ChartVital::RespiratoryRate => &[BiometricsField::RespiratoryRate],
            ChartVital::Pulse => &[BiometricsField::Pulse],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// One line on the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub field: BiometricsField,
    /// Oldest first.
    pub points: Vec<ChartPoint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VitalsChart {
    pub vital: ChartVital,
    /// Axis title with units when known, e.g. `BP (mmHg)`.
    pub title: String,
    pub series: Vec<ChartSeries>,
}

/// Date-ascending series for `vital`. Readings without the measurement are skipped.
pub fn chart_series(readings: &[VitalsRecord], vital: ChartVital) -> Vec<ChartSeries> {
    vital
        .fields()
        .iter()
        .map(|&field| {
            let mut points: Vec<ChartPoint> = readings
                .iter()
                .filter_map(|r| {
                    r.get(field).map(|value| ChartPoint {
                        date: r.date,
                        value,
                    })
                })
                .collect();
            points.sort_by_key(|p| p.date);
            ChartSeries { field, points }
        })
        .collect()
}

/// Path of the observation search for every numeric vitals concept.
pub fn vitals_path(fhir_base: &str, patient_uuid: Uuid, concepts: &ConceptMap) -> String {
    let codes = concepts.numeric_uuids().join(",");
    format!(
        "{fhir_base}/Observation?subject:Patient={patient_uuid}&code={codes}&_summary=data&_sort=-date&_count={VITALS_OBSERVATION_COUNT}"
    )
}

/// Group observations into readings, most recent first.
///
/// Observations without a timestamp, without a numeric value, or whose codes match no
/// configured concept are skipped.
pub fn group_readings(
    concepts: &ConceptMap,
    observations: impl IntoIterator<Item = ObservationData>,
) -> Vec<VitalsRecord> {
    let mut readings: BTreeMap<DateTime<Utc>, BTreeMap<BiometricsField, f64>> = BTreeMap::new();

    for observation in observations {
        let Some(date) = observation.effective else {
            tracing::warn!("skipping observation {} without a date", observation.id);
            continue;
        };
        let Some(field) = observation
            .codes
            .iter()
            .find_map(|code| concepts.field_for(code))
        else {
            tracing::debug!("skipping observation {} with unmapped codes", observation.id);
            continue;
        };
        let Some(value) = observation.value.as_ref().and_then(|v| v.as_number()) else {
            tracing::debug!("skipping non-numeric observation {}", observation.id);
            continue;
        };

        // The search is sorted newest first, so the first value seen for a field wins.
        readings
            .entry(date)
            .or_default()
            .entry(field)
            .or_insert(value);
    }

    readings
        .into_iter()
        .rev()
        .map(|(date, measurements)| VitalsRecord { date, measurements })
        .collect()
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl OverviewKind for VitalsKind {
    type Record = VitalsRecord;

    fn heading(&self) -> &'static str {
        "Vitals"
    }

    fn display_text(&self) -> &'static str {
        "vital signs"
    }

    fn workspace_id(&self) -> &'static str {
        VITALS_FORM_WORKSPACE
    }

    fn request_path(&self) -> String {
        vitals_path(&self.fhir_base, self.patient_uuid, &self.concepts)
    }

    fn decode(&self, body: Value) -> ChartResult<Vec<VitalsRecord>> {
        let observations = Observation::from_search_bundle(body)?;
        Ok(group_readings(&self.concepts, observations))
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Date".to_string(),
            self.header("BP", BiometricsField::SystolicBloodPressure),
            self.header("R. Rate", BiometricsField::RespiratoryRate),
            self.header("Pulse", BiometricsField::Pulse),
            self.header("SpO2", BiometricsField::OxygenSaturation),
            self.header("Temp", BiometricsField::Temperature),
        ]
    }

    fn row(&self, record: &VitalsRecord) -> Vec<String> {
        let blood_pressure = match (
            record.get(BiometricsField::SystolicBloodPressure),
            record.get(BiometricsField::DiastolicBloodPressure),
        ) {
            (None, None) => String::new(),
            (systolic, diastolic) => format!("{} / {}", cell(systolic), cell(diastolic)),
        };

        vec![
            record.date.format("%d - %b - %Y").to_string(),
            blood_pressure,
            cell(record.get(BiometricsField::RespiratoryRate)),
            cell(record.get(BiometricsField::Pulse)),
            cell(record.get(BiometricsField::OxygenSaturation)),
            cell(record.get(BiometricsField::Temperature)),
        ]
    }
}
