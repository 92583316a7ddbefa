//! Conditions overview.

use crate::config::ChartConfig;
use crate::constants::CONDITIONS_FORM_WORKSPACE;
use crate::overview::{Overview, OverviewKind};
use crate::{ChartError, ChartResult};
use fhir::{Condition, ConditionData, PatientData};
use serde_json::Value;

/// The conditions panel for one patient.
pub type ConditionsOverview = Overview<ConditionsKind>;

/// Condition search for a patient identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionsKind {
    fhir_base: String,
    patient_identifier: String,
}

impl ConditionsKind {
    pub fn new(fhir_base: impl Into<String>, patient_identifier: impl Into<String>) -> Self {
        Self {
            fhir_base: fhir_base.into(),
            patient_identifier: patient_identifier.into(),
        }
    }

    pub fn patient_identifier(&self) -> &str {
        &self.patient_identifier
    }
}

impl ConditionsOverview {
    /// Conditions overview keyed by the patient's first identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidInput`] if the patient has no usable identifier.
    pub fn for_patient(config: &ChartConfig, patient: &PatientData) -> ChartResult<Self> {
        let identifier = patient.primary_identifier().ok_or_else(|| {
            ChartError::InvalidInput(format!("patient {} has no identifier", patient.id))
        })?;
        Ok(Self::for_identifier(config, identifier))
    }

    /// Conditions overview for a raw patient identifier.
    pub fn for_identifier(config: &ChartConfig, identifier: &str) -> Self {
        Overview::new(
            ConditionsKind::new(config.fhir_base_path(), identifier),
            config.page_size(),
        )
    }
}

/// Path of the condition search. The identifier is interpolated as given.
pub fn conditions_path(fhir_base: &str, identifier: &str) -> String {
    format!("{fhir_base}/Condition?patient.identifier={identifier}")
}

/// Most recent onset first; conditions without an onset go last, keeping server order.
fn sort_by_onset(conditions: &mut [ConditionData]) {
    conditions.sort_by(|a, b| match (a.onset, b.onset) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

impl OverviewKind for ConditionsKind {
    type Record = ConditionData;

    fn heading(&self) -> &'static str {
        "Conditions"
    }

    fn display_text(&self) -> &'static str {
        "conditions"
    }

    fn workspace_id(&self) -> &'static str {
        CONDITIONS_FORM_WORKSPACE
    }

    fn request_path(&self) -> String {
        conditions_path(&self.fhir_base, &self.patient_identifier)
    }

    fn decode(&self, body: Value) -> ChartResult<Vec<ConditionData>> {
        let mut conditions = Condition::from_search_bundle(body)?;
        sort_by_onset(&mut conditions);
        Ok(conditions)
    }

    fn headers(&self) -> Vec<String> {
        vec!["Active Conditions".into(), "Since".into()]
    }

    fn row(&self, record: &ConditionData) -> Vec<String> {
        let since = record
            .onset
            .map(|onset| onset.format("%b-%Y").to_string())
            .unwrap_or_default();
        vec![record.display.clone(), since]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ERROR_GUIDANCE, PATIENT_CHART_WORKSPACE_SLOT};
    use crate::overview::OverviewBody;
    use crate::test_support::{RecordingFetcher, RecordingLauncher};
    use crate::FetchState;
    use serde_json::json;

    fn condition(id: &str, text: &str, onset: Option<&str>) -> Value {
        let mut resource = json!({
            "resourceType": "Condition",
            "id": id,
            "code": {"text": text},
            "clinicalStatus": {"coding": [{"code": "active"}]}
        });
        if let Some(onset) = onset {
            resource["onsetDateTime"] = json!(onset);
        }
        json!({"resource": resource})
    }

    fn bundle(entries: Vec<Value>) -> Value {
        json!({"resourceType": "Bundle", "type": "searchset", "entry": entries})
    }

    fn patient() -> PatientData {
        fhir::Patient::parse(
            r#"{"resourceType":"Patient","id":"8673ee4f-e2ab-4077-ba55-4980f408773e",
                "identifier":[{"value":"100GEJ"},{"value":"other"}]}"#,
        )
        .expect("patient should parse")
    }

    #[tokio::test]
    async fn requests_conditions_for_first_identifier() {
        let fetcher = RecordingFetcher::with_response(bundle(vec![]));
        let mut overview =
            ConditionsOverview::for_patient(&ChartConfig::default(), &patient()).expect("overview");
        overview.load(&fetcher).await;

        assert_eq!(
            fetcher.calls(),
            vec!["/ws/fhir2/R4/Condition?patient.identifier=100GEJ".to_string()]
        );
    }

    #[tokio::test]
    async fn identifier_is_interpolated_verbatim() {
        for identifier in ["100GEJ", "MRN 42/7", "a&b=c"] {
            let fetcher = RecordingFetcher::with_response(bundle(vec![]));
            let mut overview =
                ConditionsOverview::for_identifier(&ChartConfig::default(), identifier);
            overview.load(&fetcher).await;
            assert_eq!(
                fetcher.calls(),
                vec![format!("/ws/fhir2/R4/Condition?patient.identifier={identifier}")]
            );
        }
    }

    #[test]
    fn patient_without_identifier_is_rejected() {
        let patient = fhir::Patient::parse(r#"{"resourceType":"Patient","id":"p1"}"#)
            .expect("patient should parse");
        let Err(err) = ConditionsOverview::for_patient(&ChartConfig::default(), &patient) else {
            panic!("should require an identifier");
        };
        assert!(matches!(err, ChartError::InvalidInput(msg) if msg.contains("p1")));
    }

    #[tokio::test]
    async fn unauthorized_shows_error_panel() {
        let fetcher = RecordingFetcher::default();
        fetcher.push_response(Err(ChartError::Http {
            status: 401,
            status_text: "Unauthorized".into(),
        }));
        let mut overview = ConditionsOverview::for_identifier(&ChartConfig::default(), "100GEJ");
        overview.load(&fetcher).await;

        let view = overview.view();
        assert_eq!(view.heading, "Conditions");
        let OverviewBody::Error(panel) = view.body else {
            panic!("expected error panel");
        };
        assert_eq!(panel.headline, "Error 401: Unauthorized");
        assert_eq!(panel.guidance, ERROR_GUIDANCE);
    }

    #[tokio::test]
    async fn empty_result_offers_to_record_conditions() {
        let fetcher = RecordingFetcher::with_response(bundle(vec![]));
        let launcher = RecordingLauncher::default();
        let mut overview = ConditionsOverview::for_identifier(&ChartConfig::default(), "100GEJ");
        overview.load(&fetcher).await;

        let OverviewBody::Empty(empty) = overview.view().body else {
            panic!("expected empty state");
        };
        assert_eq!(
            empty.message,
            "There are no conditions to display for this patient"
        );
        assert_eq!(empty.action_label, "Record conditions");

        overview.launch_form(&launcher);
        assert_eq!(
            launcher.attached(),
            vec![(
                PATIENT_CHART_WORKSPACE_SLOT.to_string(),
                CONDITIONS_FORM_WORKSPACE.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn eight_conditions_paginate_five_then_three() {
        let entries = (1..=8)
            .map(|month| {
                condition(
                    &format!("c{month}"),
                    &format!("Condition {month}"),
                    Some(&format!("2020-{month:02}-01")),
                )
            })
            .collect();
        let fetcher = RecordingFetcher::with_response(bundle(entries));
        let mut overview = ConditionsOverview::for_identifier(&ChartConfig::default(), "100GEJ");
        overview.load(&fetcher).await;

        let OverviewBody::Table(first) = overview.view().body else {
            panic!("expected table");
        };
        assert_eq!(first.add_label, "Add");
        assert_eq!(first.headers, vec!["Active Conditions", "Since"]);
        assert_eq!(first.rows.len(), 5);
        assert_eq!(first.rows[0], vec!["Condition 8", "Aug-2020"]);
        assert_eq!(first.summary, "1–5 of 8 items");

        assert!(overview.next_page());
        let OverviewBody::Table(second) = overview.view().body else {
            panic!("expected table");
        };
        assert_eq!(second.rows.len(), 3);
        assert_eq!(second.summary, "6–8 of 8 items");
        assert_eq!(second.rows[2], vec!["Condition 1", "Jan-2020"]);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn conditions_without_onset_sort_last() {
        let fetcher = RecordingFetcher::with_response(bundle(vec![
            condition("a", "Undated", None),
            condition("b", "Older", Some("2019-03-04")),
            condition("c", "Newer", Some("2021-06-15T10:00:00+00:00")),
        ]));
        let mut overview = ConditionsOverview::for_identifier(&ChartConfig::default(), "100GEJ");
        overview.load(&fetcher).await;

        let names: Vec<_> = overview
            .state()
            .records()
            .expect("loaded")
            .iter()
            .map(|c| c.display.as_str())
            .collect();
        assert_eq!(names, vec!["Newer", "Older", "Undated"]);

        let OverviewBody::Table(table) = overview.view().body else {
            panic!("expected table");
        };
        assert_eq!(table.rows[2], vec!["Undated", ""]);
    }

    #[tokio::test]
    async fn malformed_bundle_is_a_failed_load() {
        let fetcher = RecordingFetcher::with_response(json!({"resourceType": "Patient"}));
        let mut overview = ConditionsOverview::for_identifier(&ChartConfig::default(), "100GEJ");
        overview.load(&fetcher).await;
        assert!(matches!(
            overview.state(),
            FetchState::Failed { status: 0, .. }
        ));
    }
}
