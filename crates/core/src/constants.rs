//! Constants used throughout the chart core crate.
//!
//! Fixed UI strings live here alongside the default server paths and identifiers so the
//! overviews, the form and their tests agree on them.

/// Default base path of the FHIR R4 module.
pub const DEFAULT_FHIR_BASE_PATH: &str = "/ws/fhir2/R4";

/// Default base path of the OpenMRS REST module.
pub const DEFAULT_REST_BASE_PATH: &str = "/ws/rest/v1";

/// Default number of rows per overview page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Upper bound on observations requested by the vitals overview.
pub const VITALS_OBSERVATION_COUNT: usize = 100;

/// Workspace slot that data-entry forms are attached to.
pub const PATIENT_CHART_WORKSPACE_SLOT: &str = "patient-chart-workspace-slot";

/// Workspace id of the conditions entry form.
pub const CONDITIONS_FORM_WORKSPACE: &str = "conditions-form-workspace";

/// Workspace id of the vitals and biometrics entry form.
pub const VITALS_FORM_WORKSPACE: &str = "patient-vitals-biometrics-form-workspace";

/// Guidance shown under an overview's error headline.
pub const ERROR_GUIDANCE: &str = "Sorry, there was a problem displaying this information. You can try to reload this page, or contact the site administrator and quote the error code above.";

/// Label of the button that opens an overview's entry form.
pub const ADD_LABEL: &str = "Add";

/// Query used to fetch vital sign concept metadata.
pub const VITALS_CONCEPT_SET_QUERY: &str = "VITALS SIGNS";

/// Default encounter type for vitals (OpenMRS "Vitals").
pub const DEFAULT_VITALS_ENCOUNTER_TYPE_UUID: &str = "67a71486-1a54-468f-ac3e-7091a9a79584";

/// Default form recorded against vitals encounters.
pub const DEFAULT_VITALS_FORM_UUID: &str = "9f26aad4-244a-46ca-be49-1196df1a8c9a";

/// Default BMI display unit.
pub const DEFAULT_BMI_UNIT: &str = "kg / m²";

/// Toast title after a successful save.
pub const VITALS_SAVED_TITLE: &str = "Vitals and Biometrics saved";

/// Notification title after a failed save.
pub const VITALS_SAVE_FAILED_TITLE: &str = "Error saving vitals";

/// HTTP status the encounter endpoint answers a successful create with.
pub const HTTP_CREATED: u16 = 201;
