#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("Error {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid text: {0}")]
    Text(#[from] chart_types::TextError),
    #[error("failed to read configuration file: {0}")]
    ConfigRead(std::io::Error),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(serde_yaml::Error),
    #[error("no session location is available")]
    MissingSession,
    #[error("a save is already in progress")]
    SavePending,
    #[error("request was cancelled")]
    Cancelled,
}

pub type ChartResult<T> = std::result::Result<T, ChartError>;
