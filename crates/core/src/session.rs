//! The current server session.

use crate::config::ChartConfig;
use crate::fetcher::ChartFetcher;
use crate::ChartResult;
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
}

/// The facility location the logged-in user is working at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionLocation {
    pub uuid: String,
    #[serde(default)]
    pub display: Option<String>,
}

/// Session resource as returned by `GET {restBase}/session`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub session_location: Option<SessionLocation>,
}

impl Session {
    pub fn location_uuid(&self) -> Option<&str> {
        self.session_location.as_ref().map(|l| l.uuid.as_str())
    }
}

pub fn session_path(rest_base: &str) -> String {
    format!("{rest_base}/session")
}

/// Fetch the current session.
///
/// # Errors
///
/// Returns the fetcher's error, or [`crate::ChartError::Json`] if the body is not a session.
pub async fn fetch_session<F>(fetcher: &F, config: &ChartConfig) -> ChartResult<Session>
where
    F: ChartFetcher + ?Sized,
{
    let path = session_path(config.rest_base_path());
    tracing::debug!("fetching session: {path}");
    let body = fetcher.get(&path).await?;
    let session: Session = serde_json::from_value(body)?;
    if !session.authenticated {
        tracing::warn!("session is not authenticated");
    }
    Ok(session)
}
