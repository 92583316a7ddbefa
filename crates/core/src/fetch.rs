//! The three-state lifecycle of a single outbound read.

use crate::error::ChartError;
use crate::ChartResult;

/// Where a read stands. Every overview is always in exactly one of these states.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchState<T> {
    /// The read has not settled yet.
    Loading,
    /// The read was rejected. `status` is 0 when no HTTP response was received.
    Failed { status: u16, status_text: String },
    /// The read succeeded. An empty collection is still a success.
    Loaded { records: T },
}

impl<T> FetchState<T> {
    /// Convert a settled read into a state.
    pub fn settle(result: ChartResult<T>) -> Self {
        match result {
            Ok(records) => FetchState::Loaded { records },
            Err(err) => Self::failed(&err),
        }
    }

    /// The failed state for `err`.
    ///
    /// HTTP rejections keep their status line; anything else has no status and carries the
    /// error message instead.
    pub fn failed(err: &ChartError) -> Self {
        match err {
            ChartError::Http {
                status,
                status_text,
            } => FetchState::Failed {
                status: *status,
                status_text: status_text.clone(),
            },
            other => FetchState::Failed {
                status: 0,
                status_text: other.to_string(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn records(&self) -> Option<&T> {
        match self {
            FetchState::Loaded { records } => Some(records),
            _ => None,
        }
    }
}
