//! Generic overview panel: one read, three states, paginated table.
//!
//! An overview is parameterised by an [`OverviewKind`] that knows which request to issue,
//! how to decode the response and how to lay a record out as a table row. The overview
//! itself owns the fetch lifecycle and the page cursor, and produces an [`OverviewView`]
//! that a front-end renders verbatim.

use crate::constants::{ADD_LABEL, ERROR_GUIDANCE, PATIENT_CHART_WORKSPACE_SLOT};
use crate::fetch::FetchState;
use crate::fetcher::ChartFetcher;
use crate::pagination::{page_count, paginate};
use crate::workspace::WorkspaceLauncher;
use crate::ChartResult;
use serde_json::Value;
use std::num::NonZeroUsize;

// ============================================================================
// View model
// ============================================================================

/// Everything a front-end needs to draw an overview panel.
#[derive(Clone, Debug, PartialEq)]
pub struct OverviewView {
    pub heading: String,
    pub body: OverviewBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverviewBody {
    /// Progress indicator only.
    Loading,
    Error(ErrorPanel),
    Empty(EmptyState),
    Table(TableView),
}

/// Error banner, e.g. `Error 401: Unauthorized` above fixed guidance.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorPanel {
    pub headline: String,
    pub guidance: String,
}

/// Shown when the read succeeded with no records.
#[derive(Clone, Debug, PartialEq)]
pub struct EmptyState {
    pub message: String,
    /// Label of the link that opens the entry form.
    pub action_label: String,
}

/// One page of rows plus pagination controls.
#[derive(Clone, Debug, PartialEq)]
pub struct TableView {
    pub add_label: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Range indicator, e.g. `1–5 of 8 items`.
    pub summary: String,
    pub page_index: usize,
    pub page_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

// ============================================================================
// Overview kinds
// ============================================================================

/// What varies between overviews.
pub trait OverviewKind {
    type Record;

    /// Panel heading, e.g. `Conditions`.
    fn heading(&self) -> &'static str;

    /// Plural noun used in the empty state, e.g. `conditions`.
    fn display_text(&self) -> &'static str;

    /// Workspace opened by the Add button and the empty-state link.
    fn workspace_id(&self) -> &'static str;

    /// Server-relative path of the single read.
    fn request_path(&self) -> String;

    /// Decode the response into records, most recent first.
    fn decode(&self, body: Value) -> ChartResult<Vec<Self::Record>>;

    fn headers(&self) -> Vec<String>;

    fn row(&self, record: &Self::Record) -> Vec<String>;
}

// ============================================================================
// Overview
// ============================================================================

/// An overview panel for one patient.
pub struct Overview<K: OverviewKind> {
    kind: K,
    state: FetchState<Vec<K::Record>>,
    page_size: NonZeroUsize,
    page_index: usize,
}

impl<K: OverviewKind> Overview<K> {
    /// A new overview in the loading state. Nothing is requested until [`Overview::load`].
    pub fn new(kind: K, page_size: NonZeroUsize) -> Self {
        Self {
            kind,
            state: FetchState::Loading,
            page_size,
            page_index: 0,
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    pub fn state(&self) -> &FetchState<Vec<K::Record>> {
        &self.state
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Issue the overview's read and settle its state. Resets to the first page.
    ///
    /// Failures do not propagate: they become [`FetchState::Failed`].
    pub async fn load<F>(&mut self, fetcher: &F)
    where
        F: ChartFetcher + ?Sized,
    {
        let path = self.kind.request_path();
        tracing::debug!("{} overview: GET {path}", self.kind.heading());

        self.state = FetchState::Loading;
        let result = match fetcher.get(&path).await {
            Ok(body) => self.kind.decode(body),
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            tracing::warn!("{} overview failed to load: {err}", self.kind.heading());
        }

        self.state = FetchState::settle(result);
        self.page_index = 0;
    }

    fn page_count(&self) -> usize {
        let total = self.state.records().map_or(0, Vec::len);
        page_count(total, self.page_size)
    }

    /// Move to the next page. Returns `false` (and stays put) on the last page.
    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page_index + 1)
    }

    /// Move to the previous page. Returns `false` (and stays put) on the first page.
    pub fn previous_page(&mut self) -> bool {
        match self.page_index.checked_sub(1) {
            Some(index) => self.go_to_page(index),
            None => false,
        }
    }

    /// Jump to page `index` (zero-based). Out-of-range indexes are ignored.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if self.state.records().is_none() || index >= self.page_count() {
            return false;
        }
        self.page_index = index;
        true
    }

    /// Open the entry form. Backs both the Add button and the empty-state link.
    pub fn launch_form<L>(&self, launcher: &L)
    where
        L: WorkspaceLauncher + ?Sized,
    {
        launcher.attach(PATIENT_CHART_WORKSPACE_SLOT, self.kind.workspace_id());
    }

    /// Build the view for the current state and page.
    pub fn view(&self) -> OverviewView {
        let body = match &self.state {
            FetchState::Loading => OverviewBody::Loading,
            FetchState::Failed {
                status,
                status_text,
            } => OverviewBody::Error(ErrorPanel {
                headline: format!("Error {status}: {status_text}"),
                guidance: ERROR_GUIDANCE.to_string(),
            }),
            FetchState::Loaded { records } if records.is_empty() => {
                let text = self.kind.display_text();
                OverviewBody::Empty(EmptyState {
                    message: format!("There are no {text} to display for this patient"),
                    action_label: format!("Record {text}"),
                })
            }
            FetchState::Loaded { records } => {
                let page = paginate(records, self.page_size, self.page_index);
                OverviewBody::Table(TableView {
                    add_label: ADD_LABEL.to_string(),
                    headers: self.kind.headers(),
                    rows: page.items.iter().map(|r| self.kind.row(r)).collect(),
                    summary: page.summary(self.page_size),
                    page_index: page.page_index,
                    page_count: page.page_count,
                    has_previous: page.has_previous(),
                    has_next: page.has_next(),
                })
            }
        };

        OverviewView {
            heading: self.kind.heading().to_string(),
            body,
        }
    }
}
