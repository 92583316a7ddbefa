//! Fakes for the fetcher, launcher and saver seams.

use crate::abort::AbortHandle;
use crate::fetcher::{ChartFetcher, SaveResponse};
use crate::save::{SaveVitalsRequest, VitalsSaver};
use crate::workspace::WorkspaceLauncher;
use crate::ChartResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FetcherState {
    calls: Vec<String>,
    responses: VecDeque<ChartResult<Value>>,
    posts: Vec<(String, Value)>,
    post_responses: VecDeque<ChartResult<SaveResponse>>,
}

/// Records every request and answers from queued responses.
///
/// An empty GET queue answers `null`; an empty POST queue answers `201`.
#[derive(Clone, Default)]
pub(crate) struct RecordingFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl RecordingFetcher {
    pub(crate) fn with_response(body: Value) -> Self {
        let fetcher = Self::default();
        fetcher.push_response(Ok(body));
        fetcher
    }

    pub(crate) fn push_response(&self, response: ChartResult<Value>) {
        self.state
            .lock()
            .expect("fetcher state")
            .responses
            .push_back(response);
    }

    pub(crate) fn push_post_response(&self, response: ChartResult<SaveResponse>) {
        self.state
            .lock()
            .expect("fetcher state")
            .post_responses
            .push_back(response);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().expect("fetcher state").calls.clone()
    }

    pub(crate) fn posts(&self) -> Vec<(String, Value)> {
        self.state.lock().expect("fetcher state").posts.clone()
    }
}

#[async_trait]
impl ChartFetcher for RecordingFetcher {
    async fn get(&self, path: &str) -> ChartResult<Value> {
        let mut state = self.state.lock().expect("fetcher state");
        state.calls.push(path.to_string());
        state.responses.pop_front().unwrap_or(Ok(Value::Null))
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        _abort: &AbortHandle,
    ) -> ChartResult<SaveResponse> {
        let mut state = self.state.lock().expect("fetcher state");
        state.posts.push((path.to_string(), body.clone()));
        state.post_responses.pop_front().unwrap_or(Ok(SaveResponse {
            status: 201,
            body: Value::Null,
        }))
    }
}

/// Records attach and close calls.
#[derive(Default)]
pub(crate) struct RecordingLauncher {
    attached: Mutex<Vec<(String, String)>>,
    closed: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub(crate) fn attached(&self) -> Vec<(String, String)> {
        self.attached.lock().expect("launcher state").clone()
    }

    pub(crate) fn closed(&self) -> Vec<String> {
        self.closed.lock().expect("launcher state").clone()
    }
}

impl WorkspaceLauncher for RecordingLauncher {
    fn attach(&self, slot: &str, workspace_id: &str) {
        self.attached
            .lock()
            .expect("launcher state")
            .push((slot.to_string(), workspace_id.to_string()));
    }

    fn close(&self, workspace_id: &str) {
        self.closed
            .lock()
            .expect("launcher state")
            .push(workspace_id.to_string());
    }
}

/// Records save calls and answers from queued results, `201` once the queue is empty.
#[derive(Default)]
pub(crate) struct FakeSaver {
    calls: Mutex<Vec<(SaveVitalsRequest, AbortHandle)>>,
    results: Mutex<VecDeque<ChartResult<SaveResponse>>>,
}

impl FakeSaver {
    pub(crate) fn answering(result: ChartResult<SaveResponse>) -> Self {
        let saver = Self::default();
        saver.push(result);
        saver
    }

    pub(crate) fn push(&self, result: ChartResult<SaveResponse>) {
        self.results.lock().expect("saver state").push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<(SaveVitalsRequest, AbortHandle)> {
        self.calls.lock().expect("saver state").clone()
    }
}

#[async_trait]
impl VitalsSaver for FakeSaver {
    async fn save_patient_vitals(
        &self,
        request: &SaveVitalsRequest,
        abort: AbortHandle,
    ) -> ChartResult<SaveResponse> {
        self.calls
            .lock()
            .expect("saver state")
            .push((request.clone(), abort));
        self.results
            .lock()
            .expect("saver state")
            .pop_front()
            .unwrap_or(Ok(SaveResponse {
                status: 201,
                body: Value::Null,
            }))
    }
}
