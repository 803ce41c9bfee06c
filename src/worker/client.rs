//! Caller side of the worker channel
//!
//! [`SyntaxClient`] numbers jobs and talks to the worker thread. Responses
//! to superseded jobs are discarded by id; the worker still computes them.
//! [`HighlightSlot`] is the non-blocking per-view state: it remembers the
//! latest job id and keeps showing the previous tree (or the unhighlighted
//! fallback) until the matching response arrives.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use super::protocol::{
    HighlightPayload, JobId, Request, Response, SuccessPayload, TokenizePayload, TokensPayload,
    TreePayload,
};
use super::{spawn, Worker, WorkerChannel, WorkerError};
use crate::config::WorkerConfig;
use crate::diff::{DiffTokens, Hunk};
use crate::markers::{strip_markers, MarkerBounds};
use crate::syntax::{plain_text_tree, GrammarEngine, LanguageLoader, Theme, TreeSitterEngine};
use crate::tree::Node;

/// Options of a highlight request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightOptions {
    pub node_limit: Option<usize>,
    pub group_by_line: bool,
    /// Literals to post-mark after highlighting
    pub marked_texts: Vec<String>,
}

impl HighlightOptions {
    fn payload(&self, value: &str, language: &str) -> HighlightPayload {
        HighlightPayload {
            value: value.to_string(),
            language: language.to_string(),
            node_limit: self.node_limit,
            group_by_line: self.group_by_line,
            marked_texts: (!self.marked_texts.is_empty()).then(|| self.marked_texts.clone()),
        }
    }
}

/// What a view renders for one highlight request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightState {
    pub tree: Option<Vec<Node>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl HighlightState {
    fn from_response(response: Response) -> Self {
        match response {
            Response::Success {
                payload: SuccessPayload::Tree(TreePayload { tree }),
                ..
            } => Self {
                tree: Some(tree),
                is_loading: false,
                error: None,
            },
            Response::Success { id, .. } => Self {
                error: Some(format!("job {} answered with tokens, expected a tree", id)),
                ..Default::default()
            },
            Response::Failure { payload, .. } => Self {
                error: Some(payload.reason),
                ..Default::default()
            },
        }
    }
}

pub struct SyntaxClient {
    requests: Sender<Request>,
    responses: Receiver<Response>,
    thread: JoinHandle<()>,
    last_id: u64,
}

impl SyntaxClient {
    /// Start a tree-sitter worker set up from `config` and load its theme
    pub fn spawn(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let loader = LanguageLoader::new(config.language_tables());
        let tokenize_node_limit = config.tokenize_node_limit;
        let client = Self::with_worker(move || {
            Worker::new(TreeSitterEngine::new(), loader, tokenize_node_limit)
        })?;

        if !config.theme.is_empty() {
            client.load_theme(config.theme.clone())?;
        }
        Ok(client)
    }

    /// Start a worker built by `make` on the worker thread
    pub fn with_worker<E, F>(make: F) -> Result<Self, WorkerError>
    where
        E: GrammarEngine,
        F: FnOnce() -> Worker<E> + Send + 'static,
    {
        let WorkerChannel {
            requests,
            responses,
            thread,
        } = spawn(make)?;
        Ok(Self {
            requests,
            responses,
            thread,
            last_id: 0,
        })
    }

    /// Fire-and-forget theme message
    pub fn load_theme(&self, theme: Theme) -> Result<(), WorkerError> {
        self.send(Request::Theme { payload: theme })
    }

    pub fn submit_highlight(&mut self, payload: HighlightPayload) -> Result<JobId, WorkerError> {
        let id = self.next_job_id();
        self.send(Request::Highlight { id, payload })?;
        Ok(id)
    }

    pub fn submit_tokenize(&mut self, payload: TokenizePayload) -> Result<JobId, WorkerError> {
        let id = self.next_job_id();
        self.send(Request::Tokenize { id, payload })?;
        Ok(id)
    }

    /// Next response, if one is ready
    pub fn try_recv(&self) -> Result<Option<Response>, WorkerError> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }

    /// Block until the next response arrives
    pub fn recv(&self) -> Result<Response, WorkerError> {
        self.responses
            .recv()
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Block until job `id` is answered, dropping responses to other jobs
    pub fn wait_for(&self, id: JobId) -> Result<Response, WorkerError> {
        loop {
            let response = self.recv()?;
            if response.id() == id {
                return Ok(response);
            }
            tracing::debug!(
                "Discarding stale response {} while waiting for {}",
                response.id(),
                id
            );
        }
    }

    /// Highlight `value` and wait for the result
    pub fn highlight(
        &mut self,
        value: &str,
        language: &str,
        options: &HighlightOptions,
    ) -> HighlightState {
        let result = self
            .submit_highlight(options.payload(value, language))
            .and_then(|id| self.wait_for(id));
        match result {
            Ok(response) => HighlightState::from_response(response),
            Err(e) => HighlightState {
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }

    /// Tokenize both sides of `hunks` and wait for the result.
    ///
    /// The error is the failure reason reported by the worker.
    pub fn tokenize_hunks(
        &mut self,
        hunks: Vec<Hunk>,
        language: &str,
        whitespace: bool,
    ) -> Result<DiffTokens, String> {
        let payload = TokenizePayload {
            hunks,
            language: language.to_string(),
            whitespace,
        };
        let id = self.submit_tokenize(payload).map_err(|e| e.to_string())?;
        match self.wait_for(id).map_err(|e| e.to_string())? {
            Response::Success {
                payload: SuccessPayload::Tokens(TokensPayload { tokens, .. }),
                ..
            } => Ok(tokens),
            Response::Success { .. } => Err(format!("job {} answered with a tree", id)),
            Response::Failure { payload, .. } => Err(payload.reason),
        }
    }

    /// Close the channel and wait for the worker thread to finish
    pub fn shutdown(self) {
        let Self {
            requests, thread, ..
        } = self;
        drop(requests);
        if thread.join().is_err() {
            tracing::warn!("Worker thread panicked");
        }
    }

    fn next_job_id(&mut self) -> JobId {
        self.last_id += 1;
        JobId(self.last_id)
    }

    fn send(&self, request: Request) -> Result<(), WorkerError> {
        self.requests
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }
}

/// Highlight state of one view, updated without blocking
#[derive(Debug, Clone, Default)]
pub struct HighlightSlot {
    pending: Option<JobId>,
    state: HighlightState,
    fallback: Vec<Node>,
}

impl HighlightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request highlighting of `value`; supersedes any pending request
    pub fn request(
        &mut self,
        client: &mut SyntaxClient,
        value: &str,
        language: &str,
        options: &HighlightOptions,
    ) -> Result<JobId, WorkerError> {
        self.fallback = plain_text_tree(value);
        let id = client.submit_highlight(options.payload(value, language))?;
        self.begin(id);
        Ok(id)
    }

    /// Request highlighting of `raw`, which contains delimiter-bounded marks.
    ///
    /// The delimiters are stripped before the text reaches the grammar; the
    /// marks only show in the fallback rendering.
    pub fn request_marked(
        &mut self,
        client: &mut SyntaxClient,
        raw: &str,
        bounds: &MarkerBounds,
        language: &str,
        options: &HighlightOptions,
    ) -> Result<JobId, WorkerError> {
        let stripped = strip_markers(raw, bounds);
        self.fallback = stripped.fallback();
        let id = client.submit_highlight(options.payload(&stripped.text, language))?;
        self.begin(id);
        Ok(id)
    }

    /// Apply `response` if it answers the latest request.
    ///
    /// Returns false (and changes nothing) for stale or foreign responses.
    pub fn apply(&mut self, response: Response) -> bool {
        if self.pending != Some(response.id()) {
            tracing::debug!(
                "Ignoring response {} (pending {:?})",
                response.id(),
                self.pending
            );
            return false;
        }
        self.pending = None;
        self.state = HighlightState::from_response(response);
        true
    }

    pub fn pending(&self) -> Option<JobId> {
        self.pending
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    /// Unhighlighted rendering of the last requested text
    pub fn fallback(&self) -> &[Node] {
        &self.fallback
    }

    /// The highlighted tree when available, the fallback otherwise
    pub fn rendered(&self) -> &[Node] {
        self.state.tree.as_deref().unwrap_or(&self.fallback)
    }

    fn begin(&mut self, id: JobId) {
        self.pending = Some(id);
        self.state.is_loading = true;
        self.state.error = None;
    }
}
