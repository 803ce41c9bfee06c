//! Highlight worker
//!
//! One dedicated thread owns the grammar engine and processes requests one at
//! a time, so the registry of loaded grammars needs no locking. Every
//! highlight or tokenize request is answered exactly once, with either a
//! `Success` or a `Failure`; errors and panics inside a job never take the
//! thread down.
//!
//! Per-job flow:
//!
//! ```text
//! load grammar (+ deps) → highlight → [group by line] → [mark] → budget → Success | Failure
//! ```

mod client;
mod protocol;

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::diff::{tokenize_hunks, DiffTokens, TokenizeError, TokenizeOptions};
use crate::markers::mark_tree;
use crate::syntax::{GrammarEngine, GrammarError, LanguageLoader};
use crate::tree::{count_nodes, group_by_lines, FlattenError, Node};

pub use client::{HighlightOptions, HighlightSlot, HighlightState, SyntaxClient};
pub use protocol::{
    FailurePayload, HighlightPayload, JobId, Request, Response, SuccessPayload, TokenizePayload,
    TokensPayload, TreePayload,
};

/// Name of the worker thread
pub const WORKER_THREAD_NAME: &str = "syntax-worker";

/// Errors on the client side of the channel
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("worker thread is gone")]
    Disconnected,
}

/// Why a single job failed; the message becomes the failure reason
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Flatten(#[from] FlattenError),
    #[error("node limit of {limit} reached. Total nodes {count}.")]
    NodeLimitExceeded { limit: usize, count: usize },
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("{0}")]
    Panicked(String),
}

/// Request processor owning the engine and the loader
pub struct Worker<E: GrammarEngine> {
    engine: E,
    loader: LanguageLoader,
    tokenize_node_limit: usize,
}

impl<E: GrammarEngine> Worker<E> {
    pub fn new(engine: E, loader: LanguageLoader, tokenize_node_limit: usize) -> Self {
        Self {
            engine,
            loader,
            tokenize_node_limit,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Process one request. Theme messages produce no response.
    pub fn handle(&mut self, request: Request) -> Option<Response> {
        match request {
            Request::Theme { payload } => {
                tracing::debug!("Theme loaded ({} classes)", payload.len());
                self.engine.set_theme(payload);
                None
            }
            Request::Highlight { id, payload } => {
                tracing::debug!(
                    "Job {}: highlight {} ({} bytes)",
                    id,
                    payload.language,
                    payload.value.len()
                );
                let response = match self.guarded(|worker| worker.highlight(payload)) {
                    Ok(tree) => Response::tree(id, tree),
                    Err(e) => {
                        tracing::debug!("Job {} failed: {}", id, e);
                        Response::failure(id, e.to_string())
                    }
                };
                Some(response)
            }
            Request::Tokenize { id, payload } => {
                tracing::debug!(
                    "Job {}: tokenize {} hunks as {}",
                    id,
                    payload.hunks.len(),
                    payload.language
                );
                let response = match self.guarded(|worker| worker.tokenize(payload)) {
                    Ok(tokens) => Response::tokens(id, tokens),
                    Err(e) => {
                        tracing::debug!("Job {} failed: {}", id, e);
                        Response::tokenize_failure(id, e.to_string())
                    }
                };
                Some(response)
            }
        }
    }

    fn highlight(&mut self, payload: HighlightPayload) -> Result<Vec<Node>, JobError> {
        // A limit of zero means no budget
        let node_limit = payload.node_limit.filter(|limit| *limit > 0);
        let mut tree = self
            .loader
            .load_then(&mut self.engine, &payload.language, |engine, report| {
                engine.highlight(&payload.value, &report.language)
            })?;

        if payload.group_by_line {
            tree = group_by_lines(&tree, node_limit)?;
        }
        if let Some(marked) = payload.marked_texts.as_deref().filter(|m| !m.is_empty()) {
            tree = mark_tree(tree, marked);
        }

        if let Some(limit) = node_limit {
            let count = count_nodes(&tree);
            if count > limit {
                return Err(JobError::NodeLimitExceeded { limit, count });
            }
        }
        Ok(tree)
    }

    fn tokenize(&mut self, payload: TokenizePayload) -> Result<DiffTokens, JobError> {
        let options = TokenizeOptions {
            whitespace: payload.whitespace,
            node_limit: self.tokenize_node_limit,
        };
        let tokens = self
            .loader
            .load_then(&mut self.engine, &payload.language, |engine, report| {
                tokenize_hunks(engine, &payload.hunks, &report.language, options)
            })?;
        Ok(tokens)
    }

    /// Run `job`, turning a panic into [`JobError::Panicked`]
    fn guarded<T>(
        &mut self,
        job: impl FnOnce(&mut Self) -> Result<T, JobError>,
    ) -> Result<T, JobError> {
        match panic::catch_unwind(AssertUnwindSafe(|| job(self))) {
            Ok(result) => result,
            Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker job panicked".to_string()
    }
}

/// Channel ends and thread handle of a running worker
pub struct WorkerChannel {
    pub requests: Sender<Request>,
    pub responses: Receiver<Response>,
    pub thread: JoinHandle<()>,
}

/// Start a worker thread.
///
/// `make` runs on the new thread, so the engine never crosses threads. The
/// loop ends once every request sender is dropped or the response receiver
/// is gone.
pub fn spawn<E, F>(make: F) -> Result<WorkerChannel, WorkerError>
where
    E: GrammarEngine,
    F: FnOnce() -> Worker<E> + Send + 'static,
{
    let (request_tx, request_rx) = mpsc::channel::<Request>();
    let (response_tx, response_rx) = mpsc::channel::<Response>();

    let thread = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let mut worker = make();
            tracing::debug!("Worker started");
            for request in request_rx {
                let Some(response) = worker.handle(request) else {
                    continue;
                };
                if response_tx.send(response).is_err() {
                    tracing::debug!("Response receiver dropped");
                    break;
                }
            }
            tracing::debug!("Worker stopped");
        })?;

    Ok(WorkerChannel {
        requests: request_tx,
        responses: response_rx,
        thread,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{LanguageTables, Theme, TreeSitterEngine};
    use crate::tree::{text_of, Element, DATA_MARKED};

    fn worker() -> Worker<TreeSitterEngine> {
        Worker::new(
            TreeSitterEngine::new(),
            LanguageLoader::new(LanguageTables::default()),
            600,
        )
    }

    fn highlight(value: &str, language: &str) -> HighlightPayload {
        HighlightPayload {
            value: value.to_string(),
            language: language.to_string(),
            node_limit: None,
            group_by_line: false,
            marked_texts: None,
        }
    }

    fn tree_of(response: Response) -> Vec<Node> {
        match response {
            Response::Success {
                payload: SuccessPayload::Tree(TreePayload { tree }),
                ..
            } => tree,
            other => panic!("expected tree, got {:?}", other),
        }
    }

    #[test]
    fn test_theme_is_not_answered() {
        let mut worker = worker();
        let request = Request::Theme {
            payload: Theme::default(),
        };
        assert!(worker.handle(request).is_none());
    }

    #[test]
    fn test_plain_text_grouped_by_line() {
        let mut worker = worker();
        let payload = HighlightPayload {
            group_by_line: true,
            node_limit: Some(100),
            ..highlight("a\nb", "text")
        };
        let response = worker.handle(Request::Highlight { id: JobId(1), payload });
        let response = response.unwrap();
        assert_eq!(response.id(), JobId(1));

        let tree = tree_of(response);
        assert_eq!(tree.len(), 2);
        let first = tree[0].as_element().unwrap();
        assert_eq!(first.line_number(), Some(1));
        assert_eq!(text_of(&tree), "a\nb");
    }

    #[test]
    fn test_marked_text_wrapped() {
        let mut worker = worker();
        let payload = HighlightPayload {
            marked_texts: Some(vec!["x".to_string()]),
            ..highlight("const x = 1", "text")
        };
        let tree = tree_of(worker.handle(Request::Highlight { id: JobId(2), payload }).unwrap());

        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0], Node::text("const "));
        let Node::Element(Element { properties, .. }) = &tree[1] else {
            panic!("expected mark element");
        };
        assert!(properties.data.contains_key(DATA_MARKED));
        assert_eq!(tree[2], Node::text(" = 1"));
    }

    #[test]
    fn test_budget_overrun_is_a_failure() {
        let mut worker = worker();
        let payload = HighlightPayload {
            node_limit: Some(1),
            marked_texts: Some(vec!["b".to_string()]),
            ..highlight("abc", "text")
        };
        let response = worker
            .handle(Request::Highlight { id: JobId(3), payload })
            .unwrap();
        assert_eq!(
            response.reason(),
            Some("node limit of 1 reached. Total nodes 4.")
        );
    }

    #[test]
    fn test_zero_node_limit_is_unbounded() {
        let mut worker = worker();
        let payload = HighlightPayload {
            node_limit: Some(0),
            group_by_line: true,
            marked_texts: Some(vec!["b".to_string()]),
            ..highlight("abc\nd", "text")
        };
        let response = worker
            .handle(Request::Highlight { id: JobId(5), payload })
            .unwrap();
        assert!(response.is_success(), "{:?}", response.reason());
        assert_eq!(text_of(&tree_of(response)), "abc\nd");
    }

    #[test]
    fn test_unknown_language_is_a_failure() {
        let mut worker = worker();
        let response = worker
            .handle(Request::Highlight {
                id: JobId(4),
                payload: highlight("x", "cobol"),
            })
            .unwrap();
        assert!(!response.is_success());
        assert!(response.reason().unwrap().contains("cobol"));
    }

    #[test]
    fn test_panic_message_extracted() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }

    #[test]
    fn test_spawned_worker_answers_and_stops() {
        let channel = spawn(worker).unwrap();
        channel
            .requests
            .send(Request::Highlight {
                id: JobId(9),
                payload: highlight("hi", "text"),
            })
            .unwrap();
        let response = channel.responses.recv().unwrap();
        assert_eq!(response.id(), JobId(9));

        drop(channel.requests);
        channel.thread.join().unwrap();
    }
}
