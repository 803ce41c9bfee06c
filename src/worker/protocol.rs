//! Worker wire protocol
//!
//! Requests and responses are plain data (serde) so they can cross a thread
//! or process boundary unchanged:
//!
//! ```text
//! → {"type":"theme","payload":{...}}                      (once, no answer)
//! → {"type":"highlight","id":7,"payload":{value,language,nodeLimit,groupByLine,markedTexts}}
//! → {"type":"tokenize","id":8,"payload":{hunks,language,whitespace}}
//! ← {"type":"success","id":7,"payload":{"tree":[...]}}
//! ← {"type":"success","id":8,"payload":{"success":true,"tokens":{old,new}}}
//! ← {"type":"failure","id":8,"payload":{"reason":"...","success":false}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffTokens, Hunk};
use crate::syntax::Theme;
use crate::tree::Node;

/// Correlation token pairing a response with its request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPayload {
    pub value: String,
    pub language: String,
    /// `None` disables the node budget
    #[serde(default)]
    pub node_limit: Option<usize>,
    #[serde(default)]
    pub group_by_line: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_texts: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizePayload {
    pub hunks: Vec<Hunk>,
    pub language: String,
    #[serde(default)]
    pub whitespace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Class remap table; sent once at startup, never answered
    Theme { payload: Theme },
    Highlight { id: JobId, payload: HighlightPayload },
    Tokenize { id: JobId, payload: TokenizePayload },
}

impl Request {
    pub fn id(&self) -> Option<JobId> {
        match self {
            Request::Theme { .. } => None,
            Request::Highlight { id, .. } | Request::Tokenize { id, .. } => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Success { id: JobId, payload: SuccessPayload },
    Failure { id: JobId, payload: FailurePayload },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuccessPayload {
    Tokens(TokensPayload),
    Tree(TreePayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePayload {
    pub tree: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokensPayload {
    pub success: bool,
    pub tokens: DiffTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePayload {
    pub reason: String,
    /// Set (to `false`) on tokenize failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl Response {
    pub fn tree(id: JobId, tree: Vec<Node>) -> Self {
        Response::Success {
            id,
            payload: SuccessPayload::Tree(TreePayload { tree }),
        }
    }

    pub fn tokens(id: JobId, tokens: DiffTokens) -> Self {
        Response::Success {
            id,
            payload: SuccessPayload::Tokens(TokensPayload {
                success: true,
                tokens,
            }),
        }
    }

    pub fn failure(id: JobId, reason: impl Into<String>) -> Self {
        Response::Failure {
            id,
            payload: FailurePayload {
                reason: reason.into(),
                success: None,
            },
        }
    }

    pub fn tokenize_failure(id: JobId, reason: impl Into<String>) -> Self {
        Response::Failure {
            id,
            payload: FailurePayload {
                reason: reason.into(),
                success: Some(false),
            },
        }
    }

    pub fn id(&self) -> JobId {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => *id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// Failure reason, if this is a failure
    pub fn reason(&self) -> Option<&str> {
        match self {
            Response::Failure { payload, .. } => Some(&payload.reason),
            Response::Success { .. } => None,
        }
    }
}
