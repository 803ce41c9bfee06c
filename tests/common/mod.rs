//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use syntax_worker::syntax::{
    GrammarEngine, GrammarError, LanguageLoader, LanguageTables, Theme, PLAIN_TEXT,
};
use syntax_worker::tree::Node;
use syntax_worker::worker::{HighlightPayload, Worker};

/// Text that makes [`FakeEngine::highlight`] panic
pub const PANIC_TRIGGER: &str = "@panic@";

/// Shared, ordered log of grammar registrations
pub type RegistrationLog = Arc<Mutex<Vec<String>>>;

/// Engine that knows every grammar except the `failing` ones and highlights
/// each word as `span.token.word`.
#[derive(Default)]
pub struct FakeEngine {
    registered: HashSet<String>,
    failing: HashSet<String>,
    log: RegistrationLog,
    theme: Theme,
}

impl FakeEngine {
    pub fn new(log: RegistrationLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }
}

impl GrammarEngine for FakeEngine {
    fn is_registered(&self, id: &str) -> bool {
        id == PLAIN_TEXT || self.registered.contains(id)
    }

    fn register(&mut self, id: &str, _dependencies: &[String]) -> Result<(), GrammarError> {
        if self.failing.contains(id) {
            return Err(GrammarError::UnknownGrammar(id.to_string()));
        }
        self.registered.insert(id.to_string());
        self.log.lock().unwrap().push(id.to_string());
        Ok(())
    }

    fn highlight(&mut self, text: &str, id: &str) -> Result<Vec<Node>, GrammarError> {
        if !self.is_registered(id) {
            return Err(GrammarError::NotRegistered(id.to_string()));
        }
        if text.contains(PANIC_TRIGGER) {
            panic!("engine exploded");
        }

        let mut nodes = Vec::new();
        let mut word = String::new();
        for c in text.chars() {
            if c.is_alphanumeric() {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                nodes.push(self.word(std::mem::take(&mut word)));
            }
            nodes.push(Node::text(c.to_string()));
        }
        if !word.is_empty() {
            nodes.push(self.word(word));
        }
        Ok(nodes)
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

impl FakeEngine {
    fn word(&self, word: String) -> Node {
        let classes = self
            .theme
            .apply(vec!["token".to_string(), "word".to_string()]);
        Node::span(classes, vec![Node::text(word)])
    }
}

/// Tables where `app` depends on `lib` and `base`, and `lib` on `base`
pub fn layered_tables() -> LanguageTables {
    let mut tables = LanguageTables::empty();
    tables
        .dependencies
        .insert("app".to_string(), vec!["lib".to_string(), "base".to_string()]);
    tables
        .dependencies
        .insert("lib".to_string(), vec!["base".to_string()]);
    tables
        .aliases
        .insert("application".to_string(), "app".to_string());
    tables
}

/// A fake-engine worker over [`layered_tables`], plus its registration log
pub fn fake_worker() -> (Worker<FakeEngine>, RegistrationLog) {
    let log = RegistrationLog::default();
    let worker = Worker::new(
        FakeEngine::new(log.clone()),
        LanguageLoader::new(layered_tables()),
        600,
    );
    (worker, log)
}

pub fn highlight_payload(value: &str, language: &str) -> HighlightPayload {
    HighlightPayload {
        value: value.to_string(),
        language: language.to_string(),
        node_limit: None,
        group_by_line: false,
        marked_texts: None,
    }
}
