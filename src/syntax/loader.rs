//! Dependency-aware grammar loading
//!
//! Resolves an alias, then registers the grammar's dependencies depth-first
//! before the grammar itself. Already registered grammars are skipped, so a
//! second load of the same language does nothing. A failing grammar is
//! logged and skipped; its siblings and the requested grammar still get
//! their own attempt.

use std::collections::HashSet;

use super::engine::GrammarEngine;
use super::languages::{LanguageTables, PLAIN_TEXT};

/// Outcome of one [`LanguageLoader::load`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Canonical id of the requested language
    pub language: String,
    /// Grammars newly registered by this call, in registration order
    pub registered: Vec<String>,
    /// Grammars whose registration failed, with the reason
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageLoader {
    tables: LanguageTables,
}

impl LanguageLoader {
    pub fn new(tables: LanguageTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &LanguageTables {
        &self.tables
    }

    /// Ensure `language` and its transitive dependencies are registered
    pub fn load<E: GrammarEngine + ?Sized>(&self, engine: &mut E, language: &str) -> LoadReport {
        let id = self.tables.resolve(language).to_string();
        let mut report = LoadReport {
            language: id.clone(),
            ..Default::default()
        };
        let mut visiting = HashSet::new();
        self.ensure(engine, &id, &mut visiting, &mut report);
        report
    }

    /// Load `language`, then call `done` with the engine and the canonical id.
    ///
    /// `done` runs after the requested grammar's own registration attempt,
    /// whether it succeeded or not.
    pub fn load_then<E, R, F>(&self, engine: &mut E, language: &str, done: F) -> R
    where
        E: GrammarEngine + ?Sized,
        F: FnOnce(&mut E, &LoadReport) -> R,
    {
        let report = self.load(engine, language);
        done(engine, &report)
    }

    fn ensure<E: GrammarEngine + ?Sized>(
        &self,
        engine: &mut E,
        id: &str,
        visiting: &mut HashSet<String>,
        report: &mut LoadReport,
    ) {
        if id == PLAIN_TEXT || engine.is_registered(id) {
            return;
        }
        // Already attempted by this load (diamond dependency)
        if report.failed.iter().any(|(failed, _)| failed == id) {
            return;
        }
        if !visiting.insert(id.to_string()) {
            tracing::warn!("Dependency cycle through grammar {}, skipping", id);
            return;
        }

        let dependencies: Vec<String> = self
            .tables
            .dependencies_of(id)
            .iter()
            .map(|dep| self.tables.resolve(dep).to_string())
            .collect();

        for dependency in &dependencies {
            self.ensure(engine, dependency, visiting, report);
        }

        match engine.register(id, &dependencies) {
            Ok(()) => {
                tracing::debug!("Registered grammar {}", id);
                report.registered.push(id.to_string());
            }
            Err(e) => {
                tracing::warn!("Failed to load grammar {}: {}", id, e);
                report.failed.push((id.to_string(), e.to_string()));
            }
        }
    }
}
