//! Language identification tables
//!
//! Two static tables drive grammar loading:
//! - aliases: file extensions and common names → canonical grammar id
//! - dependencies: grammar id → grammars that must be registered first
//!
//! Both come with built-in defaults and can be extended from the config file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Built-in plain text language; needs no grammar
pub const PLAIN_TEXT: &str = "text";

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Web stack
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("mts", "typescript"),
    ("htm", "html"),
    ("xhtml", "html"),
    // Systems
    ("rs", "rust"),
    ("h", "c"),
    ("c++", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("golang", "go"),
    // Scripting
    ("py", "python"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    // Data / config
    ("svg", "xml"),
    ("xsd", "xml"),
    ("dosini", "ini"),
    ("cfg", "ini"),
    // Lisp family
    ("rkt", "scheme"),
    ("racket", "scheme"),
    ("scm", "scheme"),
    // No highlighting
    ("txt", PLAIN_TEXT),
    ("plaintext", PLAIN_TEXT),
    ("none", PLAIN_TEXT),
];

const DEFAULT_DEPENDENCIES: &[(&str, &[&str])] = &[
    ("typescript", &["javascript"]),
    ("tsx", &["typescript"]),
    ("cpp", &["c"]),
];

/// Alias and dependency tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTables {
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub dependencies: HashMap<String, Vec<String>>,
}

impl Default for LanguageTables {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(alias, id)| (alias.to_string(), id.to_string()))
                .collect(),
            dependencies: DEFAULT_DEPENDENCIES
                .iter()
                .map(|(id, deps)| {
                    (
                        id.to_string(),
                        deps.iter().map(|d| d.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl LanguageTables {
    /// Tables with no entries at all
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
            dependencies: HashMap::new(),
        }
    }

    /// Overlay `other` on top of these tables (entries in `other` win)
    pub fn merge(mut self, other: LanguageTables) -> Self {
        self.aliases.extend(other.aliases);
        self.dependencies.extend(other.dependencies);
        self
    }

    /// Canonical grammar id for `language` (identity when not an alias)
    pub fn resolve<'a>(&'a self, language: &'a str) -> &'a str {
        self.aliases
            .get(language)
            .map(String::as_str)
            .unwrap_or(language)
    }

    /// Direct dependencies of canonical grammar `id`
    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.dependencies
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Language for a file path, from its extension
    pub fn language_for_path(&self, path: &Path) -> String {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.resolve(&ext.to_lowercase()).to_string())
            .unwrap_or_else(|| PLAIN_TEXT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_alias() {
        let tables = LanguageTables::default();
        assert_eq!(tables.resolve("js"), "javascript");
        assert_eq!(tables.resolve("rs"), "rust");
        assert_eq!(tables.resolve("rust"), "rust");
        assert_eq!(tables.resolve("unknown"), "unknown");
    }

    #[test]
    fn test_dependencies() {
        let tables = LanguageTables::default();
        assert_eq!(tables.dependencies_of("tsx"), ["typescript"]);
        assert!(tables.dependencies_of("rust").is_empty());
    }

    #[test]
    fn test_language_for_path() {
        let tables = LanguageTables::default();
        assert_eq!(tables.language_for_path(Path::new("main.RS")), "rust");
        assert_eq!(tables.language_for_path(Path::new("/a/b/app.tsx")), "tsx");
        assert_eq!(tables.language_for_path(Path::new("no_extension")), "text");
    }

    #[test]
    fn test_merge_overrides() {
        let mut extra = LanguageTables::empty();
        extra.aliases.insert("js".to_string(), "typescript".to_string());
        extra
            .dependencies
            .insert("vue".to_string(), vec!["html".to_string()]);
        let tables = LanguageTables::default().merge(extra);
        assert_eq!(tables.resolve("js"), "typescript");
        assert_eq!(tables.dependencies_of("vue"), ["html"]);
        assert_eq!(tables.resolve("py"), "python");
    }
}
