//! Capture names → token classes
//!
//! Tree-sitter queries name their captures (`@keyword`, `@function.method`).
//! Known names become the class list of a token span: `token` followed by
//! the dot-separated segments of the resolved name.

/// Standard tree-sitter capture names that produce token spans.
pub const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",             // @attribute
    "boolean",               // @boolean (true, false)
    "comment",               // @comment
    "constant",              // @constant
    "constant.builtin",      // @constant.builtin (null, nil)
    "constructor",           // @constructor (new Foo)
    "embedded",              // @embedded
    "escape",                // @escape (string escapes)
    "function",              // @function
    "function.builtin",      // @function.builtin (echo, print)
    "function.macro",        // @function.macro (println!)
    "function.method",       // @function.method
    "keyword",               // @keyword
    "keyword.return",        // @keyword.return
    "keyword.function",      // @keyword.function (function, fn)
    "keyword.operator",      // @keyword.operator (and, or)
    "label",                 // @label
    "module",                // @module
    "number",                // @number
    "operator",              // @operator
    "property",              // @property
    "punctuation",           // @punctuation (general)
    "punctuation.bracket",   // @punctuation.bracket
    "punctuation.delimiter", // @punctuation.delimiter
    "punctuation.special",   // @punctuation.special
    "string",                // @string
    "string.special",        // @string.special (regex, heredoc)
    "tag",                   // @tag (HTML tags)
    "tag.attribute",         // @tag.attribute
    "text",                  // @text
    "type",                  // @type
    "type.builtin",          // @type.builtin (int, string, bool)
    "variable",              // @variable
    "variable.builtin",      // @variable.builtin ($this, self)
    "variable.parameter",    // @variable.parameter
];

/// Class every token span starts with
pub const TOKEN_CLASS: &str = "token";

/// Resolve a capture name to a known highlight name.
///
/// Tries the exact name first, then progressively shorter parents
/// (e.g. "keyword.control.import" -> "keyword.control" -> "keyword").
pub fn resolve_highlight_name(name: &str) -> Option<&'static str> {
    let mut current = name;
    loop {
        if let Some(&known) = HIGHLIGHT_NAMES.iter().find(|&&n| n == current) {
            return Some(known);
        }

        let dot_pos = current.rfind('.')?;
        current = &current[..dot_pos];
    }
}

/// Class list for a capture, or `None` when the capture is not highlighted
pub fn token_classes(capture_name: &str) -> Option<Vec<String>> {
    if capture_name.starts_with('_') {
        return None;
    }
    let resolved = resolve_highlight_name(capture_name)?;
    let mut classes = vec![TOKEN_CLASS.to_string()];
    classes.extend(resolved.split('.').map(str::to_string));
    Some(classes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_name_lookup() {
        assert_eq!(resolve_highlight_name("keyword"), Some("keyword"));
        assert_eq!(resolve_highlight_name("keyword.function"), Some("keyword.function"));
        assert_eq!(resolve_highlight_name("keyword.control.import"), Some("keyword"));
        assert_eq!(resolve_highlight_name("nonexistent"), None);
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(
            token_classes("function.method").unwrap(),
            vec!["token", "function", "method"]
        );
        assert_eq!(token_classes("string").unwrap(), vec!["token", "string"]);
        assert!(token_classes("_ignored").is_none());
        assert!(token_classes("local.scope").is_none());
    }
}
