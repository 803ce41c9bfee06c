//! Diff hunks and a unified diff reader

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Delete,
    Normal,
}

/// One line of a hunk (without its `+`/`-`/` ` prefix)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub content: String,
}

impl Change {
    pub fn new(kind: ChangeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// A contiguous old/new line range of a two-sided diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// The `@@ ... @@` header line
    pub content: String,
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub changes: Vec<Change>,
}

impl Hunk {
    /// Lines present on the old side (normal + delete)
    pub fn old_side(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Insert)
            .map(|c| c.content.as_str())
    }

    /// Lines present on the new side (normal + insert)
    pub fn new_side(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Delete)
            .map(|c| c.content.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffParseError {
    #[error("line {line}: malformed hunk header: {header}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: unexpected change line outside of a hunk")]
    OrphanChange { line: usize },
}

/// Read every hunk of a unified diff (`git diff` output, possibly several files)
pub fn parse_unified_diff(text: &str) -> Result<Vec<Hunk>, DiffParseError> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    // Lines still expected on each side of the current hunk
    let mut remaining = (0usize, 0usize);

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.starts_with("@@") {
            if let Some(hunk) = current.take() {
                hunks.push(hunk);
            }
            let hunk = parse_header(line).ok_or_else(|| DiffParseError::InvalidHeader {
                line: line_no,
                header: line.to_string(),
            })?;
            remaining = (hunk.old_lines, hunk.new_lines);
            current = Some(hunk);
            continue;
        }

        let in_hunk = remaining.0 > 0 || remaining.1 > 0;
        let Some(hunk) = current.as_mut().filter(|_| in_hunk) else {
            // File headers (diff --git, index, ---, +++) between hunks
            if line.starts_with(' ') {
                return Err(DiffParseError::OrphanChange { line: line_no });
            }
            continue;
        };

        if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        let (kind, content) = match line.chars().next() {
            Some('+') => (ChangeKind::Insert, &line[1..]),
            Some('-') => (ChangeKind::Delete, &line[1..]),
            Some(' ') => (ChangeKind::Normal, &line[1..]),
            // Some tools strip the single space of blank context lines
            None => (ChangeKind::Normal, ""),
            Some(_) => continue,
        };
        match kind {
            ChangeKind::Insert => remaining.1 = remaining.1.saturating_sub(1),
            ChangeKind::Delete => remaining.0 = remaining.0.saturating_sub(1),
            ChangeKind::Normal => {
                remaining.0 = remaining.0.saturating_sub(1);
                remaining.1 = remaining.1.saturating_sub(1);
            }
        }
        hunk.changes.push(Change::new(kind, content));
    }

    if let Some(hunk) = current {
        hunks.push(hunk);
    }
    Ok(hunks)
}

/// `@@ -12,3 +12,4 @@ fn context()`
fn parse_header(line: &str) -> Option<Hunk> {
    let inner = line.strip_prefix("@@ ")?;
    let end = inner.find(" @@")?;
    let mut ranges = inner[..end].split_whitespace();
    let (old_start, old_lines) = parse_range(ranges.next()?.strip_prefix('-')?)?;
    let (new_start, new_lines) = parse_range(ranges.next()?.strip_prefix('+')?)?;

    Some(Hunk {
        content: line.to_string(),
        old_start,
        old_lines,
        new_start,
        new_lines,
        changes: Vec::new(),
    })
}

/// `12,3` → (12, 3); a missing count means one line
fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
