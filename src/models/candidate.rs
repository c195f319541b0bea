//! Located proxy entry candidates
//!
//! A candidate is a span of the document that syntactically looks like a
//! proxy entry. Whether it really is one is decided later by the inspector.

use std::fmt;
use std::ops::Range;

/// Surface syntax of a located entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntrySyntax {
    /// Single-line `{ key: value, ... }` mapping
    Flow,
    /// Multi-line mapping under a `-` list item marker
    Block,
}

impl EntrySyntax {
    pub fn as_str(self) -> &'static str {
        match self {
            EntrySyntax::Flow => "flow",
            EntrySyntax::Block => "block",
        }
    }
}

impl fmt::Display for EntrySyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural problems the locator noticed while scanning a candidate.
///
/// Defective candidates are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateDefect {
    /// The line ended before the closing `}`
    Unterminated,
    /// A bare `-` item with no field lines under it
    EmptyItem,
}

/// Line terminator used by the line a candidate ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A located, not yet classified proxy entry span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntryCandidate<'a> {
    /// Byte offset of the first character (the `-` marker when present)
    pub start: usize,
    /// Byte offset one past the last character of the entry
    pub end: usize,
    pub syntax: EntrySyntax,
    /// `&document[start..end]`
    pub text: &'a str,
    /// Column at which the entry's keys start. Only meaningful for block entries.
    pub field_indent: usize,
    pub line_ending: LineEnding,
    pub defect: Option<CandidateDefect>,
}

impl<'a> ProxyEntryCandidate<'a> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_well_formed(&self) -> bool {
        self.defect.is_none()
    }
}
