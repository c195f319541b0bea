//! Results produced by a fixing pass

use serde::Serialize;
use thiserror::Error;

/// Outcome of inspecting one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not a proxy entry, or structurally broken
    NotAProxy,
    /// A proxy entry that already declares `skip-cert-verify` (any value)
    AlreadyCompliant,
    /// A proxy entry missing the field
    NeedsFix,
}

/// Outcome of rewriting one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    Unchanged,
    Rewritten(String),
}

/// First changed entry of a document, for user-facing diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryChange {
    pub before: String,
    pub after: String,
}

/// Aggregate counters of one fixing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixSummary {
    pub rewritten_count: usize,
    pub already_compliant_count: usize,
    pub total_candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_change: Option<EntryChange>,
}

impl FixSummary {
    /// Number of entries recognized as proxies, fixed or not.
    pub fn proxy_count(&self) -> usize {
        self.rewritten_count + self.already_compliant_count
    }
}

/// Warning-level conditions of a pass. None of them stop the output from being written.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixWarning {
    #[error("document is empty")]
    EmptyDocument,
    #[error("no proxies found")]
    NoProxiesFound,
}

/// Transformed document together with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    #[serde(skip)]
    pub document: String,
    pub summary: FixSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<FixWarning>,
}

impl FixReport {
    pub fn is_noop(&self) -> bool {
        self.summary.proxy_count() == 0
    }

    pub fn changed(&self) -> bool {
        self.summary.rewritten_count > 0
    }
}
