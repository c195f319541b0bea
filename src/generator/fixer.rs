//! Splice step of the fixing pipeline
//!
//! All candidates are located on the untouched document first. Rewritten
//! entries are then spliced into a copy from the last one to the first, so the
//! offsets of entries not yet applied always refer to unchanged text.

use log::{debug, info};

use crate::generator::rewriter::rewrite;
use crate::models::{
    Classification, EntryChange, FixReport, FixSummary, FixWarning, RewriteResult,
};
use crate::parser::{classify, EntryLocator, LocatorOptions};

/// One pending replacement of `document[start..end]`
#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// Stateless driver of one fixing pass.
///
/// A fixer may be shared freely; every call to [`ProxyFixer::fix`] works on its
/// own document and keeps nothing between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyFixer {
    options: LocatorOptions,
}

impl ProxyFixer {
    pub fn new(options: LocatorOptions) -> Self {
        ProxyFixer { options }
    }

    pub fn options(&self) -> LocatorOptions {
        self.options
    }

    /// Add `skip-cert-verify: true` to every proxy entry of `document` that lacks it
    pub fn fix(&self, document: &str) -> FixReport {
        if document.trim().is_empty() {
            return FixReport {
                document: document.to_string(),
                summary: FixSummary::default(),
                warning: Some(FixWarning::EmptyDocument),
            };
        }

        let candidates: Vec<_> = EntryLocator::with_options(document, self.options).collect();
        let mut summary = FixSummary {
            total_candidates: candidates.len(),
            ..FixSummary::default()
        };
        let mut edits = Vec::new();

        for candidate in &candidates {
            match classify(candidate) {
                Classification::NotAProxy => {}
                Classification::AlreadyCompliant => summary.already_compliant_count += 1,
                Classification::NeedsFix => {
                    if let RewriteResult::Rewritten(replacement) = rewrite(candidate) {
                        if summary.first_change.is_none() {
                            summary.first_change = Some(EntryChange {
                                before: candidate.text.to_string(),
                                after: replacement.clone(),
                            });
                        }
                        edits.push(Edit {
                            start: candidate.start,
                            end: candidate.end,
                            replacement,
                        });
                    }
                }
            }
        }
        summary.rewritten_count = edits.len();

        let mut fixed = document.to_string();
        for edit in edits.iter().rev() {
            debug!("splicing {}..{}", edit.start, edit.end);
            fixed.replace_range(edit.start..edit.end, &edit.replacement);
        }

        let warning = if summary.proxy_count() == 0 {
            Some(FixWarning::NoProxiesFound)
        } else {
            None
        };
        info!(
            "{} of {} candidates rewritten, {} already compliant",
            summary.rewritten_count, summary.total_candidates, summary.already_compliant_count
        );

        FixReport {
            document: fixed,
            summary,
            warning,
        }
    }
}

/// Fix a document with default locator options
pub fn fix_document(document: &str) -> FixReport {
    ProxyFixer::default().fix(document)
}
