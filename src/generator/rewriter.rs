//! Entry rewriter
//!
//! Inserts `skip-cert-verify: true` into a single entry. The insertion is
//! purely textual; no existing field is moved, reformatted or re-indented.
//! The only removal ever performed is the dangling comma of `..., }`.

use crate::constants::SKIP_CERT_VERIFY_FIELD;
use crate::models::{EntrySyntax, ProxyEntryCandidate, RewriteResult};
use crate::parser::{trailing_shape, TrailingShape};

/// Rewrite a candidate that was classified as needing the field
pub fn rewrite(candidate: &ProxyEntryCandidate<'_>) -> RewriteResult {
    if !candidate.is_well_formed() {
        return RewriteResult::Unchanged;
    }
    match candidate.syntax {
        EntrySyntax::Flow => rewrite_flow(candidate.text),
        EntrySyntax::Block => rewrite_block(candidate),
    }
}

/// `- { a: 1, b: 2 }` -> `- { a: 1, b: 2, skip-cert-verify: true }`
fn rewrite_flow(text: &str) -> RewriteResult {
    let (Some(close), Some(shape)) = (text.rfind('}'), trailing_shape(text)) else {
        return RewriteResult::Unchanged;
    };

    let body = text[..close].trim_end();
    let gap = &text[body.len()..close];
    let last_field = match shape {
        TrailingShape::Clean => body,
        TrailingShape::DanglingComma => body[..body.len() - 1].trim_end(),
    };

    let mut fixed = String::with_capacity(text.len() + SKIP_CERT_VERIFY_FIELD.len() + 2);
    fixed.push_str(last_field);
    fixed.push_str(", ");
    fixed.push_str(SKIP_CERT_VERIFY_FIELD);
    fixed.push_str(gap);
    fixed.push_str(&text[close..]);
    RewriteResult::Rewritten(fixed)
}

/// Append the field as a new line under the entry's last field line
fn rewrite_block(candidate: &ProxyEntryCandidate<'_>) -> RewriteResult {
    let mut fixed = String::with_capacity(
        candidate.text.len() + candidate.field_indent + SKIP_CERT_VERIFY_FIELD.len() + 2,
    );
    fixed.push_str(candidate.text);
    fixed.push_str(candidate.line_ending.as_str());
    fixed.extend(std::iter::repeat(' ').take(candidate.field_indent));
    fixed.push_str(SKIP_CERT_VERIFY_FIELD);
    RewriteResult::Rewritten(fixed)
}
