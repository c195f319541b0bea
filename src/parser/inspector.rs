//! Field inspector
//!
//! Classifies one located candidate as noise, an already compliant proxy, or a
//! proxy that needs the `skip-cert-verify` field. Detection is deliberately
//! loose: key tokens are matched by substring containment, not by parsing the
//! mapping, so that hand-edited and slightly broken files are still recognized.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::constants::{REQUIRED_KEY_TOKENS, SKIP_CERT_VERIFY_KEY, SKIP_CERT_VERIFY_TOKEN};
use crate::models::{Classification, EntrySyntax, ProxyEntryCandidate};

lazy_static! {
    static ref KEY_TOKEN_REGEX: Regex =
        Regex::new(r"(?m)(?:^|[{,])[ \t]*(?:-[ \t]+)?([A-Za-z0-9_][A-Za-z0-9_.-]*)[ \t]*:(?:[ \t\r]|[,}]|$)")
            .unwrap();
}

/// Key names found in one candidate, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyFields {
    keys: Vec<String>,
}

impl ProxyFields {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn has_skip_cert_verify(&self) -> bool {
        self.contains(SKIP_CERT_VERIFY_KEY)
    }
}

/// How a flow entry ends right before its closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingShape {
    /// `..., last: value }`
    Clean,
    /// `..., last: value, }`
    DanglingComma,
}

/// Scan the `key:` tokens of an entry
pub fn proxy_fields(text: &str) -> ProxyFields {
    let keys = KEY_TOKEN_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    ProxyFields { keys }
}

/// Classify the tail of a flow mapping. Returns `None` when there is no closing brace.
pub fn trailing_shape(text: &str) -> Option<TrailingShape> {
    let close = text.rfind('}')?;
    let shape = if text[..close].trim_end().ends_with(',') {
        TrailingShape::DanglingComma
    } else {
        TrailingShape::Clean
    };
    Some(shape)
}

/// First value written for `key` in an entry, with quotes stripped.
///
/// Used for display only, so the value ends at the first `,` or `}` in flow
/// entries and at the end of the line in block entries.
pub fn field_value<'a>(candidate: &ProxyEntryCandidate<'a>, key: &str) -> Option<&'a str> {
    let text = candidate.text;
    let token = format!("{}:", key);
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(&token) {
        let at = search_from + found;
        search_from = at + token.len();
        let boundary_ok = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || matches!(c, '{' | ',' | '-'));
        if !boundary_ok {
            continue;
        }
        let rest = &text[at + token.len()..];
        let end = match candidate.syntax {
            EntrySyntax::Flow => rest.find([',', '}', '\n']),
            EntrySyntax::Block => rest.find(['\r', '\n']),
        }
        .unwrap_or(rest.len());
        let value = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');
        return Some(value);
    }
    None
}

/// Decide what to do with one candidate
pub fn classify(candidate: &ProxyEntryCandidate<'_>) -> Classification {
    let classification = classify_text(candidate);
    debug!(
        "{} candidate at {}..{}: {:?}",
        candidate.syntax, candidate.start, candidate.end, classification
    );
    classification
}

fn classify_text(candidate: &ProxyEntryCandidate<'_>) -> Classification {
    if let Some(defect) = candidate.defect {
        debug!("skipping malformed candidate at {}: {:?}", candidate.start, defect);
        return Classification::NotAProxy;
    }
    let text = candidate.text.trim();
    if proxy_fields(text).is_empty() {
        return Classification::NotAProxy;
    }
    if !REQUIRED_KEY_TOKENS.iter().all(|token| text.contains(token)) {
        return Classification::NotAProxy;
    }
    if text.contains(SKIP_CERT_VERIFY_TOKEN) {
        Classification::AlreadyCompliant
    } else {
        Classification::NeedsFix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::locate_entries;

    fn first(doc: &str) -> ProxyEntryCandidate<'_> {
        locate_entries(doc).into_iter().next().unwrap()
    }

    #[test]
    fn test_classify_needs_fix() {
        let doc = "- { name: A, type: trojan, server: s.com, port: 443, password: p }";
        assert_eq!(classify(&first(doc)), Classification::NeedsFix);
    }

    #[test]
    fn test_classify_already_compliant_with_any_value() {
        let doc = "- { name: A, server: s.com, port: 443, skip-cert-verify: false }";
        assert_eq!(classify(&first(doc)), Classification::AlreadyCompliant);
    }

    #[test]
    fn test_classify_missing_required_key() {
        let doc = "- { name: G, type: select, proxies: [A, B] }";
        assert_eq!(classify(&first(doc)), Classification::NotAProxy);
        let doc = "dns: { enable: true, listen: 0.0.0.0:53 }";
        assert_eq!(classify(&first(doc)), Classification::NotAProxy);
    }

    #[test]
    fn test_classify_defective_candidates() {
        let unterminated = "- { name: A, server: s, port: 1";
        assert_eq!(classify(&first(unterminated)), Classification::NotAProxy);
    }

    #[test]
    fn test_classify_nested_flow_entry() {
        let doc = "- { name: A, type: vmess, server: s, port: 443, ws-opts: { path: /ws, headers: { Host: h } } }";
        assert_eq!(classify(&first(doc)), Classification::NeedsFix);
        let doc = "- { name: A, server: s, port: 443, ws-opts: { path: /ws }, skip-cert-verify: true }";
        assert_eq!(classify(&first(doc)), Classification::AlreadyCompliant);
    }

    #[test]
    fn test_classify_is_substring_based() {
        // `server:` only appears inside a value, yet the entry still counts
        let doc = "- { name: A, note: 'server: x', port: 1 }";
        assert_eq!(classify(&first(doc)), Classification::NeedsFix);
    }

    #[test]
    fn test_classify_block_entry() {
        let doc = "proxies:\n  - name: A\n    server: s\n    port: 1\n    skip-cert-verify: true\n";
        assert_eq!(classify(&first(doc)), Classification::AlreadyCompliant);
    }

    #[test]
    fn test_proxy_fields_flow_and_block() {
        let flow = proxy_fields("- { name: A, server: s.com, port: 443, udp: true }");
        assert_eq!(flow.keys(), ["name", "server", "port", "udp"]);
        assert!(!flow.has_skip_cert_verify());

        let block = proxy_fields("- name: A\n    server: s\n    skip-cert-verify: false");
        assert_eq!(block.len(), 3);
        assert!(block.has_skip_cert_verify());

        assert!(proxy_fields("{ }").is_empty());
    }

    #[test]
    fn test_trailing_shape() {
        assert_eq!(
            trailing_shape("- { name: A, port: 1 }"),
            Some(TrailingShape::Clean)
        );
        assert_eq!(
            trailing_shape("- { name: A, port: 1, }"),
            Some(TrailingShape::DanglingComma)
        );
        assert_eq!(trailing_shape("- { name: A"), None);
    }

    #[test]
    fn test_field_value() {
        let flow = first("- { name: \"Tokyo 01\", server: jp.example.com, port: 443 }");
        assert_eq!(field_value(&flow, "name"), Some("Tokyo 01"));
        assert_eq!(field_value(&flow, "server"), Some("jp.example.com"));
        assert_eq!(field_value(&flow, "uuid"), None);

        let doc = "proxies:\n  - name: A\n    server: s.com\n    port: 443\n";
        let block = first(doc);
        assert_eq!(field_value(&block, "server"), Some("s.com"));
        assert_eq!(field_value(&block, "port"), Some("443"));
    }
}
