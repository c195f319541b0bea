//! Entry locator
//!
//! Scans a configuration document line by line and yields every span that
//! syntactically looks like a proxy entry. Two surface syntaxes are recognized:
//!
//! * flow entries: `- { name: A, server: s.com, port: 443 }`, found anywhere in
//!   the document (or only inside `proxies:` when
//!   [`LocatorOptions::flow_requires_proxies_section`] is set)
//! * block entries: a `- key: value` list item followed by deeper indented
//!   field lines, found only inside a `proxies:` section
//!
//! Candidates never overlap and come out in ascending order of their start
//! offset. Nothing here decides whether a span is a real proxy; that is the
//! inspector's job.

use std::collections::VecDeque;

use crate::constants::PROXIES_SECTION_HEADER;
use crate::models::{CandidateDefect, EntrySyntax, LineEnding, ProxyEntryCandidate};
use crate::utils::string::{has_key_value, is_comment, leading_indent, opens_comment, opens_quote};

/// Skipped at the start of a document, never part of a line
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Knobs of the locator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Only report flow entries that sit inside a `proxies:` section
    pub flow_requires_proxies_section: bool,
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    /// Line content without its terminator
    text: &'a str,
    ending: LineEnding,
}

/// Block entry whose end has not been seen yet
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    start: usize,
    marker_indent: usize,
    field_indent: Option<usize>,
    end: usize,
    ending: LineEnding,
}

/// Shape of a list item line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListItem {
    /// `- key: value`, with the column the key starts at
    Field(usize),
    /// `-` alone, fields follow on deeper lines
    Bare,
    /// `- { ... }`
    Flow,
    /// `- DIRECT` and friends
    Scalar,
}

fn list_item(text: &str) -> Option<ListItem> {
    let trimmed = text.trim();
    let after_marker = trimmed.strip_prefix('-')?;
    if !after_marker.is_empty() && !after_marker.starts_with([' ', '\t']) {
        return None;
    }
    let rest = after_marker.trim_start();
    let item = if rest.is_empty() || is_comment(rest) {
        ListItem::Bare
    } else if rest.starts_with('{') {
        ListItem::Flow
    } else if has_key_value(rest) {
        ListItem::Field(leading_indent(text) + trimmed.len() - rest.len())
    } else {
        ListItem::Scalar
    };
    Some(item)
}

/// Lazy, restartable scanner over one document.
///
/// Cloning the locator restarts nothing; it forks the scan at its current
/// position. Build a fresh one with [`EntryLocator::new`] to scan again.
#[derive(Debug, Clone)]
pub struct EntryLocator<'a> {
    document: &'a str,
    options: LocatorOptions,
    pos: usize,
    last_ending: LineEnding,
    section_indent: Option<usize>,
    open_block: Option<OpenBlock>,
    pending: VecDeque<ProxyEntryCandidate<'a>>,
    finished: bool,
}

impl<'a> EntryLocator<'a> {
    pub fn new(document: &'a str) -> Self {
        Self::with_options(document, LocatorOptions::default())
    }

    pub fn with_options(document: &'a str, options: LocatorOptions) -> Self {
        EntryLocator {
            document,
            options,
            pos: 0,
            last_ending: LineEnding::Lf,
            section_indent: None,
            open_block: None,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        if self.pos == 0 && self.document.starts_with(BYTE_ORDER_MARK) {
            self.pos = BYTE_ORDER_MARK.len_utf8();
        }
        if self.pos >= self.document.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.document[start..];
        let line = match rest.find('\n') {
            Some(newline) => {
                self.pos += newline + 1;
                let raw = &rest[..newline];
                let (text, ending) = match raw.strip_suffix('\r') {
                    Some(text) => (text, LineEnding::CrLf),
                    None => (raw, LineEnding::Lf),
                };
                self.last_ending = ending;
                Line { start, text, ending }
            }
            None => {
                self.pos = self.document.len();
                Line {
                    start,
                    text: rest,
                    ending: self.last_ending,
                }
            }
        };
        Some(line)
    }

    fn process_line(&mut self, line: Line<'a>) {
        let trimmed = line.text.trim();
        let indent = leading_indent(line.text);

        if let Some(mut block) = self.open_block {
            if trimmed.is_empty() || is_comment(trimmed) {
                return;
            }
            if indent > block.marker_indent {
                block.field_indent.get_or_insert(indent);
                block.end = line.start + line.text.len();
                block.ending = line.ending;
                self.open_block = Some(block);
                return;
            }
            self.open_block = None;
            let candidate = self.finish_block(block);
            self.pending.push_back(candidate);
        }

        if trimmed == PROXIES_SECTION_HEADER {
            self.section_indent = Some(indent);
            return;
        }

        if let Some(section_indent) = self.section_indent {
            if !trimmed.is_empty()
                && !is_comment(trimmed)
                && indent <= section_indent
                && !trimmed.starts_with('-')
            {
                self.section_indent = None;
            }
        }

        if self.section_indent.is_some() {
            let marker = line.start + indent;
            match list_item(line.text) {
                Some(ListItem::Field(key_column)) => {
                    self.open_block = Some(OpenBlock {
                        start: marker,
                        marker_indent: indent,
                        field_indent: Some(key_column),
                        end: line.start + line.text.len(),
                        ending: line.ending,
                    });
                    return;
                }
                Some(ListItem::Bare) => {
                    self.open_block = Some(OpenBlock {
                        start: marker,
                        marker_indent: indent,
                        field_indent: None,
                        end: marker + 1,
                        ending: line.ending,
                    });
                    return;
                }
                Some(ListItem::Flow) | Some(ListItem::Scalar) | None => {}
            }
        }

        if !self.options.flow_requires_proxies_section || self.section_indent.is_some() {
            self.scan_flow(line);
        }
    }

    fn finish_block(&self, block: OpenBlock) -> ProxyEntryCandidate<'a> {
        let defect = match block.field_indent {
            Some(_) => None,
            None => Some(CandidateDefect::EmptyItem),
        };
        ProxyEntryCandidate {
            start: block.start,
            end: block.end,
            syntax: EntrySyntax::Block,
            text: &self.document[block.start..block.end],
            field_indent: block.field_indent.unwrap_or(block.marker_indent + 2),
            line_ending: block.ending,
            defect,
        }
    }

    /// Queue every `{ ... }` run on one line
    fn scan_flow(&mut self, line: Line<'a>) {
        let bytes = line.text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) => match skip_quoted(bytes, i, q) {
                    QuoteStep::Advance(n) => {
                        i += n;
                        continue;
                    }
                    QuoteStep::Close => quote = None,
                },
                None => match b {
                    b'"' | b'\'' if opens_quote(bytes, i) => quote = Some(b),
                    b'#' if opens_comment(bytes, i) => break,
                    b'{' => {
                        let (close, defect) = scan_mapping(bytes, i);
                        let start = marker_before(bytes, i);
                        self.pending.push_back(ProxyEntryCandidate {
                            start: line.start + start,
                            end: line.start + close,
                            syntax: EntrySyntax::Flow,
                            text: &line.text[start..close],
                            field_indent: leading_indent(line.text),
                            line_ending: line.ending,
                            defect,
                        });
                        i = close;
                        continue;
                    }
                    _ => {}
                },
            }
            i += 1;
        }
    }
}

impl<'a> Iterator for EntryLocator<'a> {
    type Item = ProxyEntryCandidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(candidate) = self.pending.pop_front() {
                return Some(candidate);
            }
            if self.finished {
                return None;
            }
            match self.next_line() {
                Some(line) => self.process_line(line),
                None => {
                    self.finished = true;
                    if let Some(block) = self.open_block.take() {
                        let candidate = self.finish_block(block);
                        self.pending.push_back(candidate);
                    }
                }
            }
        }
    }
}

enum QuoteStep {
    /// Still inside the quoted scalar, skip this many bytes
    Advance(usize),
    /// The byte at the cursor closes the scalar
    Close,
}

fn skip_quoted(bytes: &[u8], i: usize, quote: u8) -> QuoteStep {
    let b = bytes[i];
    if quote == b'"' && b == b'\\' {
        return QuoteStep::Advance(2);
    }
    if b != quote {
        return QuoteStep::Advance(1);
    }
    // '' is an escaped quote inside a single-quoted scalar
    if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
        return QuoteStep::Advance(2);
    }
    QuoteStep::Close
}

/// Find the end of the mapping opened at `open`.
///
/// Returns the offset one past the outer closing brace (or the line length when
/// the mapping is not closed on this line) and the defect, if any. Nested
/// mappings such as `ws-opts: { ... }` are consumed whole so that nothing
/// inside them becomes a candidate.
fn scan_mapping(bytes: &[u8], open: usize) -> (usize, Option<CandidateDefect>) {
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = open + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            match skip_quoted(bytes, i, q) {
                QuoteStep::Advance(n) => {
                    i += n;
                    continue;
                }
                QuoteStep::Close => quote = None,
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' if opens_quote(bytes, i) => quote = Some(b),
            b'#' if opens_comment(bytes, i) => break,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return (i + 1, None);
                }
            }
            _ => {}
        }
        i += 1;
    }
    (bytes.len(), Some(CandidateDefect::Unterminated))
}

/// Start offset of a flow entry: the `-` list marker in front of `{` when there
/// is one, otherwise the brace itself.
fn marker_before(bytes: &[u8], open: usize) -> usize {
    let mut k = open;
    while k > 0 && (bytes[k - 1] == b' ' || bytes[k - 1] == b'\t') {
        k -= 1;
    }
    if k > 0 && bytes[k - 1] == b'-' && (k == 1 || bytes[k - 2] == b' ' || bytes[k - 2] == b'\t') {
        k - 1
    } else {
        open
    }
}

/// Locate every candidate of a document with default options
pub fn locate_entries(document: &str) -> Vec<ProxyEntryCandidate<'_>> {
    EntryLocator::new(document).collect()
}

/// Locate every candidate of a document
pub fn locate_entries_with(
    document: &str,
    options: LocatorOptions,
) -> Vec<ProxyEntryCandidate<'_>> {
    EntryLocator::with_options(document, options).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_entry_includes_list_marker() {
        let doc = "proxies:\n  - { name: A, server: s.com, port: 443 }\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        let entry = &found[0];
        assert_eq!(entry.syntax, EntrySyntax::Flow);
        assert_eq!(entry.text, "- { name: A, server: s.com, port: 443 }");
        assert_eq!(&doc[entry.range()], entry.text);
        assert!(entry.is_well_formed());
    }

    #[test]
    fn test_flow_entries_outside_proxies_section() {
        let doc = "dns: { enable: true }\nextra:\n  - { name: A, server: s, port: 1 }\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "{ enable: true }");
        assert_eq!(found[1].text, "- { name: A, server: s, port: 1 }");
    }

    #[test]
    fn test_flow_requires_section_option() {
        let doc = "extra:\n  - { name: A, server: s, port: 1 }\nproxies:\n  - { name: B, server: s, port: 2 }\n";
        let options = LocatorOptions {
            flow_requires_proxies_section: true,
        };
        let found = locate_entries_with(doc, options);
        assert_eq!(found.len(), 1);
        assert!(found[0].text.contains("name: B"));
    }

    #[test]
    fn test_braces_inside_quotes_are_ignored() {
        let doc = "- { name: \"a}b\", server: s, port: 1, password: 'x{' }\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, doc.trim_end());
        assert!(found[0].is_well_formed());
    }

    #[test]
    fn test_nested_mapping_is_one_candidate() {
        let doc = "- { name: A, server: s, port: 1, ws-opts: { path: /, headers: { Host: h } } }, \n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_well_formed());
        assert!(found[0].text.ends_with("h } } }"));
    }

    #[test]
    fn test_unterminated_mapping() {
        let doc = "- { name: A, server: s, port: 1\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].defect, Some(CandidateDefect::Unterminated));
    }

    #[test]
    fn test_commented_flow_entry_is_skipped() {
        let doc = "# - { name: A, server: s, port: 1 }\nkey: value # { a: 1 }\n";
        assert!(locate_entries(doc).is_empty());
    }

    #[test]
    fn test_multiple_flow_entries_on_one_line() {
        let doc = "proxies: [{ name: A, server: s, port: 1 }, { name: B, server: s, port: 2 }]\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 2);
        assert!(found[0].start < found[1].start);
        assert_eq!(found[1].text, "{ name: B, server: s, port: 2 }");
    }

    #[test]
    fn test_block_entries() {
        let doc = "proxies:\n  - name: A\n    server: s.com\n    port: 443\n\n  - name: B\n    server: t.com\n    port: 8443\nrules:\n  - MATCH,DIRECT\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].syntax, EntrySyntax::Block);
        assert_eq!(found[0].text, "- name: A\n    server: s.com\n    port: 443");
        assert_eq!(found[0].field_indent, 4);
        assert_eq!(found[1].text, "- name: B\n    server: t.com\n    port: 8443");
    }

    #[test]
    fn test_block_entries_at_section_indent() {
        let doc = "proxies:\n- name: A\n  server: s\n  port: 1\nproxy-groups:\n- name: G\n  type: select\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "- name: A\n  server: s\n  port: 1");
        assert_eq!(found[0].field_indent, 2);
    }

    #[test]
    fn test_block_entry_absorbs_nested_lines() {
        let doc = "proxies:\n  - name: A\n    server: s\n    port: 1\n    ws-opts: { path: / }\n    alpn:\n      - h2\n  - { name: B, server: s, port: 2 }\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 2);
        assert!(found[0].text.ends_with("      - h2"));
        assert_eq!(found[1].syntax, EntrySyntax::Flow);
    }

    #[test]
    fn test_bare_list_item_block() {
        let doc = "proxies:\n  -\n    name: A\n    server: s\n    port: 1\n  -\nrules: []\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].field_indent, 4);
        assert!(found[0].is_well_formed());
        assert_eq!(found[1].text, "-");
        assert_eq!(found[1].defect, Some(CandidateDefect::EmptyItem));
    }

    #[test]
    fn test_block_entries_need_proxies_section() {
        let doc = "proxy-groups:\n  - name: G\n    server: s\n    port: 1\n";
        assert!(locate_entries(doc).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = "proxies:\r\n  - name: A\r\n    server: s\r\n    port: 1\r\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "- name: A\r\n    server: s\r\n    port: 1");
        assert_eq!(found[0].line_ending, LineEnding::CrLf);
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let doc = "\u{feff}proxies:\n  - name: A\n    server: s\n    port: 443\n";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, "\u{feff}proxies:\n  ".len());
        assert_eq!(&doc[found[0].range()], "- name: A\n    server: s\n    port: 443");

        let doc = "\u{feff}- { name: A, server: s, port: 1 }";
        let found = locate_entries(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 3);
    }

    #[test]
    fn test_locator_is_restartable() {
        let doc = "proxies:\n  - { name: A, server: s, port: 1 }\n  - { name: B, server: s, port: 2 }\n";
        let mut locator = EntryLocator::new(doc);
        let first = locator.next();
        let forked: Vec<_> = locator.clone().collect();
        let rest: Vec<_> = locator.collect();
        assert!(first.is_some());
        assert_eq!(forked, rest);
        assert_eq!(EntryLocator::new(doc).count(), 2);
    }

    #[test]
    fn test_empty_document() {
        assert!(locate_entries("").is_empty());
        assert!(locate_entries("\n\n   \n").is_empty());
    }
}
