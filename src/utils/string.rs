//! String utility functions for line-oriented YAML scanning

/// Number of leading space or tab bytes
///
/// # Arguments
///
/// * `s` - The line to measure
///
/// # Returns
///
/// The column of the first non-blank character
pub fn leading_indent(s: &str) -> usize {
    s.len() - s.trim_start_matches([' ', '\t']).len()
}

/// Check if an already trimmed line is a YAML comment
pub fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#')
}

/// Check if a string starts with a `key: value` pair (or a bare `key:`)
///
/// The check is lenient: the first `:` must be followed by whitespace or end the
/// string, and must have something in front of it. URLs such as `http://x`
/// are therefore not treated as fields.
pub fn has_key_value(s: &str) -> bool {
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b':' {
            if i == 0 {
                return false;
            }
            return match bytes.get(i + 1) {
                None => true,
                Some(next) => next.is_ascii_whitespace(),
            };
        }
    }
    false
}

/// Check if a quote character at `pos` opens a quoted scalar
///
/// Quotes only open a scalar at the start of a token; an apostrophe inside a
/// plain word (`Bob's`) is ordinary text.
pub fn opens_quote(bytes: &[u8], pos: usize) -> bool {
    if pos == 0 {
        return true;
    }
    matches!(
        bytes[pos - 1],
        b' ' | b'\t' | b'{' | b'[' | b',' | b':' | b'-'
    )
}

/// Check if a `#` at `pos` starts a comment
pub fn opens_comment(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || bytes[pos - 1] == b' ' || bytes[pos - 1] == b'\t'
}
