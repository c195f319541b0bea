use regex::Regex;

/// Translate a shell-style wildcard (`*`, `?`) into an anchored regex
///
/// # Arguments
/// * `pattern` - The wildcard pattern, e.g. `*.yaml`
///
/// # Returns
/// * The equivalent regex source
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    source
}

/// Match a file name against a wildcard pattern
///
/// # Arguments
/// * `text` - The file name
/// * `pattern` - The wildcard pattern
///
/// # Returns
/// * `true` if the whole name matches, case-insensitively
/// * `false` otherwise, including for patterns that fail to compile
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }

    match Regex::new(&wildcard_to_regex(pattern)) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("clash.yaml", "*.yaml"));
        assert!(wildcard_match("Clash.YAML", "*.yaml"));
        assert!(!wildcard_match("clash.yaml.backup", "*.yaml"));
        assert!(!wildcard_match("clashyaml", "*.yaml"));
        assert!(wildcard_match("node1.yml", "node?.yml"));
        assert!(wildcard_match("anything", ""));
    }

    #[test]
    fn test_wildcard_escapes_regex_syntax() {
        assert!(wildcard_match("a+b (1).yaml", "a+b (1).yaml"));
        assert!(!wildcard_match("aab (1).yaml", "a+b (1).yaml"));
    }
}
