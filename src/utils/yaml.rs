use serde_yaml::{self, Value};

/// Wrapper around serde_yaml::Value for read-only inspection of a document
#[derive(Debug, Clone)]
pub struct YamlNode {
    pub value: Value,
}

impl YamlNode {
    /// Create a YamlNode from a YAML string
    pub fn from_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let value = serde_yaml::from_str(content)?;
        Ok(YamlNode { value })
    }

    /// Get a value from a dotted path (`proxies.0.name`)
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;

        for part in path.split('.') {
            if part.is_empty() {
                continue;
            }

            match current {
                Value::Mapping(map) => {
                    current = map.get(Value::String(part.to_string()))?;
                }
                Value::Sequence(seq) => {
                    let index = part.parse::<usize>().ok()?;
                    current = seq.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// Number of items in the top-level `proxies` list, if there is one
    pub fn proxy_list_len(&self) -> Option<usize> {
        match self.get_value("proxies")? {
            Value::Sequence(seq) => Some(seq.len()),
            _ => None,
        }
    }
}

/// Check that a document is syntactically valid YAML
pub fn validate_yaml(content: &str) -> Result<(), serde_yaml::Error> {
    YamlNode::from_str(content).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_value_and_proxy_count() {
        let node = YamlNode::from_str(
            "proxies:\n  - { name: A, server: s, port: 1 }\n  - name: B\n    port: 2\n",
        )
        .unwrap();
        assert_eq!(node.proxy_list_len(), Some(2));
        assert_eq!(
            node.get_value("proxies.1.name"),
            Some(&Value::String("B".to_string()))
        );
        assert!(node.get_value("proxies.7").is_none());
    }

    #[test]
    fn test_validate_yaml() {
        assert!(validate_yaml("a: 1\nb: [1, 2]\n").is_ok());
        assert!(validate_yaml("a: [1, 2\n").is_err());
    }
}
