//! Configuration types for InputSetResolver

use runform_merge::ClearPolicy;
use serde::{Deserialize, Serialize};

/// Default number of parsed documents kept by the resolver
pub const DEFAULT_PARSE_CACHE_CAPACITY: usize = 64;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Parsed documents memoized by source text; 0 disables the cache
    pub parse_cache_capacity: usize,

    /// Report template runtime inputs still open after the merge
    pub compute_missing_inputs: bool,

    /// Extra keys cleared to `[]` on top of the built-in table
    pub list_fields: Vec<String>,

    /// Extra keys cleared to `{}` on top of the built-in table
    pub map_fields: Vec<String>,
}

impl ResolverConfig {
    /// Create a new resolver configuration
    pub fn new() -> Self {
        Self {
            parse_cache_capacity: DEFAULT_PARSE_CACHE_CAPACITY,
            compute_missing_inputs: true,
            list_fields: Vec::new(),
            map_fields: Vec::new(),
        }
    }

    /// Set the parse cache capacity
    pub fn with_parse_cache_capacity(mut self, capacity: usize) -> Self {
        self.parse_cache_capacity = capacity;
        self
    }

    /// Enable or disable the completeness report
    pub fn compute_missing_inputs(mut self, enable: bool) -> Self {
        self.compute_missing_inputs = enable;
        self
    }

    /// Clear `key` to an empty list
    pub fn with_list_field(mut self, key: impl Into<String>) -> Self {
        self.list_fields.push(key.into());
        self
    }

    /// Clear `key` to an empty map
    pub fn with_map_field(mut self, key: impl Into<String>) -> Self {
        self.map_fields.push(key.into());
        self
    }

    /// Clear policy: built-in table plus configured extras
    pub fn clear_policy(&self) -> ClearPolicy {
        let policy = self
            .list_fields
            .iter()
            .fold(ClearPolicy::default(), |p, key| p.with_list_field(key.as_str()));
        self.map_fields
            .iter()
            .fold(policy, |p, key| p.with_map_field(key.as_str()))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runform_core::Node;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.parse_cache_capacity, DEFAULT_PARSE_CACHE_CAPACITY);
        assert!(config.compute_missing_inputs);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"parse_cache_capacity": 8}"#).unwrap();
        assert_eq!(config.parse_cache_capacity, 8);
        assert!(config.compute_missing_inputs);
    }

    #[test]
    fn test_clear_policy_extras() {
        let policy = ResolverConfig::new()
            .with_list_field("hosts")
            .with_map_field("annotations")
            .clear_policy();
        assert_eq!(policy.empty_value(Some("hosts")), Node::array());
        assert_eq!(policy.empty_value(Some("annotations")), Node::object());
        assert_eq!(policy.empty_value(Some("tags")), Node::object());
    }
}
