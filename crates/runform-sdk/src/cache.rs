//! Bounded parse cache
//!
//! The same template and input-set YAML comes back on every refetch, so
//! parsed trees are memoized by source text. Eviction is first-in first-out.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use runform_core::Node;
use runform_parser::{ParseError, YamlParser};

/// Parse cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries in cache
    pub size: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Arc<Node>>,
    order: VecDeque<String>,
    stats: CacheStats,
}

/// YAML parse results keyed by source text
#[derive(Debug)]
pub struct ParseCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Parse `yaml`, reusing an earlier result for identical text.
    /// Failures are not cached.
    pub fn parse(&self, yaml: &str) -> Result<Arc<Node>, ParseError> {
        if self.capacity == 0 {
            return YamlParser::parse_document(yaml).map(Arc::new);
        }

        {
            let mut inner = self.lock();
            if let Some(node) = inner.entries.get(yaml).cloned() {
                inner.stats.hits += 1;
                return Ok(node);
            }
            inner.stats.misses += 1;
        }

        let node = Arc::new(YamlParser::parse_document(yaml)?);

        let mut inner = self.lock();
        if !inner.entries.contains_key(yaml) {
            while inner.order.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(yaml.to_string());
            inner.entries.insert(yaml.to_string(), Arc::clone(&node));
        }
        inner.stats.size = inner.entries.len();
        Ok(node)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
        inner.stats.size = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
