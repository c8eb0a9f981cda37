use std::collections::HashMap;

/// World id to world name, kept for the life of the process.
///
/// World names almost never change, so entries are never evicted. A failed
/// lookup is stored as the raw id so it is not retried.
#[derive(Debug, Default)]
pub struct NameCache {
    names: HashMap<String, String>,
}

impl NameCache {
    /// Create a new empty NameCache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached name by world ID
    pub fn get(&self, world_id: &str) -> Option<&str> {
        self.names.get(world_id).map(String::as_str)
    }

    /// Store a name for a world ID
    pub fn insert(&mut self, world_id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(world_id.into(), name.into());
    }

    /// Get the number of cached names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = NameCache::new();
        assert!(cache.is_empty());
        cache.insert("wrld_1", "Home");
        assert_eq!(cache.get("wrld_1"), Some("Home"));
        assert_eq!(cache.get("wrld_2"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut cache = NameCache::new();
        cache.insert("wrld_1", "wrld_1");
        cache.insert("wrld_1", "Home");
        assert_eq!(cache.get("wrld_1"), Some("Home"));
        assert_eq!(cache.len(), 1);
    }
}
