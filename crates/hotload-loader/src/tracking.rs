//! Load-tracking registry.
//!
//! A [`LoadTracker`] remembers every plugin id its loader successfully
//! handed to the host. Trackers are published under an instance name in a
//! [`TrackerDirectory`] created once at startup, so other components
//! (including code loaded through the loader itself) can ask "did loader X
//! load plugin Y" without reaching for global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// Append-only, ordered list of loaded plugin ids.
///
/// Written from the consumer tick only; reads may come from any thread.
#[derive(Debug, Default)]
pub struct LoadTracker {
    ids: RwLock<Vec<String>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an id. Duplicates are kept.
    pub fn record(&self, plugin_id: impl Into<String>) {
        self.ids.write().push(plugin_id.into());
    }

    pub fn has_loaded(&self, plugin_id: &str) -> bool {
        self.ids.read().iter().any(|id| id == plugin_id)
    }

    /// How many times `plugin_id` was loaded.
    pub fn load_count(&self, plugin_id: &str) -> usize {
        self.ids.read().iter().filter(|id| *id == plugin_id).count()
    }

    /// All ids in load order.
    pub fn snapshot(&self) -> Vec<String> {
        self.ids.read().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }
}

/// Named tracker instances living in this process.
#[derive(Debug, Default)]
pub struct TrackerDirectory {
    instances: RwLock<HashMap<String, Arc<LoadTracker>>>,
}

impl TrackerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `tracker` under `name`.
    ///
    /// The first instance published under a name keeps it; later attempts
    /// return `false`.
    pub fn publish(&self, name: impl Into<String>, tracker: Arc<LoadTracker>) -> bool {
        let name = name.into();
        let mut instances = self.instances.write();
        if instances.contains_key(&name) {
            warn!(instance = %name, "Loader instance already published, keeping the first");
            return false;
        }
        instances.insert(name, tracker);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<LoadTracker>> {
        self.instances.read().get(name).cloned()
    }

    /// Whether loader `instance` loaded `plugin_id`. Unknown instances answer `false`.
    pub fn query(&self, instance: &str, plugin_id: &str) -> bool {
        self.get(instance)
            .is_some_and(|tracker| tracker.has_loaded(plugin_id))
    }

    /// Published instance names, sorted.
    pub fn instance_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_keeps_order_and_duplicates() {
        let tracker = LoadTracker::new();
        assert!(tracker.is_empty());

        tracker.record("a");
        tracker.record("b");
        tracker.record("a");

        assert_eq!(tracker.snapshot(), vec!["a", "b", "a"]);
        assert_eq!(tracker.load_count("a"), 2);
        assert!(tracker.has_loaded("b"));
        assert!(!tracker.has_loaded("c"));
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_reads_during_concurrent_appends() {
        let tracker = Arc::new(LoadTracker::new());
        let writer = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for i in 0..500 {
                    tracker.record(format!("p{i}"));
                }
            })
        };
        let reader = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                let mut last = 0;
                for _ in 0..500 {
                    let len = tracker.len();
                    assert!(len >= last);
                    last = len;
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(tracker.len(), 500);
    }

    #[test]
    fn test_directory_query() {
        let directory = TrackerDirectory::new();
        let tracker = Arc::new(LoadTracker::new());
        tracker.record("Foo Mod");

        assert!(directory.publish("HotLoader", Arc::clone(&tracker)));
        assert!(directory.query("HotLoader", "Foo Mod"));
        assert!(!directory.query("HotLoader", "Bar"));
        assert!(!directory.query("Other", "Foo Mod"));
    }

    #[test]
    fn test_first_published_instance_wins() {
        let directory = TrackerDirectory::new();
        let first = Arc::new(LoadTracker::new());
        first.record("x");

        assert!(directory.publish("HotLoader", first));
        assert!(!directory.publish("HotLoader", Arc::new(LoadTracker::new())));
        assert!(directory.query("HotLoader", "x"));
        assert_eq!(directory.instance_names(), vec!["HotLoader"]);
    }
}
