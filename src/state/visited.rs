use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

/// Concurrency-safe registry of claimed page keys
///
/// One logical page may be reachable through several keys (raw href, path
/// with and without trailing slash). [`VisitedSet::claim`] checks and
/// registers a whole key set inside a single critical section, so two units
/// racing for the same page can never both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashMap<String, u32>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims a set of equivalent keys
    ///
    /// # Returns
    ///
    /// * `false` - none of the keys was registered; all of them now are and
    ///   the caller owns the page
    /// * `true` - at least one key was already registered; no new key is
    ///   added (the seen counters of the known keys are bumped) and the caller
    ///   must skip
    ///
    /// # Example
    ///
    /// ```
    /// use sitewalk::VisitedSet;
    ///
    /// let visited = VisitedSet::new();
    /// assert!(!visited.claim(["/about", "/about/"]));
    /// assert!(visited.claim(["/about/", "/about/#team"]));
    /// assert_eq!(visited.size(), 2);
    /// ```
    pub fn claim<I, S>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<S> = keys.into_iter().collect();
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);

        let already = keys.iter().any(|k| seen.contains_key(k.as_ref()));
        if already {
            for key in &keys {
                if let Some(count) = seen.get_mut(key.as_ref()) {
                    *count = count.saturating_add(1);
                }
            }
            return true;
        }

        for key in &keys {
            seen.insert(key.as_ref().to_string(), 1);
        }
        false
    }

    /// Returns true if the key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of registered keys
    pub fn size(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sorted copy of the key table with the number of times each key was seen
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}
