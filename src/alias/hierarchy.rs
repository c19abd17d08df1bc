//! The alias map shared by every member of one hierarchy.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::AliasKey;
use crate::class::ClassId;
use crate::config::RegistrationMode;
use crate::error::AliasError;

/// Handle to a hierarchy's alias-to-class map.
///
/// Cloning the handle does not copy the map: every clone refers to the same
/// storage, which is how all members of a hierarchy observe each other's
/// registrations. Use [`HierarchyMap::same_map`] to test identity.
///
/// # Thread Safety
///
/// Each map carries its own lock. Registration validates and inserts under
/// a single write lock, so concurrent registrations of the same key cannot
/// both succeed.
pub struct HierarchyMap<K> {
    entries: Arc<RwLock<HashMap<K, ClassId>>>,
}

impl<K> Clone for HierarchyMap<K> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: AliasKey> Default for HierarchyMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AliasKey> HierarchyMap<K> {
    /// Creates a fresh, empty map.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns true if both handles refer to the same map.
    pub fn same_map(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Looks up the class registered under `key`.
    pub fn get(&self, key: &K) -> Option<ClassId> {
        self.entries.read().get(key).copied()
    }

    /// Returns true if `key` is registered.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns the number of registered aliases.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no aliases are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> HashMap<K, ClassId> {
        self.entries.read().clone()
    }

    /// Returns every key bound to `class`.
    pub fn keys_for(&self, class: ClassId) -> Vec<K> {
        self.entries
            .read()
            .iter()
            .filter(|(_, c)| **c == class)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Inserts a binding without the duplicate check.
    ///
    /// This writes straight into the shared map and silently replaces an
    /// existing binding, breaking the one-class-per-key rule that
    /// [`AliasRegistry::register_alias`](crate::AliasRegistry::register_alias)
    /// enforces. Returns the class previously bound to `key`.
    pub fn insert_unchecked(&self, key: K, class: ClassId) -> Option<ClassId> {
        self.entries.write().insert(key, class)
    }

    /// Removes a binding, returning the class it pointed to.
    pub fn remove(&self, key: &K) -> Option<ClassId> {
        self.entries.write().remove(key)
    }

    /// Removes every binding. The map itself stays shared by all members.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Binds each key to `class`, rejecting keys already bound.
    ///
    /// A key repeated within `keys` counts as a duplicate of its first
    /// occurrence.
    pub(crate) fn register(
        &self,
        class: ClassId,
        keys: Vec<K>,
        mode: RegistrationMode,
    ) -> Result<(), AliasError<K>> {
        let mut entries = self.entries.write();

        match mode {
            RegistrationMode::Atomic => {
                for (i, key) in keys.iter().enumerate() {
                    if let Some(existing) = entries.get(key) {
                        return Err(AliasError::Duplicate {
                            key: key.clone(),
                            existing: *existing,
                        });
                    }
                    if keys[..i].contains(key) {
                        return Err(AliasError::Duplicate {
                            key: key.clone(),
                            existing: class,
                        });
                    }
                }
                entries.extend(keys.into_iter().map(|key| (key, class)));
            }
            RegistrationMode::Sequential => {
                for key in keys {
                    if let Some(existing) = entries.get(&key) {
                        return Err(AliasError::Duplicate {
                            existing: *existing,
                            key,
                        });
                    }
                    entries.insert(key, class);
                }
            }
        }

        Ok(())
    }
}

impl<K: fmt::Debug> fmt::Debug for HierarchyMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.read().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassTable;

    fn classes() -> (ClassTable, ClassId, ClassId) {
        let classes = ClassTable::new();
        let a = classes.define("A");
        let b = classes.define("B");
        (classes, a, b)
    }

    #[test]
    fn test_clone_shares_storage() {
        let (_classes, a, _) = classes();
        let map: HierarchyMap<&str> = HierarchyMap::new();
        let other = map.clone();

        map.insert_unchecked("a", a);
        assert_eq!(other.get(&"a"), Some(a));
        assert!(map.same_map(&other));
        assert!(!map.same_map(&HierarchyMap::new()));
    }

    #[test]
    fn test_atomic_registration_rolls_back() {
        let (_classes, a, b) = classes();
        let map = HierarchyMap::new();
        map.register(a, vec!["taken"], RegistrationMode::Atomic)
            .unwrap();

        let result = map.register(b, vec!["fresh", "taken"], RegistrationMode::Atomic);
        assert_eq!(
            result,
            Err(AliasError::Duplicate {
                key: "taken",
                existing: a
            })
        );
        assert!(!map.contains(&"fresh"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_sequential_registration_keeps_earlier_keys() {
        let (_classes, a, b) = classes();
        let map = HierarchyMap::new();
        map.register(a, vec!["taken"], RegistrationMode::Sequential)
            .unwrap();

        let result = map.register(
            b,
            vec!["fresh", "taken", "never"],
            RegistrationMode::Sequential,
        );
        assert!(matches!(result, Err(AliasError::Duplicate { key: "taken", .. })));
        assert_eq!(map.get(&"fresh"), Some(b));
        assert!(!map.contains(&"never"));
    }

    #[test]
    fn test_repeated_key_in_one_call() {
        let (_classes, a, _) = classes();
        let map = HierarchyMap::new();

        let result = map.register(a, vec!["twice", "twice"], RegistrationMode::Atomic);
        assert_eq!(
            result,
            Err(AliasError::Duplicate {
                key: "twice",
                existing: a
            })
        );
        assert!(map.is_empty());
    }

    #[test]
    fn test_keys_for_and_clear() {
        let (_classes, a, b) = classes();
        let map = HierarchyMap::new();
        map.register(a, vec!["x", "y"], RegistrationMode::Atomic)
            .unwrap();
        map.register(b, vec!["z"], RegistrationMode::Atomic).unwrap();

        let mut keys = map.keys_for(a);
        keys.sort();
        assert_eq!(keys, vec!["x", "y"]);

        let shared = map.clone();
        map.clear();
        assert!(shared.is_empty());
    }

    #[test]
    fn test_remove_is_seen_by_every_handle() {
        let (_classes, a, b) = classes();
        let map = HierarchyMap::new();
        map.register(a, vec!["gone", "kept"], RegistrationMode::Atomic)
            .unwrap();
        let shared = map.clone();

        assert_eq!(shared.remove(&"gone"), Some(a));
        assert_eq!(shared.remove(&"gone"), None);
        assert!(!map.contains(&"gone"));
        assert_eq!(map.get(&"kept"), Some(a));

        map.register(b, vec!["gone"], RegistrationMode::Atomic)
            .unwrap();
        assert_eq!(shared.get(&"gone"), Some(b));
    }

    #[test]
    fn test_debug_lists_entries() {
        let (_classes, a, _) = classes();
        let map = HierarchyMap::new();
        map.insert_unchecked("only", a);
        assert_eq!(format!("{:?}", map), format!(r#"{{"only": {:?}}}"#, a));
    }
}
