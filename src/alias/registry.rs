//! Per-hierarchy alias registration and resolution.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::{AliasKey, HierarchyMap, Lookup};
use crate::class::{ClassId, ClassTable, DerivationObserver};
use crate::config::AliasConfig;
use crate::error::AliasError;

/// Registry of alias keys, one shared map per hierarchy.
///
/// A class joins a hierarchy in one of three ways:
///
/// 1. [`establish_root`](Self::establish_root) gives it a fresh map
/// 2. [`attach`](Self::attach) points it at another member's map
/// 3. Deriving from a member (when the registry is subscribed to the
///    [`ClassTable`]) hands the child its parent's map
///
/// In every case the member holds a handle to the *same* map, so a key
/// registered by any member is visible to, and reserved for, all of them.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use classy::{AliasError, AliasRegistry, ClassTable};
///
/// let classes = ClassTable::new();
/// let aliases = Arc::new(AliasRegistry::<&str>::new());
/// classes.subscribe(aliases.clone());
///
/// let base = classes.define("Base");
/// aliases.establish_root(base);
/// aliases.register_alias(base, ["pop"]).unwrap();
///
/// let kid = classes.derive(base, "Kid").unwrap();
/// aliases.register_alias(kid, ["kid"]).unwrap();
///
/// assert_eq!(aliases.resolve_alias(base, &"kid"), Ok(kid));
/// assert_eq!(aliases.resolve(base, kid), Ok(kid));
/// assert!(matches!(
///     aliases.register_alias(kid, ["pop"]),
///     Err(AliasError::Duplicate { .. })
/// ));
/// ```
pub struct AliasRegistry<K> {
    members: RwLock<HashMap<ClassId, HierarchyMap<K>>>,
    config: AliasConfig,
}

impl<K: AliasKey> Default for AliasRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AliasKey> AliasRegistry<K> {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AliasConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    pub fn with_config(config: AliasConfig) -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the registry configuration.
    pub fn config(&self) -> &AliasConfig {
        &self.config
    }

    /// Makes `class` the owner of a fresh, empty hierarchy map.
    ///
    /// Calling this again on a class that already belongs to a hierarchy
    /// keeps the existing map. Returns the class's map either way.
    pub fn establish_root(&self, class: ClassId) -> HierarchyMap<K> {
        let mut members = self.members.write();
        if let Some(existing) = members.get(&class) {
            warn!(class = %class, "class already belongs to an alias hierarchy; keeping its map");
            return existing.clone();
        }
        let map = HierarchyMap::new();
        members.insert(class, map.clone());
        debug!(class = %class, "established alias hierarchy root");
        map
    }

    /// Points `member` at the hierarchy map of `unit`.
    ///
    /// The handle is copied, not the data, so `member` and `unit` share one
    /// map from here on. Attach before registering any alias on `member`;
    /// a map `member` held before is dropped from its view.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::NoHierarchy`] if `unit` has no map.
    pub fn attach(&self, member: ClassId, unit: ClassId) -> Result<(), AliasError<K>> {
        let mut members = self.members.write();
        let map = members
            .get(&unit)
            .cloned()
            .ok_or(AliasError::NoHierarchy { class: unit })?;
        members.insert(member, map);
        debug!(member = %member, unit = %unit, "attached to alias hierarchy");
        Ok(())
    }

    /// Returns true if `class` belongs to a hierarchy.
    pub fn is_member(&self, class: ClassId) -> bool {
        self.members.read().contains_key(&class)
    }

    /// Returns the hierarchy map `class` belongs to.
    pub fn hierarchy(&self, class: ClassId) -> Option<HierarchyMap<K>> {
        self.members.read().get(&class).cloned()
    }

    fn map_for(&self, class: ClassId) -> Result<HierarchyMap<K>, AliasError<K>> {
        self.hierarchy(class)
            .ok_or(AliasError::NoHierarchy { class })
    }

    /// Registers one or more alias keys for `class`.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Duplicate`] if a key is already bound anywhere
    /// in the hierarchy, whichever member bound it. With
    /// [`RegistrationMode::Atomic`](crate::RegistrationMode::Atomic) nothing
    /// from this call is registered on failure; with
    /// [`RegistrationMode::Sequential`](crate::RegistrationMode::Sequential)
    /// keys before the duplicate stay registered.
    ///
    /// Returns [`AliasError::NoHierarchy`] if `class` is not a member.
    pub fn register_alias<I>(&self, class: ClassId, keys: I) -> Result<(), AliasError<K>>
    where
        I: IntoIterator<Item = K>,
    {
        let map = self.map_for(class)?;
        let keys: Vec<K> = keys.into_iter().collect();
        debug!(class = %class, keys = ?keys, "registering aliases");
        map.register(class, keys, self.config.registration)
    }

    /// Resolves a class or alias within the hierarchy of `scope`.
    ///
    /// A [`Lookup::Class`] is returned unchanged, so callers can accept
    /// "alias or class" arguments interchangeably. Resolution never mutates
    /// the map.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::Unknown`] if the alias is not registered, or
    /// [`AliasError::NoHierarchy`] if `scope` is not a member.
    pub fn resolve(
        &self,
        scope: ClassId,
        lookup: impl Into<Lookup<K>>,
    ) -> Result<ClassId, AliasError<K>> {
        match lookup.into() {
            Lookup::Class(class) => Ok(class),
            Lookup::Alias(key) => {
                let map = self.map_for(scope)?;
                map.get(&key).ok_or(AliasError::Unknown { key })
            }
        }
    }

    /// Resolves an alias key within the hierarchy of `scope`.
    pub fn resolve_alias(&self, scope: ClassId, key: &K) -> Result<ClassId, AliasError<K>> {
        let map = self.map_for(scope)?;
        map.get(key)
            .ok_or_else(|| AliasError::Unknown { key: key.clone() })
    }

    /// Returns a copy of every alias visible to `class`'s hierarchy.
    ///
    /// Mutating the returned map has no effect on the registry. See
    /// [`live_aliases`](Self::live_aliases) for the shared map itself.
    pub fn aliases(&self, class: ClassId) -> Result<HashMap<K, ClassId>, AliasError<K>> {
        Ok(self.map_for(class)?.snapshot())
    }

    /// Returns the live hierarchy map of `class`.
    ///
    /// Opt-in and dangerous: writes through the handle (such as
    /// [`HierarchyMap::insert_unchecked`]) bypass the duplicate check and
    /// are immediately visible to every member of the hierarchy.
    pub fn live_aliases(&self, class: ClassId) -> Result<HierarchyMap<K>, AliasError<K>> {
        self.map_for(class)
    }

    /// Returns every key in `scope`'s hierarchy that resolves to `target`.
    pub fn aliases_of(&self, scope: ClassId, target: ClassId) -> Result<Vec<K>, AliasError<K>> {
        Ok(self.map_for(scope)?.keys_for(target))
    }

    /// Clears every alias in `class`'s hierarchy.
    ///
    /// The map is emptied in place; all members see the empty map at once
    /// and can register new aliases afterwards.
    pub fn forget_aliases(&self, class: ClassId) -> Result<(), AliasError<K>> {
        self.map_for(class)?.clear();
        debug!(class = %class, "forgot aliases");
        Ok(())
    }
}

impl<K: AliasKey> DerivationObserver for AliasRegistry<K> {
    fn on_derive(&self, _classes: &ClassTable, parent: ClassId, child: ClassId) {
        let mut members = self.members.write();
        if let Some(map) = members.get(&parent).cloned() {
            members.insert(child, map);
            debug!(parent = %parent, child = %child, "threaded alias hierarchy to subclass");
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for AliasRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("members", &*self.members.read())
            .field("config", &self.config)
            .finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    proptest! {
        #[test]
        fn hierarchies_never_see_each_others_aliases(
            keys in prop::collection::hash_set("[a-z]{1,8}", 1..12),
        ) {
            let classes = ClassTable::new();
            let aliases = Arc::new(AliasRegistry::<String>::new());
            classes.subscribe(aliases.clone());

            let first = classes.define("First");
            let second = classes.define("Second");
            aliases.establish_root(first);
            aliases.establish_root(second);
            let first_child = classes.derive(first, "FirstChild").unwrap();
            let second_child = classes.derive(second, "SecondChild").unwrap();

            aliases.register_alias(first_child, keys.iter().cloned()).unwrap();
            aliases.register_alias(second_child, keys.iter().cloned()).unwrap();

            for key in &keys {
                prop_assert_eq!(aliases.resolve_alias(first, key), Ok(first_child));
                prop_assert_eq!(aliases.resolve_alias(second, key), Ok(second_child));
            }
        }

        #[test]
        fn failed_atomic_registration_leaves_map_unchanged(
            existing in prop::collection::hash_set("[a-z]{1,6}", 1..8),
            fresh in prop::collection::hash_set("[A-Z]{1,6}", 0..8),
        ) {
            let classes = ClassTable::new();
            let aliases = AliasRegistry::<String>::new();
            let base = classes.define("Base");
            aliases.establish_root(base);
            aliases.register_alias(base, existing.iter().cloned()).unwrap();
            let before = aliases.aliases(base).unwrap();

            // Any existing key makes the call fail, wherever it appears.
            let clash = existing.iter().next().cloned().unwrap();
            let mut attempt: Vec<String> = fresh.iter().cloned().collect();
            attempt.push(clash);

            let other = classes.define("Other");
            aliases.attach(other, base).unwrap();
            let is_duplicate = matches!(
                aliases.register_alias(other, attempt),
                Err(AliasError::Duplicate { .. })
            );
            prop_assert!(is_duplicate);
            prop_assert_eq!(aliases.aliases(base).unwrap(), before);
        }

        #[test]
        fn resolution_is_a_pure_read(
            keys in prop::collection::hash_set("[a-z]{1,8}", 1..10),
            repeats in 1usize..5,
        ) {
            let classes = ClassTable::new();
            let aliases = AliasRegistry::<String>::new();
            let base = classes.define("Base");
            aliases.establish_root(base);
            aliases.register_alias(base, keys.iter().cloned()).unwrap();
            let before = aliases.aliases(base).unwrap();

            for _ in 0..repeats {
                for key in &keys {
                    prop_assert_eq!(aliases.resolve_alias(base, key), Ok(base));
                }
            }
            let after: HashSet<String> = aliases.aliases(base).unwrap().into_keys().collect();
            prop_assert_eq!(after, before.into_keys().collect::<HashSet<_>>());
        }
    }
}
