//! Tracking of every class that derives from an opted-in root.
//!
//! A [`SubclassGraph`] subscribed to a [`ClassTable`] captures derivation
//! events as they happen. The event cannot be replayed, so only
//! derivations observed after a root opted in are recorded.
//!
//! # Propagation
//!
//! With the default [`Propagation::Ancestors`], each derivation walks the
//! new class's full ancestor chain and inserts it into the set of every
//! opted-in ancestor, so grandchildren show up without the intermediate
//! classes doing anything. [`Propagation::Nearest`] stops at the first
//! opted-in ancestor.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use classy::{ClassTable, SubclassGraph};
//!
//! let classes = ClassTable::new();
//! let graph = Arc::new(SubclassGraph::new());
//! classes.subscribe(graph.clone());
//!
//! let parent = classes.define("Parent");
//! graph.opt_in(parent);
//!
//! let a = classes.derive(parent, "ChildA").unwrap();
//! let b = classes.derive(parent, "ChildB").unwrap();
//! let b1 = classes.derive(b, "ChildB1").unwrap();
//!
//! assert_eq!(graph.subclasses(parent), vec![a, b, b1]);
//! ```

use std::collections::{HashMap, HashSet};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::class::{ClassId, ClassTable, DerivationObserver};
use crate::config::{Propagation, SubclassConfig};

/// Descendant sets for every opted-in root.
///
/// Each set has its own lock; derivations only lock the sets they touch.
#[derive(Debug, Default)]
pub struct SubclassGraph {
    sets: RwLock<HashMap<ClassId, Mutex<HashSet<ClassId>>>>,
    config: SubclassConfig,
}

impl SubclassGraph {
    /// Creates an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given configuration.
    pub fn with_config(config: SubclassConfig) -> Self {
        Self {
            sets: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the graph configuration.
    pub fn config(&self) -> &SubclassConfig {
        &self.config
    }

    /// Starts tracking descendants of `root`.
    ///
    /// Opting in again keeps the set already collected.
    pub fn opt_in(&self, root: ClassId) {
        let mut sets = self.sets.write();
        if sets.contains_key(&root) {
            return;
        }
        sets.insert(root, Mutex::new(HashSet::new()));
        debug!(root = %root, "opted in to subclass tracking");
    }

    /// Returns true if `root` tracks its descendants.
    pub fn is_opted_in(&self, root: ClassId) -> bool {
        self.sets.read().contains_key(&root)
    }

    /// Returns every recorded descendant of `root`, in definition order.
    ///
    /// The underlying set is unordered; sorting by id only makes the output
    /// deterministic. A class that never opted in has no descendants.
    pub fn subclasses(&self, root: ClassId) -> Vec<ClassId> {
        let sets = self.sets.read();
        let mut found: Vec<ClassId> = match sets.get(&root) {
            Some(set) => set.lock().iter().copied().collect(),
            None => return Vec::new(),
        };
        found.sort();
        found
    }

    /// Returns true if `class` is recorded as a descendant of `root`.
    pub fn knows(&self, root: ClassId, class: ClassId) -> bool {
        self.sets
            .read()
            .get(&root)
            .is_some_and(|set| set.lock().contains(&class))
    }

    /// Empties the descendant set of `root` in place.
    ///
    /// `root` stays opted in and records later derivations.
    pub fn forget_subclasses(&self, root: ClassId) {
        if let Some(set) = self.sets.read().get(&root) {
            set.lock().clear();
            debug!(root = %root, "forgot subclasses");
        }
    }
}

impl DerivationObserver for SubclassGraph {
    fn on_derive(&self, classes: &ClassTable, parent: ClassId, child: ClassId) {
        let sets = self.sets.read();
        if sets.is_empty() {
            return;
        }

        for ancestor in classes.lineage(parent) {
            if let Some(set) = sets.get(&ancestor) {
                set.lock().insert(child);
                trace!(root = %ancestor, child = %child, "recorded subclass");
                if self.config.propagation == Propagation::Nearest {
                    break;
                }
            }
        }
    }
}
