//! Explicit class table standing in for a host type system.
//!
//! Rust has no runtime class derivation, so the hierarchy the registries work
//! on is modelled here: [`ClassTable`] is an arena of class descriptors, each
//! addressed by a copyable [`ClassId`] handle and knowing its parent.
//!
//! # Derivation Events
//!
//! Registries that need to react to new subtypes implement
//! [`DerivationObserver`] and are subscribed on the table. Every call to
//! [`ClassTable::derive`] records the new class first and then notifies each
//! observer exactly once, in subscription order:
//!
//! ```rust
//! use std::sync::Arc;
//! use classy::{ClassId, ClassTable, DerivationObserver};
//! use parking_lot::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<(ClassId, ClassId)>>);
//!
//! impl DerivationObserver for Recorder {
//!     fn on_derive(&self, _classes: &ClassTable, parent: ClassId, child: ClassId) {
//!         self.0.lock().push((parent, child));
//!     }
//! }
//!
//! let classes = ClassTable::new();
//! let recorder = Arc::new(Recorder::default());
//! classes.subscribe(recorder.clone());
//!
//! let base = classes.define("Base");
//! let child = classes.derive(base, "Child").unwrap();
//! assert_eq!(*recorder.0.lock(), vec![(base, child)]);
//! ```
//!
//! The table releases its own locks before notifying, so observers may read
//! it (walk ancestors, look up names) from inside `on_derive`. They must not
//! derive new classes re-entrantly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::ClassError;

static NEXT_TABLE: AtomicU64 = AtomicU64::new(0);

/// Handle to a class recorded in a [`ClassTable`].
///
/// An id is tagged with the table that issued it and is only meaningful to
/// that table: every table query treats a foreign id as unknown. Within one
/// table, ids are assigned in definition order, so comparing two ids
/// compares their definition order.
///
/// Registries key their state by `ClassId` alone and should be subscribed
/// to a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId {
    table: u64,
    index: usize,
}

impl ClassId {
    /// Returns the arena index of this class within its table.
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Descriptor of a single class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// The class handle
    pub id: ClassId,
    /// Human-readable class name (not required to be unique)
    pub name: Arc<str>,
    /// Direct parent, `None` for classes created with [`ClassTable::define`]
    pub parent: Option<ClassId>,
}

/// Receives the "class derived from class" event.
///
/// Implemented by [`AliasRegistry`](crate::AliasRegistry) and
/// [`SubclassGraph`](crate::SubclassGraph). The event fires once per
/// derivation and cannot be replayed, so an observer subscribed late never
/// learns about earlier derivations.
pub trait DerivationObserver: Send + Sync {
    /// Called after `child` has been recorded with `parent` as its parent.
    fn on_derive(&self, classes: &ClassTable, parent: ClassId, child: ClassId);
}

/// Arena of classes and their parent links.
///
/// The table is internally synchronized and is meant to be shared through an
/// `Arc`. Classes are never removed.
pub struct ClassTable {
    tag: u64,
    classes: RwLock<Vec<ClassInfo>>,
    observers: RwLock<Vec<Arc<dyn DerivationObserver>>>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    /// Creates an empty table with no observers.
    pub fn new() -> Self {
        Self {
            tag: NEXT_TABLE.fetch_add(1, Ordering::Relaxed),
            classes: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    fn next_id(&self, classes: &[ClassInfo]) -> ClassId {
        ClassId {
            table: self.tag,
            index: classes.len(),
        }
    }

    /// Arena slot of `id`, `None` for ids issued by another table.
    fn slot<'a>(&self, classes: &'a [ClassInfo], id: ClassId) -> Option<&'a ClassInfo> {
        if id.table != self.tag {
            return None;
        }
        classes.get(id.index)
    }

    /// Subscribes an observer to every later derivation.
    pub fn subscribe(&self, observer: Arc<dyn DerivationObserver>) {
        self.observers.write().push(observer);
    }

    /// Records a class without a parent.
    ///
    /// No derivation event fires. Parentless classes are hierarchy roots or
    /// controlling units that other classes attach to.
    pub fn define(&self, name: impl Into<Arc<str>>) -> ClassId {
        let mut classes = self.classes.write();
        let id = self.next_id(&classes);
        let name = name.into();
        debug!(class = %id, name = %name, "defined class");
        classes.push(ClassInfo {
            id,
            name,
            parent: None,
        });
        id
    }

    /// Records a class deriving from `parent` and fires the derivation event.
    ///
    /// # Errors
    ///
    /// Returns [`ClassError::UnknownClass`] if `parent` was not issued by this
    /// table.
    pub fn derive(
        &self,
        parent: ClassId,
        name: impl Into<Arc<str>>,
    ) -> Result<ClassId, ClassError> {
        let child = {
            let mut classes = self.classes.write();
            if self.slot(&classes, parent).is_none() {
                return Err(ClassError::UnknownClass { class: parent });
            }
            let id = self.next_id(&classes);
            let name = name.into();
            debug!(class = %id, name = %name, parent = %parent, "derived class");
            classes.push(ClassInfo {
                id,
                name,
                parent: Some(parent),
            });
            id
        };

        let observers = self.observers.read().clone();
        for observer in &observers {
            observer.on_derive(self, parent, child);
        }

        Ok(child)
    }

    /// Returns the descriptor of a class.
    pub fn get(&self, id: ClassId) -> Option<ClassInfo> {
        let classes = self.classes.read();
        self.slot(&classes, id).cloned()
    }

    /// Returns the name of a class.
    pub fn name(&self, id: ClassId) -> Option<Arc<str>> {
        let classes = self.classes.read();
        self.slot(&classes, id).map(|c| c.name.clone())
    }

    /// Returns the direct parent of a class.
    ///
    /// `None` both for parentless classes and for ids not in the table.
    pub fn parent(&self, id: ClassId) -> Option<ClassId> {
        let classes = self.classes.read();
        self.slot(&classes, id).and_then(|c| c.parent)
    }

    /// Finds the first class defined with the given name.
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.classes
            .read()
            .iter()
            .find(|c| &*c.name == name)
            .map(|c| c.id)
    }

    /// Returns true if `id` belongs to this table.
    pub fn contains(&self, id: ClassId) -> bool {
        let classes = self.classes.read();
        self.slot(&classes, id).is_some()
    }

    /// Returns the ancestors of a class, nearest first.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let classes = self.classes.read();
        let mut chain = Vec::new();
        let mut current = self.slot(&classes, id).and_then(|c| c.parent);
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.slot(&classes, ancestor).and_then(|c| c.parent);
        }
        chain
    }

    /// Returns the class followed by its ancestors, most specific first.
    ///
    /// Empty if `id` is not in this table.
    pub fn lineage(&self, id: ClassId) -> Vec<ClassId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut chain = vec![id];
        chain.extend(self.ancestors(id));
        chain
    }

    /// Returns true if `class` derives, directly or transitively, from `ancestor`.
    ///
    /// A class is not its own descendant.
    pub fn is_descendant_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(class).contains(&ancestor)
    }

    /// Returns the number of classes recorded.
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Returns true if no classes are recorded.
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTable")
            .field("classes", &*self.classes.read())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
