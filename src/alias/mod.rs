//! Alias registry for naming classes within a hierarchy.
//!
//! This module provides:
//!
//! - [`AliasRegistry`]: Registers alias keys for classes and resolves them back
//! - [`HierarchyMap`]: The alias map shared, by identity, by every member of a hierarchy
//! - [`Lookup`]: Either a class handle or an alias key, for "alias or class" arguments
//!
//! Aliases are partitioned per hierarchy rather than globally, so two
//! unrelated hierarchies can reuse the same short key without colliding.

mod hierarchy;
mod lookup;
mod registry;

use std::fmt::Debug;
use std::hash::Hash;

pub use hierarchy::HierarchyMap;
pub use lookup::Lookup;
pub use registry::AliasRegistry;

/// Bounds required of alias keys.
///
/// Blanket-implemented; any hashable, cloneable, thread-safe value works.
/// Short string tokens (`&'static str`) or small enums are typical.
pub trait AliasKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> AliasKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
