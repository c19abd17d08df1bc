//! # Classy - registries for explicit type hierarchies
//!
//! `classy` provides three independent facilities for organizing a hierarchy
//! of classes recorded in a [`ClassTable`]:
//!
//! - [`AliasRegistry`]: Name classes with alias keys and look them up again,
//!   with one shared alias map per hierarchy
//! - [`SubclassGraph`]: Enumerate every class that transitively derives
//!   from an opted-in root
//! - [`AttributeTemplate`]: Declare attributes with live, inheritable class
//!   defaults that instances can override, including with `None`
//!
//! Alias registries and subclass graphs react to derivations, so they are
//! subscribed to the class table as [`DerivationObserver`]s. Together they
//! make a small plugin system: register implementations, enumerate them and
//! resolve them by name.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use classy::{AliasRegistry, ClassTable, SubclassGraph};
//!
//! let classes = ClassTable::new();
//! let aliases = Arc::new(AliasRegistry::<&str>::new());
//! let graph = Arc::new(SubclassGraph::new());
//! classes.subscribe(aliases.clone());
//! classes.subscribe(graph.clone());
//!
//! let base = classes.define("Base");
//! aliases.establish_root(base);
//! graph.opt_in(base);
//!
//! let child_a = classes.derive(base, "ChildA").unwrap();
//! aliases.register_alias(child_a, ["childA"]).unwrap();
//! let child_b = classes.derive(base, "ChildB").unwrap();
//! aliases.register_alias(child_b, ["childB"]).unwrap();
//!
//! assert_eq!(graph.subclasses(base), vec![child_a, child_b]);
//! assert_eq!(aliases.resolve_alias(base, &"childB"), Ok(child_b));
//! ```
//!
//! ## Configuration
//!
//! Registry behaviour that has more than one reasonable answer is
//! configurable through [`ClassyConfig`]: whether multi-key alias
//! registration is all-or-nothing ([`RegistrationMode`]) and which ancestors
//! a derivation updates ([`Propagation`]).
//!
//! ## Logging
//!
//! Registrations, derivations and forgets are reported through `tracing`
//! at debug and trace level. The crate never installs a subscriber.
//!
//! ## Thread Safety
//!
//! Every registry is internally synchronized with one lock per shared map
//! or set, so registries can be shared through `Arc`. Instance overrides
//! are changed through `&mut Instance`.

use std::sync::Arc;

pub mod alias;
pub mod class;
pub mod config;
pub mod error;
pub mod subclass;
pub mod template;

pub use alias::{AliasKey, AliasRegistry, HierarchyMap, Lookup};
pub use class::{ClassId, ClassInfo, ClassTable, DerivationObserver};
pub use config::{AliasConfig, ClassyConfig, Propagation, RegistrationMode, SubclassConfig};
pub use error::{AliasError, ClassError, TemplateError};
pub use subclass::SubclassGraph;
pub use template::{AttributeTemplate, Instance};

/// Creates an alias registry and subclass graph from one configuration and
/// subscribes both to `classes`.
///
/// # Example
///
/// ```rust
/// use classy::{ClassTable, ClassyConfig};
///
/// let classes = ClassTable::new();
/// let (aliases, graph) = classy::observe::<&str>(&classes, ClassyConfig::default());
///
/// let base = classes.define("Base");
/// aliases.establish_root(base);
/// graph.opt_in(base);
/// let child = classes.derive(base, "Child").unwrap();
///
/// assert!(aliases.is_member(child));
/// assert_eq!(graph.subclasses(base), vec![child]);
/// ```
pub fn observe<K: AliasKey>(
    classes: &ClassTable,
    config: ClassyConfig,
) -> (Arc<AliasRegistry<K>>, Arc<SubclassGraph>) {
    let aliases = Arc::new(AliasRegistry::<K>::with_config(config.aliases));
    let graph = Arc::new(SubclassGraph::with_config(config.subclasses));
    classes.subscribe(aliases.clone());
    classes.subscribe(graph.clone());
    (aliases, graph)
}
