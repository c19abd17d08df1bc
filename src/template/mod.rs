//! Templated attributes with live, inheritable class defaults.
//!
//! This module provides:
//!
//! - [`AttributeTemplate`]: Declared attributes and their per-class default slots
//! - [`Instance`]: An object with its own per-attribute override records
//!
//! Reading an attribute checks two levels, most specific first:
//!
//! 1. The instance's override record, if the instance ever set the attribute
//!    (including setting it to `None`)
//! 2. The nearest default slot walking from the instance's class up through
//!    its ancestors
//!
//! Defaults are read at access time, never copied into instances, so
//! changing a default retroactively changes every instance that has not
//! overridden it.

mod instance;
mod registry;

pub use instance::Instance;
pub use registry::AttributeTemplate;
