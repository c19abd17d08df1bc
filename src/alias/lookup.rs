//! Class-or-alias lookup argument.

use crate::class::ClassId;

/// Reference to a class, either directly or through an alias key.
///
/// This enum lets resolution accept a literal class and an alias
/// interchangeably; a literal class passes through resolution unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<K> {
    /// A class handle, returned as-is by resolution.
    Class(ClassId),
    /// An alias key, looked up in the caller's hierarchy map.
    Alias(K),
}

impl<K> Lookup<K> {
    /// Creates an alias lookup.
    pub fn alias(key: K) -> Self {
        Lookup::Alias(key)
    }
}

impl<K> From<ClassId> for Lookup<K> {
    fn from(class: ClassId) -> Self {
        Lookup::Class(class)
    }
}
