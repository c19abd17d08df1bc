//! Instances and their per-attribute override records.

use std::collections::HashMap;
use std::sync::Arc;

use crate::class::ClassId;

/// An object of some class, carrying the attributes it set explicitly.
///
/// The presence of an entry is the "has been set" flag, and the entry's
/// value may itself be `None`. An instance that set an attribute to `None`
/// therefore reads `None` forever after, while an instance that never set
/// it keeps following the class default.
///
/// Setters go through `&mut Instance`, so an instance shared across threads
/// needs the same external synchronization as any other mutable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<V> {
    class: ClassId,
    overrides: HashMap<Arc<str>, Option<V>>,
}

impl<V> Instance<V> {
    /// Creates an instance of `class` with no overrides.
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            overrides: HashMap::new(),
        }
    }

    /// Returns the class this is an instance of.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Returns true if the attribute was explicitly set on this instance.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    /// Returns the override record for an attribute.
    ///
    /// `None` means never set; `Some(None)` means explicitly set to the
    /// empty value.
    pub fn override_value(&self, name: &str) -> Option<&Option<V>> {
        self.overrides.get(name)
    }

    /// Returns the names of every attribute set on this instance.
    pub fn overridden(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(|name| &**name)
    }

    /// Drops every override, so all attributes read class defaults again.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub(crate) fn record(&mut self, name: Arc<str>, value: Option<V>) {
        self.overrides.insert(name, value);
    }

    pub(crate) fn forget(&mut self, name: &str) -> bool {
        self.overrides.remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassTable;

    #[test]
    fn test_fresh_instance_has_no_overrides() {
        let classes = ClassTable::new();
        let widget = classes.define("Widget");
        let instance: Instance<&str> = Instance::new(widget);

        assert_eq!(instance.class(), widget);
        assert!(!instance.is_overridden("awesomeness"));
        assert_eq!(instance.override_value("awesomeness"), None);
        assert_eq!(instance.overridden().count(), 0);
    }

    #[test]
    fn test_empty_override_is_still_an_override() {
        let classes = ClassTable::new();
        let widget = classes.define("Widget");
        let mut instance: Instance<&str> = Instance::new(widget);

        instance.record(Arc::from("awesomeness"), None);

        assert!(instance.is_overridden("awesomeness"));
        assert_eq!(instance.override_value("awesomeness"), Some(&None));
    }

    #[test]
    fn test_forget_and_clear() {
        let classes = ClassTable::new();
        let widget = classes.define("Widget");
        let mut instance = Instance::new(widget);
        instance.record(Arc::from("a"), Some(1));
        instance.record(Arc::from("b"), Some(2));

        assert!(instance.forget("a"));
        assert!(!instance.forget("a"));
        assert_eq!(instance.overridden().collect::<Vec<_>>(), vec!["b"]);

        instance.clear_overrides();
        assert!(!instance.is_overridden("b"));
    }
}
