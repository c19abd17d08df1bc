//! Declared attributes and per-class default slots.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::Instance;
use crate::class::{ClassId, ClassTable};
use crate::error::TemplateError;

/// Templated attributes for the classes of one [`ClassTable`].
///
/// Declaring an attribute on an owner class makes it readable and writable
/// on the owner, its subclasses and all their instances. Each class may hold
/// its own default slot for the attribute; setting a default on a subclass
/// creates the subclass's slot and leaves the owner's untouched.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use classy::{AttributeTemplate, ClassTable};
///
/// let classes = Arc::new(ClassTable::new());
/// let widget = classes.define("Widget");
///
/// let template = AttributeTemplate::new(classes.clone());
/// template.declare(widget, ["awesomeness", "temperature"]);
/// template.set_default(widget, "awesomeness", Some("total")).unwrap();
///
/// let mut doodad = template.new_instance(widget);
/// assert_eq!(template.get(&doodad, "awesomeness"), Ok(Some("total")));
/// assert_eq!(template.get(&doodad, "temperature"), Ok(None));
///
/// // New defaults reach existing instances.
/// template.set_default(widget, "temperature", Some("cool")).unwrap();
/// assert_eq!(template.get(&doodad, "temperature"), Ok(Some("cool")));
///
/// // An explicit None is an override too.
/// template.set(&mut doodad, "awesomeness", None).unwrap();
/// template.set_default(widget, "awesomeness", Some("pretty_dang")).unwrap();
/// assert_eq!(template.get(&doodad, "awesomeness"), Ok(None));
/// ```
pub struct AttributeTemplate<V> {
    classes: Arc<ClassTable>,
    /// Attribute names declared directly on each owner, in declaration order.
    declared: RwLock<HashMap<ClassId, Vec<Arc<str>>>>,
    /// Default slots owned by each class. A present `None` is a slot holding
    /// the empty value, distinct from having no slot.
    defaults: RwLock<HashMap<ClassId, HashMap<Arc<str>, Option<V>>>>,
}

impl<V: Clone> AttributeTemplate<V> {
    /// Creates a template with no declared attributes.
    pub fn new(classes: Arc<ClassTable>) -> Self {
        Self {
            classes,
            declared: RwLock::new(HashMap::new()),
            defaults: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the class table this template walks for inheritance.
    pub fn classes(&self) -> &Arc<ClassTable> {
        &self.classes
    }

    /// Declares one or more attributes on `owner`.
    ///
    /// Each new name gets an empty default slot on `owner`. Names already
    /// visible on `owner`, whether declared on it or inherited from an
    /// ancestor, are skipped so the default they resolve to is unchanged.
    pub fn declare<I, S>(&self, owner: ClassId, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let lineage = self.classes.lineage(owner);
        let mut declared = self.declared.write();
        let mut defaults = self.defaults.write();

        for name in names {
            let name: Arc<str> = name.into();
            let visible = lineage.iter().any(|class| {
                declared
                    .get(class)
                    .is_some_and(|names| names.contains(&name))
            });
            if visible {
                continue;
            }
            defaults
                .entry(owner)
                .or_default()
                .insert(name.clone(), None);
            debug!(owner = %owner, attribute = %name, "declared templated attribute");
            declared.entry(owner).or_default().push(name);
        }
    }

    /// Returns true if `name` is declared on `class` or one of its ancestors.
    pub fn is_declared(&self, class: ClassId, name: &str) -> bool {
        let lineage = self.classes.lineage(class);
        self.declared_name(&lineage, name).is_some()
    }

    /// Returns every attribute visible on `class`.
    ///
    /// Names declared on `class` come first, followed by those of each
    /// ancestor in turn. A name declared at several levels appears once.
    pub fn attributes(&self, class: ClassId) -> Vec<Arc<str>> {
        let declared = self.declared.read();
        let mut names: Vec<Arc<str>> = Vec::new();
        for level in self.classes.lineage(class) {
            for name in declared.get(&level).into_iter().flatten() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Creates an instance of `class` with no overrides.
    pub fn new_instance(&self, class: ClassId) -> Instance<V> {
        Instance::new(class)
    }

    /// Reads an attribute on an instance.
    ///
    /// Returns the instance's own value if it ever set the attribute, even
    /// if that value is `None`. Otherwise returns the default of the nearest
    /// class with a slot, starting at the instance's class.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Undeclared`] if the attribute is not declared
    /// on the instance's class or any ancestor.
    pub fn get(&self, instance: &Instance<V>, name: &str) -> Result<Option<V>, TemplateError> {
        let lineage = self.classes.lineage(instance.class());
        self.require_declared(instance.class(), &lineage, name)?;

        if let Some(value) = instance.override_value(name) {
            return Ok(value.clone());
        }
        Ok(self.nearest_default(&lineage, name))
    }

    /// Sets an attribute on an instance.
    ///
    /// The value is recorded unconditionally, so setting `None` detaches the
    /// instance from later default changes just like any other value.
    pub fn set(
        &self,
        instance: &mut Instance<V>,
        name: &str,
        value: Option<V>,
    ) -> Result<(), TemplateError> {
        let lineage = self.classes.lineage(instance.class());
        let name = self.require_declared(instance.class(), &lineage, name)?;
        instance.record(name, value);
        Ok(())
    }

    /// Drops an instance's override so it follows class defaults again.
    ///
    /// Returns true if the instance had set the attribute.
    pub fn reset(&self, instance: &mut Instance<V>, name: &str) -> Result<bool, TemplateError> {
        let lineage = self.classes.lineage(instance.class());
        self.require_declared(instance.class(), &lineage, name)?;
        Ok(instance.forget(name))
    }

    /// Returns true if the instance explicitly set the attribute.
    pub fn is_overridden(&self, instance: &Instance<V>, name: &str) -> bool {
        instance.is_overridden(name)
    }

    /// Assigns the default held in `class`'s own slot.
    ///
    /// Creates the slot if `class` has none. Ancestor slots are never
    /// touched, so a subclass default shadows the owner's for that subclass
    /// and its descendants only.
    pub fn set_default(
        &self,
        class: ClassId,
        name: &str,
        value: Option<V>,
    ) -> Result<(), TemplateError> {
        let lineage = self.classes.lineage(class);
        let name = self.require_declared(class, &lineage, name)?;
        debug!(class = %class, attribute = %name, "set templated default");
        self.defaults
            .write()
            .entry(class)
            .or_default()
            .insert(name, value);
        Ok(())
    }

    /// Reads the default for `class`, walking up to the nearest slot.
    ///
    /// This is what an instance of `class` without an override would read.
    pub fn default(&self, class: ClassId, name: &str) -> Result<Option<V>, TemplateError> {
        let lineage = self.classes.lineage(class);
        self.require_declared(class, &lineage, name)?;
        Ok(self.nearest_default(&lineage, name))
    }

    /// Returns `class`'s own slot without consulting ancestors.
    ///
    /// `None` means `class` has no slot; `Some(None)` is a slot holding the
    /// empty value.
    pub fn own_default(&self, class: ClassId, name: &str) -> Option<Option<V>> {
        self.defaults
            .read()
            .get(&class)
            .and_then(|slots| slots.get(name))
            .cloned()
    }

    /// Removes `class`'s own slot, exposing the nearest ancestor's default.
    ///
    /// Returns true if a slot was removed.
    pub fn clear_default(&self, class: ClassId, name: &str) -> bool {
        self.defaults
            .write()
            .get_mut(&class)
            .is_some_and(|slots| slots.remove(name).is_some())
    }

    /// Removes every default slot of every class.
    ///
    /// Declarations survive; all attributes read `None` until new defaults
    /// are set. Meant for test setup.
    pub fn clear_defaults(&self) {
        self.defaults.write().clear();
        debug!("cleared templated defaults");
    }

    fn declared_name(&self, lineage: &[ClassId], name: &str) -> Option<Arc<str>> {
        let declared = self.declared.read();
        lineage.iter().find_map(|class| {
            declared
                .get(class)
                .and_then(|names| names.iter().find(|n| &***n == name))
                .cloned()
        })
    }

    fn require_declared(
        &self,
        class: ClassId,
        lineage: &[ClassId],
        name: &str,
    ) -> Result<Arc<str>, TemplateError> {
        self.declared_name(lineage, name)
            .ok_or_else(|| TemplateError::Undeclared {
                class,
                attribute: Arc::from(name),
            })
    }

    fn nearest_default(&self, lineage: &[ClassId], name: &str) -> Option<V> {
        let defaults = self.defaults.read();
        lineage
            .iter()
            .find_map(|class| defaults.get(class).and_then(|slots| slots.get(name)))
            .cloned()
            .flatten()
    }
}

impl<V: fmt::Debug> fmt::Debug for AttributeTemplate<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeTemplate")
            .field("declared", &*self.declared.read())
            .field("defaults", &*self.defaults.read())
            .finish()
    }
}
