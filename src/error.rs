//! Error types for class, alias and template operations.
//!
//! All errors are programmer errors surfaced synchronously at the call that
//! broke an invariant. Nothing here is transient, so nothing is retried.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::class::ClassId;

/// Error from the class table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// The class id does not belong to this table.
    #[error("unknown class {class}")]
    UnknownClass { class: ClassId },
}

/// Error from alias registration and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError<K: fmt::Debug> {
    /// The key is already bound within the same hierarchy map.
    ///
    /// Never resolved automatically; the caller must pick another key.
    #[error("alias {key:?} is already taken by class {existing}")]
    Duplicate { key: K, existing: ClassId },

    /// No class is registered under the key.
    #[error("could not find alias {key:?}")]
    Unknown { key: K },

    /// The class never established or attached to a hierarchy map.
    #[error("class {class} is not a member of any alias hierarchy")]
    NoHierarchy { class: ClassId },
}

/// Error from templated attribute access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The attribute is not declared on the class or any of its ancestors.
    #[error("attribute '{attribute}' is not declared for class {class}")]
    Undeclared { class: ClassId, attribute: Arc<str> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassTable;

    #[test]
    fn test_duplicate_alias_display() {
        let classes = ClassTable::new();
        let owner = classes.define("Owner");
        let err = AliasError::Duplicate {
            key: "childA",
            existing: owner,
        };
        let msg = err.to_string();
        assert!(msg.contains("already taken"));
        assert!(msg.contains("childA"));
        assert!(msg.contains("#0"));
    }

    #[test]
    fn test_unknown_alias_display() {
        let err: AliasError<&str> = AliasError::Unknown { key: "missing" };
        let msg = err.to_string();
        assert!(msg.contains("could not find alias"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_undeclared_attribute_display() {
        let classes = ClassTable::new();
        let widget = classes.define("Widget");
        let err = TemplateError::Undeclared {
            class: widget,
            attribute: Arc::from("sparkle"),
        };
        assert!(err.to_string().contains("'sparkle'"));
    }
}
