//! Registry configuration.
//!
//! Every setting has a default, so configuration can be built in code or
//! deserialized from any serde format with only the fields that differ:
//!
//! ```rust
//! use classy::{ClassyConfig, Propagation, RegistrationMode};
//!
//! let config: ClassyConfig = serde_json::from_str(
//!     r#"{ "aliases": { "registration": "sequential" } }"#,
//! ).unwrap();
//!
//! assert_eq!(config.aliases.registration, RegistrationMode::Sequential);
//! assert_eq!(config.subclasses.propagation, Propagation::Ancestors);
//! ```

use serde::{Deserialize, Serialize};

/// How a multi-key alias registration handles a duplicate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationMode {
    /// Validate every key before inserting any. A failed call leaves the
    /// map untouched.
    #[default]
    Atomic,
    /// Insert keys one at a time and stop at the first duplicate. Keys
    /// before the duplicate stay registered.
    Sequential,
}

/// Which descendant sets a derivation event updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Insert the new class into the set of every opted-in ancestor.
    #[default]
    Ancestors,
    /// Insert the new class only into the set of the nearest opted-in
    /// ancestor. An opted-in intermediate class hides its descendants from
    /// the roots above it.
    Nearest,
}

/// Settings for [`AliasRegistry`](crate::AliasRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    pub registration: RegistrationMode,
}

/// Settings for [`SubclassGraph`](crate::SubclassGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubclassConfig {
    pub propagation: Propagation,
}

/// Combined settings for all registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassyConfig {
    pub aliases: AliasConfig,
    pub subclasses: SubclassConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassyConfig::default();
        assert_eq!(config.aliases.registration, RegistrationMode::Atomic);
        assert_eq!(config.subclasses.propagation, Propagation::Ancestors);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ClassyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClassyConfig::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let config: ClassyConfig = serde_json::from_str(
            r#"{
                "aliases": { "registration": "sequential" },
                "subclasses": { "propagation": "nearest" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.aliases.registration, RegistrationMode::Sequential);
        assert_eq!(config.subclasses.propagation, Propagation::Nearest);
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let result: Result<AliasConfig, _> =
            serde_json::from_str(r#"{ "registration": "sometimes" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_snake_case() {
        let json = serde_json::to_string(&SubclassConfig {
            propagation: Propagation::Nearest,
        })
        .unwrap();
        assert_eq!(json, r#"{"propagation":"nearest"}"#);
    }
}
