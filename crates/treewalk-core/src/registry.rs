//! Name-based module registry and typed property binding.

use crate::check::{Check, CheckBox};
use crate::config::Configuration;
use crate::error::EngineError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Attributes consumed by the engine and never passed to a check.
pub(crate) const ENGINE_ATTRIBUTES: &[&str] = &["id", "severity", "tokens"];

/// A named, typed setter for one configurable field of a check.
pub struct Property<C> {
    /// Attribute name as written in the configuration.
    pub name: &'static str,
    /// Parses and stores the value; the error text is shown to the user.
    pub set: fn(&mut C, &str) -> Result<(), String>,
}

/// Checks that can be configured from attributes.
///
/// # Example
///
/// ```ignore
/// impl Configurable for FileLengthCheck {
///     const PROPERTIES: &'static [Property<Self>] = &[Property {
///         name: "max",
///         set: |check, value| {
///             check.max = parse_usize(value)?;
///             Ok(())
///         },
///     }];
/// }
/// ```
pub trait Configurable: Sized + 'static {
    /// Every property this check accepts.
    const PROPERTIES: &'static [Property<Self>];
}

type Factory = Arc<dyn Fn(&Configuration) -> Result<CheckBox, EngineError> + Send + Sync>;

#[derive(Clone)]
struct Entry {
    factory: Factory,
    description: &'static str,
}

/// Maps module names to check factories.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    entries: BTreeMap<String, Entry>,
    packages: Vec<String>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.entries.keys().collect::<Vec<_>>())
            .field("packages", &self.packages)
            .finish()
    }
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package prefix tried during resolution.
    #[must_use]
    pub fn with_package(mut self, prefix: impl Into<String>) -> Self {
        self.add_package(prefix);
        self
    }

    /// Adds a package prefix in place. Duplicates are ignored.
    pub fn add_package(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        if !self.packages.contains(&prefix) {
            self.packages.push(prefix);
        }
    }

    /// Registers a check type under its fully qualified name.
    pub fn register<C>(&mut self, name: impl Into<String>) -> &mut Self
    where
        C: Check + Configurable + Default,
    {
        let name = name.into();
        let module = name.clone();
        let factory: Factory = Arc::new(move |config: &Configuration| {
            let mut check = C::default();
            for (key, value) in config.attributes() {
                if ENGINE_ATTRIBUTES.contains(&key.as_str()) {
                    continue;
                }
                let property = C::PROPERTIES
                    .iter()
                    .find(|p| p.name == key)
                    .ok_or_else(|| EngineError::UnknownProperty {
                        module: module.clone(),
                        property: key.clone(),
                    })?;
                (property.set)(&mut check, value).map_err(|message| EngineError::Property {
                    module: module.clone(),
                    property: key.clone(),
                    value: value.clone(),
                    message,
                })?;
            }
            Ok(Box::new(check) as CheckBox)
        });
        let description = C::default().description();
        debug!(module = %name, "registered check");
        self.entries.insert(
            name,
            Entry {
                factory,
                description,
            },
        );
        self
    }

    /// Resolves a configured name to a registered module name.
    ///
    /// Candidates are tried in order: the name itself, each package prefix
    /// plus the name, the name plus `Check`, each package prefix plus the
    /// name plus `Check`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ModuleResolution`] listing every candidate.
    pub fn resolve(&self, name: &str) -> Result<&str, EngineError> {
        let candidates = self.candidates(name);
        candidates
            .iter()
            .find_map(|c| self.entries.get_key_value(c.as_str()))
            .map(|(key, _)| key.as_str())
            .ok_or_else(|| EngineError::ModuleResolution {
                name: name.to_string(),
                tried: candidates.clone(),
            })
    }

    fn candidates(&self, name: &str) -> Vec<String> {
        let suffixed = format!("{name}Check");
        let mut candidates = vec![name.to_string()];
        candidates.extend(self.packages.iter().map(|p| format!("{p}{name}")));
        candidates.push(suffixed.clone());
        candidates.extend(self.packages.iter().map(|p| format!("{p}{suffixed}")));
        candidates
    }

    /// Resolves and configures a check from its configuration node.
    ///
    /// Returns the resolved module name with the instance.
    ///
    /// # Errors
    ///
    /// Fails on resolution errors, unknown attributes or rejected values.
    pub fn instantiate(&self, config: &Configuration) -> Result<(String, CheckBox), EngineError> {
        let module = self.resolve(config.name())?;
        let entry = &self.entries[module];
        let check = (entry.factory)(config)?;
        Ok((module.to_string(), check))
    }

    /// Registered names with their descriptions, in name order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.description))
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses `true`/`false` (also `yes`/`no`, `on`/`off`).
///
/// # Errors
///
/// Returns a message for any other value.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => Err(format!("`{other}` is not a boolean")),
    }
}

/// Parses a non-negative integer.
///
/// # Errors
///
/// Returns a message if the value is not a valid integer.
pub fn parse_usize(value: &str) -> Result<usize, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("`{value}` is not a non-negative integer: {e}"))
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
///
/// # Errors
///
/// Never fails; the signature matches the other property parsers.
pub fn parse_list(value: &str) -> Result<Vec<String>, String> {
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    #[derive(Default)]
    struct LengthCheck {
        max: usize,
        strict: bool,
    }

    impl Check for LengthCheck {
        fn default_tokens(&self) -> Vec<TokenType> {
            vec![TokenType::new(1)]
        }

        fn description(&self) -> &'static str {
            "limits length"
        }
    }

    impl Configurable for LengthCheck {
        const PROPERTIES: &'static [Property<Self>] = &[
            Property {
                name: "max",
                set: |check, value| {
                    check.max = parse_usize(value)?;
                    Ok(())
                },
            },
            Property {
                name: "strict",
                set: |check, value| {
                    check.strict = parse_bool(value)?;
                    Ok(())
                },
            },
        ];
    }

    fn registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new().with_package("demo::");
        registry.register::<LengthCheck>("demo::LengthCheck");
        registry
    }

    #[test]
    fn resolves_with_package_and_suffix() {
        let registry = registry();
        assert_eq!(registry.resolve("demo::LengthCheck").unwrap(), "demo::LengthCheck");
        assert_eq!(registry.resolve("LengthCheck").unwrap(), "demo::LengthCheck");
        assert_eq!(registry.resolve("Length").unwrap(), "demo::LengthCheck");
    }

    #[test]
    fn resolution_failure_lists_candidates_in_order() {
        let err = registry().resolve("Width").unwrap_err();
        match err {
            EngineError::ModuleResolution { name, tried } => {
                assert_eq!(name, "Width");
                assert_eq!(
                    tried,
                    vec!["Width", "demo::Width", "WidthCheck", "demo::WidthCheck"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn instantiate_applies_properties_and_skips_engine_attributes() {
        let config = Configuration::new("Length")
            .with_attribute("max", "10")
            .with_attribute("strict", "yes")
            .with_attribute("id", "len")
            .with_attribute("severity", "warning")
            .with_attribute("tokens", "FN_DEF");
        let (module, _check) = registry().instantiate(&config).unwrap();
        assert_eq!(module, "demo::LengthCheck");
    }

    #[test]
    fn unknown_property_is_rejected() {
        let config = Configuration::new("Length").with_attribute("colour", "red");
        let Err(err) = registry().instantiate(&config) else {
            panic!("`colour` must be rejected");
        };
        assert!(matches!(
            err,
            EngineError::UnknownProperty { ref property, .. } if property == "colour"
        ));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let config = Configuration::new("Length").with_attribute("max", "many");
        let Err(err) = registry().instantiate(&config) else {
            panic!("`many` must be rejected");
        };
        assert!(matches!(err, EngineError::Property { ref value, .. } if value == "many"));
    }

    #[test]
    fn lists_modules_with_descriptions() {
        let registry = registry();
        let modules: Vec<_> = registry.modules().collect();
        assert_eq!(modules, vec![("demo::LengthCheck", "limits length")]);
    }

    #[test]
    fn list_parser_trims() {
        assert_eq!(parse_list(" a, b ,,c").unwrap(), vec!["a", "b", "c"]);
    }
}
