//! Check presets for common configurations.

use treewalk_core::{Configuration, CHECKER_MODULE, TREE_WALKER_MODULE};

/// Preset configurations for treewalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Recommended checks with sensible defaults.
    #[default]
    Recommended,
    /// Strict checks with tighter limits.
    Strict,
    /// Minimal checks for gradual adoption.
    Minimal,
}

impl Preset {
    /// Every preset, in increasing strictness.
    pub const ALL: [Self; 3] = [Self::Minimal, Self::Recommended, Self::Strict];

    /// Lower-case preset name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Looks a preset up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Returns the module configurations of this preset.
    #[must_use]
    pub fn modules(self) -> Vec<Configuration> {
        match self {
            Self::Recommended => recommended_modules(),
            Self::Strict => strict_modules(),
            Self::Minimal => minimal_modules(),
        }
    }

    /// Returns a complete `Checker` configuration running this preset.
    #[must_use]
    pub fn configuration(self) -> Configuration {
        let mut walker = Configuration::new(TREE_WALKER_MODULE);
        for module in self.modules() {
            walker.add_child(module);
        }
        Configuration::new(CHECKER_MODULE).with_child(walker)
    }
}

/// Returns the recommended set of modules.
///
/// Includes:
/// - `FunctionLength` (50 lines)
/// - `FunctionName`, `TypeName`, `ConstantName`
/// - `ParameterNumber` (7)
/// - `ForbiddenCall` (`unwrap`, `expect`, `dbg!`, `todo!`, `unimplemented!`)
#[must_use]
pub fn recommended_modules() -> Vec<Configuration> {
    vec![
        Configuration::new("FunctionLength"),
        Configuration::new("FunctionName"),
        Configuration::new("TypeName"),
        Configuration::new("ConstantName"),
        Configuration::new("ParameterNumber"),
        Configuration::new("ForbiddenCall"),
    ]
}

/// Returns the strict set of modules.
///
/// Includes all recommended modules with tighter limits, plus:
/// - `NestingDepth` (3)
/// - `FileLength` (1000 lines)
/// - `LinePattern` (trailing whitespace)
#[must_use]
pub fn strict_modules() -> Vec<Configuration> {
    vec![
        Configuration::new("FunctionLength").with_attribute("max", "30"),
        Configuration::new("FunctionName"),
        Configuration::new("TypeName"),
        Configuration::new("ConstantName"),
        Configuration::new("ParameterNumber").with_attribute("max", "5"),
        Configuration::new("ForbiddenCall"),
        Configuration::new("NestingDepth").with_attribute("max", "3"),
        Configuration::new("FileLength").with_attribute("max", "1000"),
        Configuration::new("LinePattern"),
    ]
}

/// Returns the minimal set of modules.
///
/// For gradual adoption, only includes:
/// - `ForbiddenCall` (`unwrap` only)
#[must_use]
pub fn minimal_modules() -> Vec<Configuration> {
    vec![Configuration::new("ForbiddenCall")
        .with_attribute("methods", "unwrap")
        .with_attribute("macros", "")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_modules() {
        for preset in Preset::ALL {
            assert!(!preset.modules().is_empty());
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("lenient"), None);
    }

    #[test]
    fn test_presets_resolve() {
        let registry = crate::registry();
        for preset in Preset::ALL {
            for module in preset.modules() {
                assert!(
                    registry.instantiate(&module).is_ok(),
                    "{} in {} does not instantiate",
                    module.name(),
                    preset.name()
                );
            }
        }
    }

    #[test]
    fn test_configuration_shape() {
        let config = Preset::Strict.configuration();
        assert_eq!(config.name(), CHECKER_MODULE);
        let walker = config.child(TREE_WALKER_MODULE).expect("walker");
        assert_eq!(walker.children().len(), 9);
    }
}
