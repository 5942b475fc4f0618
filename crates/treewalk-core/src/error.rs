//! Fatal engine errors, raised while building a checker.

use crate::config::ConfigError;
use miette::Diagnostic;

/// Errors that stop a run before any file is processed.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum EngineError {
    /// No registered module matched a configured name.
    #[error("Unable to instantiate module `{name}`")]
    #[diagnostic(
        code(treewalk::module_resolution),
        help("tried: {}", tried.join(", "))
    )]
    ModuleResolution {
        /// Name as configured.
        name: String,
        /// Every candidate name that was looked up.
        tried: Vec<String>,
    },

    /// A configured token is unknown or not acceptable for the check.
    #[error("Token `{token}` is not acceptable for module `{module}`")]
    #[diagnostic(code(treewalk::illegal_token))]
    IllegalToken {
        /// Module the token was configured on.
        module: String,
        /// Token name as configured.
        token: String,
    },

    /// A check declares required tokens outside its acceptable tokens.
    #[error("Required token `{token}` of module `{module}` is not acceptable")]
    #[diagnostic(
        code(treewalk::required_not_acceptable),
        help("required tokens must be a subset of acceptable tokens")
    )]
    RequiredNotAcceptable {
        /// Offending module.
        module: String,
        /// Token name (or id when the vocabulary has no name for it).
        token: String,
    },

    /// A configured attribute has no matching property.
    #[error("Property `{property}` does not exist in module `{module}`")]
    #[diagnostic(code(treewalk::unknown_property))]
    UnknownProperty {
        /// Module the attribute was configured on.
        module: String,
        /// Attribute name.
        property: String,
    },

    /// A property setter rejected the configured value.
    #[error("Cannot set property `{property}` of module `{module}` to `{value}`: {message}")]
    #[diagnostic(code(treewalk::property))]
    Property {
        /// Module the attribute was configured on.
        module: String,
        /// Attribute name.
        property: String,
        /// Configured value.
        value: String,
        /// Setter diagnostic.
        message: String,
    },

    /// The configuration tree has the wrong shape.
    #[error("Invalid configuration structure: {message}")]
    #[diagnostic(code(treewalk::invalid_structure))]
    InvalidStructure {
        /// What is wrong.
        message: String,
    },

    /// The worker pool could not be started.
    #[error("Cannot start {threads} worker threads: {message}")]
    #[diagnostic(code(treewalk::thread_pool))]
    ThreadPool {
        /// Requested thread count.
        threads: usize,
        /// Pool builder diagnostic.
        message: String,
    },

    /// Loading the configuration failed.
    #[error(transparent)]
    #[diagnostic(code(treewalk::config))]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_lists_candidates() {
        let err = EngineError::ModuleResolution {
            name: "Foo".to_string(),
            tried: vec!["Foo".to_string(), "FooCheck".to_string()],
        };
        assert_eq!(err.to_string(), "Unable to instantiate module `Foo`");
        let help = err.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("tried: Foo, FooCheck"));
    }
}
