//! The check plugin trait.

use crate::ast::Node;
use crate::collector::Reporter;
use crate::token::TokenType;
use crate::types::{short_name, Severity};
use std::collections::BTreeMap;

/// A failure raised by a check callback.
///
/// The engine turns it into a `general.check.failure` violation and mutes
/// the check for the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CheckError {
    /// Description of the failure.
    pub message: String,
}

impl CheckError {
    /// Creates a check error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type of check callbacks.
pub type CheckResult = Result<(), CheckError>;

/// A tree check, driven by the walker.
///
/// Per file the walker calls [`begin_tree`](Check::begin_tree) once, then
/// [`visit_token`](Check::visit_token) and [`leave_token`](Check::leave_token)
/// for every node whose type the check registered for, then
/// [`finish_tree`](Check::finish_tree). [`destroy`](Check::destroy) runs once
/// when the worker owning the instance is torn down.
///
/// # Example
///
/// ```ignore
/// use treewalk_core::{Check, CheckResult, Node, Reporter, TokenType};
///
/// #[derive(Default)]
/// pub struct NoLoopCheck;
///
/// impl Check for NoLoopCheck {
///     fn default_tokens(&self) -> Vec<TokenType> { vec![LOOP] }
///
///     fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
///         reporter.log_node(node, "loop.forbidden", &[]);
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send {
    /// Token types visited when no tokens are configured.
    fn default_tokens(&self) -> Vec<TokenType>;

    /// Token types a configuration may select.
    fn acceptable_tokens(&self) -> Vec<TokenType> {
        self.default_tokens()
    }

    /// Token types always visited, whatever the configuration says.
    fn required_tokens(&self) -> Vec<TokenType> {
        Vec::new()
    }

    /// Returns a brief description of what this check enforces.
    fn description(&self) -> &'static str {
        ""
    }

    /// English message templates used by this check, as `(key, template)`.
    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Called before the walk; `root` is `None` for empty files.
    ///
    /// # Errors
    ///
    /// An error mutes the check for the rest of the file.
    fn begin_tree(&mut self, _root: Option<Node<'_>>, _reporter: &mut Reporter<'_>) -> CheckResult {
        Ok(())
    }

    /// Called when the walker enters a registered node.
    ///
    /// # Errors
    ///
    /// An error mutes the check for the rest of the file.
    fn visit_token(&mut self, _node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        Ok(())
    }

    /// Called when the walker leaves a registered node.
    ///
    /// # Errors
    ///
    /// An error mutes the check for the rest of the file.
    fn leave_token(&mut self, _node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        Ok(())
    }

    /// Called after the walk.
    ///
    /// # Errors
    ///
    /// An error is reported like any other callback failure.
    fn finish_tree(
        &mut self,
        _root: Option<Node<'_>>,
        _reporter: &mut Reporter<'_>,
    ) -> CheckResult {
        Ok(())
    }

    /// Releases resources; called once per instance.
    fn destroy(&mut self) {}
}

/// Type alias for boxed [`Check`] trait objects.
pub type CheckBox = Box<dyn Check>;

/// Engine-side settings of one configured check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMeta {
    /// Fully qualified module name the configuration resolved to.
    pub module: String,
    /// Optional configured id.
    pub id: Option<String>,
    /// Severity of reported violations.
    pub severity: Severity,
    /// Configured token names; empty means "use the default tokens".
    pub tokens: Vec<String>,
    /// Message templates overriding the bundles for this module only.
    pub custom_messages: BTreeMap<String, String>,
}

impl CheckMeta {
    /// Creates metadata with default severity and no overrides.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            id: None,
            severity: Severity::default(),
            tokens: Vec::new(),
            custom_messages: BTreeMap::new(),
        }
    }

    /// Name used in logs and failure messages: the id when set, otherwise
    /// the short module name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.id
            .as_deref()
            .unwrap_or_else(|| short_name(&self.module))
    }
}

/// A check instance together with its engine-side settings.
pub struct RegisteredCheck {
    /// Engine-side settings.
    pub meta: CheckMeta,
    /// The instance.
    pub check: CheckBox,
}

impl std::fmt::Debug for RegisteredCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCheck")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Minimal;

    impl Check for Minimal {
        fn default_tokens(&self) -> Vec<TokenType> {
            vec![TokenType::new(4)]
        }
    }

    #[test]
    fn defaults_follow_default_tokens() {
        let check = Minimal;
        assert_eq!(check.acceptable_tokens(), vec![TokenType::new(4)]);
        assert!(check.required_tokens().is_empty());
        assert_eq!(check.description(), "");
    }

    #[test]
    fn display_name_prefers_id() {
        let mut meta = CheckMeta::new("treewalk_checks::FileLengthCheck");
        assert_eq!(meta.display_name(), "FileLengthCheck");
        meta.id = Some("files".to_string());
        assert_eq!(meta.display_name(), "files");
    }
}
