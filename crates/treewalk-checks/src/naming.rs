//! Naming convention checks.
//!
//! # Configuration
//!
//! - `format`: Regular expression every name must match

use crate::pattern::Pattern;
use treewalk_core::{Check, CheckResult, Configurable, Node, Property, Reporter, TokenType};
use treewalk_syntax::tokens::{
    CONST_DEF, ENUM_DEF, FN_DEF, METHOD_DEF, STATIC_DEF, STRUCT_DEF, TRAIT_DEF, TYPE_ALIAS,
};

/// Message key for a name that does not match its pattern.
pub const MSG_KEY: &str = "name.invalid.pattern";

const MESSAGES: &[(&str, &str)] = &[(MSG_KEY, "Name '{0}' must match pattern '{1}'")];

fn check_name(pattern: &mut Pattern, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
    let name = node.text().strip_prefix("r#").unwrap_or(node.text());
    if !pattern.regex()?.is_match(name) {
        reporter.log_node(node, MSG_KEY, &[&name, &pattern.source()]);
    }
    Ok(())
}

/// Validates function and method names (snake case by default).
#[derive(Debug, Clone)]
pub struct FunctionNameCheck {
    format: Pattern,
}

impl Default for FunctionNameCheck {
    fn default() -> Self {
        Self {
            format: Pattern::lazy("^[a-z_][a-z0-9_]*$"),
        }
    }
}

impl Check for FunctionNameCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![FN_DEF, METHOD_DEF]
    }

    fn description(&self) -> &'static str {
        "Checks that function names match a pattern"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        MESSAGES
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        check_name(&mut self.format, node, reporter)
    }
}

impl Configurable for FunctionNameCheck {
    const PROPERTIES: &'static [Property<Self>] = &[Property {
        name: "format",
        set: |check, value| {
            check.format = Pattern::compile(value)?;
            Ok(())
        },
    }];
}

/// Validates type names: structs, enums, traits and aliases (camel case by
/// default).
#[derive(Debug, Clone)]
pub struct TypeNameCheck {
    format: Pattern,
}

impl Default for TypeNameCheck {
    fn default() -> Self {
        Self {
            format: Pattern::lazy("^[A-Z][A-Za-z0-9]*$"),
        }
    }
}

impl Check for TypeNameCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![STRUCT_DEF, ENUM_DEF, TRAIT_DEF, TYPE_ALIAS]
    }

    fn description(&self) -> &'static str {
        "Checks that type names match a pattern"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        MESSAGES
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        check_name(&mut self.format, node, reporter)
    }
}

impl Configurable for TypeNameCheck {
    const PROPERTIES: &'static [Property<Self>] = &[Property {
        name: "format",
        set: |check, value| {
            check.format = Pattern::compile(value)?;
            Ok(())
        },
    }];
}

/// Validates `const` and `static` names (upper snake case by default).
#[derive(Debug, Clone)]
pub struct ConstantNameCheck {
    format: Pattern,
}

impl Default for ConstantNameCheck {
    fn default() -> Self {
        Self {
            format: Pattern::lazy("^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$"),
        }
    }
}

impl Check for ConstantNameCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![CONST_DEF, STATIC_DEF]
    }

    fn description(&self) -> &'static str {
        "Checks that constant names match a pattern"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        MESSAGES
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        // `const _: () = ...;` is an anonymous item.
        if node.text() == "_" {
            return Ok(());
        }
        check_name(&mut self.format, node, reporter)
    }
}

impl Configurable for ConstantNameCheck {
    const PROPERTIES: &'static [Property<Self>] = &[Property {
        name: "format",
        set: |check, value| {
            check.format = Pattern::compile(value)?;
            Ok(())
        },
    }];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check_code;
    use treewalk_core::Configuration;

    #[test]
    fn test_function_names() {
        let code = r"
fn good_name() {}
fn BadName() {}
impl S {
    fn alsoBad(&self) {}
    fn r#match() {}
}
";
        let violations = check_code(&Configuration::new("FunctionName"), code);
        let names: Vec<(usize, &str)> = violations
            .iter()
            .map(|v| (v.line, v.args[0].as_str()))
            .collect();
        assert_eq!(names, vec![(3, "BadName"), (5, "alsoBad")]);
        assert_eq!(
            violations[0].message,
            "Name 'BadName' must match pattern '^[a-z_][a-z0-9_]*$'"
        );
    }

    #[test]
    fn test_custom_format() {
        let config = Configuration::new("FunctionName").with_attribute("format", "^test_");
        let violations = check_code(&config, "fn test_a() {}\nfn helper() {}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn test_type_names() {
        let code = r"
struct Good;
struct bad_struct;
enum Fine { A }
trait lower {}
type Alias = u8;
";
        let violations = check_code(&Configuration::new("TypeName"), code);
        let lines: Vec<usize> = violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_constant_names() {
        let code = "const MAX_LEN: usize = 1;\nstatic counter: u8 = 0;\nconst _: () = ();\n";
        let violations = check_code(&Configuration::new("ConstantName"), code);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].args[0], "counter");
    }
}
