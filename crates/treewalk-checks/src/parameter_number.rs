//! Check limiting the number of function parameters.
//!
//! # Configuration
//!
//! - `max`: Maximum number of parameters (default: 7)
//! - `ignore_self`: Do not count a `self` receiver (default: true)

use treewalk_core::{
    parse_bool, parse_usize, Check, CheckResult, Configurable, Node, Property, Reporter,
    TokenType,
};
use treewalk_syntax::tokens::{FN_DEF, METHOD_DEF, PARAM};

/// Message key for too many parameters.
pub const MSG_KEY: &str = "parameters.too.many";

/// Limits how many parameters a function takes.
#[derive(Debug, Clone)]
pub struct ParameterNumberCheck {
    max: usize,
    ignore_self: bool,
}

impl Default for ParameterNumberCheck {
    fn default() -> Self {
        Self {
            max: 7,
            ignore_self: true,
        }
    }
}

impl Check for ParameterNumberCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![FN_DEF, METHOD_DEF]
    }

    fn description(&self) -> &'static str {
        "Limits the number of function parameters"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Function '{0}' has {1} parameters (max: {2})")]
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        let count = node
            .children()
            .filter(|c| c.token_type() == PARAM)
            .filter(|c| !(self.ignore_self && c.text() == "self"))
            .count();
        if count > self.max {
            reporter.log_node(node, MSG_KEY, &[&node.text(), &count, &self.max]);
        }
        Ok(())
    }
}

impl Configurable for ParameterNumberCheck {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property {
            name: "max",
            set: |check, value| {
                check.max = parse_usize(value)?;
                Ok(())
            },
        },
        Property {
            name: "ignore_self",
            set: |check, value| {
                check.ignore_self = parse_bool(value)?;
                Ok(())
            },
        },
    ];
}
