//! Check limiting the length of function bodies.
//!
//! # Rationale
//!
//! Long functions are hard to read and tend to mix several concerns.
//! Splitting them keeps each piece small enough to understand at a glance.
//!
//! # Configuration
//!
//! - `max`: Maximum lines from the opening to the closing brace (default: 50)
//! - `count_empty`: Count blank and comment-only lines (default: true)

use treewalk_core::{
    parse_bool, parse_usize, Check, CheckResult, Configurable, Node, Property, Reporter, TokenType,
};
use treewalk_syntax::tokens::{BLOCK, FN_DEF, METHOD_DEF};

/// Message key for an over-long function.
pub const MSG_KEY: &str = "function.too.long";

/// Limits the number of lines in a function body.
#[derive(Debug, Clone)]
pub struct FunctionLengthCheck {
    max: usize,
    count_empty: bool,
}

impl Default for FunctionLengthCheck {
    fn default() -> Self {
        Self {
            max: 50,
            count_empty: true,
        }
    }
}

impl FunctionLengthCheck {
    fn body_length(&self, open: Node<'_>, close: Node<'_>, reporter: &Reporter<'_>) -> usize {
        if self.count_empty {
            return close.line().saturating_sub(open.line()) + 1;
        }
        (open.line()..=close.line())
            .filter_map(|n| reporter.line(n))
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with("//")
            })
            .count()
    }
}

impl Check for FunctionLengthCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![FN_DEF, METHOD_DEF]
    }

    fn description(&self) -> &'static str {
        "Limits the number of lines in a function body"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Function '{0}' has {1} lines (max: {2})")]
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        // Trait methods without a default body have no block.
        let Some(block) = node.find_first_token(BLOCK) else {
            return Ok(());
        };
        let Some(close) = block.last_child() else {
            return Ok(());
        };

        let length = self.body_length(block, close, reporter);
        if length > self.max {
            reporter.log_node(node, MSG_KEY, &[&node.text(), &length, &self.max]);
        }
        Ok(())
    }
}

impl Configurable for FunctionLengthCheck {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property {
            name: "max",
            set: |check, value| {
                check.max = parse_usize(value)?;
                Ok(())
            },
        },
        Property {
            name: "count_empty",
            set: |check, value| {
                check.count_empty = parse_bool(value)?;
                Ok(())
            },
        },
    ];
}
