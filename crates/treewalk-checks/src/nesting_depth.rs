//! Check limiting how deeply control flow nests.
//!
//! # Rationale
//!
//! Every nested `if`, `match` or loop adds a level the reader has to keep in
//! mind. Early returns and extracted helpers flatten the code.
//!
//! # Configuration
//!
//! - `max`: Maximum nesting depth (default: 4)

use treewalk_core::{
    parse_usize, Check, CheckResult, Configurable, Node, Property, Reporter, TokenType,
};
use treewalk_syntax::tokens::{CLOSURE, FOR, IF, LOOP, MATCH, WHILE};

/// Message key for too deep nesting.
pub const MSG_KEY: &str = "nesting.too.deep";

/// Limits nesting of `if`, `match` and loops.
#[derive(Debug, Clone)]
pub struct NestingDepthCheck {
    max: usize,
    depth: usize,
    counted: Vec<bool>,
}

impl Default for NestingDepthCheck {
    fn default() -> Self {
        Self {
            max: 4,
            depth: 0,
            counted: Vec::new(),
        }
    }
}

/// `else if` continues the chain of its parent `if` on the same level.
fn is_else_if(node: Node<'_>) -> bool {
    node.token_type() == IF && node.parent().is_some_and(|p| p.token_type() == IF)
}

impl Check for NestingDepthCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        vec![IF, MATCH, LOOP, WHILE, FOR]
    }

    fn acceptable_tokens(&self) -> Vec<TokenType> {
        vec![IF, MATCH, LOOP, WHILE, FOR, CLOSURE]
    }

    fn description(&self) -> &'static str {
        "Limits nesting depth of control flow"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Nesting depth {0} exceeds maximum allowed {1}")]
    }

    fn begin_tree(&mut self, _root: Option<Node<'_>>, _reporter: &mut Reporter<'_>) -> CheckResult {
        self.depth = 0;
        self.counted.clear();
        Ok(())
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        let counts = !is_else_if(node);
        self.counted.push(counts);
        if !counts {
            return Ok(());
        }
        self.depth += 1;
        if self.depth > self.max {
            reporter.log_node(node, MSG_KEY, &[&self.depth, &self.max]);
        }
        Ok(())
    }

    fn leave_token(&mut self, _node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        if self.counted.pop().unwrap_or(false) {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(())
    }
}

impl Configurable for NestingDepthCheck {
    const PROPERTIES: &'static [Property<Self>] = &[Property {
        name: "max",
        set: |check, value| {
            check.max = parse_usize(value)?;
            Ok(())
        },
    }];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check_code;
    use treewalk_core::Configuration;

    const CODE: &str = r"
fn f(v: &[u8]) {
    for x in v {
        if *x > 0 {
            match x {
                1 => loop { break },
                _ => {}
            }
        }
    }
    if true {}
}
";

    #[test]
    fn test_detects_deep_nesting() {
        let config = Configuration::new("NestingDepth").with_attribute("max", "3");
        let violations = check_code(&config, CODE);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 6);
        assert_eq!(
            violations[0].message,
            "Nesting depth 4 exceeds maximum allowed 3"
        );
    }

    #[test]
    fn test_depth_resets_after_leaving() {
        let config = Configuration::new("NestingDepth").with_attribute("max", "1");
        let lines: Vec<usize> = check_code(&config, CODE).iter().map(|v| v.line).collect();
        // The trailing `if` on line 11 is back at depth 1.
        assert_eq!(lines, vec![4, 5, 6]);
    }

    #[test]
    fn test_else_if_stays_on_level() {
        let code = "fn f() {\n    if a {} else if b {} else if c {} else {}\n}\n";
        let config = Configuration::new("NestingDepth").with_attribute("max", "1");
        assert!(check_code(&config, code).is_empty());
    }

    #[test]
    fn test_closures_count_when_configured() {
        let code = "fn f() {\n    if a { let g = || if b {}; }\n}\n";
        let plain = Configuration::new("NestingDepth").with_attribute("max", "1");
        assert_eq!(check_code(&plain, code).len(), 1);

        let with_closures = plain.with_attribute("tokens", "IF, CLOSURE");
        assert_eq!(check_code(&with_closures, code).len(), 2);
    }
}
