//! Check reporting lines that match a regular expression.
//!
//! # Configuration
//!
//! - `format`: Forbidden pattern (default: trailing whitespace, `\s+$`)
//! - `max_per_file`: Stop reporting after this many matches, 0 for no limit
//!   (default: 0)

use crate::pattern::Pattern;
use treewalk_core::{
    parse_usize, Check, CheckResult, Configurable, Node, Property, Reporter, TokenType,
};

/// Message key for a matching line.
pub const MSG_KEY: &str = "line.pattern.match";

/// Reports every line matching `format`, at the column of the match.
#[derive(Debug, Clone)]
pub struct LinePatternCheck {
    format: Pattern,
    max_per_file: usize,
}

impl Default for LinePatternCheck {
    fn default() -> Self {
        Self {
            format: Pattern::lazy(r"\s+$"),
            max_per_file: 0,
        }
    }
}

impl Check for LinePatternCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        Vec::new()
    }

    fn description(&self) -> &'static str {
        "Reports lines matching a regular expression"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Line matches the illegal pattern '{0}'")]
    }

    fn begin_tree(&mut self, _root: Option<Node<'_>>, reporter: &mut Reporter<'_>) -> CheckResult {
        let source = self.format.source().to_string();
        let regex = self.format.regex()?;

        let mut hits = Vec::new();
        for (index, line) in reporter.lines().enumerate() {
            if self.max_per_file > 0 && hits.len() >= self.max_per_file {
                break;
            }
            if let Some(found) = regex.find(line) {
                hits.push((index + 1, line[..found.start()].chars().count()));
            }
        }

        for (line, column) in hits {
            reporter.log(line, column, MSG_KEY, &[&source]);
        }
        Ok(())
    }
}

impl Configurable for LinePatternCheck {
    const PROPERTIES: &'static [Property<Self>] = &[
        Property {
            name: "format",
            set: |check, value| {
                check.format = Pattern::compile(value)?;
                Ok(())
            },
        },
        Property {
            name: "max_per_file",
            set: |check, value| {
                check.max_per_file = parse_usize(value)?;
                Ok(())
            },
        },
    ];
}
