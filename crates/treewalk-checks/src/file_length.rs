//! Check limiting the number of lines in a file.
//!
//! # Configuration
//!
//! - `max`: Maximum number of lines (default: 2000)

use treewalk_core::{
    parse_usize, Check, CheckResult, Configurable, Node, Property, Reporter, TokenType,
};

/// Message key for an over-long file.
pub const MSG_KEY: &str = "file.too.long";

/// Limits file length. Visits no nodes; works on the whole text.
#[derive(Debug, Clone)]
pub struct FileLengthCheck {
    max: usize,
}

impl Default for FileLengthCheck {
    fn default() -> Self {
        Self { max: 2000 }
    }
}

impl Check for FileLengthCheck {
    fn default_tokens(&self) -> Vec<TokenType> {
        Vec::new()
    }

    fn description(&self) -> &'static str {
        "Limits the number of lines in a file"
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "File length is {0} lines (max allowed is {1})")]
    }

    fn begin_tree(&mut self, _root: Option<Node<'_>>, reporter: &mut Reporter<'_>) -> CheckResult {
        let lines = reporter.file().line_count();
        if lines > self.max {
            reporter.log_line(1, MSG_KEY, &[&lines, &self.max]);
        }
        Ok(())
    }
}

impl Configurable for FileLengthCheck {
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

    #[test]
    fn test_detects_long_file() {
        let config = Configuration::new("FileLength").with_attribute("max", "2");
        let violations = check_code(&config, "fn a() {}\nfn b() {}\nfn c() {}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!((violations[0].line, violations[0].column), (1, 0));
        assert_eq!(
            violations[0].message,
            "File length is 3 lines (max allowed is 2)"
        );
    }

    #[test]
    fn test_empty_file() {
        let config = Configuration::new("FileLength").with_attribute("max", "0");
        assert!(check_code(&config, "").is_empty());
    }

    #[test]
    fn test_rejects_bad_max() {
        let config = Configuration::new("FileLength").with_attribute("max", "many");
        let err = crate::registry().instantiate(&config).err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some(
                "Cannot set property `max` of module `treewalk_checks::FileLengthCheck` to `many`: \
                 `many` is not a non-negative integer: invalid digit found in string"
            )
        );
    }
}
