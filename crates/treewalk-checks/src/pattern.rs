//! Lazily compiled regular expressions for check properties.

use regex::Regex;
use treewalk_core::CheckError;

/// A regex property: the source text, compiled on first use or when set.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// A pattern compiled on first use.
    pub(crate) fn lazy(source: &str) -> Self {
        Self {
            source: source.to_string(),
            regex: None,
        }
    }

    /// Compiles `source` now, rejecting invalid expressions.
    pub(crate) fn compile(source: &str) -> Result<Self, String> {
        let regex = Regex::new(source).map_err(|e| e.to_string())?;
        Ok(Self {
            source: source.to_string(),
            regex: Some(regex),
        })
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled expression.
    pub(crate) fn regex(&mut self) -> Result<&Regex, CheckError> {
        if self.regex.is_none() {
            let regex = Regex::new(&self.source)
                .map_err(|e| CheckError::new(format!("invalid pattern `{}`: {e}", self.source)))?;
            self.regex = Some(regex);
        }
        self.regex
            .as_ref()
            .ok_or_else(|| CheckError::new("pattern not compiled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_compiles_on_use() {
        let mut pattern = Pattern::lazy("^a+$");
        assert!(pattern.regex().unwrap().is_match("aaa"));
        assert_eq!(pattern.source(), "^a+$");
    }

    #[test]
    fn test_invalid_source() {
        assert!(Pattern::compile("(").is_err());
        assert!(Pattern::lazy("(").regex().is_err());
    }
}
