//! Grammar adapter seam.

use crate::ast::Ast;
use crate::text::FileText;
use crate::token::TokenType;

/// A parse failure reported by a [`Language`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// Line of the failure (1-based), if the parser knows it.
    pub line: Option<usize>,
    /// Column of the failure (0-based), if the parser knows it.
    pub column: Option<usize>,
    /// Parser diagnostic.
    pub message: String,
}

impl ParseError {
    /// Creates a parse error without a position.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            column: None,
            message: message.into(),
        }
    }

    /// Attaches a position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// A source language: token vocabulary plus parser.
///
/// Token ids returned by the vocabulary must be dense, i.e. smaller than
/// [`token_count`](Language::token_count).
pub trait Language: Send + Sync {
    /// Language name, used in log output.
    fn name(&self) -> &'static str;

    /// File extensions (without dot) handled by default.
    fn file_extensions(&self) -> &[&'static str];

    /// Number of token types in the vocabulary.
    fn token_count(&self) -> usize;

    /// Symbolic name of a token type.
    fn token_name(&self, ty: TokenType) -> Option<&'static str>;

    /// Token type for a symbolic name.
    fn token_id(&self, name: &str) -> Option<TokenType>;

    /// Parses a file into a tree. Empty input yields an [`Ast`] without a root.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not valid in this language.
    fn parse(&self, file: &FileText) -> Result<Ast, ParseError>;
}
