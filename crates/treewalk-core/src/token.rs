//! Token-type tags and the subtree token bit-set.

use serde::{Deserialize, Serialize};

/// Integer tag identifying the syntactic category of an AST node.
///
/// The set of valid tags is owned by the [`Language`](crate::Language) that
/// produced the tree; the engine only ever uses them as dense indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenType(u16);

impl TokenType {
    /// Creates a token type from its numeric id.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }

    /// Returns the id as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Growable bit-set of token types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBitSet {
    words: Vec<u64>,
}

impl TokenBitSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token type to the set.
    pub fn insert(&mut self, ty: TokenType) {
        let (word, bit) = Self::position(ty);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= bit;
    }

    /// Returns true if the token type is in the set.
    #[must_use]
    pub fn contains(&self, ty: TokenType) -> bool {
        let (word, bit) = Self::position(ty);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Adds every member of `other` to this set.
    pub fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= theirs;
        }
    }

    /// Returns true if no token type is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Returns the number of token types in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn position(ty: TokenType) -> (usize, u64) {
        let index = ty.index();
        (index / 64, 1u64 << (index % 64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = TokenBitSet::new();
        assert!(set.is_empty());
        set.insert(TokenType::new(3));
        set.insert(TokenType::new(130));
        assert!(set.contains(TokenType::new(3)));
        assert!(set.contains(TokenType::new(130)));
        assert!(!set.contains(TokenType::new(4)));
        assert!(!set.contains(TokenType::new(1000)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn union_grows_to_larger_set() {
        let mut small = TokenBitSet::new();
        small.insert(TokenType::new(1));
        let mut large = TokenBitSet::new();
        large.insert(TokenType::new(200));

        small.union_with(&large);
        assert!(small.contains(TokenType::new(1)));
        assert!(small.contains(TokenType::new(200)));
    }
}
