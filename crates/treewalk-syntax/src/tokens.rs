//! Token-type vocabulary for Rust sources.
//!
//! Ids are dense and stable: each constant's id is its index into [`NAMES`].

use treewalk_core::TokenType;

/// Whole source file; always the root.
pub const FILE: TokenType = TokenType::new(0);
/// `use` declaration.
pub const USE: TokenType = TokenType::new(1);
/// `mod` item, inline or out of line.
pub const MOD_DEF: TokenType = TokenType::new(2);
/// Free function.
pub const FN_DEF: TokenType = TokenType::new(3);
/// Function inside an `impl` or `trait` block.
pub const METHOD_DEF: TokenType = TokenType::new(4);
/// Function parameter, including `self`.
pub const PARAM: TokenType = TokenType::new(5);
/// `struct` item.
pub const STRUCT_DEF: TokenType = TokenType::new(6);
/// `enum` item.
pub const ENUM_DEF: TokenType = TokenType::new(7);
/// Enum variant.
pub const VARIANT: TokenType = TokenType::new(8);
/// Struct, union or variant field.
pub const FIELD: TokenType = TokenType::new(9);
/// `trait` item.
pub const TRAIT_DEF: TokenType = TokenType::new(10);
/// `impl` block.
pub const IMPL_DEF: TokenType = TokenType::new(11);
/// `type` alias.
pub const TYPE_ALIAS: TokenType = TokenType::new(12);
/// `const` item.
pub const CONST_DEF: TokenType = TokenType::new(13);
/// `static` item.
pub const STATIC_DEF: TokenType = TokenType::new(14);
/// Opening brace of a block.
pub const BLOCK: TokenType = TokenType::new(15);
/// Closing brace of a block; always the last child of its [`BLOCK`].
pub const RCURLY: TokenType = TokenType::new(16);
/// `let` statement.
pub const LET: TokenType = TokenType::new(17);
/// `if` expression.
pub const IF: TokenType = TokenType::new(18);
/// `match` expression.
pub const MATCH: TokenType = TokenType::new(19);
/// One arm of a `match`.
pub const MATCH_ARM: TokenType = TokenType::new(20);
/// `loop` expression.
pub const LOOP: TokenType = TokenType::new(21);
/// `while` expression.
pub const WHILE: TokenType = TokenType::new(22);
/// `for` expression.
pub const FOR: TokenType = TokenType::new(23);
/// Closure expression.
pub const CLOSURE: TokenType = TokenType::new(24);
/// Function call; text is the callee path when it has one.
pub const CALL: TokenType = TokenType::new(25);
/// Method call; text is the method name.
pub const METHOD_CALL: TokenType = TokenType::new(26);
/// Macro invocation; text is the macro path.
pub const MACRO_CALL: TokenType = TokenType::new(27);
/// `return` expression.
pub const RETURN: TokenType = TokenType::new(28);
/// `?` operator.
pub const TRY: TokenType = TokenType::new(29);
/// `unsafe` block.
pub const UNSAFE: TokenType = TokenType::new(30);

/// Symbolic names, indexed by token id.
pub const NAMES: &[&str] = &[
    "FILE",
    "USE",
    "MOD_DEF",
    "FN_DEF",
    "METHOD_DEF",
    "PARAM",
    "STRUCT_DEF",
    "ENUM_DEF",
    "VARIANT",
    "FIELD",
    "TRAIT_DEF",
    "IMPL_DEF",
    "TYPE_ALIAS",
    "CONST_DEF",
    "STATIC_DEF",
    "BLOCK",
    "RCURLY",
    "LET",
    "IF",
    "MATCH",
    "MATCH_ARM",
    "LOOP",
    "WHILE",
    "FOR",
    "CLOSURE",
    "CALL",
    "METHOD_CALL",
    "MACRO_CALL",
    "RETURN",
    "TRY",
    "UNSAFE",
];

/// Returns the name of a token type.
#[must_use]
pub fn name(ty: TokenType) -> Option<&'static str> {
    NAMES.get(ty.index()).copied()
}

/// Returns the token type for a name.
#[must_use]
pub fn id(name: &str) -> Option<TokenType> {
    NAMES
        .iter()
        .position(|n| *n == name)
        .and_then(|i| u16::try_from(i).ok())
        .map(TokenType::new)
}
