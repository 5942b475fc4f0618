//! Token-type → interested-checks table.

use crate::check::RegisteredCheck;
use crate::error::EngineError;
use crate::language::Language;
use crate::token::TokenType;
use tracing::debug;

/// For each token type, the indices of the checks registered for it, in
/// configuration order. The same list drives enter and leave callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTable {
    by_token: Vec<Vec<usize>>,
}

impl DispatchTable {
    /// Builds the table for `checks`, validating every token set against
    /// the language vocabulary.
    ///
    /// # Errors
    ///
    /// Fails if a check requires a token it does not accept, or if a
    /// configured token is unknown or not acceptable.
    pub fn build(language: &dyn Language, checks: &[RegisteredCheck]) -> Result<Self, EngineError> {
        let mut table = Self {
            by_token: vec![Vec::new(); language.token_count()],
        };

        for (index, registered) in checks.iter().enumerate() {
            let meta = &registered.meta;
            let check = &registered.check;
            let acceptable = check.acceptable_tokens();
            let required = check.required_tokens();

            if let Some(missing) = required.iter().find(|t| !acceptable.contains(t)) {
                return Err(EngineError::RequiredNotAcceptable {
                    module: meta.module.clone(),
                    token: token_label(language, *missing),
                });
            }

            let tokens = if meta.tokens.is_empty() {
                check.default_tokens()
            } else {
                let mut tokens = Vec::with_capacity(meta.tokens.len() + required.len());
                for name in &meta.tokens {
                    let ty = language
                        .token_id(name)
                        .filter(|ty| acceptable.contains(ty))
                        .ok_or_else(|| EngineError::IllegalToken {
                            module: meta.module.clone(),
                            token: name.clone(),
                        })?;
                    tokens.push(ty);
                }
                tokens.extend(required);
                tokens
            };

            for ty in tokens {
                let Some(slot) = table.by_token.get_mut(ty.index()) else {
                    return Err(EngineError::IllegalToken {
                        module: meta.module.clone(),
                        token: ty.to_string(),
                    });
                };
                if !slot.contains(&index) {
                    slot.push(index);
                    debug!(
                        module = %meta.module,
                        token = %token_label(language, ty),
                        "registered check for token"
                    );
                }
            }
        }

        Ok(table)
    }

    #[cfg(test)]
    pub(crate) fn from_slots(by_token: Vec<Vec<usize>>) -> Self {
        Self { by_token }
    }

    /// Indices of the checks interested in `ty`; empty for unregistered types.
    #[must_use]
    pub fn interested(&self, ty: TokenType) -> &[usize] {
        self.by_token.get(ty.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns true if no check registered for any token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.iter().all(Vec::is_empty)
    }
}

fn token_label(language: &dyn Language, ty: TokenType) -> String {
    language
        .token_name(ty)
        .map_or_else(|| ty.to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::check::{Check, CheckMeta};
    use crate::language::ParseError;
    use crate::text::FileText;

    const NAMES: &[&str] = &["ROOT", "IDENT", "METHOD_DEF", "LCURLY"];

    struct Tiny;

    impl Language for Tiny {
        fn name(&self) -> &'static str {
            "tiny"
        }
        fn file_extensions(&self) -> &[&'static str] {
            &["t"]
        }
        fn token_count(&self) -> usize {
            NAMES.len()
        }
        fn token_name(&self, ty: TokenType) -> Option<&'static str> {
            NAMES.get(ty.index()).copied()
        }
        fn token_id(&self, name: &str) -> Option<TokenType> {
            NAMES
                .iter()
                .position(|n| *n == name)
                .and_then(|i| u16::try_from(i).ok())
                .map(TokenType::new)
        }
        fn parse(&self, _file: &FileText) -> Result<Ast, ParseError> {
            Ok(Ast::new())
        }
    }

    struct Probe {
        default: Vec<u16>,
        acceptable: Vec<u16>,
        required: Vec<u16>,
    }

    impl Check for Probe {
        fn default_tokens(&self) -> Vec<TokenType> {
            self.default.iter().copied().map(TokenType::new).collect()
        }
        fn acceptable_tokens(&self) -> Vec<TokenType> {
            self.acceptable.iter().copied().map(TokenType::new).collect()
        }
        fn required_tokens(&self) -> Vec<TokenType> {
            self.required.iter().copied().map(TokenType::new).collect()
        }
    }

    fn registered(probe: Probe, tokens: &[&str]) -> RegisteredCheck {
        let mut meta = CheckMeta::new("Probe");
        meta.tokens = tokens.iter().map(|t| (*t).to_string()).collect();
        RegisteredCheck {
            meta,
            check: Box::new(probe),
        }
    }

    fn probe(default: &[u16], acceptable: &[u16], required: &[u16]) -> Probe {
        Probe {
            default: default.to_vec(),
            acceptable: acceptable.to_vec(),
            required: required.to_vec(),
        }
    }

    #[test]
    fn default_tokens_in_configuration_order() {
        let checks = vec![
            registered(probe(&[1, 2], &[1, 2], &[]), &[]),
            registered(probe(&[1], &[1], &[]), &[]),
        ];
        let table = DispatchTable::build(&Tiny, &checks).unwrap();
        assert_eq!(table.interested(TokenType::new(1)), &[0, 1]);
        assert_eq!(table.interested(TokenType::new(2)), &[0]);
        assert!(table.interested(TokenType::new(3)).is_empty());
        assert!(table.interested(TokenType::new(999)).is_empty());
    }

    #[test]
    fn configured_tokens_plus_required() {
        let checks = vec![registered(probe(&[1, 2], &[1, 2, 3], &[2]), &["LCURLY"])];
        let table = DispatchTable::build(&Tiny, &checks).unwrap();
        assert!(table.interested(TokenType::new(1)).is_empty());
        assert_eq!(table.interested(TokenType::new(2)), &[0]);
        assert_eq!(table.interested(TokenType::new(3)), &[0]);
    }

    #[test]
    fn check_listed_once_per_token() {
        let checks = vec![registered(probe(&[1], &[1, 2], &[1]), &["IDENT", "IDENT"])];
        let table = DispatchTable::build(&Tiny, &checks).unwrap();
        assert_eq!(table.interested(TokenType::new(1)), &[0]);
    }

    #[test]
    fn unacceptable_configured_token_is_fatal() {
        let checks = vec![registered(probe(&[1], &[1], &[]), &["METHOD_DEF"])];
        let err = DispatchTable::build(&Tiny, &checks).unwrap_err();
        assert!(matches!(err, EngineError::IllegalToken { ref token, .. } if token == "METHOD_DEF"));
    }

    #[test]
    fn unknown_token_name_is_fatal() {
        let checks = vec![registered(probe(&[1], &[1], &[]), &["NOPE"])];
        assert!(matches!(
            DispatchTable::build(&Tiny, &checks),
            Err(EngineError::IllegalToken { .. })
        ));
    }

    #[test]
    fn required_outside_acceptable_is_fatal() {
        let checks = vec![registered(probe(&[1], &[1], &[3]), &[])];
        let err = DispatchTable::build(&Tiny, &checks).unwrap_err();
        assert!(matches!(
            err,
            EngineError::RequiredNotAcceptable { ref token, .. } if token == "LCURLY"
        ));
    }

    #[test]
    fn token_outside_vocabulary_is_fatal() {
        let checks = vec![registered(probe(&[40], &[40], &[]), &[])];
        assert!(matches!(
            DispatchTable::build(&Tiny, &checks),
            Err(EngineError::IllegalToken { .. })
        ));
    }
}
