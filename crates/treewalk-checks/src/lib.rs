//! # treewalk-checks
//!
//! Built-in checks for treewalk.
//!
//! Every check is registered under `treewalk_checks::<Name>Check`; the
//! registry returned by [`registry`] also knows the `treewalk_checks::`
//! package, so configurations can use the short name (`FunctionLength`).
//!
//! ## Available Checks
//!
//! | Name | Tokens | Description |
//! |------|--------|-------------|
//! | `FunctionLength` | `FN_DEF`, `METHOD_DEF` | Limits lines in a function body |
//! | `FunctionName` | `FN_DEF`, `METHOD_DEF` | Function names match a pattern |
//! | `TypeName` | `STRUCT_DEF`, `ENUM_DEF`, `TRAIT_DEF`, `TYPE_ALIAS` | Type names match a pattern |
//! | `ConstantName` | `CONST_DEF`, `STATIC_DEF` | Constant names match a pattern |
//! | `NestingDepth` | `IF`, `MATCH`, `LOOP`, `WHILE`, `FOR` | Limits control-flow nesting |
//! | `ParameterNumber` | `FN_DEF`, `METHOD_DEF` | Limits parameters per function |
//! | `ForbiddenCall` | `METHOD_CALL`, `MACRO_CALL`, `CALL` | Forbids selected calls |
//! | `FileLength` | none | Limits lines per file |
//! | `LinePattern` | none | Reports lines matching a pattern |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use treewalk_checks::{registry, Preset};
//! use treewalk_core::Checker;
//! use treewalk_syntax::RustLanguage;
//!
//! let checker = Checker::builder(Arc::new(RustLanguage::new()), registry())
//!     .configuration(Preset::Recommended.configuration())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod file_length;
mod forbidden_call;
mod function_length;
mod line_pattern;
mod naming;
mod nesting_depth;
mod parameter_number;
mod pattern;
mod presets;

#[cfg(test)]
mod test_support;

pub use file_length::FileLengthCheck;
pub use forbidden_call::ForbiddenCallCheck;
pub use function_length::FunctionLengthCheck;
pub use line_pattern::LinePatternCheck;
pub use naming::{ConstantNameCheck, FunctionNameCheck, TypeNameCheck};
pub use nesting_depth::NestingDepthCheck;
pub use parameter_number::ParameterNumberCheck;
pub use presets::{minimal_modules, recommended_modules, strict_modules, Preset};

use treewalk_core::ModuleRegistry;

/// Package prefix of every built-in check.
pub const PACKAGE: &str = "treewalk_checks::";

/// Returns a registry holding every built-in check.
#[must_use]
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new().with_package(PACKAGE);
    registry
        .register::<FileLengthCheck>("treewalk_checks::FileLengthCheck")
        .register::<ForbiddenCallCheck>("treewalk_checks::ForbiddenCallCheck")
        .register::<FunctionLengthCheck>("treewalk_checks::FunctionLengthCheck")
        .register::<FunctionNameCheck>("treewalk_checks::FunctionNameCheck")
        .register::<TypeNameCheck>("treewalk_checks::TypeNameCheck")
        .register::<ConstantNameCheck>("treewalk_checks::ConstantNameCheck")
        .register::<LinePatternCheck>("treewalk_checks::LinePatternCheck")
        .register::<NestingDepthCheck>("treewalk_checks::NestingDepthCheck")
        .register::<ParameterNumberCheck>("treewalk_checks::ParameterNumberCheck");
    tracing::debug!("Registered {} built-in check(s)", registry.len());
    registry
}
