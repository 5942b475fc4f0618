//! # treewalk-syntax
//!
//! Rust grammar adapter for the treewalk engine.
//!
//! [`RustLanguage`] parses source files with `syn` and mirrors the result
//! into a [`treewalk_core::Ast`] whose node types come from the [`tokens`]
//! vocabulary. Positions come from `proc-macro2` span locations: lines are
//! 1-based, columns 0-based character offsets.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use treewalk_core::Checker;
//! use treewalk_syntax::RustLanguage;
//!
//! let checker = Checker::builder(Arc::new(RustLanguage::new()), registry)
//!     .configuration(config)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod rust;
pub mod tokens;

pub use rust::RustLanguage;
