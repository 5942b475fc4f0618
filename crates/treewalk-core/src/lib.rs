//! # treewalk-core
//!
//! Engine core for single-pass AST checking.
//!
//! A [`Language`] turns source text into an [`Ast`]; the [`Checker`] walks
//! that tree once per file and dispatches every node, on entry and on exit,
//! to the [`Check`] instances that declared interest in its token type.
//! Violations are sorted per file and fanned out to [`AuditListener`]s;
//! unchanged files are skipped through a [`PersistentCache`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use treewalk_core::{Checker, Configuration, ModuleRegistry};
//!
//! let config = Configuration::new("Checker")
//!     .with_child(Configuration::new("TreeWalker").with_child(Configuration::new("FunctionLength")));
//!
//! let mut checker = Checker::builder(Arc::new(MyLanguage), registry)
//!     .configuration(config)
//!     .listener(MyLogger::default())
//!     .build()?;
//!
//! let failures = checker.process(&files);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
mod cache;
mod check;
mod checker;
mod collector;
mod config;
mod dispatch;
mod error;
mod filter;
mod language;
mod listener;
mod messages;
mod registry;
mod text;
mod token;
mod types;
mod walker;

pub use ast::{Ast, Node, NodeId, TreeError};
pub use cache::{
    config_fingerprint, content_fingerprint, CacheError, PersistentCache, CONFIG_HASH_KEY,
};
pub use check::{Check, CheckBox, CheckError, CheckMeta, CheckResult, RegisteredCheck};
pub use checker::{CancellationToken, Checker, CheckerBuilder};
pub use collector::{Reporter, ViolationCollector};
pub use config::{
    CheckerSection, ConfigError, ConfigFile, Configuration, ModuleSection, SuppressSection,
    CHECKER_MODULE, TREE_WALKER_MODULE,
};
pub use dispatch::DispatchTable;
pub use error::EngineError;
pub use filter::{
    Filter, FilterContext, FilterSet, SeverityFilter, SuppressionCommentFilter, SuppressionFilter,
};
pub use language::{Language, ParseError};
pub use listener::{AuditListener, ListenerDispatcher, ListenerError, ListenerResult};
pub use messages::{
    format_message, Messages, GENERAL_CHECK_FAILURE, GENERAL_EXCEPTION, GENERAL_PARSE_ERROR,
};
pub use registry::{parse_bool, parse_list, parse_usize, Configurable, ModuleRegistry, Property};
pub use text::{expand_tabs_width, FileText};
pub use token::{TokenBitSet, TokenType};
pub use types::{AuditSummary, Severity, Violation};
pub use walker::{TreeWalker, WalkContext};
