//! Violation collection during a walk.

use crate::ast::Node;
use crate::check::CheckMeta;
use crate::messages::{format_message, Messages};
use crate::text::{expand_tabs_width, FileText};
use crate::token::TokenType;
use crate::types::Violation;
use std::fmt::Display;
use std::path::Path;

/// Accumulates the violations of one file.
#[derive(Debug, Default)]
pub struct ViolationCollector {
    violations: Vec<Violation>,
}

impl ViolationCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything collected so far.
    pub fn reset(&mut self) {
        self.violations.clear();
    }

    /// Adds a violation. Duplicates are kept.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Number of collected violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Sorted snapshot of the collected violations.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        let mut sorted = self.violations.clone();
        sorted.sort();
        sorted
    }

    /// Sorts and drains the collected violations.
    pub fn take_sorted(&mut self) -> Vec<Violation> {
        let mut sorted = std::mem::take(&mut self.violations);
        sorted.sort();
        sorted
    }
}

/// Handle through which a check reports violations.
///
/// Every violation logged through a reporter is attributed to the check the
/// reporter was created for: its module name, id and severity, and its
/// custom messages take precedence over the shared bundles.
pub struct Reporter<'a> {
    collector: &'a mut ViolationCollector,
    meta: &'a CheckMeta,
    file: &'a FileText,
    messages: &'a Messages,
    tab_width: usize,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for one check and one file.
    pub fn new(
        collector: &'a mut ViolationCollector,
        meta: &'a CheckMeta,
        file: &'a FileText,
        messages: &'a Messages,
        tab_width: usize,
    ) -> Self {
        Self {
            collector,
            meta,
            file,
            messages,
            tab_width,
        }
    }

    /// Logs a violation at `line` (1-based) and `column` (0-based character
    /// index). The reported column is 1-based with tabs expanded.
    pub fn log(&mut self, line: usize, column: usize, key: &str, args: &[&dyn Display]) {
        let column = self.expanded_column(line, column);
        self.push(line, column, key, args, None);
    }

    /// Logs a violation against a whole line; the reported column is 0.
    pub fn log_line(&mut self, line: usize, key: &str, args: &[&dyn Display]) {
        self.push(line, 0, key, args, None);
    }

    /// Logs a violation at a node's position.
    pub fn log_node(&mut self, node: Node<'_>, key: &str, args: &[&dyn Display]) {
        let column = self.expanded_column(node.line(), node.column());
        self.push(node.line(), column, key, args, Some(node.token_type()));
    }

    /// Path of the file being checked.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The file being checked.
    #[must_use]
    pub fn file(&self) -> &FileText {
        self.file
    }

    /// One line of the file (1-based).
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        self.file.line(number)
    }

    /// All lines of the file.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.file.lines()
    }

    /// Settings of the check this reporter belongs to.
    #[must_use]
    pub fn meta(&self) -> &CheckMeta {
        self.meta
    }

    fn expanded_column(&self, line: usize, column: usize) -> usize {
        self.file.line(line).map_or(column, |text| {
            expand_tabs_width(text, column, self.tab_width)
        }) + 1
    }

    fn push(
        &mut self,
        line: usize,
        column: usize,
        key: &str,
        args: &[&dyn Display],
        token_type: Option<TokenType>,
    ) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let message = match self.meta.custom_messages.get(key) {
            Some(template) => format_message(template, &args),
            None => self.messages.render(key, &args),
        };
        self.collector.push(
            Violation::new(line, column, self.meta.severity, key, message, &self.meta.module)
                .with_module_id(self.meta.id.clone())
                .with_args(args)
                .with_token_type(token_type),
        );
    }
}
