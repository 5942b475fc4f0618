//! Violation filters applied before listeners see a violation.
//!
//! Supports suppression comments like:
//! ```text
//! // treewalk: allow(FunctionLength, long-fns) reason="generated table"
//! ```
//! and `[[suppress]]` entries in `treewalk.toml`:
//! ```toml
//! [[suppress]]
//! files = "generated/"
//! checks = "FunctionLength|FileLength"
//! lines = "1-40"
//! ```

use crate::config::{ConfigError, SuppressSection};
use crate::text::FileText;
use crate::types::{short_name, Severity, Violation};
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::debug;

/// What a filter knows about the file a violation belongs to.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Path as reported to listeners.
    pub path: &'a Path,
    /// File text, absent when the file could not be read.
    pub text: Option<&'a FileText>,
}

/// Decides whether a violation reaches the listeners.
pub trait Filter: Send + Sync {
    /// Returns false to drop the violation.
    fn accept(&self, ctx: &FilterContext<'_>, violation: &Violation) -> bool;
}

/// An ordered set of filters; a violation passes if every filter accepts it.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn Filter>>,
}

impl std::fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSet")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FilterSet {
    /// Creates an empty set, which accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    pub fn add(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the set holds no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true if every filter accepts the violation.
    #[must_use]
    pub fn accept(&self, ctx: &FilterContext<'_>, violation: &Violation) -> bool {
        self.filters.iter().all(|f| f.accept(ctx, violation))
    }
}

/// Drops violations below a minimum severity.
#[derive(Debug, Clone, Copy)]
pub struct SeverityFilter {
    minimum: Severity,
}

impl SeverityFilter {
    /// Keeps violations at or above `minimum`.
    #[must_use]
    pub fn new(minimum: Severity) -> Self {
        Self { minimum }
    }
}

impl Default for SeverityFilter {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl Filter for SeverityFilter {
    fn accept(&self, _ctx: &FilterContext<'_>, violation: &Violation) -> bool {
        violation.severity >= self.minimum
    }
}

/// Drops violations covered by an allow comment on the same line or the
/// line above.
///
/// A name in `allow(...)` matches the module id, the full module name, the
/// short module name, or the short name without its `Check` suffix. `all`
/// matches every check.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionCommentFilter;

impl Filter for SuppressionCommentFilter {
    fn accept(&self, ctx: &FilterContext<'_>, violation: &Violation) -> bool {
        let Some(text) = ctx.text else {
            return true;
        };
        let line = violation.line;
        let directive = [line.saturating_sub(1), line]
            .into_iter()
            .filter(|n| *n > 0)
            .filter_map(|n| text.line(n))
            .filter_map(parse_allow_directive)
            .find(|directive| directive.covers(violation));
        match directive {
            Some(directive) => {
                debug!(
                    file = %ctx.path.display(),
                    line,
                    source = %violation.source,
                    reason = directive.reason.as_deref().unwrap_or(""),
                    "violation suppressed"
                );
                false
            }
            None => true,
        }
    }
}

/// Drops violations matched by a `[[suppress]]` entry.
#[derive(Debug, Clone, Default)]
pub struct SuppressionFilter {
    entries: Vec<SuppressEntry>,
}

#[derive(Debug, Clone)]
struct SuppressEntry {
    files: Option<Regex>,
    checks: Option<Regex>,
    message: Option<Regex>,
    id: Option<String>,
    lines: Vec<RangeInclusive<usize>>,
}

impl SuppressEntry {
    fn matches(&self, path: &str, violation: &Violation) -> bool {
        self.files.as_ref().map_or(true, |re| re.is_match(path))
            && self
                .checks
                .as_ref()
                .map_or(true, |re| re.is_match(&violation.source))
            && self
                .message
                .as_ref()
                .map_or(true, |re| re.is_match(&violation.message))
            && self
                .id
                .as_ref()
                .map_or(true, |id| violation.module_id.as_ref() == Some(id))
            && (self.lines.is_empty() || self.lines.iter().any(|r| r.contains(&violation.line)))
    }
}

impl SuppressionFilter {
    /// Compiles the entries of a `[[suppress]]` list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Suppression`] for an entry with an invalid
    /// regex or line list, or with nothing to match on.
    pub fn from_sections(sections: &[SuppressSection]) -> Result<Self, ConfigError> {
        let entries = sections
            .iter()
            .enumerate()
            .map(|(index, section)| compile_entry(index, section))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Filter for SuppressionFilter {
    fn accept(&self, ctx: &FilterContext<'_>, violation: &Violation) -> bool {
        let path = ctx.path.to_string_lossy().replace('\\', "/");
        let suppressed = self.entries.iter().any(|e| e.matches(&path, violation));
        if suppressed {
            debug!(
                file = %path,
                line = violation.line,
                source = %violation.source,
                "violation suppressed by configuration"
            );
        }
        !suppressed
    }
}

fn compile_entry(index: usize, section: &SuppressSection) -> Result<SuppressEntry, ConfigError> {
    let invalid = |message: String| ConfigError::Suppression { index, message };
    let regex = |field: &str, pattern: Option<&str>| {
        pattern
            .map(Regex::new)
            .transpose()
            .map_err(|e| invalid(format!("`{field}` is not a valid regex: {e}")))
    };

    if section.files.is_none()
        && section.checks.is_none()
        && section.message.is_none()
        && section.id.is_none()
    {
        return Err(invalid(
            "one of `files`, `checks`, `message` or `id` is required".to_string(),
        ));
    }

    let lines = match &section.lines {
        Some(spec) => parse_line_ranges(spec).map_err(invalid)?,
        None => Vec::new(),
    };

    Ok(SuppressEntry {
        files: regex("files", section.files.as_deref())?,
        checks: regex("checks", section.checks.as_deref())?,
        message: regex("message", section.message.as_deref())?,
        id: section.id.clone(),
        lines,
    })
}

/// Parses `"10-20,30"` into inclusive line ranges.
pub(crate) fn parse_line_ranges(spec: &str) -> Result<Vec<RangeInclusive<usize>>, String> {
    let number = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("`{spec}` is not a list of lines"))
    };
    let mut ranges = Vec::new();
    for part in spec.split(',').map(str::trim) {
        if part.is_empty() {
            continue;
        }
        let range = match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(format!("range `{part}` ends before it starts"));
                }
                start..=end
            }
            None => {
                let line = number(part)?;
                line..=line
            }
        };
        ranges.push(range);
    }
    if ranges.is_empty() {
        return Err("`lines` is empty".to_string());
    }
    Ok(ranges)
}

/// Parsed allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AllowDirective {
    names: BTreeSet<String>,
    reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, violation: &Violation) -> bool {
        if self.names.contains("all") {
            return true;
        }
        let short = short_name(&violation.source);
        let bare = short.strip_suffix("Check").unwrap_or(short);
        violation
            .module_id
            .as_deref()
            .into_iter()
            .chain([violation.source.as_str(), short, bare])
            .any(|name| self.names.contains(name))
    }
}

/// Parses `// treewalk: allow(a, b) reason="..."` anywhere in a line.
pub(crate) fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let start = line.find("//")?;
    let comment = line[start..].trim_start_matches('/').trim();
    let directive = comment.strip_prefix("treewalk:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let names: BTreeSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { names, reason })
}
