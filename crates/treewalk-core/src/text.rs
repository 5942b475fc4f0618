//! File contents with line indexing.

use std::path::{Path, PathBuf};

/// The text of one file, indexed by line.
#[derive(Debug, Clone)]
pub struct FileText {
    path: PathBuf,
    content: String,
    line_starts: Vec<usize>,
}

impl FileText {
    /// Wraps already-loaded content.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .filter(|start| *start < content.len() || *start == 0)
            .collect();
        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read as UTF-8.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entire content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of lines. Empty content has zero lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        if self.content.is_empty() {
            0
        } else {
            self.line_starts.len()
        }
    }

    /// Returns line `number` (1-based) without its terminator.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        if number == 0 || number > self.line_count() {
            return None;
        }
        let start = self.line_starts[number - 1];
        let end = self
            .line_starts
            .get(number)
            .copied()
            .unwrap_or(self.content.len());
        let line = &self.content[start..end];
        let line = line.strip_suffix('\n').unwrap_or(line);
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Iterates over all lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        (1..=self.line_count()).filter_map(|n| self.line(n))
    }
}

/// Returns the display width of the first `column` characters of `line`,
/// expanding tabs to the next multiple of `tab_width`.
#[must_use]
pub fn expand_tabs_width(line: &str, column: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line.chars().take(column).fold(0, |width, c| {
        if c == '\t' {
            (width / tab_width + 1) * tab_width
        } else {
            width + 1
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_one_based() {
        let text = FileText::new("a.rs", "first\r\nsecond\nthird");
        assert_eq!(text.line_count(), 3);
        assert_eq!(text.line(1), Some("first"));
        assert_eq!(text.line(2), Some("second"));
        assert_eq!(text.line(3), Some("third"));
        assert_eq!(text.line(0), None);
        assert_eq!(text.line(4), None);
    }

    #[test]
    fn trailing_newline_does_not_add_line() {
        let text = FileText::new("a.rs", "one\ntwo\n");
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn empty_content_has_no_lines() {
        let text = FileText::new("a.rs", "");
        assert_eq!(text.line_count(), 0);
        assert_eq!(text.line(1), None);
    }

    #[test]
    fn tab_expansion() {
        assert_eq!(expand_tabs_width("\tx", 1, 8), 8);
        assert_eq!(expand_tabs_width("ab\tx", 3, 4), 4);
        assert_eq!(expand_tabs_width("abc", 2, 8), 2);
        assert_eq!(expand_tabs_width("\t\t", 2, 0), 2);
    }
}
