//! Report listeners for the `check` command.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use treewalk_core::{AuditListener, AuditSummary, ListenerResult, Severity, Violation};

use crate::OutputFormat;

/// Violations and exceptions of one file.
#[derive(Debug, Default, Serialize)]
struct FileReport {
    path: PathBuf,
    violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exceptions: Vec<String>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: &'a AuditSummary,
}

/// Writes audit events in one of the [`OutputFormat`]s.
pub struct ReportListener {
    format: OutputFormat,
    out: Box<dyn Write + Send>,
    color: bool,
    current: Option<FileReport>,
    finished: Vec<FileReport>,
}

impl ReportListener {
    /// Creates a listener writing to `out`.
    pub fn new(format: OutputFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            out,
            color: false,
            current: None,
            finished: Vec::new(),
        }
    }

    /// Enables ANSI colors in text output.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Info | Severity::Ignore => "34",
        };
        self.paint(code, &severity.to_string())
    }

    fn write_text_file(&mut self, report: &FileReport) -> ListenerResult {
        if report.violations.is_empty() && report.exceptions.is_empty() {
            return Ok(());
        }
        let header = self.paint("1", &report.path.display().to_string());
        writeln!(self.out, "{header}")?;
        for violation in &report.violations {
            let severity = self.severity_label(violation.severity);
            writeln!(
                self.out,
                "  {}:{}: {} {} [{}]",
                violation.line,
                violation.column,
                severity,
                violation.message,
                reported_id(violation)
            )?;
        }
        for exception in &report.exceptions {
            let label = self.paint("31", "exception");
            writeln!(self.out, "  {label}: {exception}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_text_summary(&mut self, summary: &AuditSummary) -> ListenerResult {
        let code = if summary.error_count > 0 {
            "31"
        } else if summary.violation_count > 0 {
            "33"
        } else {
            "32"
        };
        let cached = if summary.files_cached > 0 {
            format!(" ({} unchanged)", summary.files_cached)
        } else {
            String::new()
        };
        let cancelled = if summary.cancelled { " (cancelled)" } else { "" };
        let line = self.paint(
            code,
            &format!(
                "Found {} violation(s), {} failing, in {} file(s){cached}{cancelled}",
                summary.violation_count, summary.error_count, summary.files_processed
            ),
        );
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

/// The configured id, or the short module name when there is none.
fn reported_id(violation: &Violation) -> &str {
    match &violation.module_id {
        Some(id) => id,
        None => violation
            .source
            .rsplit("::")
            .next()
            .unwrap_or(&violation.source),
    }
}

impl AuditListener for ReportListener {
    fn file_started(&mut self, path: &Path) -> ListenerResult {
        self.current = Some(FileReport {
            path: path.to_path_buf(),
            ..FileReport::default()
        });
        Ok(())
    }

    fn add_error(&mut self, path: &Path, violation: &Violation) -> ListenerResult {
        if self.format == OutputFormat::Compact {
            writeln!(
                self.out,
                "{}:{}:{}: {} [{}] {}",
                path.display(),
                violation.line,
                violation.column,
                violation.severity,
                reported_id(violation),
                violation.message
            )?;
        } else if let Some(report) = &mut self.current {
            report.violations.push(violation.clone());
        }
        Ok(())
    }

    fn add_exception(&mut self, path: &Path, error: &str) -> ListenerResult {
        if self.format == OutputFormat::Compact {
            writeln!(self.out, "{}: exception: {error}", path.display())?;
        } else if let Some(report) = &mut self.current {
            report.exceptions.push(error.to_string());
        }
        Ok(())
    }

    fn file_finished(&mut self, _path: &Path) -> ListenerResult {
        let Some(report) = self.current.take() else {
            return Ok(());
        };
        match self.format {
            OutputFormat::Text => self.write_text_file(&report)?,
            OutputFormat::Json => {
                if !report.violations.is_empty() || !report.exceptions.is_empty() {
                    self.finished.push(report);
                }
            }
            OutputFormat::Compact => {}
        }
        Ok(())
    }

    fn audit_finished(&mut self, summary: &AuditSummary) -> ListenerResult {
        match self.format {
            OutputFormat::Text => self.write_text_summary(summary)?,
            OutputFormat::Json => {
                self.finished.sort_by(|a, b| a.path.cmp(&b.path));
                let report = JsonReport {
                    files: &self.finished,
                    summary,
                };
                serde_json::to_writer_pretty(&mut self.out, &report)
                    .map_err(|e| treewalk_core::ListenerError::Other(e.to_string()))?;
                writeln!(self.out)?;
            }
            OutputFormat::Compact => {}
        }
        self.out.flush()?;
        Ok(())
    }
}
