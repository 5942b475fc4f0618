//! Check command implementation.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use treewalk_checks::{registry, Preset};
use treewalk_core::{Checker, ConfigFile, SuppressionCommentFilter, SuppressionFilter};
use treewalk_syntax::RustLanguage;

use super::output::ReportListener;
use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Options of `treewalk check`.
#[derive(Debug)]
pub struct CheckArgs {
    /// File or directory to check.
    pub path: PathBuf,
    /// Report format.
    pub format: OutputFormat,
    /// Extra exclusion globs.
    pub exclude: Vec<String>,
    /// Worker thread override.
    pub threads: Option<usize>,
    /// Skip the configured cache.
    pub no_cache: bool,
    /// Preset used when no configuration file is found.
    pub preset: Preset,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

/// Runs the check command.
///
/// Configuration problems are printed as diagnostics and yield exit code 2.
pub fn run(args: &CheckArgs) -> Result<ExitCode> {
    if !args.path.exists() {
        anyhow::bail!("Path does not exist: {}", args.path.display());
    }

    let source = config_resolver::resolve(&args.path, args.config.as_deref());
    let config = match source.path() {
        Some(path) => {
            tracing::info!("Using config {}", path.display());
            Some(
                ConfigFile::from_file(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
            )
        }
        None => {
            tracing::info!("No config found, using the {} preset", args.preset.name());
            None
        }
    };

    let language = Arc::new(RustLanguage::new());
    let section = config.as_ref().map(|c| c.checker.clone()).unwrap_or_default();
    let config_dir = config_dir(&source);

    let mut exclude = section.exclude.clone();
    exclude.extend(args.exclude.iter().cloned());
    let exclude = compile_excludes(&exclude)?;

    let configuration = match &config {
        Some(config) => config.to_configuration(),
        None => args.preset.configuration(),
    };
    let color = args.format == OutputFormat::Text && std::io::stdout().is_terminal();
    let listener =
        ReportListener::new(args.format, Box::new(std::io::stdout())).with_color(color);

    let mut builder = Checker::builder(language, registry())
        .configuration(configuration)
        .filter(SuppressionCommentFilter)
        .listener(listener);
    if let Some(threads) = args.threads.or(section.threads) {
        builder = builder.threads(threads);
    }
    if let Some(fail_on) = section.fail_on {
        builder = builder.fail_on(fail_on);
    }
    if let Some(basedir) = &section.basedir {
        builder = builder.basedir(relative_to(config_dir, basedir));
    } else if args.path.is_dir() {
        builder = builder.basedir(args.path.clone());
    }
    match &section.cache_file {
        Some(cache) if !args.no_cache => {
            builder = builder.cache_file(relative_to(config_dir, cache));
        }
        _ => {}
    }
    if let Some(config) = &config {
        for (locale, entries) in &config.translations {
            builder = builder.translations(locale.clone(), entries.clone());
        }
        if !config.suppressions.is_empty() {
            let suppressions = SuppressionFilter::from_sections(&config.suppressions)
                .context("Invalid [[suppress]] entry")?;
            tracing::debug!("Loaded {} suppression(s)", suppressions.len());
            builder = builder.filter(suppressions);
        }
    }

    let checker = match builder.build() {
        Ok(checker) => checker,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return Ok(ExitCode::from(2));
        }
    };

    let files = discover_files(&args.path, checker.file_extensions(), &exclude)?;
    tracing::debug!("Discovered {} file(s) under {}", files.len(), args.path.display());

    tracing::info!(
        "Checking {} file(s) with {} check(s)",
        files.len(),
        checker.check_count()
    );
    let summary = checker.audit(&files);
    tracing::debug!("Audit finished: {:?}", summary);

    if summary.error_count > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn config_dir(source: &ConfigSource) -> Option<&Path> {
    source.path().and_then(Path::parent)
}

/// Paths in a config file are relative to the file's directory.
fn relative_to(dir: Option<&Path>, path: &Path) -> PathBuf {
    match dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern `{p}`")))
        .collect()
}

/// Collects files with one of `extensions` under `root`, honoring
/// `.gitignore` and the exclusion globs. A file root is returned as is.
pub fn discover_files(
    root: &Path,
    extensions: &[String],
    exclude: &[glob::Pattern],
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.context("Failed to walk source tree")?;
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if !matches_extension {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let excluded = exclude
            .iter()
            .any(|pattern| pattern.matches_path(relative) || pattern.matches_path(path));
        if excluded {
            tracing::debug!("Excluded {}", path.display());
        } else {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for file in [
            "src/lib.rs",
            "src/gen/out.rs",
            "src/notes.md",
            "target/debug/build.rs",
            ".hidden/mod.rs",
        ] {
            let path = tmp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        tmp
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_discovery_filters_extensions() {
        let tmp = tree();
        let files = discover_files(tmp.path(), &["rs".to_string()], &[]).unwrap();
        assert_eq!(
            names(tmp.path(), &files),
            vec![
                ".hidden/mod.rs",
                "src/gen/out.rs",
                "src/lib.rs",
                "target/debug/build.rs"
            ]
        );
    }

    #[test]
    fn test_discovery_excludes() {
        let tmp = tree();
        let exclude =
            compile_excludes(&["target/**".to_string(), "**/gen/*".to_string()]).unwrap();
        let files = discover_files(tmp.path(), &["rs".to_string()], &exclude).unwrap();
        assert_eq!(
            names(tmp.path(), &files),
            vec![".hidden/mod.rs", "src/lib.rs"]
        );
    }

    #[test]
    fn test_single_file_root() {
        let tmp = tree();
        let file = tmp.path().join("src/notes.md");
        let files = discover_files(&file, &["rs".to_string()], &[]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_invalid_exclude() {
        assert!(compile_excludes(&["[".to_string()]).is_err());
    }

    #[test]
    fn test_relative_to_config_dir() {
        let dir = Path::new("/project");
        assert_eq!(
            relative_to(Some(dir), Path::new(".treewalk-cache")),
            PathBuf::from("/project/.treewalk-cache")
        );
        assert_eq!(
            relative_to(Some(dir), Path::new("/tmp/cache")),
            PathBuf::from("/tmp/cache")
        );
        assert_eq!(
            relative_to(None, Path::new("cache")),
            PathBuf::from("cache")
        );
    }
}
