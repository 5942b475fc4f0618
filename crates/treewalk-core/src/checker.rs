//! Run orchestration: configuration, worker pool, cache and events.

use crate::cache::{content_fingerprint, PersistentCache};
use crate::check::{CheckMeta, RegisteredCheck};
use crate::config::{Configuration, CHECKER_MODULE, TREE_WALKER_MODULE};
use crate::dispatch::DispatchTable;
use crate::error::EngineError;
use crate::filter::{Filter, FilterContext, FilterSet, SeverityFilter};
use crate::language::Language;
use crate::listener::{AuditListener, ListenerDispatcher};
use crate::messages::{Messages, GENERAL_EXCEPTION, GENERAL_PARSE_ERROR};
use crate::registry::{parse_list, parse_usize, ModuleRegistry};
use crate::text::FileText;
use crate::types::{AuditSummary, Severity, Violation};
use crate::walker::{TreeWalker, WalkContext};

use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_TAB_WIDTH: usize = 8;
const ROOT_ATTRIBUTES: &[&str] = &["severity", "tab_width", "locale", "file_extensions", "packages"];
const WALKER_ATTRIBUTES: &[&str] = &["severity"];

/// Shared flag that stops a run from starting new files.
///
/// Files already in flight finish normally and `audit_finished` still fires.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builder for configuring a [`Checker`].
pub struct CheckerBuilder {
    language: Arc<dyn Language>,
    registry: ModuleRegistry,
    configuration: Option<Configuration>,
    listeners: Vec<Box<dyn AuditListener>>,
    filters: FilterSet,
    cache_file: Option<PathBuf>,
    threads: Option<usize>,
    basedir: Option<PathBuf>,
    fail_on: Severity,
    translations: BTreeMap<String, BTreeMap<String, String>>,
    cancellation: CancellationToken,
}

impl CheckerBuilder {
    /// Creates a builder for `language`, resolving modules through `registry`.
    #[must_use]
    pub fn new(language: Arc<dyn Language>, registry: ModuleRegistry) -> Self {
        let mut filters = FilterSet::new();
        filters.add(Box::new(SeverityFilter::default()));
        Self {
            language,
            registry,
            configuration: None,
            listeners: Vec::new(),
            filters,
            cache_file: None,
            threads: None,
            basedir: None,
            fail_on: Severity::Error,
            translations: BTreeMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the configuration tree (a `Checker` root).
    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Adds a listener.
    #[must_use]
    pub fn listener<L: AuditListener + 'static>(mut self, listener: L) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Adds a boxed listener.
    #[must_use]
    pub fn listener_box(mut self, listener: Box<dyn AuditListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Adds a filter consulted before every `add_error`.
    #[must_use]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.add(Box::new(filter));
        self
    }

    /// Enables the persistent cache at `path`.
    #[must_use]
    pub fn cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    /// Sets the worker count; `1` runs sequentially, `0` uses every core.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Reports event paths relative to `basedir`.
    #[must_use]
    pub fn basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.basedir = Some(basedir.into());
        self
    }

    /// Lowest severity counted by [`Checker::process`] (default: error).
    #[must_use]
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    /// Adds message translations for `locale`.
    #[must_use]
    pub fn translations(mut self, locale: impl Into<String>, entries: BTreeMap<String, String>) -> Self {
        self.translations.entry(locale.into()).or_default().extend(entries);
        self
    }

    /// Shares a cancellation token with the run.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Builds the checker: resolves and configures every module, validates
    /// tokens, and prepares one set of check instances per worker.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] for any configuration problem. No file is
    /// touched before this succeeds.
    pub fn build(mut self) -> Result<Checker, EngineError> {
        let configuration = self.configuration.take().unwrap_or_else(|| {
            Configuration::new(CHECKER_MODULE).with_child(Configuration::new(TREE_WALKER_MODULE))
        });
        if configuration.name() != CHECKER_MODULE {
            return Err(EngineError::structure(format!(
                "root module must be `{CHECKER_MODULE}`, found `{}`",
                configuration.name()
            )));
        }
        check_attributes(&configuration, ROOT_ATTRIBUTES)?;

        let root_severity = severity_attribute(&configuration, None)?;
        let tab_width = match configuration.attribute("tab_width") {
            Some(value) => parse_usize(value).map_err(|message| EngineError::Property {
                module: CHECKER_MODULE.to_string(),
                property: "tab_width".to_string(),
                value: value.to_string(),
                message,
            })?,
            None => DEFAULT_TAB_WIDTH,
        };
        if let Some(packages) = configuration.attribute("packages") {
            for package in parse_list(packages).unwrap_or_default() {
                self.registry.add_package(package);
            }
        }
        let extensions = match configuration.attribute("file_extensions") {
            Some(list) => parse_list(list).unwrap_or_default(),
            None => Vec::new(),
        };
        let extensions = if extensions.is_empty() {
            self.language
                .file_extensions()
                .iter()
                .map(|e| (*e).to_string())
                .collect()
        } else {
            extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        };

        let specs = self.collect_specs(&configuration, root_severity)?;
        let registry = Arc::new(self.registry);

        let prototype = instantiate_checks(&registry, &specs)?;
        let table = Arc::new(DispatchTable::build(self.language.as_ref(), &prototype)?);

        let locale = configuration.attribute("locale").unwrap_or("en");
        let mut messages = Messages::new(locale);
        for registered in &prototype {
            messages.add_defaults(registered.check.messages());
        }
        for (locale, entries) in self.translations {
            messages.add_translations(&locale, entries);
        }

        let threads = match self.threads {
            None | Some(0) => rayon::current_num_threads(),
            Some(n) => n,
        };
        let pool = if threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("treewalk-{i}"))
                .build()
                .map_err(|e| EngineError::ThreadPool {
                    threads,
                    message: e.to_string(),
                })?;
            Some(pool)
        } else {
            None
        };

        let specs = Arc::new(specs);
        let mut walkers = vec![TreeWalker::new(prototype, Arc::clone(&table))];
        for _ in 1..threads {
            walkers.push(TreeWalker::new(
                instantiate_checks(&registry, &specs)?,
                Arc::clone(&table),
            ));
        }

        let cache = self
            .cache_file
            .map(|path| PersistentCache::load(path, &configuration));

        let mut dispatcher = ListenerDispatcher::new();
        for listener in self.listeners {
            dispatcher.add(listener);
        }

        info!(
            "Checker ready: {} check(s), {} worker(s), language {}",
            specs.len(),
            threads,
            self.language.name()
        );

        Ok(Checker {
            language: self.language,
            registry,
            specs,
            table,
            walkers: Mutex::new(walkers),
            pool,
            messages,
            tab_width,
            extensions,
            basedir: self.basedir.map(|b| absolute(&b)),
            fail_on: self.fail_on,
            cache,
            filters: self.filters,
            dispatcher: Mutex::new(dispatcher),
            cancellation: self.cancellation,
            configuration,
        })
    }

    fn collect_specs(
        &self,
        configuration: &Configuration,
        root_severity: Option<Severity>,
    ) -> Result<Vec<CheckSpec>, EngineError> {
        let mut specs = Vec::new();
        for walker in configuration.children() {
            if walker.name() != TREE_WALKER_MODULE {
                return Err(EngineError::structure(format!(
                    "`{}` is not allowed under `{CHECKER_MODULE}`; checks belong under `{TREE_WALKER_MODULE}`",
                    walker.name()
                )));
            }
            check_attributes(walker, WALKER_ATTRIBUTES)?;
            let walker_severity = severity_attribute(walker, root_severity)?;

            for module in walker.children() {
                if !module.children().is_empty() {
                    return Err(EngineError::structure(format!(
                        "module `{}` cannot have child modules",
                        module.name()
                    )));
                }
                let resolved = self.registry.resolve(module.name())?.to_string();
                let severity = severity_attribute(module, walker_severity)?.unwrap_or_default();
                let tokens = match module.attribute("tokens") {
                    Some(value) => {
                        let tokens = parse_list(value).unwrap_or_default();
                        if tokens.is_empty() {
                            return Err(EngineError::Property {
                                module: module.name().to_string(),
                                property: "tokens".to_string(),
                                value: value.to_string(),
                                message: "at least one token is required".to_string(),
                            });
                        }
                        tokens
                    }
                    None => Vec::new(),
                };
                let meta = CheckMeta {
                    module: resolved,
                    id: module.attribute("id").map(String::from),
                    severity,
                    tokens,
                    custom_messages: module.messages().clone(),
                };
                debug!(module = %meta.module, severity = %meta.severity, "configured check");
                specs.push(CheckSpec {
                    config: module.clone(),
                    meta,
                });
            }
        }
        Ok(specs)
    }
}

/// A configured module, ready to be instantiated once per worker.
#[derive(Debug, Clone)]
struct CheckSpec {
    config: Configuration,
    meta: CheckMeta,
}

fn instantiate_checks(
    registry: &ModuleRegistry,
    specs: &[CheckSpec],
) -> Result<Vec<RegisteredCheck>, EngineError> {
    specs
        .iter()
        .map(|spec| {
            let (_, check) = registry.instantiate(&spec.config)?;
            Ok(RegisteredCheck {
                meta: spec.meta.clone(),
                check,
            })
        })
        .collect()
}

fn check_attributes(config: &Configuration, allowed: &[&str]) -> Result<(), EngineError> {
    match config.attributes().keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(property) => Err(EngineError::UnknownProperty {
            module: config.name().to_string(),
            property: property.clone(),
        }),
        None => Ok(()),
    }
}

fn severity_attribute(
    config: &Configuration,
    inherited: Option<Severity>,
) -> Result<Option<Severity>, EngineError> {
    match config.attribute("severity") {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|message| EngineError::Property {
                module: config.name().to_string(),
                property: "severity".to_string(),
                value: value.to_string(),
                message,
            }),
        None => Ok(inherited),
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

#[derive(Default)]
struct Stats {
    processed: AtomicUsize,
    cached: AtomicUsize,
    skipped: AtomicUsize,
    errors: AtomicUsize,
    violations: AtomicUsize,
    cancelled: AtomicBool,
}

struct FileOutcome {
    text: Option<FileText>,
    violations: Vec<Violation>,
    exception: Option<String>,
}

/// Checks files with a fixed configuration.
///
/// Use [`Checker::builder()`] to construct an instance.
pub struct Checker {
    language: Arc<dyn Language>,
    registry: Arc<ModuleRegistry>,
    specs: Arc<Vec<CheckSpec>>,
    table: Arc<DispatchTable>,
    walkers: Mutex<Vec<TreeWalker>>,
    pool: Option<rayon::ThreadPool>,
    messages: Messages,
    tab_width: usize,
    extensions: Vec<String>,
    basedir: Option<PathBuf>,
    fail_on: Severity,
    cache: Option<PersistentCache>,
    filters: FilterSet,
    dispatcher: Mutex<ListenerDispatcher>,
    cancellation: CancellationToken,
    configuration: Configuration,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("language", &self.language.name())
            .field("checks", &self.specs.len())
            .field("extensions", &self.extensions)
            .field("fail_on", &self.fail_on)
            .finish_non_exhaustive()
    }
}

impl Checker {
    /// Creates a new builder.
    #[must_use]
    pub fn builder(language: Arc<dyn Language>, registry: ModuleRegistry) -> CheckerBuilder {
        CheckerBuilder::new(language, registry)
    }

    /// The configuration this checker was built from.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Number of configured checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.specs.len()
    }

    /// Extensions (without dot) of the files this checker accepts.
    #[must_use]
    pub fn file_extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The persistent cache, if enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&PersistentCache> {
        self.cache.as_ref()
    }

    /// Handle for cancelling runs of this checker.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Checks `files` and returns the number of reported violations at or
    /// above the `fail_on` severity.
    pub fn process(&self, files: &[PathBuf]) -> usize {
        self.audit(files).error_count
    }

    /// Checks `files` and returns the run counters.
    ///
    /// `audit_finished` is delivered even if a listener or check panics
    /// through the engine; the panic is resumed afterwards.
    pub fn audit(&self, files: &[PathBuf]) -> AuditSummary {
        info!("Starting audit of {} file(s)", files.len());
        let stats = Stats::default();
        self.dispatcher.lock().audit_started();

        let run = catch_unwind(AssertUnwindSafe(|| match &self.pool {
            Some(pool) => pool.install(|| {
                files
                    .par_iter()
                    .for_each(|file| self.process_file(file, &stats));
            }),
            None => files.iter().for_each(|file| self.process_file(file, &stats)),
        }));

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.persist() {
                warn!(error = %e, "failed to persist cache");
            }
        }

        let mut dispatcher = self.dispatcher.lock();
        let summary = AuditSummary {
            files_processed: stats.processed.load(Ordering::SeqCst),
            files_cached: stats.cached.load(Ordering::SeqCst),
            files_skipped: stats.skipped.load(Ordering::SeqCst),
            error_count: stats.errors.load(Ordering::SeqCst),
            violation_count: stats.violations.load(Ordering::SeqCst),
            listener_failures: dispatcher.failures(),
            cancelled: stats.cancelled.load(Ordering::SeqCst),
        };
        dispatcher.audit_finished(&summary);
        drop(dispatcher);

        info!(
            "Audit complete: {} violation(s), {} at or above {} in {} file(s)",
            summary.violation_count, summary.error_count, self.fail_on, summary.files_processed
        );

        if let Err(payload) = run {
            resume_unwind(payload);
        }
        summary
    }

    fn process_file(&self, file: &Path, stats: &Stats) {
        if self.cancellation.is_cancelled() {
            stats.cancelled.store(true, Ordering::SeqCst);
            return;
        }
        if !self.accepts_extension(file) {
            debug!("Skipping (extension): {}", file.display());
            stats.skipped.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let absolute = absolute(file);
        let shown = self.display_path(&absolute);
        debug!("Checking: {}", shown.display());

        let outcome = self.check_file(&absolute, stats);
        stats.processed.fetch_add(1, Ordering::SeqCst);

        let ctx = FilterContext {
            path: &shown,
            text: outcome.text.as_ref(),
        };
        let mut dispatcher = self.dispatcher.lock();
        dispatcher.file_started(&shown);
        if let Some(error) = &outcome.exception {
            dispatcher.add_exception(&shown, error);
        }
        for violation in &outcome.violations {
            if !self.filters.accept(&ctx, violation) {
                continue;
            }
            stats.violations.fetch_add(1, Ordering::SeqCst);
            if violation.severity >= self.fail_on {
                stats.errors.fetch_add(1, Ordering::SeqCst);
            }
            dispatcher.add_error(&shown, violation);
        }
        dispatcher.file_finished(&shown);
    }

    fn check_file(&self, file: &Path, stats: &Stats) -> FileOutcome {
        let text = match FileText::read(file) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read {}: {}", file.display(), e);
                if let Some(cache) = &self.cache {
                    cache.remove(file);
                }
                let error = e.to_string();
                return FileOutcome {
                    text: None,
                    violations: vec![self.engine_violation(0, 0, GENERAL_EXCEPTION, &error, CHECKER_MODULE)],
                    exception: Some(error),
                };
            }
        };

        let fingerprint = content_fingerprint(text.content());
        if let Some(cache) = &self.cache {
            if cache.is_unchanged(file, &fingerprint) {
                debug!("Unchanged since last clean run: {}", file.display());
                stats.cached.fetch_add(1, Ordering::SeqCst);
                return FileOutcome {
                    text: Some(text),
                    violations: Vec::new(),
                    exception: None,
                };
            }
        }

        let violations = match self.language.parse(&text) {
            Ok(ast) => self.walk(&ast, &text),
            Err(e) => {
                debug!("Parse error in {}: {}", file.display(), e);
                vec![self.engine_violation(
                    e.line.unwrap_or(0),
                    e.column.map_or(0, |c| c + 1),
                    GENERAL_PARSE_ERROR,
                    &e.message,
                    TREE_WALKER_MODULE,
                )]
            }
        };

        if let Some(cache) = &self.cache {
            if violations.is_empty() {
                cache.mark_checked(file, &fingerprint);
            } else {
                cache.remove(file);
            }
        }

        FileOutcome {
            text: Some(text),
            violations,
            exception: None,
        }
    }

    fn walk(&self, ast: &crate::ast::Ast, text: &FileText) -> Vec<Violation> {
        let pooled = self.walkers.lock().pop();
        let mut walker = match pooled {
            Some(walker) => walker,
            None => match instantiate_checks(&self.registry, &self.specs) {
                Ok(checks) => TreeWalker::new(checks, Arc::clone(&self.table)),
                Err(e) => {
                    warn!("Cannot create checks for {}: {}", text.path().display(), e);
                    let message = e.to_string();
                    return vec![self.engine_violation(0, 0, GENERAL_EXCEPTION, &message, CHECKER_MODULE)];
                }
            },
        };

        let ctx = WalkContext {
            file: text,
            messages: &self.messages,
            tab_width: self.tab_width,
        };
        let violations = walker.walk(ast, &ctx);
        self.walkers.lock().push(walker);
        violations
    }

    fn engine_violation(
        &self,
        line: usize,
        column: usize,
        key: &str,
        detail: &str,
        source: &str,
    ) -> Violation {
        let args = vec![detail.to_string()];
        let message = self.messages.render(key, &args);
        Violation::new(line, column, Severity::Error, key, message, source).with_args(args)
    }

    fn accepts_extension(&self, file: &Path) -> bool {
        file.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }

    fn display_path(&self, file: &Path) -> PathBuf {
        self.basedir
            .as_deref()
            .and_then(|base| absolute(file).strip_prefix(base).ok().map(Path::to_path_buf))
            .unwrap_or_else(|| file.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::check::Check;
    use crate::language::ParseError;
    use crate::token::TokenType;

    struct Plain;

    impl Language for Plain {
        fn name(&self) -> &'static str {
            "plain"
        }
        fn file_extensions(&self) -> &[&'static str] {
            &["txt"]
        }
        fn token_count(&self) -> usize {
            1
        }
        fn token_name(&self, ty: TokenType) -> Option<&'static str> {
            (ty.id() == 0).then_some("ROOT")
        }
        fn token_id(&self, name: &str) -> Option<TokenType> {
            (name == "ROOT").then_some(TokenType::new(0))
        }
        fn parse(&self, file: &FileText) -> Result<Ast, ParseError> {
            Ok(Ast::with_root(TokenType::new(0), file.content(), 1, 0))
        }
    }

    fn builder() -> CheckerBuilder {
        Checker::builder(Arc::new(Plain), ModuleRegistry::new())
    }

    #[test]
    fn test_builder_defaults() {
        let checker = builder().threads(1).build().expect("Failed to build checker");
        assert_eq!(checker.check_count(), 0);
        assert!(checker.cache().is_none());
        assert_eq!(checker.configuration().name(), CHECKER_MODULE);
    }

    #[test]
    fn test_root_must_be_checker() {
        let err = builder()
            .configuration(Configuration::new("Other"))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStructure { .. }));
    }

    #[test]
    fn test_unknown_root_attribute() {
        let err = builder()
            .configuration(Configuration::new(CHECKER_MODULE).with_attribute("colour", "red"))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownProperty { .. }));
    }

    #[test]
    fn test_bad_tab_width() {
        let err = builder()
            .configuration(Configuration::new(CHECKER_MODULE).with_attribute("tab_width", "wide"))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Property { ref property, .. } if property == "tab_width"));
    }

    #[test]
    fn test_unresolvable_module_fails_before_any_file() {
        let config = Configuration::new(CHECKER_MODULE).with_child(
            Configuration::new(TREE_WALKER_MODULE).with_child(Configuration::new("Missing")),
        );
        let err = builder().configuration(config).build().unwrap_err();
        assert!(matches!(err, EngineError::ModuleResolution { .. }));
    }

    #[derive(Default)]
    struct RootCheck;

    impl Check for RootCheck {
        fn default_tokens(&self) -> Vec<TokenType> {
            vec![TokenType::new(0)]
        }
    }

    impl crate::registry::Configurable for RootCheck {
        const PROPERTIES: &'static [crate::registry::Property<Self>] = &[];
    }

    fn with_root_check(tokens: &str) -> Result<Checker, EngineError> {
        let mut registry = ModuleRegistry::new();
        registry.register::<RootCheck>("RootCheck");
        let config = Configuration::new(CHECKER_MODULE).with_child(
            Configuration::new(TREE_WALKER_MODULE)
                .with_child(Configuration::new("RootCheck").with_attribute("tokens", tokens)),
        );
        Checker::builder(Arc::new(Plain), registry)
            .configuration(config)
            .threads(1)
            .build()
    }

    #[test]
    fn test_empty_token_list_is_rejected() {
        for tokens in ["", " , "] {
            let err = with_root_check(tokens).unwrap_err();
            assert!(
                matches!(err, EngineError::Property { ref property, .. } if property == "tokens"),
                "{tokens:?}: {err}"
            );
        }
        assert_eq!(with_root_check("ROOT").unwrap().check_count(), 1);
    }

    #[test]
    fn test_extension_filter_and_basedir() {
        let checker = builder()
            .threads(1)
            .basedir("/project")
            .build()
            .expect("Failed to build checker");
        assert!(checker.accepts_extension(Path::new("a.TXT")));
        assert!(!checker.accepts_extension(Path::new("a.rs")));
        assert!(!checker.accepts_extension(Path::new("Makefile")));
        assert_eq!(checker.file_extensions(), ["txt".to_string()]);
        assert_eq!(
            checker.display_path(Path::new("/project/src/a.txt")),
            PathBuf::from("src/a.txt")
        );
        assert_eq!(
            checker.display_path(Path::new("/elsewhere/a.txt")),
            PathBuf::from("/elsewhere/a.txt")
        );
    }

    #[test]
    fn test_cancelled_run_starts_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();

        let token = CancellationToken::new();
        let checker = builder()
            .threads(1)
            .cancellation(token.clone())
            .build()
            .unwrap();
        token.cancel();
        let summary = checker.audit(&[file]);
        assert!(summary.cancelled);
        assert_eq!(summary.files_processed, 0);
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let checker = builder().threads(1).build().unwrap();
        let summary = checker.audit(&[PathBuf::from("/definitely/missing/file.txt")]);
        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.error_count, 1);
    }
}
