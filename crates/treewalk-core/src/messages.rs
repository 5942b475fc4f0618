//! Message bundles and template rendering.

use std::collections::BTreeMap;

/// Reported when a file cannot be read.
pub const GENERAL_EXCEPTION: &str = "general.exception";
/// Reported when a file cannot be parsed.
pub const GENERAL_PARSE_ERROR: &str = "general.parse.error";
/// Reported when a check fails inside a callback.
pub const GENERAL_CHECK_FAILURE: &str = "general.check.failure";

const DEFAULT_LOCALE: &str = "en";

const ENGINE_MESSAGES: &[(&str, &str)] = &[
    (GENERAL_EXCEPTION, "Got an exception - {0}"),
    (GENERAL_PARSE_ERROR, "Parse error: {0}"),
    (
        GENERAL_CHECK_FAILURE,
        "Check {0} failed while processing {1}: {2}",
    ),
];

/// Per-run message lookup.
///
/// Tables are keyed by locale (`en`, `de`, `pt_BR`, ...). Lookup tries the
/// full locale, then its language part, then `en`.
#[derive(Debug, Clone)]
pub struct Messages {
    locale: String,
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Messages {
    /// Creates a lookup for `locale` holding the engine's own English messages.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        let mut messages = Self {
            locale: locale.into(),
            tables: BTreeMap::new(),
        };
        messages.add_defaults(ENGINE_MESSAGES);
        messages
    }

    /// Active locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Adds English templates, keeping entries that already exist.
    pub fn add_defaults(&mut self, entries: &[(&str, &str)]) {
        let table = self.tables.entry(DEFAULT_LOCALE.to_string()).or_default();
        for (key, template) in entries {
            table
                .entry((*key).to_string())
                .or_insert_with(|| (*template).to_string());
        }
    }

    /// Adds or replaces templates for a locale.
    pub fn add_translations<I, K, V>(&mut self, locale: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.tables.entry(locale.to_string()).or_default();
        for (key, template) in entries {
            table.insert(key.into(), template.into());
        }
    }

    /// Finds the template for `key`.
    #[must_use]
    pub fn template(&self, key: &str) -> Option<&str> {
        let language = self.locale.split(['_', '-']).next().unwrap_or(&self.locale);
        [self.locale.as_str(), language, DEFAULT_LOCALE]
            .into_iter()
            .find_map(|locale| self.tables.get(locale).and_then(|t| t.get(key)))
            .map(String::as_str)
    }

    /// Renders `key` with `args`. Unknown keys render as the key itself
    /// followed by the arguments.
    #[must_use]
    pub fn render(&self, key: &str, args: &[String]) -> String {
        match self.template(key) {
            Some(template) => format_message(template, args),
            None if args.is_empty() => key.to_string(),
            None => format!("{key}: {}", args.join(", ")),
        }
    }
}

/// Replaces `{n}` placeholders with `args[n]`. Placeholders without a
/// matching argument are left as written.
#[must_use]
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });
        match replaced {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
