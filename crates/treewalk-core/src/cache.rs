//! Persistent cache of files that last checked clean.
//!
//! On disk the cache is a flat `key=value` file. One reserved key holds the
//! fingerprint of the configuration the entries were produced with; every
//! other key is an absolute file path mapped to the SHA-256 of the content
//! that checked clean.

use crate::config::Configuration;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reserved key holding the configuration fingerprint.
pub const CONFIG_HASH_KEY: &str = "configuration*?";

/// Cache persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Writing the cache file failed.
    #[error("Failed to write cache file {path}: {source}")]
    Io {
        /// Cache file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// File-content cache keyed by absolute path.
#[derive(Debug)]
pub struct PersistentCache {
    path: PathBuf,
    config_hash: String,
    entries: RwLock<BTreeMap<String, String>>,
}

impl PersistentCache {
    /// Loads the cache at `path` for the given configuration.
    ///
    /// A missing or unreadable file yields an empty cache, as does a file
    /// written for a different configuration.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, config: &Configuration) -> Self {
        let path = path.into();
        let config_hash = config_fingerprint(config);
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let mut entries = parse_entries(&content);
                match entries.remove(CONFIG_HASH_KEY) {
                    Some(stored) if stored == config_hash => {
                        debug!(path = %path.display(), entries = entries.len(), "cache loaded");
                        entries
                    }
                    Some(_) => {
                        info!(path = %path.display(), "configuration changed, cache invalidated");
                        BTreeMap::new()
                    }
                    None => {
                        warn!(path = %path.display(), "cache file has no configuration hash, ignoring it");
                        BTreeMap::new()
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read cache file, starting empty");
                BTreeMap::new()
            }
        };
        Self {
            path,
            config_hash,
            entries: RwLock::new(entries),
        }
    }

    /// Cache file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint of the configuration this cache belongs to.
    #[must_use]
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Returns true if `file` last checked clean with exactly this content.
    #[must_use]
    pub fn is_unchanged(&self, file: &Path, fingerprint: &str) -> bool {
        self.entries
            .read()
            .get(key(file).as_str())
            .is_some_and(|stored| stored == fingerprint)
    }

    /// Records that `file` checked clean with this content.
    pub fn mark_checked(&self, file: &Path, fingerprint: &str) {
        self.entries
            .write()
            .insert(key(file), fingerprint.to_string());
    }

    /// Forgets `file`.
    pub fn remove(&self, file: &Path) {
        self.entries.write().remove(key(file).as_str());
    }

    /// Forgets every file.
    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    /// Number of cached files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no file is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Writes the cache to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn persist(&self) -> Result<(), CacheError> {
        let io_error = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let mut out = String::from("# treewalk cache\n");
        let _ = writeln!(out, "{}={}", escape(CONFIG_HASH_KEY), self.config_hash);
        for (file, fingerprint) in self.entries.read().iter() {
            let _ = writeln!(out, "{}={fingerprint}", escape(file));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&self.path, out).map_err(io_error)?;
        debug!(path = %self.path.display(), entries = self.len(), "cache persisted");
        Ok(())
    }
}

fn key(file: &Path) -> String {
    file.to_string_lossy().into_owned()
}

fn escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '=' => out.push_str("\\="),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Splits one line at the first unescaped `=`, unescaping the key.
fn split_entry(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => key.push('\n'),
                Some((_, escaped)) => key.push(escaped),
                None => return None,
            },
            '=' => return Some((key, line[index + 1..].to_string())),
            other => key.push(other),
        }
    }
    None
}

fn parse_entries(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(split_entry)
        .collect()
}

/// Fingerprint of a whole configuration tree, upper-case hex SHA-256.
///
/// Every string is length-prefixed and every map or list is count-prefixed,
/// so distinct trees never serialise to the same byte stream.
#[must_use]
pub fn config_fingerprint(config: &Configuration) -> String {
    fn feed_str(hasher: &mut Sha256, value: &str) {
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }

    fn feed_map(hasher: &mut Sha256, map: &BTreeMap<String, String>) {
        hasher.update((map.len() as u64).to_le_bytes());
        for (key, value) in map {
            feed_str(hasher, key);
            feed_str(hasher, value);
        }
    }

    fn feed_node(hasher: &mut Sha256, node: &Configuration) {
        feed_str(hasher, node.name());
        feed_map(hasher, node.attributes());
        feed_map(hasher, node.messages());
        hasher.update((node.children().len() as u64).to_le_bytes());
        for child in node.children() {
            feed_node(hasher, child);
        }
    }

    let mut hasher = Sha256::new();
    feed_node(&mut hasher, config);
    hex::encode_upper(hasher.finalize())
}

/// Fingerprint of file content, lower-case hex SHA-256.
#[must_use]
pub fn content_fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
