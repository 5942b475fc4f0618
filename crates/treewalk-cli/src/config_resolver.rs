//! Locating `treewalk.toml`.
//!
//! Lookup order:
//!
//! 1. `--config <FILE>`
//! 2. `treewalk.toml`, then `.treewalk.toml`, in the checked directory
//! 3. `config.toml` in the user directory (`$TREEWALK_CONFIG_DIR`, else
//!    `~/.treewalk/`)
//! 4. nothing: the `recommended` preset is used

use std::path::{Path, PathBuf};

/// Environment variable overriding the user config directory.
pub const CONFIG_DIR_ENV: &str = "TREEWALK_CONFIG_DIR";

const PROJECT_CONFIG_NAMES: &[&str] = &["treewalk.toml", ".treewalk.toml"];
const USER_CONFIG_NAME: &str = "config.toml";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the checked sources.
    Project(PathBuf),
    /// Found in the user config directory.
    User(PathBuf),
    /// No file; a preset is used.
    Preset,
}

impl ConfigSource {
    /// Path of the configuration file, if there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Preset => None,
        }
    }
}

/// Resolves the configuration for a run rooted at `root`.
#[must_use]
pub fn resolve(root: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(root, explicit, user_config_dir())
}

fn resolve_in(root: &Path, explicit: Option<&Path>, user_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // A single file being checked looks for config next to it.
    let dir = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Using project config {}", found.display());
        return ConfigSource::Project(found);
    }

    if let Some(found) = user_dir
        .map(|dir| dir.join(USER_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
    {
        tracing::debug!("Using user config {}", found.display());
        return ConfigSource::User(found);
    }

    ConfigSource::Preset
}

/// Returns the user config directory.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|home| home.join(".treewalk")),
    }
}
