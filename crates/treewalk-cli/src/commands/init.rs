//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_NAME: &str = "treewalk.toml";

const DEFAULT_CONFIG: &str = r#"# treewalk configuration

[checker]
# Severity of modules that do not set one: error, warning, info, ignore
severity = "error"
# Lowest severity that makes `treewalk check` exit with 1
fail_on = "error"
# Worker threads; 1 runs sequentially, unset uses every core
# threads = 4
# Unchanged files are skipped on the next run
cache_file = ".treewalk-cache"
# Glob patterns excluded from file discovery
exclude = ["target/**"]

[[module]]
name = "FunctionLength"
[module.properties]
max = 50

[[module]]
name = "FunctionName"

[[module]]
name = "TypeName"

[[module]]
name = "ConstantName"

[[module]]
name = "ParameterNumber"
[module.properties]
max = 7

[[module]]
name = "ForbiddenCall"
id = "no-panics"
[module.properties]
methods = ["unwrap", "expect"]
macros = ["dbg", "todo", "unimplemented"]

# [[module]]
# name = "NestingDepth"
# severity = "warning"
# [module.properties]
# max = 4

# [translations.de]
# "function.too.long" = "Funktion '{0}' hat {1} Zeilen (max: {2})"
"#;

/// Runs the init command, writing `treewalk.toml` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure checks");
    println!("  2. Run: treewalk check");

    Ok(())
}
