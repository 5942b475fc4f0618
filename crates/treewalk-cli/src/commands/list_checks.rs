//! List checks command implementation.

use std::fmt::Write as _;
use treewalk_checks::{registry, Preset, PACKAGE};

/// Runs the list-checks command.
pub fn run() {
    print!("{}", render());
}

fn render() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available checks:\n");
    let _ = writeln!(out, "{:<22} Description", "Name");
    let _ = writeln!(out, "{}", "-".repeat(72));

    for (name, description) in registry().modules() {
        let short = name.strip_prefix(PACKAGE).unwrap_or(name);
        let short = short.strip_suffix("Check").unwrap_or(short);
        let _ = writeln!(out, "{short:<22} {description}");
    }

    let _ = writeln!(out, "\nPresets:");
    for preset in Preset::ALL {
        let modules: Vec<String> = preset
            .modules()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let marker = if preset == Preset::default() {
            " (default)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<12} {}{marker}",
            preset.name(),
            modules.join(", ")
        );
    }
    out
}
