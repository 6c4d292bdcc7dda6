//! Configuration view and validation commands: `cmdforge config`.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::PathBuf;

use cmdforge::config::CONFIG_FILE;
use cmdforge::{Arity, CommandSet, CommandSetBuilder, RuntimeConfig};

pub fn command_set(config_path: Option<PathBuf>) -> Result<CommandSet> {
    let path = config_path.or_else(RuntimeConfig::default_path);
    let shown_path = path.clone();

    let set = CommandSetBuilder::new("config")
        .desc("show", "Print the effective configuration as TOML")
        .register("show", Arity::NONE, |inv| {
            let content = toml::to_string_pretty(inv.config())
                .context("Failed to serialize configuration")?;
            inv.say(content.trim_end());
            Ok(Value::Null)
        })
        .desc("path", "Print the configuration file location")
        .register("path", Arity::NONE, move |inv| {
            match &shown_path {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    inv.say(format!("{}{}", path.display(), state));
                }
                None => inv.say(format!("No configuration directory; {} is not read", CONFIG_FILE)),
            }
            Ok(json!(shown_path.as_ref().map(|p| p.display().to_string())))
        })
        .desc("validate", "Check the configuration for problems")
        .register("validate", Arity::NONE, move |inv| {
            let warnings = inv.config().validate();
            if warnings.is_empty() {
                inv.say("Configuration is valid");
            } else {
                inv.say("Configuration warnings:");
                for warning in &warnings {
                    inv.say(format!("  - {}", warning));
                }
            }
            if let Some(path) = &path {
                inv.say(format!("Source: {}", path.display()));
            }
            Ok(json!(warnings))
        })
        .build()?;
    Ok(set)
}
