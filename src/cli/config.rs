use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::Value as JsonValue;

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration, overrides applied
    Show,

    /// Get one configuration value
    Get {
        /// Dotted key, e.g. `upload.verify_ms`
        key: String,
    },

    /// Print where the configuration was read from
    Path,
}

pub fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("Effective configuration ({}):", ctx.config_path().display());
            println!("{}", serde_yaml::to_string(ctx.config())?);
        }
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            let segments = split_key(&key)?;
            match get_json_value(&json, &segments) {
                Some(value) => print!("{}", serde_yaml::to_string(value)?),
                None => bail!("{} not found in configuration", key),
            }
        }
        ConfigAction::Path => {
            let state = if ctx.config_path().exists() {
                "present"
            } else {
                "absent, defaults in use"
            };
            println!("{} ({})", ctx.config_path().display(), state);
        }
    }
    Ok(())
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        bail!("configuration key cannot be empty");
    }
    Ok(segments)
}

fn get_json_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for segment in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;

    #[test]
    fn nested_keys_resolve_against_the_config() {
        let json = serde_json::to_value(RelayConfig::default()).unwrap();
        let segments = split_key("upload.verify_ms").unwrap();
        assert_eq!(
            get_json_value(&json, &segments),
            Some(&JsonValue::from(30_000))
        );
        assert!(get_json_value(&json, &["upload", "nope"]).is_none());
        assert!(split_key("..").is_err());
    }
}
