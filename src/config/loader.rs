use std::{fs, path::Path};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{ExporterConfig, LogFormat, LoggingConfig};
use crate::config::validator;

/// Load the config file when given, otherwise start from defaults, then validate.
pub fn run(config_path: Option<&str>) -> Result<ExporterConfig> {
    match config_path {
        Some(path) => file_to_config(Path::new(path))
            .with_context(|| format!("Invalid config format in {}", path)),
        None => finalize(ExporterConfig::default()),
    }
}

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ExporterConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ExporterConfig> {
    // an empty document is a valid "all defaults" config
    let config: ExporterConfig = if content.trim().is_empty() {
        ExporterConfig::default()
    } else {
        serde_yaml::from_str(content).inspect_err(|e| error!("parse config error: {}", e))?
    };
    finalize(config)
}

fn finalize(mut config: ExporterConfig) -> Result<ExporterConfig> {
    // Apply defaults
    if config.settings.logging.is_none() {
        config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    debug!("validation config ...");
    validator::validate_exporter_config(&config)?;
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
