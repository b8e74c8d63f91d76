use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// How each command's outcome is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One sentence per command
    #[default]
    Human,
    /// One JSON object per command
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Configuration for the bank-ledger CLI
///
/// Everything is in memory; there is nothing to configure about storage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output format (default: human)
    pub output_format: OutputFormat,

    /// Log filter directive, e.g. "warn" or "bank_ledger=debug" (default: "warn")
    pub log_level: String,

    /// Command file to read; stdin when absent
    pub input: Option<PathBuf>,

    /// Environment values that were rejected while loading; logged once the
    /// subscriber is installed
    pub warnings: Vec<String>,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Config {
            output_format: OutputFormat::Human,
            log_level: "warn".to_string(),
            input: None,
            warnings: Vec::new(),
        }
    }

    /// Get output format
    pub fn get_output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Set output format
    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    /// Get log filter directive
    pub fn get_log_level(&self) -> &str {
        &self.log_level
    }

    /// Set log filter directive
    pub fn set_log_level(&mut self, level: String) {
        self.log_level = level;
    }

    /// Get command file path
    pub fn get_input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Set command file path
    pub fn set_input(&mut self, path: PathBuf) {
        self.input = Some(path);
    }

    /// Load config from environment variables
    ///
    /// Environment variables:
    /// - `BANK_LEDGER_OUTPUT_FORMAT`: "human" or "json"; unknown values are ignored
    /// - `BANK_LEDGER_LOG_LEVEL`: log filter directive
    /// - `BANK_LEDGER_INPUT`: command file path
    ///
    /// Nothing is logged here; rejected values end up in `warnings`.
    pub fn from_env() -> Self {
        Config::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::new();

        if let Some(format) = lookup("BANK_LEDGER_OUTPUT_FORMAT") {
            match format.parse() {
                Ok(format) => config.output_format = format,
                Err(e) => config
                    .warnings
                    .push(format!("ignoring BANK_LEDGER_OUTPUT_FORMAT: {}", e)),
            }
        }

        if let Some(level) = lookup("BANK_LEDGER_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(path) = lookup("BANK_LEDGER_INPUT") {
            config.input = Some(PathBuf::from(path));
        }

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.output_format, OutputFormat::Human);
        assert_eq!(config.log_level, "warn");
        assert!(config.input.is_none());
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_config_setters() {
        let mut config = Config::new();
        config.set_output_format(OutputFormat::Json);
        assert_eq!(config.get_output_format(), OutputFormat::Json);

        config.set_log_level("debug".to_string());
        assert_eq!(config.get_log_level(), "debug");

        config.set_input(PathBuf::from("commands.txt"));
        assert!(config.get_input().unwrap().ends_with("commands.txt"));
    }

    #[test]
    fn test_config_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("BANK_LEDGER_OUTPUT_FORMAT", "JSON"),
            ("BANK_LEDGER_LOG_LEVEL", "bank_ledger=debug"),
            ("BANK_LEDGER_INPUT", "/tmp/cmds"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.log_level, "bank_ledger=debug");
        assert_eq!(config.input, Some(PathBuf::from("/tmp/cmds")));
    }

    #[test]
    fn test_unknown_format_keeps_default() {
        let config = Config::from_vars(|key| {
            (key == "BANK_LEDGER_OUTPUT_FORMAT").then(|| "yaml".to_string())
        });
        assert_eq!(config.output_format, OutputFormat::Human);
        assert_eq!(
            config.warnings,
            vec!["ignoring BANK_LEDGER_OUTPUT_FORMAT: unknown output format 'yaml'".to_string()]
        );
    }

    #[test]
    fn test_valid_vars_produce_no_warnings() {
        let config = Config::from_vars(|key| {
            (key == "BANK_LEDGER_OUTPUT_FORMAT").then(|| "human".to_string())
        });
        assert!(config.warnings.is_empty());
    }
}
