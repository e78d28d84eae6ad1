//! Configuration file handling

use std::path::{Path, PathBuf};

use ddlint_core::ReportMode;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::args::OutputFormat;

pub const CONFIG_FILE: &str = "ddlint.toml";

/// Configuration for ddlint
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Script file paths or glob patterns
    #[serde(default)]
    pub files: Vec<String>,

    /// Directory searched recursively for *.sql files
    #[serde(default)]
    pub dir: Option<String>,

    /// SQL dialect ("mysql" or "postgresql")
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Rules to run; empty means every built-in rule
    #[serde(default)]
    pub rules: Vec<String>,

    /// Rules to skip (e.g., ["destruct", "column-comment"])
    #[serde(default)]
    pub disable: Vec<String>,

    /// "first-per-statement" (default) or "every-node"
    #[serde(default)]
    pub report: Option<ReportMode>,
}

/// Check-command arguments that override file settings
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub files: &'a [PathBuf],
    pub dir: Option<&'a Path>,
    pub dialect: Option<&'a str>,
    pub format: Option<OutputFormat>,
    pub rules: &'a [String],
    pub disable: &'a [String],
    pub all_violations: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load ddlint.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let current_dir = std::env::current_dir().into_diagnostic()?;
        match Self::find_from(&current_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using config file");
                Ok(Some(Self::from_file(&path)?))
            }
            None => Ok(None),
        }
    }

    fn find_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(mut self, args: Overrides<'_>) -> Self {
        if !args.files.is_empty() {
            self.files = args.files.iter().map(|p| p.display().to_string()).collect();
        }

        if let Some(dir) = args.dir {
            self.dir = Some(dir.display().to_string());
        }

        if let Some(dialect) = args.dialect {
            self.dialect = Some(dialect.to_string());
        }

        if args.format.is_some() {
            self.format = args.format;
        }

        if !args.rules.is_empty() {
            self.rules = args.rules.to_vec();
        }

        if !args.disable.is_empty() {
            self.disable = args.disable.to_vec();
        }

        if args.all_violations {
            self.report = Some(ReportMode::EveryNode);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
files = ["migrations/*.sql"]
dialect = "mysql"
format = "sarif"
disable = ["destruct"]
report = "every-node"
"#,
        )
        .unwrap();
        assert_eq!(config.files, vec!["migrations/*.sql"]);
        assert_eq!(config.dialect.as_deref(), Some("mysql"));
        assert_eq!(config.format, Some(OutputFormat::Sarif));
        assert!(config.rules.is_empty());
        assert_eq!(config.disable, vec!["destruct"]);
        assert_eq!(config.report, Some(ReportMode::EveryNode));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("schema = [\"a.sql\"]").is_err());
    }

    #[test]
    fn test_args_take_precedence() {
        let config = Config {
            files: vec!["old.sql".to_string()],
            dialect: Some("postgresql".to_string()),
            disable: vec!["destruct".to_string()],
            ..Config::default()
        };
        let files = [PathBuf::from("new.sql")];
        let merged = config.merge_with_args(Overrides {
            files: &files,
            dialect: Some("mysql"),
            format: Some(OutputFormat::Json),
            all_violations: true,
            ..Overrides::default()
        });

        assert_eq!(merged.files, vec!["new.sql"]);
        assert_eq!(merged.dialect.as_deref(), Some("mysql"));
        assert_eq!(merged.format, Some(OutputFormat::Json));
        assert_eq!(merged.disable, vec!["destruct"]);
        assert_eq!(merged.report, Some(ReportMode::EveryNode));
    }

    #[test]
    fn test_find_from_parent_directory() {
        let root = std::env::temp_dir().join(format!("ddlint-config-{}", std::process::id()));
        let nested = root.join("db").join("migrations");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(CONFIG_FILE), "dialect = \"mysql\"\n").unwrap();

        assert_eq!(Config::find_from(&nested), Some(root.join(CONFIG_FILE)));
        let config = Config::from_file(&root.join(CONFIG_FILE)).unwrap();
        assert_eq!(config.dialect.as_deref(), Some("mysql"));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
