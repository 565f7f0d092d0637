use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "spendtrack", about = "Personal expense tracker")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "spendtrack.toml")]
    pub config: String,

    /// Database file (overrides config file)
    #[arg(long)]
    pub db: Option<String>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Record an expense
    Add {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// One of: Food, Clothes, Travel, Entertainment, Bills, Other
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        amount: String,
        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List recorded expenses
    List {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show totals and shares per category
    Summary {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Delete one expense by id
    Delete {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        id: i64,
    },
    /// Delete every expense for the account
    Clear {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Export all stored expenses to CSV
    Export {
        /// Destination file (overrides config file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default = "default_export")]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// "sqlite" (default) or "memory" (scratch runs, nothing persists).
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: String,
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        backend: default_backend(),
        path: default_db_path(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_export() -> ExportConfig {
    ExportConfig {
        path: default_export_path(),
    }
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_db_path() -> String {
    "expenses.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_path() -> String {
    "expenses_data.csv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: default_storage(),
            logging: default_logging(),
            export: default_export(),
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref db) = cli.db {
            config.storage.path = db.clone();
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(config_path: &str, db: Option<&str>) -> CliArgs {
        CliArgs {
            config: config_path.to_string(),
            db: db.map(str::to_string),
            log_level: None,
            command: Command::Export { output: None },
        }
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::load(&cli("does-not-exist.toml", None));
        assert_eq!(config.storage.backend, "sqlite");
        assert_eq!(config.storage.path, "expenses.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.export.path, "expenses_data.csv");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spendtrack.toml");
        std::fs::write(&path, "[storage]\npath = \"from-file.db\"\n").unwrap();

        let config = Config::load(&cli(path.to_str().unwrap(), Some("from-cli.db")));
        assert_eq!(config.storage.path, "from-cli.db");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spendtrack.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\njson = true\n").unwrap();

        let config = Config::load(&cli(path.to_str().unwrap(), None));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.storage.backend, "sqlite");
    }
}
