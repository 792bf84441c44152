//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// File storage locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ledger import behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Report generation settings.
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory where generated workbooks are written.
    #[serde(default = "default_exports_dir")]
    pub exports_dir: String,
    /// Directory holding report templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            exports_dir: default_exports_dir(),
            templates_dir: default_templates_dir(),
        }
    }
}

fn default_exports_dir() -> String {
    "temp_exports".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

/// Ledger import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Account absorbing import imbalances.
    #[serde(default = "default_suspense_account")]
    pub suspense_account_code: String,
    /// Journal receiving imported balances.
    #[serde(default = "default_journal_code")]
    pub default_journal_code: String,
    /// Gap above which a suspense line is booked.
    #[serde(default = "default_gap_tolerance")]
    pub gap_tolerance: Decimal,
    /// Maximum debit/credit difference accepted on commit.
    #[serde(default = "default_entry_tolerance")]
    pub entry_tolerance: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            suspense_account_code: default_suspense_account(),
            default_journal_code: default_journal_code(),
            gap_tolerance: default_gap_tolerance(),
            entry_tolerance: default_entry_tolerance(),
        }
    }
}

fn default_suspense_account() -> String {
    "4799".to_string()
}

fn default_journal_code() -> String {
    "OD".to_string()
}

fn default_gap_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_entry_tolerance() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

/// Report generation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    /// Sheets a liasse template must contain before injection.
    #[serde(default = "default_required_sheets")]
    pub required_sheets: Vec<String>,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            required_sheets: default_required_sheets(),
        }
    }
}

fn default_required_sheets() -> Vec<String> {
    ["BILAN ACTIF", "BILAN PASSIF", "COMPTE DE RESULTAT", "Résultat fiscal"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("AUDITIA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.suspense_account_code, "4799");
        assert_eq!(ledger.default_journal_code, "OD");
        assert_eq!(ledger.gap_tolerance, dec!(0.01));
        assert_eq!(ledger.entry_tolerance, dec!(0.05));
    }

    #[test]
    fn test_required_sheets_default() {
        let reports = ReportsConfig::default();
        assert_eq!(reports.required_sheets.len(), 4);
        assert!(reports.required_sheets.iter().any(|s| s == "BILAN ACTIF"));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("AUDITIA__DATABASE__URL", Some("sqlite::memory:")),
                ("AUDITIA__LEDGER__SUSPENSE_ACCOUNT_CODE", Some("471")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.suspense_account_code, "471");
                assert_eq!(config.ledger.default_journal_code, "OD");
                assert_eq!(config.storage.exports_dir, "temp_exports");
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("AUDITIA__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
