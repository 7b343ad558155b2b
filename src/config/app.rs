//! Application configuration loading from config.toml
//!
//! The file describes the ledger owner, the monthly report schedule, and the
//! jars to seed on first run:
//!
//! ```toml
//! [user]
//! name = "Owner"
//! income = 10000000.0
//!
//! [scheduler]
//! day = 1
//! hour = 0
//! minute = 1
//!
//! [[jars]]
//! name = "Necessities"
//! percentage = 55.0
//! category = "essential"
//! priority = "high"
//! ```

use crate::core::jar::NewJar;
use crate::entities::Priority;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "JAR_LEDGER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Ledger owner
    pub user: UserConfig,
    /// Monthly report schedule
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Jars to seed when the owner has none
    #[serde(default)]
    pub jars: Vec<JarConfig>,
}

/// The ledger owner.
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Display name, used to find the owner again on restart
    pub name: String,
    /// Monthly income
    pub income: f64,
}

/// When the monthly report job fires, in UTC.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Whether the background job runs at all
    pub enabled: bool,
    /// Day of month, 1-28
    pub day: u32,
    /// Hour, 0-23
    pub hour: u32,
    /// Minute, 0-59
    pub minute: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            day: 1,
            hour: 0,
            minute: 1,
        }
    }
}

impl SchedulerConfig {
    /// Checks the firing instant exists in every month.
    pub fn validate(&self) -> Result<()> {
        if !(1..=28).contains(&self.day) || self.hour > 23 || self.minute > 59 {
            return Err(Error::Config {
                message: format!(
                    "Invalid schedule day={} hour={} minute={} (day 1-28, hour 0-23, minute 0-59)",
                    self.day, self.hour, self.minute
                ),
            });
        }
        Ok(())
    }
}

/// Configuration for a single jar
#[derive(Debug, Deserialize, Clone)]
pub struct JarConfig {
    /// Name of the jar
    pub name: String,
    /// Category for organization (e.g., "essential", "growth")
    pub category: String,
    /// Share of monthly income
    pub percentage: f64,
    /// Savings target
    #[serde(default)]
    pub target_amount: f64,
    /// Ordering priority
    #[serde(default)]
    pub priority: Priority,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Display color
    #[serde(default = "default_color")]
    pub color: String,
    /// Display icon
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_color() -> String {
    "#6B7280".to_string()
}

fn default_icon() -> String {
    "jar".to_string()
}

impl From<JarConfig> for NewJar {
    fn from(config: JarConfig) -> Self {
        Self {
            name: config.name,
            description: config.description,
            percentage: config.percentage,
            target_amount: config.target_amount,
            priority: config.priority,
            category: config.category,
            color: config.color,
            icon: config.icon,
        }
    }
}

/// Parses configuration from TOML text and validates the schedule.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.scheduler.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
/// - The schedule names an instant that does not exist in every month
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `$JAR_LEDGER_CONFIG`, or ./config.toml when unset.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r##"
            [user]
            name = "Owner"
            income = 10000000.0

            [scheduler]
            day = 2
            hour = 6

            [[jars]]
            name = "Necessities"
            category = "essential"
            percentage = 55.0
            priority = "high"
            color = "#10B981"

            [[jars]]
            name = "Play"
            category = "fun"
            percentage = 10.0
            target_amount = 500.0
            description = "weekend money"
        "##;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.user.name, "Owner");
        assert_eq!(config.user.income, 10_000_000.0);
        assert_eq!(
            config.scheduler,
            SchedulerConfig {
                enabled: true,
                day: 2,
                hour: 6,
                minute: 1
            }
        );
        assert_eq!(config.jars.len(), 2);
        assert_eq!(config.jars[0].priority, Priority::High);
        assert_eq!(config.jars[1].priority, Priority::Medium);
        assert_eq!(config.jars[1].target_amount, 500.0);
        assert_eq!(config.jars[1].description.as_deref(), Some("weekend money"));
        assert_eq!(config.jars[0].color, "#10B981");
        assert_eq!(config.jars[1].color, "#6B7280");
        assert_eq!(config.jars[1].icon, "jar");
    }

    #[test]
    fn test_scheduler_defaults_when_section_missing() {
        let config = parse_config("[user]\nname = \"Owner\"\nincome = 0.0\n").unwrap();
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert!(config.jars.is_empty());
    }

    #[test]
    fn test_rejects_day_not_in_every_month() {
        let toml_str = "[user]\nname = \"Owner\"\nincome = 0.0\n[scheduler]\nday = 31\n";
        let result = parse_config(toml_str);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_missing_user() {
        let result = parse_config("[[jars]]\nname = \"x\"\ncategory = \"y\"\npercentage = 1.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
