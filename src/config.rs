//! Runtime configuration.
//!
//! Configuration is read once from the environment (after `.env` is loaded by
//! the binary) and passed explicitly into the components that need it.

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;

use crate::{error::config::ConfigError, model::calendar::SeasonTable, util::time::parse_date};

const DEFAULT_CALENDAR_START: (i32, u32, u32) = (2016, 1, 1);
const DEFAULT_CALENDAR_END: (i32, u32, u32) = (2025, 12, 31);
const DEFAULT_SOURCE_DIR: &str = "data";

pub struct Config {
    pub database_url: String,
    pub source_dir: PathBuf,
    pub warehouse: WarehouseConfig,
}

/// Settings consumed by the ETL components.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseConfig {
    pub calendar: CalendarConfig,
    pub dimension_policy: DimensionPolicy,
    pub load_retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seasons: SeasonTable,
}

/// How the fact transformer treats dimension references it has not seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DimensionPolicy {
    /// Unknown customers, products and sellers are created with placeholder attributes.
    #[default]
    Implicit,
    /// Unknown references stay unresolved and the order line is quarantined.
    LookupOnly,
}

impl std::str::FromStr for DimensionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "implicit" => Ok(Self::Implicit),
            "lookup_only" | "lookup-only" => Ok(Self::LookupOnly),
            other => Err(format!("expected implicit or lookup_only, got {other:?}")),
        }
    }
}

/// Bounded exponential backoff for transient storage failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (1-based): `initial * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        let (sy, sm, sd) = DEFAULT_CALENDAR_START;
        let (ey, em, ed) = DEFAULT_CALENDAR_END;
        Self {
            start: NaiveDate::from_ymd_opt(sy, sm, sd).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(ey, em, ed).unwrap_or(NaiveDate::MIN),
            seasons: SeasonTable::default(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            dimension_policy: DimensionPolicy::default(),
            load_retry: RetryConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let defaults = WarehouseConfig::default();

        let start = parse_optional(&lookup, "CALENDAR_START", |v| {
            parse_date(v).map_err(|e| e.to_string())
        })?
        .unwrap_or(defaults.calendar.start);
        let end = parse_optional(&lookup, "CALENDAR_END", |v| {
            parse_date(v).map_err(|e| e.to_string())
        })?
        .unwrap_or(defaults.calendar.end);

        if end < start {
            return Err(ConfigError::InvalidEnvValue {
                var: "CALENDAR_END".to_string(),
                reason: format!("{end} is before CALENDAR_START {start}"),
            });
        }

        let seasons = parse_optional(&lookup, "SEASON_HEMISPHERE", str::parse::<SeasonTable>)?
            .unwrap_or(defaults.calendar.seasons);
        let dimension_policy = parse_optional(&lookup, "DIMENSION_POLICY", str::parse::<DimensionPolicy>)?
            .unwrap_or(defaults.dimension_policy);

        let max_attempts = parse_optional(&lookup, "LOAD_MAX_ATTEMPTS", |v| {
            match v.parse::<u32>() {
                Ok(0) => Err("must be at least 1".to_string()),
                Ok(n) => Ok(n),
                Err(e) => Err(e.to_string()),
            }
        })?
        .unwrap_or(defaults.load_retry.max_attempts);
        let initial_backoff = parse_optional(&lookup, "LOAD_INITIAL_BACKOFF_MS", |v| {
            v.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        })?
        .unwrap_or(defaults.load_retry.initial_backoff);

        Ok(Self {
            database_url,
            source_dir: lookup("SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR)),
            warehouse: WarehouseConfig {
                calendar: CalendarConfig {
                    start,
                    end,
                    seasons,
                },
                dimension_policy,
                load_retry: RetryConfig {
                    max_attempts,
                    initial_backoff,
                },
            },
        })
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => parse(raw.trim())
            .map(Some)
            .map_err(|reason| ConfigError::InvalidEnvValue {
                var: var.to_string(),
                reason,
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn requires_database_url() {
        let result = Config::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(var)) if var == "DATABASE_URL"));
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();

        assert_eq!(config.warehouse, WarehouseConfig::default());
        assert_eq!(config.source_dir, PathBuf::from("data"));
        assert_eq!(config.warehouse.load_retry.max_attempts, 3);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("CALENDAR_START", "2022-01-01"),
            ("CALENDAR_END", "2022-12-31"),
            ("SEASON_HEMISPHERE", "southern"),
            ("DIMENSION_POLICY", "lookup_only"),
            ("LOAD_INITIAL_BACKOFF_MS", "10"),
        ]))
        .unwrap();

        let warehouse = config.warehouse;
        assert_eq!(warehouse.calendar.seasons, SeasonTable::Southern);
        assert_eq!(warehouse.dimension_policy, DimensionPolicy::LookupOnly);
        assert_eq!(warehouse.load_retry.initial_backoff, Duration::from_millis(10));
        assert_eq!(warehouse.load_retry.backoff(3), Duration::from_millis(40));
    }

    #[test]
    fn rejects_invalid_values() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("LOAD_MAX_ATTEMPTS", "0"),
        ]));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvValue { var, .. }) if var == "LOAD_MAX_ATTEMPTS")
        );

        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("CALENDAR_START", "2023-01-01"),
            ("CALENDAR_END", "2022-01-01"),
        ]));
        assert!(result.is_err());
    }
}
