use crate::events::{EventLog, DEFAULT_CHANNEL_CAPACITY, DEFAULT_HISTORY_CAPACITY};
use crate::ledger::{
    LedgerRules, LedgerService, ReportStateMachine, ReportStore, VoteLedger, COOLDOWN_SECS,
    FLAG_DOWNVOTE_RATIO, FLAG_MIN_DOWNVOTES,
};
use crate::reputation::{
    ReputationLedger, DOWNVOTE_PENALTY, REPORT_POINTS, SOLVE_POINTS, UPVOTE_POINTS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::info;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration for the incident ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Notification history and broadcast sizing
    pub events: EventsConfig,
    /// Point amounts, cooldown and flag thresholds
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Events kept in memory for late readers
    pub history_capacity: usize,
    /// Per-subscriber broadcast buffer
    pub channel_capacity: usize,
}

/// Governance-tunable ledger parameters. Defaults are the protocol constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub report_points: u64,
    pub upvote_points: u64,
    pub downvote_penalty: u64,
    pub solve_points: u64,
    pub cooldown_secs: u64,
    pub flag_min_downvotes: u64,
    pub flag_downvote_ratio: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            report_points: REPORT_POINTS,
            upvote_points: UPVOTE_POINTS,
            downvote_penalty: DOWNVOTE_PENALTY,
            solve_points: SOLVE_POINTS,
            cooldown_secs: COOLDOWN_SECS,
            flag_min_downvotes: FLAG_MIN_DOWNVOTES,
            flag_downvote_ratio: FLAG_DOWNVOTE_RATIO,
        }
    }
}

impl RulesConfig {
    /// Convert to LedgerRules for use by the state machine
    pub fn to_rules(&self) -> LedgerRules {
        LedgerRules {
            report_points: self.report_points,
            upvote_points: self.upvote_points,
            downvote_penalty: self.downvote_penalty,
            solve_points: self.solve_points,
            cooldown_secs: self.cooldown_secs,
            flag_min_downvotes: self.flag_min_downvotes,
            flag_downvote_ratio: self.flag_downvote_ratio,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            events: EventsConfig {
                history_capacity: DEFAULT_HISTORY_CAPACITY,
                channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            },
            rules: RulesConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup("INCIDENT_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }

        override_from(&lookup, "INCIDENT_EVENT_HISTORY", &mut config.events.history_capacity)?;
        override_from(&lookup, "INCIDENT_EVENT_CHANNEL", &mut config.events.channel_capacity)?;

        let rules = &mut config.rules;
        override_from(&lookup, "INCIDENT_REPORT_POINTS", &mut rules.report_points)?;
        override_from(&lookup, "INCIDENT_UPVOTE_POINTS", &mut rules.upvote_points)?;
        override_from(&lookup, "INCIDENT_DOWNVOTE_PENALTY", &mut rules.downvote_penalty)?;
        override_from(&lookup, "INCIDENT_SOLVE_POINTS", &mut rules.solve_points)?;
        override_from(&lookup, "INCIDENT_COOLDOWN_SECS", &mut rules.cooldown_secs)?;
        override_from(&lookup, "INCIDENT_FLAG_MIN_DOWNVOTES", &mut rules.flag_min_downvotes)?;

        config.validate()?;

        if config.rules.to_rules() != LedgerRules::default() {
            info!(rules = ?config.rules, "Using non-default ledger rules");
        }

        Ok(config)
    }

    /// Validate configuration for consistency
    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log level: {} (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.events.history_capacity == 0 {
            return Err(anyhow::anyhow!("Event history capacity must be non-zero"));
        }

        if self.events.channel_capacity == 0 {
            return Err(anyhow::anyhow!("Event channel capacity must be non-zero"));
        }

        if self.rules.flag_min_downvotes == 0 {
            return Err(anyhow::anyhow!(
                "Flag threshold must require at least one downvote"
            ));
        }

        Ok(())
    }

    /// Build an empty ledger wired to this configuration
    pub fn build_service(&self) -> LedgerService {
        LedgerService::new(ReportStateMachine::new(
            ReportStore::new(),
            VoteLedger::new(),
            ReputationLedger::new(),
            self.rules.to_rules(),
            EventLog::new(self.events.history_capacity, self.events.channel_capacity),
        ))
    }
}

fn override_from<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value", key))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = LedgerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.rules.to_rules(), LedgerRules::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = LedgerConfig::from_vars(vars(&[
            ("INCIDENT_LOG_LEVEL", "DEBUG"),
            ("INCIDENT_COOLDOWN_SECS", "60"),
            ("INCIDENT_EVENT_HISTORY", "16"),
        ]))
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.rules.cooldown_secs, 60);
        assert_eq!(config.events.history_capacity, 16);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = LedgerConfig::from_vars(vars(&[("INCIDENT_REPORT_POINTS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("INCIDENT_REPORT_POINTS"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(LedgerConfig::from_vars(vars(&[("INCIDENT_LOG_LEVEL", "loud")])).is_err());
        assert!(LedgerConfig::from_vars(vars(&[("INCIDENT_EVENT_CHANNEL", "0")])).is_err());
        assert!(LedgerConfig::from_vars(vars(&[("INCIDENT_FLAG_MIN_DOWNVOTES", "0")])).is_err());
    }
}
