//! Runtime settings and tuning parameters for the passenger script.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DEFAULT_DETACHED_SCAN_PERIOD_SECS, DEFAULT_ENTRY_TIMEOUT_SECS, DEFAULT_INTERACTION_KEY,
    DEFAULT_INTERVAL_MS, DEFAULT_PROXIMITY_RADIUS, DEFAULT_VALIDATION_PERIOD_SECS,
};

/// Minimum severity of notices forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

impl Verbosity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// True when a notice of `level` should be shown at this verbosity.
    #[must_use]
    pub fn admits(self, level: Self) -> bool {
        level <= self
    }

    #[must_use]
    pub const fn log_level(self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warning => log::Level::Warn,
            Self::Info => log::Level::Info,
            Self::Debug => log::Level::Debug,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-facing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub verbosity: Verbosity,
    /// Tick interval the host should schedule, in milliseconds.
    pub interval_ms: u32,
    /// Name of the key that triggers ride requests and seated interaction.
    pub interaction_key: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            interval_ms: DEFAULT_INTERVAL_MS,
            interaction_key: DEFAULT_INTERACTION_KEY.to_string(),
        }
    }
}

/// Tuning for the interaction state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionParameters {
    /// Search radius for the ride request, in metres.
    pub proximity_radius: f32,
    pub entry_timeout_secs: u32,
    pub validation_period_secs: u32,
    pub detached_scan_period_secs: u32,
    /// Periodically adopt a vehicle the character already sits in while detached.
    pub adopt_occupied_vehicle: bool,
}

impl Default for InteractionParameters {
    fn default() -> Self {
        Self {
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            entry_timeout_secs: DEFAULT_ENTRY_TIMEOUT_SECS,
            validation_period_secs: DEFAULT_VALIDATION_PERIOD_SECS,
            detached_scan_period_secs: DEFAULT_DETACHED_SCAN_PERIOD_SECS,
            adopt_occupied_vehicle: false,
        }
    }
}

impl InteractionParameters {
    #[must_use]
    pub const fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.entry_timeout_secs as u64)
    }

    #[must_use]
    pub const fn validation_period(&self) -> Duration {
        Duration::from_secs(self.validation_period_secs as u64)
    }

    #[must_use]
    pub const fn detached_scan_period(&self) -> Duration {
        Duration::from_secs(self.detached_scan_period_secs as u64)
    }

    /// Distance beyond which a pending entry is abandoned.
    #[must_use]
    pub fn drift_radius(&self) -> f32 {
        self.proximity_radius * crate::constants::DRIFT_RADIUS_FACTOR
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerConfig {
    pub settings: ScriptSettings,
    pub parameters: InteractionParameters,
}

impl PassengerConfig {
    /// Parse settings from JSON, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings for the host's store.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field is outside its usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.interval_ms == 0 {
            return Err(ConfigError::ZeroField {
                field: "settings.interval_ms",
            });
        }
        if self.settings.interaction_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        let radius = self.parameters.proximity_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidRadius { value: radius });
        }
        for (field, value) in [
            (
                "parameters.entry_timeout_secs",
                self.parameters.entry_timeout_secs,
            ),
            (
                "parameters.validation_period_secs",
                self.parameters.validation_period_secs,
            ),
            (
                "parameters.detached_scan_period_secs",
                self.parameters.detached_scan_period_secs,
            ),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroField { field });
            }
        }
        Ok(())
    }

    /// True when `key` names the configured interaction key.
    #[must_use]
    pub fn is_interaction_key(&self, key: &str) -> bool {
        self.settings
            .interaction_key
            .trim()
            .eq_ignore_ascii_case(key.trim())
    }
}

/// Errors raised when passenger configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroField { field: &'static str },
    #[error("proximity radius must be a positive distance (got {value:.2})")]
    InvalidRadius { value: f32 },
    #[error("interaction key must not be empty")]
    EmptyKey,
}
