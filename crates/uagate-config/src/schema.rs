// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema.
//!
//! Example file:
//!
//! ```yaml
//! gateway:
//!   name: plant-gateway
//! devices:
//!   - code: press-01
//!     url: opc.tcp://10.0.0.5:4840
//!     topic: factory/press
//!     interval_ms: 500
//!     nodes: ["1:2045", "1:2046"]
//! logging:
//!   level: info
//!   format: text
//! ```
//!
//! Device fields are deserialized with defaults so a missing required
//! field surfaces as a per-entry [`validate`](DeviceEntry::validate)
//! failure (skippable at provisioning time) instead of failing the whole
//! file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default poll interval in milliseconds, also applied when an entry
/// asks for less than one millisecond.
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 1000;

fn default_poll_interval_ms() -> i64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// =============================================================================
// GatewayConfig
// =============================================================================

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway identity.
    #[serde(default)]
    pub gateway: GatewaySection,
    /// Device fleet.
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl GatewayConfig {
    /// Strict whole-file validation, used by the `validate` command.
    ///
    /// Provisioning does not call this; it validates entry by entry and
    /// skips the bad ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.devices {
            entry.validate()?;
            if !seen.insert(entry.code.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "duplicate device code '{}'",
                    entry.code
                )));
            }
        }
        Ok(())
    }
}

/// Gateway identity section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySection {
    /// Human-readable gateway name.
    #[serde(default)]
    pub name: String,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (text, json, compact).
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// DeviceEntry
// =============================================================================

/// One device in the fleet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Unique device code, the control-plane routing key.
    #[serde(default)]
    pub code: String,
    /// OPC UA endpoint URL.
    #[serde(default)]
    pub url: String,
    /// Sink topic for this device's batches.
    #[serde(default)]
    pub topic: String,
    /// Poll cadence in milliseconds; values below 1 fall back to
    /// [`DEFAULT_POLL_INTERVAL_MS`].
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: i64,
    /// Polled node addresses, raw `"ns:id"` strings.
    #[serde(default)]
    pub nodes: Vec<String>,
}

impl DeviceEntry {
    /// Checks the entry's required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code.trim().is_empty() {
            return Err(ConfigError::invalid("device entry missing code"));
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::invalid(format!(
                "device '{}' missing url",
                self.code
            )));
        }
        if self.topic.trim().is_empty() {
            return Err(ConfigError::invalid(format!(
                "device '{}' missing topic",
                self.code
            )));
        }
        Ok(())
    }

    /// Effective poll interval, with the below-one-millisecond fallback.
    pub fn poll_interval(&self) -> Duration {
        if self.interval_ms < 1 {
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS as u64)
        } else {
            Duration::from_millis(self.interval_ms as u64)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
