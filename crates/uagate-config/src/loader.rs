// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! YAML configuration loading.

use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::schema::GatewayConfig;

/// Loads a config file from disk.
pub fn load_path(path: impl AsRef<Path>) -> Result<GatewayConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::io(path.display().to_string(), source))?;
    debug!(path = %path.display(), "config file read");
    load_str(&text)
}

/// Parses config from a YAML string.
pub fn load_str(text: &str) -> Result<GatewayConfig, ConfigError> {
    serde_yaml::from_str(text).map_err(|err| ConfigError::parse(err.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
gateway:
  name: plant-gateway
devices:
  - code: press-01
    url: opc.tcp://10.0.0.5:4840
    topic: factory/press
    interval_ms: 500
    nodes: ["1:2045", "1:2046"]
  - code: oven-02
    url: opc.tcp://10.0.0.6:4840
    topic: factory/oven
logging:
  level: debug
  format: json
"#;

    #[test]
    fn test_load_str_full_document() {
        let config = load_str(SAMPLE).unwrap();
        assert_eq!(config.gateway.name, "plant-gateway");
        assert_eq!(config.devices.len(), 2);

        let press = &config.devices[0];
        assert_eq!(press.code, "press-01");
        assert_eq!(press.interval_ms, 500);
        assert_eq!(press.nodes, vec!["1:2045", "1:2046"]);

        // interval omitted: defaults to 1000 ms
        let oven = &config.devices[1];
        assert_eq!(oven.interval_ms, 1000);
        assert!(oven.nodes.is_empty());

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_field_is_entry_level_not_file_level() {
        // The file parses; the bad entry is caught by validate() so
        // provisioning can skip it.
        let config = load_str(
            r#"
devices:
  - url: opc.tcp://10.0.0.5:4840
    topic: factory/press
"#,
        )
        .unwrap();
        assert_eq!(config.devices.len(), 1);
        assert!(config.devices[0].validate().is_err());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = load_str("devices: [::").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_path_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_path(file.path()).unwrap();
        assert_eq!(config.devices.len(), 2);
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = load_path("/nonexistent/uagate.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
