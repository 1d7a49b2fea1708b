// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use crate::cli::{Cli, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::runtime(format!(
            "configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = uagate_config::load_path(config_path)?;
    config.validate()?;

    println!("✓ Configuration is valid: {}", config_path.display());
    println!();
    println!("Summary:");
    println!("  Gateway Name: {}", config.gateway.name);
    println!("  Devices:      {}", config.devices.len());
    let polled: usize = config.devices.iter().map(|d| d.nodes.len()).sum();
    println!("  Polled Nodes: {}", polled);

    if config.devices.is_empty() {
        println!();
        println!("Warnings:");
        println!("  ⚠ No devices configured");
    }

    if args.show_config {
        println!();
        println!("Parsed configuration:");
        println!(
            "{}",
            serde_yaml::to_string(&config)
                .unwrap_or_else(|_| "(serialization error)".to_string())
        );
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli_for(path: &std::path::Path) -> Cli {
        Cli::parse_from(["uagate", "-c", path.to_str().unwrap()])
    }

    #[test]
    fn test_validate_accepts_good_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
gateway:
  name: plant-gateway
devices:
  - code: press-01
    url: opc.tcp://10.0.0.5:4840
    topic: factory/press
    nodes: ["1:2045"]
"#
        )
        .unwrap();

        let cli = cli_for(file.path());
        validate(&cli, ValidateArgs::default()).unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicate_codes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
devices:
  - code: press-01
    url: opc.tcp://10.0.0.5:4840
    topic: factory/press
  - code: press-01
    url: opc.tcp://10.0.0.6:4840
    topic: factory/oven
"#
        )
        .unwrap();

        let cli = cli_for(file.path());
        let err = validate(&cli, ValidateArgs::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate device code"));
    }

    #[test]
    fn test_validate_missing_file() {
        let cli = cli_for(std::path::Path::new("/nonexistent/uagate.yaml"));
        let err = validate(&cli, ValidateArgs::default()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
