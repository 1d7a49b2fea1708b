// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, LogFormat, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::GatewayRuntime;

/// Executes the `run` command to start the gateway.
pub async fn run(cli: &Cli, _args: RunArgs) -> BinResult<()> {
    let config = uagate_config::load_path(&cli.config)?;

    // CLI flags win over the config file's logging section.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.logging.format));
    init_logging(&level, format);

    info!(config = %cli.config.display(), "starting uagate");

    GatewayRuntime::new(config).run().await
}
