// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Main binary entry point for the uagate gateway.

use uagate_bin::cli::Cli;
use uagate_bin::commands;
use uagate_bin::error::report_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(err) = commands::execute(cli).await {
        report_error(&err);
        std::process::exit(err.exit_code());
    }
}
