// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uagate-bin
//!
//! CLI binary for the uagate OPC UA data-acquisition gateway.
//!
//! This crate wires the pieces together:
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - Gateway runtime orchestration (config → registry → run)
//! - Graceful shutdown handling
//!
//! ## Usage
//!
//! ```bash
//! # Start the gateway (default command)
//! uagate
//!
//! # Start with a custom config
//! uagate -c /etc/uagate/config.yaml
//!
//! # Validate a configuration file
//! uagate validate
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::GatewayRuntime;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
