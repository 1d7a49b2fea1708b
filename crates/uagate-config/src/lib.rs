// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uagate-config
//!
//! Configuration schema and YAML loader for the uagate gateway.
//!
//! The schema is deliberately forgiving: per-device validation problems
//! are reported entry by entry so provisioning can skip the bad ones and
//! keep the healthy fleet running. Only file-level problems (unreadable
//! file, malformed YAML) abort a load.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::{load_path, load_str};
pub use schema::{DeviceEntry, GatewayConfig, GatewaySection, LoggingSection};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
