// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uagate-opcua
//!
//! OPC UA transport for the uagate gateway.
//!
//! Implements [`NodeTransport`](uagate_core::transport::NodeTransport)
//! over the `opcua` crate's synchronous client: endpoint discovery, an
//! anonymous plain-security session, value and display-name reads, and
//! typed writes. Everything protocol-independent (state machine, polling,
//! routing) lives in `uagate-core`; this crate only maps the library's
//! surface onto the gateway's narrow session contract.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod transport;

pub use config::OpcUaOptions;
pub use transport::{OpcUaTransport, OpcUaTransportFactory};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
