// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uagate-core
//!
//! Core abstractions for the uagate OPC UA data-acquisition gateway.
//!
//! This crate provides everything protocol-independent:
//!
//! - **Address**: the `ns:id` node address scheme
//! - **Value**: the wire-type codec between typed node values and canonical text
//! - **Error**: the flat error taxonomy shared across the gateway
//! - **Transport**: the narrow session contract a protocol crate implements
//! - **Device**: the per-device client (connection state machine + poll loop)
//! - **Registry**: the device-code keyed control plane
//! - **Sink**: the downstream publication boundary
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uagate_core::device::DeviceSpec;
//! use uagate_core::registry::ClientRegistry;
//! use uagate_core::sink::LogSink;
//!
//! let registry = ClientRegistry::new(factory, Arc::new(LogSink::default()));
//! registry.provision(DeviceSpec {
//!     code: "press-01".into(),
//!     url: "opc.tcp://10.0.0.5:4840".into(),
//!     topic: "factory/press".into(),
//!     poll_interval: std::time::Duration::from_millis(500),
//!     nodes: vec!["1:2045".into()],
//! });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod address;
pub mod error;
pub mod value;

// =============================================================================
// Client Modules
// =============================================================================

pub mod device;
pub mod registry;
pub mod transport;

// =============================================================================
// Output Modules
// =============================================================================

pub mod sink;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use address::NodeAddress;
pub use error::{ClientError, CodecError, GatewayError, TransportError};
pub use value::{TypedValue, WireType};

pub use device::{ConnectionState, DeviceClient, DeviceSpec, NodeDetail};
pub use registry::ClientRegistry;
pub use transport::{NodeSample, NodeTransport, NodeValue, TransportFactory};

pub use sink::{ChannelSink, LogSink, Reading, Sink, SinkMessage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
