// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session contract between the gateway and a protocol implementation.
//!
//! A [`NodeTransport`] is the narrow seam behind which the concrete OPC UA
//! library lives. The device client never touches the library directly; it
//! drives this trait under its session lock, so implementations may assume
//! calls are serialized per device.

use async_trait::async_trait;

use crate::address::NodeAddress;
use crate::error::TransportError;
use crate::value::TypedValue;

// =============================================================================
// Samples
// =============================================================================

/// One sampled node: its display name plus its value.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSample {
    /// Server-side display name of the node.
    pub display_name: String,
    /// The sampled value, or the unsupported marker.
    pub value: NodeValue,
}

/// A sampled value, or the marker for a type outside the codec.
///
/// `Unsupported` is terminal: reads report it with an empty value field,
/// writes against such a node fail with an unsupported-type error.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A value within the codec's wire types.
    Supported(TypedValue),
    /// A value whose type the codec does not cover.
    Unsupported {
        /// Raw type name reported by the transport, for diagnostics.
        type_name: String,
    },
}

impl NodeValue {
    /// The type name to report for this value.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Supported(v) => v.wire_type().name(),
            Self::Unsupported { type_name } => type_name,
        }
    }

    /// Canonical text form; empty for unsupported types.
    pub fn encoded(&self) -> String {
        match self {
            Self::Supported(v) => v.encode(),
            Self::Unsupported { .. } => String::new(),
        }
    }
}

// =============================================================================
// NodeTransport
// =============================================================================

/// Session-level operations a protocol crate must provide.
///
/// Implementations map their library's failures into [`TransportError`]
/// and keep `is_connected` accurate after a failed call, since the device
/// client uses it to detect a dropped session.
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Establishes a session against the given endpoint URL.
    ///
    /// Must be idempotent when already connected.
    async fn connect(&mut self, endpoint: &str) -> Result<(), TransportError>;

    /// Tears the session down. Safe to call when not connected.
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Whether a usable session is currently established.
    fn is_connected(&self) -> bool;

    /// Reads the node's display name and current value.
    async fn read_node(&self, address: &NodeAddress) -> Result<NodeSample, TransportError>;

    /// Writes a typed value to the node.
    async fn write_node(
        &self,
        address: &NodeAddress,
        value: TypedValue,
    ) -> Result<(), TransportError>;
}

// =============================================================================
// TransportFactory
// =============================================================================

/// Creates a fresh transport for each provisioned device client.
pub trait TransportFactory: Send + Sync {
    /// Creates an unconnected transport for the given endpoint URL.
    ///
    /// The URL is also passed to [`NodeTransport::connect`] later; it is
    /// provided here so factories can pre-configure per-endpoint options.
    fn create(&self, endpoint: &str) -> Box<dyn NodeTransport>;
}

// =============================================================================
// Tests
// =============================================================================
