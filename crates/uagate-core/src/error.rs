// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error taxonomy for the gateway.
//!
//! The taxonomy is deliberately flat: one enum per layer, every variant a
//! distinct failure kind carrying the offending address, device code, or
//! input text. Callers dispatch on the variant; there is no nested
//! hierarchy to unwrap.
//!
//! - [`CodecError`] — text-to-typed-value decoding failures
//! - [`TransportError`] — session-level failures reported by a transport
//! - [`ClientError`] — failures of one device client operation
//! - [`GatewayError`] — registry-level failures (routing by device code)

use thiserror::Error;

// =============================================================================
// Codec Errors
// =============================================================================

/// Errors from decoding canonical text into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Text is not an accepted boolean form.
    #[error("invalid boolean text '{text}' (expected true/1/false/0)")]
    InvalidBoolean {
        /// The rejected input text.
        text: String,
    },

    /// Text does not parse as a number of the target width.
    #[error("invalid {target} value '{text}'")]
    InvalidNumber {
        /// The rejected input text.
        text: String,
        /// Canonical name of the target wire type.
        target: &'static str,
    },
}

impl CodecError {
    /// Creates an invalid-boolean error.
    pub fn invalid_boolean(text: impl Into<String>) -> Self {
        Self::InvalidBoolean { text: text.into() }
    }

    /// Creates an invalid-number error.
    pub fn invalid_number(text: impl Into<String>, target: &'static str) -> Self {
        Self::InvalidNumber {
            text: text.into(),
            target,
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by a [`NodeTransport`](crate::transport::NodeTransport)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Establishing a session failed.
    #[error("connect failed: {message}")]
    ConnectFailed {
        /// Transport-specific reason.
        message: String,
    },

    /// An operation was attempted without an established session.
    #[error("session is not connected")]
    NotConnected,

    /// The address was well-formed but does not resolve on the server.
    #[error("node {address} not found on server")]
    NodeNotFound {
        /// Canonical text form of the address.
        address: String,
    },

    /// The server rejected or the link dropped during a read.
    #[error("read of {address} failed: {message}")]
    ReadFailed {
        /// Canonical text form of the address.
        address: String,
        /// Transport-specific reason.
        message: String,
    },

    /// The server rejected or the link dropped during a write.
    #[error("write of {address} failed: {message}")]
    WriteFailed {
        /// Canonical text form of the address.
        address: String,
        /// Transport-specific reason.
        message: String,
    },
}

impl TransportError {
    /// Creates a connect-failed error.
    pub fn connect_failed(message: impl Into<String>) -> Self {
        Self::ConnectFailed {
            message: message.into(),
        }
    }

    /// Creates a node-not-found error.
    pub fn node_not_found(address: impl Into<String>) -> Self {
        Self::NodeNotFound {
            address: address.into(),
        }
    }

    /// Creates a read-failed error.
    pub fn read_failed(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Creates a write-failed error.
    pub fn write_failed(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            address: address.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Client Errors
// =============================================================================

/// Errors from one device client operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The node address text is malformed.
    #[error("malformed node address '{address}'")]
    AddressFormat {
        /// The rejected address text.
        address: String,
    },

    /// The client has no established session.
    #[error("device {device} is not connected")]
    NotConnected {
        /// Device code of the client.
        device: String,
    },

    /// The address was well-formed but does not resolve on the server.
    #[error("node {address} not found on server")]
    NodeNotFound {
        /// Canonical text form of the address.
        address: String,
    },

    /// The node's value type is outside the codec.
    #[error("unsupported node type {type_name}")]
    UnsupportedType {
        /// Raw type name reported by the transport.
        type_name: String,
    },

    /// A read was rejected by the server or the link dropped.
    #[error("read of {address} failed: {message}")]
    ReadFailed {
        /// Canonical text form of the address.
        address: String,
        /// Transport-specific reason.
        message: String,
    },

    /// A write was rejected by the server or the link dropped.
    #[error("write of {address} failed: {message}")]
    WriteFailed {
        /// Canonical text form of the address.
        address: String,
        /// Transport-specific reason.
        message: String,
    },

    /// The supplied value text did not decode against the node's type.
    #[error(transparent)]
    Decode(#[from] CodecError),
}

impl ClientError {
    /// Creates an address-format error.
    pub fn address_format(address: impl Into<String>) -> Self {
        Self::AddressFormat {
            address: address.into(),
        }
    }

    /// Creates a not-connected error.
    pub fn not_connected(device: impl Into<String>) -> Self {
        Self::NotConnected {
            device: device.into(),
        }
    }

    /// Creates an unsupported-type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Maps a transport failure into the client-level taxonomy.
    pub fn from_transport(device: &str, err: TransportError) -> Self {
        match err {
            TransportError::ConnectFailed { .. } | TransportError::NotConnected => {
                Self::not_connected(device)
            }
            TransportError::NodeNotFound { address } => Self::NodeNotFound { address },
            TransportError::ReadFailed { address, message } => {
                Self::ReadFailed { address, message }
            }
            TransportError::WriteFailed { address, message } => {
                Self::WriteFailed { address, message }
            }
        }
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors from the client registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No device client is registered under the given code.
    #[error("no device client registered for code '{device}'")]
    ClientNotFound {
        /// The unknown device code.
        device: String,
    },

    /// The routed client operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl GatewayError {
    /// Creates a client-not-found error.
    pub fn client_not_found(device: impl Into<String>) -> Self {
        Self::ClientNotFound {
            device: device.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = ClientError::address_format("2045");
        assert_eq!(err.to_string(), "malformed node address '2045'");

        let err = GatewayError::client_not_found("press-99");
        assert_eq!(
            err.to_string(),
            "no device client registered for code 'press-99'"
        );

        let err = CodecError::invalid_number("true", "int32");
        assert_eq!(err.to_string(), "invalid int32 value 'true'");
    }

    #[test]
    fn test_transport_mapping() {
        let err = ClientError::from_transport("press-01", TransportError::NotConnected);
        assert_eq!(err, ClientError::not_connected("press-01"));

        let err = ClientError::from_transport(
            "press-01",
            TransportError::node_not_found("1:9"),
        );
        assert!(matches!(err, ClientError::NodeNotFound { address } if address == "1:9"));

        let err = ClientError::from_transport(
            "press-01",
            TransportError::write_failed("1:9", "BadTypeMismatch"),
        );
        assert!(matches!(err, ClientError::WriteFailed { .. }));
    }

    #[test]
    fn test_codec_error_wraps_into_client_error() {
        let err: ClientError = CodecError::invalid_boolean("maybe").into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
