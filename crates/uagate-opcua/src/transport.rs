// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA session over the `opcua` crate's synchronous client.
//!
//! The device client serializes access behind its session lock, so this
//! transport never sees concurrent calls. It keeps its own connected flag:
//! a session-level failure (the read/write call itself errors, as opposed
//! to a bad per-node status) flips the flag so the device client can
//! observe the drop and hand recovery to its reconnect driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use opcua::client::prelude::*;
use opcua::sync::RwLock;
use tracing::{debug, info};

use uagate_core::address::NodeAddress;
use uagate_core::error::TransportError;
use uagate_core::transport::{NodeSample, NodeTransport, NodeValue, TransportFactory};
use uagate_core::value::TypedValue;

use crate::config::OpcUaOptions;

// =============================================================================
// Variant Mapping
// =============================================================================

fn node_id_for(address: &NodeAddress) -> NodeId {
    NodeId::new(address.namespace_index, address.identifier)
}

/// Maps a library variant into the gateway's value model. Types outside
/// the codec come back as the unsupported marker with a diagnostic name.
fn node_value_from(variant: &Variant) -> NodeValue {
    match variant {
        Variant::Boolean(v) => NodeValue::Supported(TypedValue::Bool(*v)),
        Variant::SByte(v) => NodeValue::Supported(TypedValue::Int8(*v)),
        Variant::Byte(v) => NodeValue::Supported(TypedValue::UInt8(*v)),
        Variant::Int16(v) => NodeValue::Supported(TypedValue::Int16(*v)),
        Variant::UInt16(v) => NodeValue::Supported(TypedValue::UInt16(*v)),
        Variant::Int32(v) => NodeValue::Supported(TypedValue::Int32(*v)),
        Variant::UInt32(v) => NodeValue::Supported(TypedValue::UInt32(*v)),
        Variant::Int64(v) => NodeValue::Supported(TypedValue::Int64(*v)),
        Variant::UInt64(v) => NodeValue::Supported(TypedValue::UInt64(*v)),
        Variant::Float(v) => NodeValue::Supported(TypedValue::Float32(*v)),
        Variant::Double(v) => NodeValue::Supported(TypedValue::Float64(*v)),
        Variant::String(v) => NodeValue::Supported(TypedValue::String(v.as_ref().to_string())),
        other => NodeValue::Unsupported {
            type_name: variant_type_name(other).to_string(),
        },
    }
}

fn variant_from(value: TypedValue) -> Variant {
    match value {
        TypedValue::Bool(v) => Variant::Boolean(v),
        TypedValue::Int8(v) => Variant::SByte(v),
        TypedValue::UInt8(v) => Variant::Byte(v),
        TypedValue::Int16(v) => Variant::Int16(v),
        TypedValue::UInt16(v) => Variant::UInt16(v),
        TypedValue::Int32(v) => Variant::Int32(v),
        TypedValue::UInt32(v) => Variant::UInt32(v),
        TypedValue::Int64(v) => Variant::Int64(v),
        TypedValue::UInt64(v) => Variant::UInt64(v),
        TypedValue::Float32(v) => Variant::Float(v),
        TypedValue::Float64(v) => Variant::Double(v),
        TypedValue::String(v) => Variant::String(UAString::from(v)),
    }
}

fn variant_type_name(variant: &Variant) -> &'static str {
    match variant {
        Variant::Empty => "null",
        Variant::DateTime(_) => "datetime",
        Variant::Guid(_) => "guid",
        Variant::ByteString(_) => "bytestring",
        Variant::LocalizedText(_) => "localizedtext",
        Variant::QualifiedName(_) => "qualifiedname",
        Variant::Array(_) => "array",
        _ => "unknown",
    }
}

fn display_name_from(data_value: &DataValue, fallback: &str) -> String {
    match &data_value.value {
        Some(Variant::LocalizedText(text)) => text.text.as_ref().to_string(),
        Some(Variant::String(text)) => text.as_ref().to_string(),
        _ => fallback.to_string(),
    }
}

fn is_unknown_node(status: StatusCode) -> bool {
    status == StatusCode::BadNodeIdUnknown || status == StatusCode::BadNodeIdInvalid
}

// =============================================================================
// OpcUaTransport
// =============================================================================

/// [`NodeTransport`] backed by a real OPC UA session.
pub struct OpcUaTransport {
    options: OpcUaOptions,
    session: Option<Arc<RwLock<Session>>>,
    connected: AtomicBool,
}

impl OpcUaTransport {
    /// Creates an unconnected transport.
    pub fn new(options: OpcUaOptions) -> Self {
        Self {
            options,
            session: None,
            connected: AtomicBool::new(false),
        }
    }

    fn session(&self) -> Result<Arc<RwLock<Session>>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }
        self.session.clone().ok_or(TransportError::NotConnected)
    }

    /// A failure of the read/write call itself means the session dropped.
    fn mark_dropped(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl NodeTransport for OpcUaTransport {
    async fn connect(&mut self, endpoint: &str) -> Result<(), TransportError> {
        if self.is_connected() {
            return Ok(());
        }
        info!(endpoint = endpoint, "connecting to OPC UA server");

        let client = ClientBuilder::new()
            .application_name(self.options.application_name.as_str())
            .application_uri(self.options.application_uri.as_str())
            .session_retry_limit(self.options.session_retry_limit)
            .session_timeout(self.options.session_timeout_ms)
            .trust_server_certs(true)
            .client()
            .ok_or_else(|| TransportError::connect_failed("failed to build OPC UA client"))?;

        let endpoints = client.get_server_endpoints_from_url(endpoint).map_err(|status| {
            TransportError::connect_failed(format!("endpoint discovery failed: {}", status))
        })?;

        // Anonymous over the plain endpoint; security is out of scope.
        let target = endpoints
            .iter()
            .find(|e| {
                e.security_policy_uri.as_ref() == SecurityPolicy::None.to_uri()
                    && e.security_mode == MessageSecurityMode::None
            })
            .cloned()
            .ok_or_else(|| {
                TransportError::connect_failed("server offers no plain (None/None) endpoint")
            })?;

        let mut client = client;
        let session = client
            .connect_to_endpoint(target, IdentityToken::Anonymous)
            .map_err(|status| {
                TransportError::connect_failed(format!("session establishment failed: {}", status))
            })?;

        self.session = Some(session);
        self.connected.store(true, Ordering::SeqCst);
        info!(endpoint = endpoint, "connected to OPC UA server");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(session) = self.session.take() {
            session.read().disconnect();
            debug!("OPC UA session closed");
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.session.is_some()
    }

    async fn read_node(&self, address: &NodeAddress) -> Result<NodeSample, TransportError> {
        let session = self.session()?;
        let node_id = node_id_for(address);

        let reads = [
            ReadValueId {
                node_id: node_id.clone(),
                attribute_id: AttributeId::Value as u32,
                index_range: UAString::null(),
                data_encoding: QualifiedName::null(),
            },
            ReadValueId {
                node_id,
                attribute_id: AttributeId::DisplayName as u32,
                index_range: UAString::null(),
                data_encoding: QualifiedName::null(),
            },
        ];

        let results = {
            let guard = session.read();
            guard.read(&reads, TimestampsToReturn::Neither, 0.0)
        };
        let results = match results {
            Ok(results) => results,
            Err(status) => {
                self.mark_dropped();
                return Err(TransportError::read_failed(
                    address.to_string(),
                    status.to_string(),
                ));
            }
        };
        if results.is_empty() {
            return Err(TransportError::read_failed(
                address.to_string(),
                "server returned no results",
            ));
        }

        let value_result = &results[0];
        let status = value_result.status.unwrap_or(StatusCode::Good);
        if status.is_bad() {
            return Err(if is_unknown_node(status) {
                TransportError::node_not_found(address.to_string())
            } else {
                TransportError::read_failed(address.to_string(), status.to_string())
            });
        }
        let value = match &value_result.value {
            Some(variant) => node_value_from(variant),
            None => return Err(TransportError::node_not_found(address.to_string())),
        };

        let fallback = address.to_string();
        let display_name = results
            .get(1)
            .map(|dv| display_name_from(dv, &fallback))
            .unwrap_or(fallback);

        Ok(NodeSample {
            display_name,
            value,
        })
    }

    async fn write_node(
        &self,
        address: &NodeAddress,
        value: TypedValue,
    ) -> Result<(), TransportError> {
        let session = self.session()?;

        let write = WriteValue {
            node_id: node_id_for(address),
            attribute_id: AttributeId::Value as u32,
            index_range: UAString::null(),
            value: DataValue::new_now(variant_from(value)),
        };

        let results = {
            let guard = session.read();
            guard.write(&[write])
        };
        let results = match results {
            Ok(results) => results,
            Err(status) => {
                self.mark_dropped();
                return Err(TransportError::write_failed(
                    address.to_string(),
                    status.to_string(),
                ));
            }
        };

        let status = results
            .first()
            .copied()
            .unwrap_or(StatusCode::BadUnexpectedError);
        if status.is_good() {
            Ok(())
        } else if is_unknown_node(status) {
            Err(TransportError::node_not_found(address.to_string()))
        } else {
            Err(TransportError::write_failed(
                address.to_string(),
                status.to_string(),
            ))
        }
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Creates one [`OpcUaTransport`] per provisioned device.
pub struct OpcUaTransportFactory {
    options: OpcUaOptions,
}

impl OpcUaTransportFactory {
    /// Creates a factory applying the given options to every transport.
    pub fn new(options: OpcUaOptions) -> Self {
        Self { options }
    }
}

impl Default for OpcUaTransportFactory {
    fn default() -> Self {
        Self::new(OpcUaOptions::default())
    }
}

impl TransportFactory for OpcUaTransportFactory {
    fn create(&self, _endpoint: &str) -> Box<dyn NodeTransport> {
        Box::new(OpcUaTransport::new(self.options.clone()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uagate_core::value::WireType;

    #[test]
    fn test_variant_mapping_round_trip() {
        let samples = [
            TypedValue::Bool(true),
            TypedValue::Int8(-5),
            TypedValue::UInt8(200),
            TypedValue::Int16(-1000),
            TypedValue::UInt16(50_000),
            TypedValue::Int32(7),
            TypedValue::UInt32(4_000_000_000),
            TypedValue::Int64(-1),
            TypedValue::UInt64(u64::MAX),
            TypedValue::Float32(1.5),
            TypedValue::Float64(-273.15),
            TypedValue::String("press".into()),
        ];
        for value in samples {
            let variant = variant_from(value.clone());
            assert_eq!(node_value_from(&variant), NodeValue::Supported(value));
        }
    }

    #[test]
    fn test_unsupported_variants_carry_type_name() {
        let value = node_value_from(&Variant::Empty);
        assert_eq!(
            value,
            NodeValue::Unsupported {
                type_name: "null".into()
            }
        );
        assert_eq!(value.encoded(), "");

        let text = Variant::LocalizedText(Box::new(LocalizedText::new("en", "Running")));
        assert!(matches!(
            node_value_from(&text),
            NodeValue::Unsupported { type_name } if type_name == "localizedtext"
        ));
    }

    #[test]
    fn test_display_name_extraction() {
        let dv = DataValue::new_now(Variant::LocalizedText(Box::new(LocalizedText::new(
            "en",
            "CycleCount",
        ))));
        assert_eq!(display_name_from(&dv, "1:7"), "CycleCount");

        let dv = DataValue::new_now(Variant::Int32(3));
        assert_eq!(display_name_from(&dv, "1:7"), "1:7");
    }

    #[test]
    fn test_node_id_mapping() {
        let node_id = node_id_for(&NodeAddress::new(1, 2045));
        assert_eq!(node_id, NodeId::new(1, 2045u32));
    }

    #[tokio::test]
    async fn test_operations_without_session_are_not_connected() {
        let transport = OpcUaTransport::new(OpcUaOptions::default());
        assert!(!transport.is_connected());

        let err = transport
            .read_node(&NodeAddress::new(1, 1))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::NotConnected);

        let err = transport
            .write_node(&NodeAddress::new(1, 1), TypedValue::Int32(1))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::NotConnected);
    }

    #[test]
    fn test_supported_wire_types_cover_codec() {
        // Every codec wire type must map onto a concrete variant.
        let values = [
            TypedValue::Bool(false),
            TypedValue::Int8(0),
            TypedValue::UInt8(0),
            TypedValue::Int16(0),
            TypedValue::UInt16(0),
            TypedValue::Int32(0),
            TypedValue::UInt32(0),
            TypedValue::Int64(0),
            TypedValue::UInt64(0),
            TypedValue::Float32(0.0),
            TypedValue::Float64(0.0),
            TypedValue::String(String::new()),
        ];
        let mut covered: Vec<WireType> = values.iter().map(|v| v.wire_type()).collect();
        covered.dedup();
        assert_eq!(covered.len(), 12);
    }
}
