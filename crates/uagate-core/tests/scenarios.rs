// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! End-to-end scenarios through the registry with a scriptable transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use uagate_core::address::NodeAddress;
use uagate_core::device::{ConnectionState, DeviceSpec, RECONNECT_INTERVAL};
use uagate_core::error::{ClientError, GatewayError, TransportError};
use uagate_core::registry::ClientRegistry;
use uagate_core::sink::{ChannelSink, Reading, SinkMessage};
use uagate_core::transport::{NodeSample, NodeTransport, NodeValue, TransportFactory};
use uagate_core::value::TypedValue;

// =============================================================================
// Scriptable transport
// =============================================================================

/// Shared backing state for one fake server; cloned handles let a test
/// manipulate the server while the client under test owns the transport.
#[derive(Default)]
struct FakeServer {
    connected: AtomicBool,
    refuse_connect: AtomicBool,
    nodes: parking_lot::RwLock<HashMap<NodeAddress, NodeSample>>,
}

impl FakeServer {
    fn set_value(&self, address: NodeAddress, name: &str, value: TypedValue) {
        self.nodes.write().insert(
            address,
            NodeSample {
                display_name: name.to_string(),
                value: NodeValue::Supported(value),
            },
        );
    }

    fn value(&self, address: &NodeAddress) -> Option<NodeValue> {
        self.nodes.read().get(address).map(|s| s.value.clone())
    }
}

struct FakeTransport {
    server: Arc<FakeServer>,
}

#[async_trait]
impl NodeTransport for FakeTransport {
    async fn connect(&mut self, _endpoint: &str) -> Result<(), TransportError> {
        if self.server.refuse_connect.load(Ordering::SeqCst) {
            return Err(TransportError::connect_failed("connection refused"));
        }
        self.server.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.server.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.server.connected.load(Ordering::SeqCst)
    }

    async fn read_node(&self, address: &NodeAddress) -> Result<NodeSample, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.server
            .nodes
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| TransportError::node_not_found(address.to_string()))
    }

    async fn write_node(
        &self,
        address: &NodeAddress,
        value: TypedValue,
    ) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        match self.server.nodes.write().get_mut(address) {
            Some(sample) => {
                sample.value = NodeValue::Supported(value);
                Ok(())
            }
            None => Err(TransportError::node_not_found(address.to_string())),
        }
    }
}

struct FakeFactory {
    server: Arc<FakeServer>,
}

impl TransportFactory for FakeFactory {
    fn create(&self, _endpoint: &str) -> Box<dyn NodeTransport> {
        Box::new(FakeTransport {
            server: Arc::clone(&self.server),
        })
    }
}

fn press_spec(nodes: &[&str]) -> DeviceSpec {
    DeviceSpec {
        code: "press-01".into(),
        url: "opc.tcp://10.0.0.5:4840".into(),
        topic: "factory/press".into(),
        poll_interval: Duration::from_millis(200),
        nodes: nodes.iter().map(|s| s.to_string()).collect(),
    }
}

fn gateway(
    server: &Arc<FakeServer>,
) -> (ClientRegistry, tokio::sync::mpsc::Receiver<SinkMessage>) {
    let (sink, receiver) = ChannelSink::new(64);
    let registry = ClientRegistry::new(
        Arc::new(FakeFactory {
            server: Arc::clone(server),
        }),
        Arc::new(sink),
    );
    (registry, receiver)
}

// =============================================================================
// Scenarios
// =============================================================================

/// Scenario A: a connected client polls an Int32 node and the batch plus
/// the single-node query both carry the canonical encoding.
#[tokio::test(start_paused = true)]
async fn scenario_poll_and_query_int32_node() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 2045), "CycleCount", TypedValue::Int32(7));

    let (registry, mut sink_rx) = gateway(&server);
    registry.provision(press_spec(&["1:2045"]));

    let message = sink_rx.recv().await.unwrap();
    assert_eq!(message.topic, "factory/press");
    assert_eq!(message.device_code, "press-01");
    assert_eq!(message.batch, vec![Reading::new("1:2045", "7")]);

    let detail = registry.query_node("press-01", "1:2045").await.unwrap();
    assert_eq!(detail.name, "CycleCount");
    assert_eq!(detail.type_name, "int32");
    assert_eq!(detail.value, "7");

    registry.shutdown().await;
}

/// Scenario B: writing boolean text against an Int32 node is a decode
/// failure and leaves the node untouched.
#[tokio::test(start_paused = true)]
async fn scenario_write_type_mismatch_is_decode_failure() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 10), "Setpoint", TypedValue::Int32(7));

    let (registry, _sink_rx) = gateway(&server);
    registry.provision(press_spec(&[]));
    tokio::time::sleep(RECONNECT_INTERVAL * 2).await;

    let err = registry
        .apply_write("press-01", "1:10", "true")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::Client(ClientError::Decode(_))
    ));
    assert_eq!(
        server.value(&NodeAddress::new(1, 10)),
        Some(NodeValue::Supported(TypedValue::Int32(7)))
    );

    registry.shutdown().await;
}

/// Scenario C: a write against a down session fails with NotConnected;
/// once the reconnect driver restores the session the same write lands.
#[tokio::test(start_paused = true)]
async fn scenario_write_recovers_after_reconnect() {
    let server = Arc::new(FakeServer::default());
    server.refuse_connect.store(true, Ordering::SeqCst);
    server.set_value(NodeAddress::new(1, 10), "Setpoint", TypedValue::Int32(0));

    let (registry, _sink_rx) = gateway(&server);
    registry.provision(press_spec(&[]));
    tokio::time::sleep(RECONNECT_INTERVAL * 2).await;

    let err = registry
        .apply_write("press-01", "1:10", "42")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Client(ClientError::not_connected("press-01"))
    );

    // Server comes back; the 1000 ms reconnect driver picks it up.
    server.refuse_connect.store(false, Ordering::SeqCst);
    tokio::time::sleep(RECONNECT_INTERVAL * 2).await;

    registry.apply_write("press-01", "1:10", "42").await.unwrap();
    assert_eq!(
        server.value(&NodeAddress::new(1, 10)),
        Some(NodeValue::Supported(TypedValue::Int32(42)))
    );

    registry.shutdown().await;
}

/// Scenario D: every operation against an unknown device code fails with
/// ClientNotFound.
#[tokio::test]
async fn scenario_unknown_device_code() {
    let server = Arc::new(FakeServer::default());
    let (registry, _sink_rx) = gateway(&server);

    let expected = GatewayError::client_not_found("ghost");
    assert_eq!(
        registry.apply_write("ghost", "1:1", "1").await.unwrap_err(),
        expected
    );
    assert_eq!(registry.add_polled_node("ghost", "1:1").unwrap_err(), expected);
    assert_eq!(
        registry.remove_polled_node("ghost", "1:1").unwrap_err(),
        expected
    );
    assert_eq!(registry.query_nodes("ghost").unwrap_err(), expected);
    assert_eq!(registry.query_node("ghost", "1:1").await.unwrap_err(), expected);
    assert_eq!(registry.query_url("ghost").unwrap_err(), expected);
}

/// Scenario E: a structurally invalid polled address is accepted into the
/// set, warned about every cycle, and never blocks healthy addresses.
#[tokio::test(start_paused = true)]
async fn scenario_malformed_polled_address_is_skipped() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 1), "Healthy", TypedValue::UInt16(3));

    let (registry, mut sink_rx) = gateway(&server);
    registry.provision(press_spec(&["1:1"]));
    registry.add_polled_node("press-01", "abc").unwrap();

    let nodes = registry.query_nodes("press-01").unwrap();
    assert_eq!(nodes, vec!["1:1".to_string(), "abc".to_string()]);

    // Several cycles keep flowing with only the healthy address.
    for _ in 0..3 {
        let message = sink_rx.recv().await.unwrap();
        assert_eq!(message.batch, vec![Reading::new("1:1", "3")]);
    }

    registry.shutdown().await;
}

/// Snapshot consistency: an address added mid-flight shows up in a later
/// cycle, never partially within one.
#[tokio::test(start_paused = true)]
async fn scenario_polled_set_snapshot_per_cycle() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 1), "A", TypedValue::Int32(1));
    server.set_value(NodeAddress::new(1, 2), "B", TypedValue::Int32(2));

    let (registry, mut sink_rx) = gateway(&server);
    registry.provision(press_spec(&["1:1"]));

    let first = sink_rx.recv().await.unwrap();
    assert_eq!(first.batch, vec![Reading::new("1:1", "1")]);

    registry.add_polled_node("press-01", "1:2").unwrap();

    // Every batch is either the old snapshot or the full new one.
    let expanded = vec![Reading::new("1:1", "1"), Reading::new("1:2", "2")];
    loop {
        let message = sink_rx.recv().await.unwrap();
        if message.batch == expanded {
            break;
        }
        assert_eq!(message.batch, vec![Reading::new("1:1", "1")]);
    }

    registry.shutdown().await;
}

/// A session drop mid-operation flips the observed state; the client keeps
/// publishing again after recovery.
#[tokio::test(start_paused = true)]
async fn scenario_session_drop_detected_and_recovered() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 1), "A", TypedValue::Int32(1));

    let (registry, mut sink_rx) = gateway(&server);
    registry.provision(press_spec(&["1:1"]));

    let first = sink_rx.recv().await.unwrap();
    assert_eq!(first.batch, vec![Reading::new("1:1", "1")]);

    // Drop the link out from under the client.
    server.connected.store(false, Ordering::SeqCst);

    // The reconnect driver restores it; batches resume.
    let resumed = sink_rx.recv().await.unwrap();
    assert_eq!(resumed.batch, vec![Reading::new("1:1", "1")]);

    registry.shutdown().await;
}

/// Two-phase stop quiesces everything: after shutdown no further batches
/// arrive even as time advances.
#[tokio::test(start_paused = true)]
async fn scenario_shutdown_quiesces_polling() {
    let server = Arc::new(FakeServer::default());
    server.set_value(NodeAddress::new(1, 1), "A", TypedValue::Int32(1));

    let (registry, mut sink_rx) = gateway(&server);
    registry.provision(press_spec(&["1:1"]));
    let _ = sink_rx.recv().await.unwrap();

    registry.shutdown().await;

    // Drain whatever was already in flight, then verify silence.
    while sink_rx.try_recv().is_ok() {}
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(sink_rx.try_recv().is_err());
}

/// Connection state is observable through its full lifecycle.
#[tokio::test(start_paused = true)]
async fn scenario_connection_state_lifecycle() {
    let server = Arc::new(FakeServer::default());
    let (sink, _rx) = ChannelSink::new(8);
    let transport = Box::new(FakeTransport {
        server: Arc::clone(&server),
    });
    let client = Arc::new(uagate_core::device::DeviceClient::new(
        press_spec(&[]),
        transport,
        Arc::new(sink),
    ));

    assert_eq!(client.connection_state().await, ConnectionState::Disconnected);
    client.start();
    tokio::time::sleep(RECONNECT_INTERVAL * 2).await;
    assert_eq!(client.connection_state().await, ConnectionState::Connected);
    client.stop().await;
    assert_eq!(client.connection_state().await, ConnectionState::Disconnected);
    assert!(!server.connected.load(Ordering::SeqCst));
}
