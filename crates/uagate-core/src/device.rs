// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-device client: connection state machine and poll loop.
//!
//! A [`DeviceClient`] owns one server session. Two background tasks drive
//! it once started:
//!
//! - the **reconnect driver**, a fixed 1000 ms interval that attempts a
//!   connect whenever the session is down;
//! - the **poll loop**, which snapshots the polled-address set each cycle,
//!   reads every address, and pushes the non-empty batch to the sink.
//!
//! The session handle and the connection state live together in one
//! structure behind a single async mutex. Every transport-touching
//! operation takes that lock for its full duration, which gives the
//! at-most-one-writer guarantee and keeps state observations consistent
//! with the session they describe.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::address::NodeAddress;
use crate::error::{ClientError, TransportError};
use crate::sink::{Reading, Sink};
use crate::transport::{NodeTransport, NodeValue};
use crate::value;

/// Default poll interval, also used when configuration asks for less
/// than one millisecond.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Cadence of the reconnect driver, independent of the poll interval.
pub const RECONNECT_INTERVAL: Duration = Duration::from_millis(1000);

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of a device client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No session; the reconnect driver will retry.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A session is established and usable.
    Connected,
}

impl ConnectionState {
    /// Whether the session is usable.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// =============================================================================
// DeviceSpec
// =============================================================================

/// Static identity and cadence of one device client.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    /// Unique device code, the routing key on the control plane.
    pub code: String,
    /// OPC UA endpoint URL (e.g. `opc.tcp://10.0.0.5:4840`).
    pub url: String,
    /// Sink topic for this device's batches.
    pub topic: String,
    /// Poll cadence; zero falls back to [`DEFAULT_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Initial polled-address set, raw `"ns:id"` strings.
    pub nodes: Vec<String>,
}

/// Result of a single-node query: display name, type name, encoded value.
///
/// The value is empty when the node's type is outside the codec; the type
/// name then carries the transport's raw name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetail {
    /// Server-side display name.
    pub name: String,
    /// Canonical wire type name, or the raw name for unsupported types.
    pub type_name: String,
    /// Canonical text form of the current value.
    pub value: String,
}

// =============================================================================
// DeviceClient
// =============================================================================

/// The session handle and its state, mutated together under one lock.
struct Session {
    transport: Box<dyn NodeTransport>,
    state: ConnectionState,
}

/// One long-lived client against one device server.
pub struct DeviceClient {
    spec: DeviceSpec,
    session: Mutex<Session>,
    nodes: parking_lot::RwLock<BTreeSet<String>>,
    sink: Arc<dyn Sink>,
    running: AtomicBool,
    stop: watch::Sender<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl DeviceClient {
    /// Creates a stopped client. Call [`start`](Self::start) to spawn its
    /// reconnect driver and poll loop.
    pub fn new(spec: DeviceSpec, transport: Box<dyn NodeTransport>, sink: Arc<dyn Sink>) -> Self {
        let mut spec = spec;
        if spec.poll_interval < Duration::from_millis(1) {
            spec.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        let nodes: BTreeSet<String> = spec.nodes.iter().cloned().collect();
        let (stop, _) = watch::channel(false);
        Self {
            spec,
            session: Mutex::new(Session {
                transport,
                state: ConnectionState::Disconnected,
            }),
            nodes: parking_lot::RwLock::new(nodes),
            sink,
            running: AtomicBool::new(false),
            stop,
            tasks: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Device code, the control-plane routing key.
    pub fn device_code(&self) -> &str {
        &self.spec.code
    }

    /// Endpoint URL the client connects to.
    pub fn endpoint_url(&self) -> &str {
        &self.spec.url
    }

    /// Sink topic for this device's batches.
    pub fn topic(&self) -> &str {
        &self.spec.topic
    }

    /// Current connection state.
    pub async fn connection_state(&self) -> ConnectionState {
        self.session.lock().await.state
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Spawns the reconnect driver and the poll loop. A second call on a
    /// running client is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        // send_replace: the previous tasks' receivers are gone by now.
        self.stop.send_replace(false);

        let reconnect = {
            let client = Arc::clone(self);
            let stop_rx = self.stop.subscribe();
            tokio::spawn(async move { client.reconnect_loop(stop_rx).await })
        };
        let poll = {
            let client = Arc::clone(self);
            let stop_rx = self.stop.subscribe();
            tokio::spawn(async move { client.poll_loop(stop_rx).await })
        };
        self.tasks.lock().extend([reconnect, poll]);
        info!(device = %self.spec.code, url = %self.spec.url, "device client started");
    }

    /// Stops the client in two phases: signal cancellation, then await
    /// both tasks so an in-flight poll cycle completes before this
    /// returns. Finally tears the session down.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.stop.send_replace(true);

        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        let mut session = self.session.lock().await;
        if session.transport.is_connected() {
            if let Err(err) = session.transport.disconnect().await {
                warn!(device = %self.spec.code, error = %err, "disconnect failed during stop");
            }
        }
        session.state = ConnectionState::Disconnected;
        info!(device = %self.spec.code, "device client stopped");
    }

    // -------------------------------------------------------------------------
    // Reconnect driver
    // -------------------------------------------------------------------------

    async fn reconnect_loop(self: Arc<Self>, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(RECONNECT_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.try_connect().await;
                }
            }
        }
    }

    /// Attempts a connect when the session is down. Idempotent; concurrent
    /// attempts serialize behind the session lock.
    async fn try_connect(&self) {
        let mut session = self.session.lock().await;
        if session.state.is_connected() {
            return;
        }
        session.state = ConnectionState::Connecting;
        let result = session.transport.connect(&self.spec.url).await;
        match result {
            Ok(()) => {
                session.state = ConnectionState::Connected;
                info!(device = %self.spec.code, url = %self.spec.url, "connected");
            }
            Err(err) => {
                session.state = ConnectionState::Disconnected;
                warn!(
                    device = %self.spec.code,
                    url = %self.spec.url,
                    error = %err,
                    "connect attempt failed"
                );
            }
        }
    }

    // -------------------------------------------------------------------------
    // Poll loop
    // -------------------------------------------------------------------------

    async fn poll_loop(self: Arc<Self>, mut stop_rx: watch::Receiver<bool>) {
        loop {
            if *stop_rx.borrow() {
                break;
            }
            self.poll_cycle().await;
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.spec.poll_interval) => {}
            }
        }
    }

    /// One poll cycle over a snapshot of the polled-address set.
    ///
    /// Mid-cycle edits to the set apply from the next cycle. Per-address
    /// failures are logged and skipped; a dropped session aborts the rest
    /// of the cycle. Whatever was gathered is published, unless empty.
    async fn poll_cycle(&self) {
        let snapshot: Vec<String> = self.nodes.read().iter().cloned().collect();
        if snapshot.is_empty() {
            return;
        }
        {
            let session = self.session.lock().await;
            if !session.state.is_connected() {
                return;
            }
        }

        let mut batch: Vec<Reading> = Vec::with_capacity(snapshot.len());
        for raw in snapshot {
            let address = match NodeAddress::parse(&raw) {
                Ok(address) => address,
                Err(err) => {
                    warn!(
                        device = %self.spec.code,
                        address = %raw,
                        error = %err,
                        "skipping unparseable polled address"
                    );
                    continue;
                }
            };

            // One lock acquisition per read keeps control-plane writes
            // from starving behind a long cycle.
            let mut session = self.session.lock().await;
            if !session.state.is_connected() {
                break;
            }
            let result = session.transport.read_node(&address).await;
            match result {
                Ok(sample) => {
                    if let NodeValue::Unsupported { type_name } = &sample.value {
                        debug!(
                            device = %self.spec.code,
                            address = %raw,
                            type_name = %type_name,
                            "unsupported node type, emitting empty value"
                        );
                    }
                    batch.push(Reading::new(raw, sample.value.encoded()));
                }
                Err(err) => {
                    if !session.transport.is_connected() {
                        session.state = ConnectionState::Disconnected;
                        warn!(
                            device = %self.spec.code,
                            address = %raw,
                            error = %err,
                            "session dropped during poll"
                        );
                        break;
                    }
                    warn!(
                        device = %self.spec.code,
                        address = %raw,
                        error = %err,
                        "read failed, skipping node"
                    );
                }
            }
        }

        if !batch.is_empty() {
            self.sink
                .publish(&self.spec.topic, &self.spec.code, batch)
                .await;
        }
    }

    // -------------------------------------------------------------------------
    // Control plane
    // -------------------------------------------------------------------------

    /// Writes value text to a node.
    ///
    /// Connectivity is checked before the address is parsed. The node is
    /// then read so its current wire type selects the decode path; the
    /// decoded value is written. No retry on failure.
    pub async fn apply_write(&self, raw_address: &str, text: &str) -> Result<(), ClientError> {
        let mut session = self.session.lock().await;
        if !session.state.is_connected() {
            return Err(ClientError::not_connected(&self.spec.code));
        }
        let address = NodeAddress::parse(raw_address)?;

        let read = session.transport.read_node(&address).await;
        let sample = match read {
            Ok(sample) => sample,
            Err(err) => return Err(self.note_failure(&mut session, err)),
        };
        let wire_type = match sample.value {
            NodeValue::Supported(current) => current.wire_type(),
            NodeValue::Unsupported { type_name } => {
                return Err(ClientError::unsupported_type(type_name));
            }
        };

        let decoded = value::decode(wire_type, text)?;
        let written = session.transport.write_node(&address, decoded).await;
        if let Err(err) = written {
            return Err(self.note_failure(&mut session, err));
        }

        info!(
            device = %self.spec.code,
            address = %raw_address,
            "write applied"
        );
        Ok(())
    }

    /// Reads one node's display name, type, and current value.
    pub async fn query_node(&self, raw_address: &str) -> Result<NodeDetail, ClientError> {
        let address = NodeAddress::parse(raw_address)?;

        let mut session = self.session.lock().await;
        if !session.state.is_connected() {
            return Err(ClientError::not_connected(&self.spec.code));
        }

        let read = session.transport.read_node(&address).await;
        let sample = match read {
            Ok(sample) => sample,
            Err(err) => return Err(self.note_failure(&mut session, err)),
        };
        Ok(NodeDetail {
            name: sample.display_name,
            type_name: sample.value.type_name().to_string(),
            value: sample.value.encoded(),
        })
    }

    /// Adds a raw address string to the polled set.
    ///
    /// No format validation happens here; an unparseable entry is logged
    /// and skipped by each poll cycle instead. Duplicate inserts are
    /// no-ops (set semantics).
    pub fn add_polled_node(&self, address: impl Into<String>) {
        let address = address.into();
        let inserted = self.nodes.write().insert(address.clone());
        if inserted {
            debug!(device = %self.spec.code, address = %address, "polled node added");
        }
    }

    /// Removes an address from the polled set. Returns whether it was
    /// present; removing an absent entry is a no-op.
    pub fn remove_polled_node(&self, address: &str) -> bool {
        let removed = self.nodes.write().remove(address);
        if removed {
            debug!(device = %self.spec.code, address = %address, "polled node removed");
        }
        removed
    }

    /// The current polled-address set, sorted.
    pub fn polled_nodes(&self) -> Vec<String> {
        self.nodes.read().iter().cloned().collect()
    }

    /// Records a transport failure: flips the state when the session
    /// dropped, and maps the error into the client taxonomy.
    fn note_failure(&self, session: &mut Session, err: TransportError) -> ClientError {
        if !session.transport.is_connected() {
            session.state = ConnectionState::Disconnected;
            warn!(device = %self.spec.code, error = %err, "session dropped");
        }
        ClientError::from_transport(&self.spec.code, err)
    }
}

// =============================================================================
// Tests
// =============================================================================
