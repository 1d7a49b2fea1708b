// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client registry: the device-code keyed control plane.
//!
//! The registry owns every [`DeviceClient`] and routes each control-plane
//! operation to the right one by device code. It is an ordinary value
//! constructed by the embedder, not a global; whoever builds the gateway
//! decides its lifetime.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::device::{DeviceClient, DeviceSpec, NodeDetail};
use crate::error::GatewayError;
use crate::sink::Sink;
use crate::transport::TransportFactory;

// =============================================================================
// ClientRegistry
// =============================================================================

/// Owns the `device code → client` map and the transport factory.
pub struct ClientRegistry {
    clients: DashMap<String, Arc<DeviceClient>>,
    factory: Arc<dyn TransportFactory>,
    sink: Arc<dyn Sink>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    pub fn new(factory: Arc<dyn TransportFactory>, sink: Arc<dyn Sink>) -> Self {
        Self {
            clients: DashMap::new(),
            factory,
            sink,
        }
    }

    // -------------------------------------------------------------------------
    // Provisioning
    // -------------------------------------------------------------------------

    /// Provisions and starts one device client.
    ///
    /// Entries with an empty code or URL, and entries whose code is
    /// already taken (first one wins), are skipped with a warn log rather
    /// than aborting. Returns whether a client was started.
    pub fn provision(&self, spec: DeviceSpec) -> bool {
        if spec.code.trim().is_empty() || spec.url.trim().is_empty() {
            warn!(
                device = %spec.code,
                url = %spec.url,
                "skipping device entry with missing code or url"
            );
            return false;
        }

        match self.clients.entry(spec.code.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                warn!(
                    device = %spec.code,
                    "skipping duplicate device code, keeping first entry"
                );
                false
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let transport = self.factory.create(&spec.url);
                let client = Arc::new(DeviceClient::new(
                    spec,
                    transport,
                    Arc::clone(&self.sink),
                ));
                client.start();
                slot.insert(client);
                true
            }
        }
    }

    /// Provisions a batch of device specs, returning how many started.
    pub fn provision_all(&self, specs: Vec<DeviceSpec>) -> usize {
        let mut started = 0;
        for spec in specs {
            if self.provision(spec) {
                started += 1;
            }
        }
        info!(devices = started, "device clients provisioned");
        started
    }

    // -------------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------------

    fn client(&self, code: &str) -> Result<Arc<DeviceClient>, GatewayError> {
        self.clients
            .get(code)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GatewayError::client_not_found(code))
    }

    /// Writes value text to a node of the given device.
    pub async fn apply_write(
        &self,
        code: &str,
        address: &str,
        text: &str,
    ) -> Result<(), GatewayError> {
        let client = self.client(code)?;
        client.apply_write(address, text).await?;
        Ok(())
    }

    /// Adds an address to the device's polled set.
    pub fn add_polled_node(&self, code: &str, address: &str) -> Result<(), GatewayError> {
        self.client(code)?.add_polled_node(address);
        Ok(())
    }

    /// Removes an address from the device's polled set. Returns whether
    /// the address was present.
    pub fn remove_polled_node(&self, code: &str, address: &str) -> Result<bool, GatewayError> {
        Ok(self.client(code)?.remove_polled_node(address))
    }

    /// The device's current polled set, sorted.
    pub fn query_nodes(&self, code: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.client(code)?.polled_nodes())
    }

    /// Reads one node's display name, type, and current value.
    pub async fn query_node(&self, code: &str, address: &str) -> Result<NodeDetail, GatewayError> {
        let client = self.client(code)?;
        let detail = client.query_node(address).await?;
        Ok(detail)
    }

    /// The device's endpoint URL.
    pub fn query_url(&self, code: &str) -> Result<String, GatewayError> {
        Ok(self.client(code)?.endpoint_url().to_string())
    }

    // -------------------------------------------------------------------------
    // Introspection & lifecycle
    // -------------------------------------------------------------------------

    /// Codes of all registered devices, sorted.
    pub fn device_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        codes.sort();
        codes
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry holds no devices.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Stops every client (each fully quiesced before the next returns)
    /// and empties the map.
    pub async fn shutdown(&self) {
        let clients: Vec<Arc<DeviceClient>> = self
            .clients
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for client in clients {
            client.stop().await;
        }
        self.clients.clear();
        info!("all device clients stopped");
    }
}

// =============================================================================
// Tests
// =============================================================================
