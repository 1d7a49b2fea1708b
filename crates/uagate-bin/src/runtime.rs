// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gateway runtime orchestration.
//!
//! Builds the client registry from configuration, runs until shutdown is
//! initiated (signal or programmatic), then quiesces every device client.

use std::sync::Arc;

use tracing::{info, warn};

use uagate_config::{DeviceEntry, GatewayConfig};
use uagate_core::device::DeviceSpec;
use uagate_core::registry::ClientRegistry;
use uagate_core::sink::{LogSink, Sink};
use uagate_core::transport::TransportFactory;
use uagate_opcua::{OpcUaOptions, OpcUaTransportFactory};

use crate::error::BinResult;
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// GatewayRuntime
// =============================================================================

/// Owns the configured gateway for the duration of a `run` invocation.
pub struct GatewayRuntime {
    config: GatewayConfig,
    shutdown: ShutdownCoordinator,
}

impl GatewayRuntime {
    /// Creates a runtime for the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Handle for initiating shutdown programmatically.
    pub fn shutdown_coordinator(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Runs the gateway until a termination signal arrives.
    pub async fn run(self) -> BinResult<()> {
        let factory: Arc<dyn TransportFactory> =
            Arc::new(OpcUaTransportFactory::new(OpcUaOptions::default()));
        let sink: Arc<dyn Sink> = Arc::new(LogSink);
        self.run_with(factory, sink).await
    }

    /// Runs with an explicit transport factory and sink.
    pub async fn run_with(
        self,
        factory: Arc<dyn TransportFactory>,
        sink: Arc<dyn Sink>,
    ) -> BinResult<()> {
        let registry = ClientRegistry::new(factory, sink);
        let specs = device_specs(&self.config);
        let started = registry.provision_all(specs);

        info!(
            gateway = %self.config.gateway.name,
            devices = started,
            version = crate::VERSION,
            "gateway started"
        );

        self.shutdown.wait_for_signal().await;

        info!("shutting down, quiescing device clients");
        registry.shutdown().await;
        info!("gateway stopped");
        Ok(())
    }
}

// =============================================================================
// Config Conversion
// =============================================================================

/// Converts config entries to device specs, skipping invalid entries with
/// a warn log so one bad device never takes the fleet down.
pub fn device_specs(config: &GatewayConfig) -> Vec<DeviceSpec> {
    config
        .devices
        .iter()
        .filter_map(|entry| match entry.validate() {
            Ok(()) => Some(to_spec(entry)),
            Err(err) => {
                warn!(device = %entry.code, error = %err, "skipping invalid device entry");
                None
            }
        })
        .collect()
}

fn to_spec(entry: &DeviceEntry) -> DeviceSpec {
    DeviceSpec {
        code: entry.code.clone(),
        url: entry.url.clone(),
        topic: entry.topic.clone(),
        poll_interval: entry.poll_interval(),
        nodes: entry.nodes.clone(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_device_specs_skip_invalid_and_clamp_interval() {
        let config = uagate_config::load_str(
            r#"
devices:
  - code: press-01
    url: opc.tcp://10.0.0.5:4840
    topic: factory/press
    interval_ms: 0
    nodes: ["1:2045"]
  - code: ""
    url: opc.tcp://10.0.0.6:4840
    topic: factory/oven
"#,
        )
        .unwrap();

        let specs = device_specs(&config);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].code, "press-01");
        assert_eq!(specs[0].poll_interval, Duration::from_millis(1000));
        assert_eq!(specs[0].nodes, vec!["1:2045".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_stops_on_programmatic_shutdown() {
        use async_trait::async_trait;
        use uagate_core::address::NodeAddress;
        use uagate_core::error::TransportError;
        use uagate_core::sink::Reading;
        use uagate_core::transport::{NodeSample, NodeTransport, NodeValue};
        use uagate_core::value::TypedValue;

        struct IdleTransport;

        #[async_trait]
        impl NodeTransport for IdleTransport {
            async fn connect(&mut self, _endpoint: &str) -> Result<(), TransportError> {
                Ok(())
            }
            async fn disconnect(&mut self) -> Result<(), TransportError> {
                Ok(())
            }
            fn is_connected(&self) -> bool {
                true
            }
            async fn read_node(
                &self,
                _address: &NodeAddress,
            ) -> Result<NodeSample, TransportError> {
                Ok(NodeSample {
                    display_name: "Idle".into(),
                    value: NodeValue::Supported(TypedValue::Int32(0)),
                })
            }
            async fn write_node(
                &self,
                _address: &NodeAddress,
                _value: TypedValue,
            ) -> Result<(), TransportError> {
                Ok(())
            }
        }

        struct IdleFactory;
        impl TransportFactory for IdleFactory {
            fn create(&self, _endpoint: &str) -> Box<dyn NodeTransport> {
                Box::new(IdleTransport)
            }
        }

        struct DropSink;
        #[async_trait]
        impl uagate_core::sink::Sink for DropSink {
            async fn publish(&self, _topic: &str, _device_code: &str, _batch: Vec<Reading>) {}
        }

        let config = uagate_config::load_str(
            r#"
devices:
  - code: press-01
    url: opc.tcp://10.0.0.5:4840
    topic: factory/press
    nodes: ["1:1"]
"#,
        )
        .unwrap();

        let runtime = GatewayRuntime::new(config);
        let shutdown = runtime.shutdown_coordinator();

        let task = tokio::spawn(async move {
            runtime
                .run_with(Arc::new(IdleFactory), Arc::new(DropSink))
                .await
        });

        tokio::time::sleep(Duration::from_millis(2500)).await;
        shutdown.initiate();
        task.await.unwrap().unwrap();
    }
}
