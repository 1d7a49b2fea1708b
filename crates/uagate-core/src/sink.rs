// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Downstream publication boundary.
//!
//! The poll loop hands every non-empty batch of readings to a [`Sink`].
//! What happens behind the trait (a message broker producer, a channel
//! into an embedding application, plain logs) is the sink's business:
//! publication failures are logged there and never travel back into the
//! poll loop.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// =============================================================================
// Readings
// =============================================================================

/// One polled reading: the raw configured address and the encoded value.
///
/// The value is empty when the node's type is outside the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    /// The address exactly as configured (e.g. `"1:2045"`).
    pub address: String,
    /// Canonical text form of the sampled value.
    pub value: String,
}

impl Reading {
    /// Creates a reading.
    pub fn new(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
        }
    }
}

/// A published batch, as delivered by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkMessage {
    /// Topic the batch belongs to.
    pub topic: String,
    /// Device code of the originating client.
    pub device_code: String,
    /// The readings of one poll cycle (never empty).
    pub batch: Vec<Reading>,
}

// =============================================================================
// Sink
// =============================================================================

/// Receives non-empty batches of readings from the poll loops.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Publishes one batch. Must not fail upward; log and drop instead.
    async fn publish(&self, topic: &str, device_code: &str, batch: Vec<Reading>);
}

// =============================================================================
// ChannelSink
// =============================================================================

/// Sink that forwards batches over an mpsc channel.
///
/// Used by tests and by embedders that consume batches in-process.
pub struct ChannelSink {
    sender: mpsc::Sender<SinkMessage>,
}

impl ChannelSink {
    /// Creates the sink and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SinkMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn publish(&self, topic: &str, device_code: &str, batch: Vec<Reading>) {
        let message = SinkMessage {
            topic: topic.to_string(),
            device_code: device_code.to_string(),
            batch,
        };
        if self.sender.send(message).await.is_err() {
            warn!(
                topic = topic,
                device = device_code,
                "sink channel closed, dropping batch"
            );
        }
    }
}

// =============================================================================
// LogSink
// =============================================================================

/// Sink that writes every batch to the log. Useful as a default and for
/// commissioning, where the broker is not wired up yet.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl Sink for LogSink {
    async fn publish(&self, topic: &str, device_code: &str, batch: Vec<Reading>) {
        info!(
            topic = topic,
            device = device_code,
            readings = batch.len(),
            "publishing batch"
        );
        for reading in &batch {
            debug!(
                topic = topic,
                device = device_code,
                address = %reading.address,
                value = %reading.value,
                "reading"
            );
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_batches() {
        let (sink, mut receiver) = ChannelSink::new(8);
        sink.publish(
            "factory/press",
            "press-01",
            vec![Reading::new("1:2045", "7")],
        )
        .await;

        let message = receiver.recv().await.unwrap();
        assert_eq!(message.topic, "factory/press");
        assert_eq!(message.device_code, "press-01");
        assert_eq!(message.batch, vec![Reading::new("1:2045", "7")]);
    }

    #[tokio::test]
    async fn test_channel_sink_survives_closed_receiver() {
        let (sink, receiver) = ChannelSink::new(1);
        drop(receiver);
        // Must not panic or error upward.
        sink.publish("t", "d", vec![Reading::new("1:1", "0")]).await;
    }
}
