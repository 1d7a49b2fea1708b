// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session options for the OPC UA transport.

use serde::{Deserialize, Serialize};

fn default_application_name() -> String {
    "uagate".to_string()
}

fn default_application_uri() -> String {
    "urn:uagate".to_string()
}

fn default_session_timeout_ms() -> u32 {
    60_000
}

fn default_session_retry_limit() -> i32 {
    3
}

/// Options applied to every session the transport opens.
///
/// The transport connects with an anonymous identity over the plain
/// (None/None) endpoint; certificate-based security is out of scope for
/// the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpcUaOptions {
    /// Application name announced to the server.
    #[serde(default = "default_application_name")]
    pub application_name: String,
    /// Application URI announced to the server.
    #[serde(default = "default_application_uri")]
    pub application_uri: String,
    /// Requested session timeout in milliseconds.
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u32,
    /// How many times the library retries a session internally.
    #[serde(default = "default_session_retry_limit")]
    pub session_retry_limit: i32,
}

impl Default for OpcUaOptions {
    fn default() -> Self {
        Self {
            application_name: default_application_name(),
            application_uri: default_application_uri(),
            session_timeout_ms: default_session_timeout_ms(),
            session_retry_limit: default_session_retry_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OpcUaOptions::default();
        assert_eq!(options.application_name, "uagate");
        assert_eq!(options.application_uri, "urn:uagate");
        assert_eq!(options.session_timeout_ms, 60_000);
        assert_eq!(options.session_retry_limit, 3);
    }
}
