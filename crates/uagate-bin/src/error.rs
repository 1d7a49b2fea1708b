// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the uagate binary.

use thiserror::Error;

/// Result type alias for uagate-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the uagate binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Config loading or validation error.
    #[error("Config error: {0}")]
    Config(#[from] uagate_config::ConfigError),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl BinError {
    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Runtime(_) => 3,
        }
    }
}

/// Reports an error with its cause chain.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

// =============================================================================
// Tests
// =============================================================================
