// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ArtifactKind, ConnectionType};
use crate::vendor::{OpenChannelCode, PrintErrorCode};

/// Top-level error type for all Labelwerk operations.
#[derive(Debug, Error)]
pub enum LabelwerkError {
    // -- Validation --
    #[error("invalid {connection} address: {address:?}")]
    InvalidAddress {
        connection: ConnectionType,
        address: String,
    },

    #[error("artifact not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("artifact {} is not a {expected} file", .path.display())]
    ArtifactMismatch { path: PathBuf, expected: ArtifactKind },

    // -- Platform adapter --
    #[error("{0} is not supported on this device")]
    AdapterUnsupported(ConnectionType),

    #[error("{0} is not enabled")]
    AdapterDisabled(ConnectionType),

    #[error("permission not granted: {0}")]
    PermissionDenied(String),

    // -- Channel --
    #[error("connecting to {address} timed out after {timeout_ms}ms")]
    ConnectionTimeout { address: String, timeout_ms: u64 },

    #[error("failed to open channel to {address}: {code}")]
    ChannelOpen {
        address: String,
        code: OpenChannelCode,
    },

    // -- Printing --
    #[error("printer rejected the job: {code}")]
    Print { code: PrintErrorCode },

    #[error("printing did not finish within {timeout_ms}ms")]
    PrintTimeout { timeout_ms: u64 },

    #[error("job cancelled")]
    Cancelled,

    // -- Driver / platform bridge --
    #[error("printer driver error: {0}")]
    Driver(String),

    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;
