// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the adapter and the vendor driver.
//
// All methods are blocking. Vendor SDK calls can take seconds (Bluetooth
// negotiation, spooling); callers run them on a blocking worker.

use std::path::Path;

use labelwerk_core::error::Result;
use labelwerk_core::{ArtifactKind, ConnectionType, OpenChannelCode, PrintErrorCode, PrintSettings};
use thiserror::Error;

/// A bridge groups both capabilities for one platform.
pub trait PlatformBridge: NativeAdapter + PrinterDriver {
    /// Human-readable platform name (e.g. "Android", "Desktop (stub)").
    fn platform_name(&self) -> &str;
}

/// Read-only view of the platform radios.
///
/// This layer never toggles radio power or requests permissions; it only
/// reports the current state.
pub trait NativeAdapter: Send + Sync {
    /// Whether the device has the radio at all.
    fn is_adapter_supported(&self, connection: ConnectionType) -> bool;

    /// Whether the radio is switched on.
    fn is_adapter_enabled(&self, connection: ConnectionType) -> bool;

    /// Whether the app holds the OS permissions needed to use the radio.
    fn has_permission(&self, connection: ConnectionType) -> bool;

    /// Devices already paired over Bluetooth.
    fn paired_devices(&self) -> Result<Vec<PairedDevice>>;

    /// Support, permission and power for `connection`, checked in that
    /// order and stopping at the first that fails.
    ///
    /// Bridges whose queries can themselves fail override this so the
    /// failure surfaces as an error instead of a missing radio.
    fn adapter_state(&self, connection: ConnectionType) -> Result<AdapterState> {
        Ok(ordered_state(self, connection))
    }
}

/// First unmet requirement for using a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Ready,
    Unsupported,
    PermissionMissing,
    Disabled,
}

/// Evaluate the boolean adapter queries in check order.
pub fn ordered_state<A>(adapter: &A, connection: ConnectionType) -> AdapterState
where
    A: NativeAdapter + ?Sized,
{
    if !adapter.is_adapter_supported(connection) {
        AdapterState::Unsupported
    } else if !adapter.has_permission(connection) {
        AdapterState::PermissionMissing
    } else if !adapter.is_adapter_enabled(connection) {
        AdapterState::Disabled
    } else {
        AdapterState::Ready
    }
}

/// Opaque handle to one open vendor channel.
///
/// Deliberately neither `Clone` nor `Copy`: `close_channel` consumes it, so
/// a handle can be closed at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DriverHandle {
    id: u64,
}

impl DriverHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Failure reported by the vendor driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// `openChannel` returned a non-`NoError` code.
    #[error("open channel failed: {0}")]
    OpenChannel(OpenChannelCode),

    /// A print call returned a non-`NoError` code.
    #[error("print failed: {0}")]
    Print(PrintErrorCode),

    /// The SDK threw instead of returning a status code.
    #[error("{0}")]
    Exception(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// The Brother SDK's channel/driver surface, consumed as a black box.
pub trait PrinterDriver: Send + Sync {
    fn open_channel(&self, connection: ConnectionType, address: &str) -> DriverResult<DriverHandle>;

    fn apply_settings(&self, handle: &DriverHandle, settings: &PrintSettings) -> DriverResult<()>;

    fn print_artifact(
        &self,
        handle: &DriverHandle,
        path: &Path,
        kind: ArtifactKind,
    ) -> DriverResult<()>;

    fn close_channel(&self, handle: DriverHandle);
}

/// A device paired with the platform Bluetooth adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    pub name: Option<String>,
    pub address: String,
}
