// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the mobile radios and the vendor
// SDK are unavailable.
//
// Every adapter reports unsupported, so jobs fail before reaching the
// driver. The driver methods exist only to satisfy the trait.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ArtifactKind, ConnectionType, PrintSettings};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeAdapter for StubBridge {
    fn is_adapter_supported(&self, connection: ConnectionType) -> bool {
        tracing::warn!(%connection, "NativeAdapter::is_adapter_supported called on stub bridge");
        false
    }

    fn is_adapter_enabled(&self, _connection: ConnectionType) -> bool {
        false
    }

    fn has_permission(&self, _connection: ConnectionType) -> bool {
        false
    }

    fn paired_devices(&self) -> Result<Vec<PairedDevice>> {
        tracing::warn!("NativeAdapter::paired_devices called on stub bridge");
        Err(LabelwerkError::PlatformUnavailable)
    }
}

impl PrinterDriver for StubBridge {
    fn open_channel(
        &self,
        _connection: ConnectionType,
        _address: &str,
    ) -> DriverResult<DriverHandle> {
        tracing::warn!("PrinterDriver::open_channel called on stub bridge");
        Err(DriverError::Exception("printer driver not available on this platform".into()))
    }

    fn apply_settings(
        &self,
        _handle: &DriverHandle,
        _settings: &PrintSettings,
    ) -> DriverResult<()> {
        Err(DriverError::Exception("printer driver not available on this platform".into()))
    }

    fn print_artifact(
        &self,
        _handle: &DriverHandle,
        _path: &Path,
        _kind: ArtifactKind,
    ) -> DriverResult<()> {
        Err(DriverError::Exception("printer driver not available on this platform".into()))
    }

    fn close_channel(&self, _handle: DriverHandle) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_no_radios() {
        let bridge = StubBridge;
        assert!(!bridge.is_adapter_supported(ConnectionType::Bluetooth));
        assert!(!bridge.is_adapter_supported(ConnectionType::Wifi));
        assert!(matches!(
            bridge.paired_devices(),
            Err(LabelwerkError::PlatformUnavailable)
        ));
    }
}
