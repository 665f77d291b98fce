// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One open channel to a printer, owned by one job.
//
// All methods block on the vendor SDK; call them from a blocking worker
// (`tokio::task::spawn_blocking`). The session closes its channel on drop,
// so every exit path, a panic included, releases the hardware exactly once.

use std::path::Path;
use std::sync::Arc;

use labelwerk_bridge::{AdapterState, DriverHandle, NativeAdapter, PrinterDriver};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ArtifactKind, ConnectionType, PrintSettings};
use tracing::{debug, info, instrument};

use crate::translate::{translate_open_error, translate_print_error};

/// Check that the transport can be used at all.
///
/// A missing radio is reported before a missing permission, and a missing
/// permission before a switched-off radio. A query that fails outright is
/// passed through as a bridge error.
pub fn check_adapter(adapter: &dyn NativeAdapter, connection: ConnectionType) -> Result<()> {
    match adapter.adapter_state(connection)? {
        AdapterState::Ready => Ok(()),
        AdapterState::Unsupported => Err(LabelwerkError::AdapterUnsupported(connection)),
        AdapterState::PermissionMissing => Err(LabelwerkError::PermissionDenied(format!(
            "{connection} access has not been granted"
        ))),
        AdapterState::Disabled => Err(LabelwerkError::AdapterDisabled(connection)),
    }
}

pub struct ChannelSession {
    driver: Arc<dyn PrinterDriver>,
    handle: Option<DriverHandle>,
    connection: ConnectionType,
    address: String,
}

impl std::fmt::Debug for ChannelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSession")
            .field("connection", &self.connection)
            .field("address", &self.address)
            .field("open", &self.is_open())
            .finish()
    }
}

impl ChannelSession {
    /// Check the adapter, then open a channel to `address`.
    #[instrument(skip(adapter, driver))]
    pub fn open(
        adapter: &dyn NativeAdapter,
        driver: Arc<dyn PrinterDriver>,
        connection: ConnectionType,
        address: &str,
    ) -> Result<Self> {
        check_adapter(adapter, connection)?;

        let handle = driver
            .open_channel(connection, address)
            .map_err(|e| translate_open_error(address, e))?;
        info!(handle = handle.id(), "channel opened");

        Ok(Self {
            driver,
            handle: Some(handle),
            connection,
            address: address.to_string(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn handle(&self) -> Result<&DriverHandle> {
        self.handle
            .as_ref()
            .ok_or_else(|| LabelwerkError::Driver(format!("channel to {} is closed", self.address)))
    }

    #[instrument(
        skip(self, settings),
        fields(address = %self.address, model = %settings.model, label = %settings.label_size)
    )]
    pub fn apply_settings(&self, settings: &PrintSettings) -> Result<()> {
        let handle = self.handle()?;
        self.driver
            .apply_settings(handle, settings)
            .map_err(translate_print_error)?;
        debug!("print settings applied");
        Ok(())
    }

    #[instrument(skip(self, path), fields(address = %self.address, path = %path.display()))]
    pub fn print(&self, path: &Path, kind: ArtifactKind) -> Result<()> {
        let handle = self.handle()?;
        self.driver
            .print_artifact(handle, path, kind)
            .map_err(translate_print_error)?;
        info!(%kind, "artifact printed");
        Ok(())
    }

    /// Close the channel. Later calls do nothing.
    #[instrument(skip(self), fields(address = %self.address))]
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            let id = handle.id();
            self.driver.close_channel(handle);
            info!(handle = id, "channel closed");
        }
    }
}

impl Drop for ChannelSession {
    fn drop(&mut self) {
        self.close();
    }
}
