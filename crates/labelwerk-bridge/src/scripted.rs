// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted in-process bridge.
//
// Stands in for the radios and the vendor SDK: every answer is set up front
// with the builder methods, every call is counted, and optional delays make
// slow Bluetooth negotiation reproducible. Used by the test suites and by
// the CLI's `--simulate` mode.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ArtifactKind, ConnectionType, OpenChannelCode, PrintErrorCode, PrintSettings};
use tracing::debug;

use crate::traits::*;

/// Snapshot of how often each capability was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub adapter_queries: usize,
    pub open: usize,
    pub apply: usize,
    pub print: usize,
    pub close: usize,
}

#[derive(Default)]
struct Counters {
    adapter_queries: AtomicUsize,
    open: AtomicUsize,
    apply: AtomicUsize,
    print: AtomicUsize,
    close: AtomicUsize,
}

/// Per-address bookkeeping of open channels.
#[derive(Default)]
struct ChannelTable {
    /// handle id -> address it was opened for.
    open: HashMap<u64, String>,
    /// address -> currently open channels.
    active: HashMap<String, usize>,
    /// address -> highest simultaneous count seen.
    peak: HashMap<String, usize>,
    /// Highest simultaneous count across all addresses.
    peak_total: usize,
}

/// Programmable bridge with call counters.
pub struct ScriptedBridge {
    unsupported: HashSet<ConnectionType>,
    disabled: HashSet<ConnectionType>,
    denied: HashSet<ConnectionType>,
    paired: Vec<PairedDevice>,
    query_failure: Option<String>,
    open_result: DriverResult<()>,
    apply_result: DriverResult<()>,
    print_result: DriverResult<()>,
    open_delay: Duration,
    print_delay: Duration,
    counters: Counters,
    next_handle: AtomicU64,
    channels: Mutex<ChannelTable>,
    printed: Mutex<Vec<(PathBuf, ArtifactKind)>>,
    last_settings: Mutex<Option<PrintSettings>>,
}

impl Default for ScriptedBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBridge {
    /// A bridge where every radio is present, on and permitted, and every
    /// driver call succeeds immediately.
    pub fn new() -> Self {
        Self {
            unsupported: HashSet::new(),
            disabled: HashSet::new(),
            denied: HashSet::new(),
            paired: Vec::new(),
            query_failure: None,
            open_result: Ok(()),
            apply_result: Ok(()),
            print_result: Ok(()),
            open_delay: Duration::ZERO,
            print_delay: Duration::ZERO,
            counters: Counters::default(),
            next_handle: AtomicU64::new(1),
            channels: Mutex::new(ChannelTable::default()),
            printed: Mutex::new(Vec::new()),
            last_settings: Mutex::new(None),
        }
    }

    pub fn adapter_unsupported(mut self, connection: ConnectionType) -> Self {
        self.unsupported.insert(connection);
        self
    }

    pub fn adapter_disabled(mut self, connection: ConnectionType) -> Self {
        self.disabled.insert(connection);
        self
    }

    pub fn permission_denied(mut self, connection: ConnectionType) -> Self {
        self.denied.insert(connection);
        self
    }

    /// Make the adapter state query itself fail, as a JNI exception would.
    pub fn fail_adapter_query(mut self, message: &str) -> Self {
        self.query_failure = Some(message.to_string());
        self
    }

    pub fn with_paired(mut self, name: Option<&str>, address: &str) -> Self {
        self.paired.push(PairedDevice {
            name: name.map(String::from),
            address: address.to_string(),
        });
        self
    }

    pub fn fail_open(mut self, code: OpenChannelCode) -> Self {
        self.open_result = Err(DriverError::OpenChannel(code));
        self
    }

    pub fn fail_apply(mut self, code: PrintErrorCode) -> Self {
        self.apply_result = Err(DriverError::Print(code));
        self
    }

    pub fn fail_print(mut self, code: PrintErrorCode) -> Self {
        self.print_result = Err(DriverError::Print(code));
        self
    }

    /// Make `open_channel` throw instead of returning a code.
    pub fn throw_on_open(mut self, message: &str) -> Self {
        self.open_result = Err(DriverError::Exception(message.to_string()));
        self
    }

    /// Make `print_artifact` throw instead of returning a code.
    pub fn throw_on_print(mut self, message: &str) -> Self {
        self.print_result = Err(DriverError::Exception(message.to_string()));
        self
    }

    pub fn open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn print_delay(mut self, delay: Duration) -> Self {
        self.print_delay = delay;
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            adapter_queries: self.counters.adapter_queries.load(Ordering::SeqCst),
            open: self.counters.open.load(Ordering::SeqCst),
            apply: self.counters.apply.load(Ordering::SeqCst),
            print: self.counters.print.load(Ordering::SeqCst),
            close: self.counters.close.load(Ordering::SeqCst),
        }
    }

    /// Channels currently open, across all addresses.
    pub fn open_channels(&self) -> usize {
        self.channels.lock().map(|t| t.open.len()).unwrap_or(0)
    }

    /// Highest number of channels that were ever open at once to `address`.
    pub fn peak_channels(&self, address: &str) -> usize {
        self.channels
            .lock()
            .map(|t| t.peak.get(address).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Highest number of channels that were ever open at once, across all
    /// addresses.
    pub fn peak_open(&self) -> usize {
        self.channels.lock().map(|t| t.peak_total).unwrap_or(0)
    }

    /// Artifacts that reached `print_artifact`, in order.
    pub fn printed(&self) -> Vec<(PathBuf, ArtifactKind)> {
        self.printed.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Settings passed to the most recent `apply_settings`.
    pub fn last_settings(&self) -> Option<PrintSettings> {
        self.last_settings.lock().ok().and_then(|s| s.clone())
    }

    fn query(&self) {
        self.counters.adapter_queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl PlatformBridge for ScriptedBridge {
    fn platform_name(&self) -> &str {
        "Simulated"
    }
}

impl NativeAdapter for ScriptedBridge {
    fn is_adapter_supported(&self, connection: ConnectionType) -> bool {
        self.query();
        !self.unsupported.contains(&connection)
    }

    fn is_adapter_enabled(&self, connection: ConnectionType) -> bool {
        self.query();
        !self.disabled.contains(&connection)
    }

    fn has_permission(&self, connection: ConnectionType) -> bool {
        self.query();
        !self.denied.contains(&connection)
    }

    fn paired_devices(&self) -> Result<Vec<PairedDevice>> {
        self.query();
        Ok(self.paired.clone())
    }

    fn adapter_state(&self, connection: ConnectionType) -> Result<AdapterState> {
        if let Some(message) = &self.query_failure {
            self.query();
            return Err(LabelwerkError::Bridge(message.clone()));
        }
        Ok(ordered_state(self, connection))
    }
}

impl PrinterDriver for ScriptedBridge {
    fn open_channel(
        &self,
        connection: ConnectionType,
        address: &str,
    ) -> DriverResult<DriverHandle> {
        self.counters.open.fetch_add(1, Ordering::SeqCst);
        if !self.open_delay.is_zero() {
            std::thread::sleep(self.open_delay);
        }
        self.open_result.clone()?;

        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut table) = self.channels.lock() {
            table.open.insert(id, address.to_string());
            let active = table.active.entry(address.to_string()).or_insert(0);
            *active += 1;
            let now = *active;
            let peak = table.peak.entry(address.to_string()).or_insert(0);
            *peak = (*peak).max(now);
            table.peak_total = table.peak_total.max(table.open.len());
        }
        debug!(%connection, address, handle = id, "scripted channel opened");
        Ok(DriverHandle::new(id))
    }

    fn apply_settings(&self, _handle: &DriverHandle, settings: &PrintSettings) -> DriverResult<()> {
        self.counters.apply.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_settings.lock() {
            *last = Some(settings.clone());
        }
        self.apply_result.clone()
    }

    fn print_artifact(
        &self,
        _handle: &DriverHandle,
        path: &Path,
        kind: ArtifactKind,
    ) -> DriverResult<()> {
        self.counters.print.fetch_add(1, Ordering::SeqCst);
        if !self.print_delay.is_zero() {
            std::thread::sleep(self.print_delay);
        }
        self.print_result.clone()?;
        if let Ok(mut printed) = self.printed.lock() {
            printed.push((path.to_path_buf(), kind));
        }
        Ok(())
    }

    fn close_channel(&self, handle: DriverHandle) {
        self.counters.close.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut table) = self.channels.lock() {
            if let Some(address) = table.open.remove(&handle.id()) {
                if let Some(active) = table.active.get_mut(&address) {
                    *active = active.saturating_sub(1);
                }
            }
        }
        debug!(handle = handle.id(), "scripted channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_calls_and_tracks_open_channels() {
        let bridge = ScriptedBridge::new();
        let handle = bridge
            .open_channel(ConnectionType::Bluetooth, "6C:B2:FD:94:22:2F")
            .expect("open");
        assert_eq!(bridge.open_channels(), 1);
        bridge.close_channel(handle);
        assert_eq!(bridge.open_channels(), 0);
        assert_eq!(bridge.peak_channels("6C:B2:FD:94:22:2F"), 1);

        let calls = bridge.calls();
        assert_eq!(calls.open, 1);
        assert_eq!(calls.close, 1);
    }

    #[test]
    fn scripted_failures_are_returned() {
        let bridge = ScriptedBridge::new().fail_open(OpenChannelCode::OpenStreamFailure);
        let err = bridge
            .open_channel(ConnectionType::Wifi, "192.168.1.20")
            .unwrap_err();
        assert_eq!(err, DriverError::OpenChannel(OpenChannelCode::OpenStreamFailure));
        assert_eq!(bridge.open_channels(), 0);
    }

    #[test]
    fn adapter_state_is_per_transport() {
        let bridge = ScriptedBridge::new().adapter_disabled(ConnectionType::Bluetooth);
        assert!(!bridge.is_adapter_enabled(ConnectionType::Bluetooth));
        assert!(bridge.is_adapter_enabled(ConnectionType::Wifi));
        assert_eq!(bridge.calls().adapter_queries, 2);
    }

    #[test]
    fn adapter_state_stops_at_the_first_gap() {
        let bridge = ScriptedBridge::new()
            .permission_denied(ConnectionType::Wifi)
            .adapter_disabled(ConnectionType::Wifi);
        let state = bridge.adapter_state(ConnectionType::Wifi).expect("state");
        assert_eq!(state, AdapterState::PermissionMissing);
        assert_eq!(bridge.calls().adapter_queries, 2);

        let state = bridge.adapter_state(ConnectionType::Bluetooth).expect("state");
        assert_eq!(state, AdapterState::Ready);
    }

    #[test]
    fn failed_adapter_query_is_an_error() {
        let bridge = ScriptedBridge::new().fail_adapter_query("java.lang.SecurityException");
        let err = bridge.adapter_state(ConnectionType::Bluetooth).unwrap_err();
        assert!(matches!(
            err,
            LabelwerkError::Bridge(ref msg) if msg.contains("SecurityException")
        ));
    }
}
