// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paired-printer discovery.
//
// Brother label printers advertise their model in the Bluetooth name
// (`QL-820NWB5291`, `Brother PT-P710BT`). We list the adapter's bonded
// devices and keep the ones that look like label printers.

use labelwerk_bridge::NativeAdapter;
use labelwerk_core::error::Result;
use labelwerk_core::{ConnectionType, DiscoveredPrinter, PrinterModel};
use tracing::{debug, info};

use crate::session::check_adapter;

/// Name fragments used by Brother label printer families.
const BROTHER_MARKERS: &[&str] = &["BROTHER", "QL-", "PT-", "TD-", "MW-", "RJ-"];

/// Whether a Bluetooth device name looks like a Brother label printer.
pub fn is_brother_printer(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    BROTHER_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Best-effort model guess from the advertised name.
pub fn model_from_name(name: &str) -> Option<PrinterModel> {
    let upper = name.to_ascii_uppercase();
    // Longest names first so "QL-820NWB" is not taken for "QL-800".
    let mut models = PrinterModel::ALL.to_vec();
    models.sort_by_key(|m| std::cmp::Reverse(m.display_name().len()));
    models.into_iter().find(|m| upper.contains(m.display_name()))
}

/// List paired Brother printers. Blocking; run on a blocking worker.
pub fn discover_printers(adapter: &dyn NativeAdapter) -> Result<Vec<DiscoveredPrinter>> {
    check_adapter(adapter, ConnectionType::Bluetooth)?;

    let paired = adapter.paired_devices()?;
    let total = paired.len();
    let printers: Vec<DiscoveredPrinter> = paired
        .into_iter()
        .filter_map(|device| {
            let name = device.name?;
            if !is_brother_printer(&name) {
                debug!(name = %name, "skipping non-printer device");
                return None;
            }
            Some(DiscoveredPrinter {
                model: model_from_name(&name),
                name,
                address: device.address,
                connection_type: ConnectionType::Bluetooth,
            })
        })
        .collect();

    info!(paired = total, printers = printers.len(), "paired printer scan complete");
    Ok(printers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelwerk_bridge::ScriptedBridge;
    use labelwerk_core::error::LabelwerkError;

    #[test]
    fn keeps_only_brother_devices() {
        let bridge = ScriptedBridge::new()
            .with_paired(Some("QL-820NWB5291"), "6C:B2:FD:94:22:2F")
            .with_paired(Some("Galaxy Buds"), "11:22:33:44:55:66")
            .with_paired(None, "AA:BB:CC:DD:EE:FF")
            .with_paired(Some("brother pt-p710bt"), "00:80:92:11:22:33");

        let found = discover_printers(&bridge).expect("discover");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].address, "6C:B2:FD:94:22:2F");
        assert_eq!(found[0].model, Some(PrinterModel::Ql820Nwb));
        assert_eq!(found[1].model, None);
    }

    #[test]
    fn disabled_bluetooth_is_reported() {
        let bridge = ScriptedBridge::new().adapter_disabled(ConnectionType::Bluetooth);
        assert!(matches!(
            discover_printers(&bridge),
            Err(LabelwerkError::AdapterDisabled(ConnectionType::Bluetooth))
        ));
    }

    #[test]
    fn model_guess_prefers_the_longest_match() {
        assert_eq!(model_from_name("QL-810W-A1"), Some(PrinterModel::Ql810W));
        assert_eq!(model_from_name("QL-800"), Some(PrinterModel::Ql800));
        assert_eq!(model_from_name("TD-4550DNWB"), None);
    }
}
