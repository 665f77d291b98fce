// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer address validation.
//
// Runs before any adapter query or driver call so malformed input never
// reaches the radio.

use std::net::Ipv4Addr;

use crate::error::{LabelwerkError, Result};
use crate::types::ConnectionType;

/// Maximum hostname length (RFC 1123).
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of one hostname label.
const MAX_LABEL_LEN: usize = 63;

/// Whether `address` is syntactically valid for the given transport.
pub fn validate_address(connection: ConnectionType, address: &str) -> bool {
    match connection {
        ConnectionType::Bluetooth => is_mac_address(address),
        ConnectionType::Wifi => is_ipv4(address) || is_hostname(address),
    }
}

/// Like [`validate_address`] but returns `InvalidAddress` on failure.
pub fn check_address(connection: ConnectionType, address: &str) -> Result<()> {
    if validate_address(connection, address) {
        Ok(())
    } else {
        Err(LabelwerkError::InvalidAddress {
            connection,
            address: address.to_string(),
        })
    }
}

/// Canonical form of a valid address, used to key per-printer locks.
///
/// `6c:b2:fd:94:22:2f` and `6C:B2:FD:94:22:2F` are the same printer.
pub fn normalize_address(connection: ConnectionType, address: &str) -> String {
    match connection {
        ConnectionType::Bluetooth => address.to_ascii_uppercase(),
        ConnectionType::Wifi => address.to_ascii_lowercase(),
    }
}

/// Six colon-separated octets of exactly two hex digits each.
fn is_mac_address(address: &str) -> bool {
    let octets: Vec<&str> = address.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn is_ipv4(address: &str) -> bool {
    address.parse::<Ipv4Addr>().is_ok()
}

fn is_hostname(address: &str) -> bool {
    if address.is_empty() || address.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    let labels: Vec<&str> = address.split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    });
    // All-numeric names are IPv4 attempts; `is_ipv4` already rejected them.
    let all_numeric = labels
        .iter()
        .all(|label| label.bytes().all(|b| b.is_ascii_digit()));
    labels_ok && !all_numeric
}
