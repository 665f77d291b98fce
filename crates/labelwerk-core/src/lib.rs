// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: core types, vendor codes and error definitions shared across
// all crates.

pub mod address;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;
pub mod vendor;

pub use address::{check_address, normalize_address, validate_address};
pub use config::AppConfig;
pub use error::LabelwerkError;
pub use types::*;
pub use vendor::{OpenChannelCode, PrintErrorCode};
