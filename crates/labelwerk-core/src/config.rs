// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LabelwerkError, Result};
use crate::types::{Halftone, LabelSize, Orientation, PrinterModel};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upper bound on opening a channel to the printer.
    pub open_timeout_ms: u64,
    /// Upper bound on submitting one artifact to an open channel.
    pub print_timeout_ms: u64,
    /// Cut after every label.
    pub auto_cut: bool,
    /// Orientation used when a job does not ask for one.
    pub default_orientation: Orientation,
    /// Halftone applied to image artifacts.
    pub image_halftone: Halftone,
    /// Model assumed when the request does not name one.
    pub default_model: PrinterModel,
    /// Label stock assumed when the request does not name one.
    pub default_label_size: LabelSize,
    /// Driver spool directory. Defaults to the system temp directory.
    pub work_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            open_timeout_ms: 5_000,
            print_timeout_ms: 30_000,
            auto_cut: true,
            default_orientation: Orientation::Landscape,
            image_halftone: Halftone::Threshold,
            default_model: PrinterModel::Ql820Nwb,
            default_label_size: LabelSize::DieCutW29H90,
            work_dir: None,
        }
    }
}

impl AppConfig {
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }

    /// Resolved driver working directory.
    pub fn work_path(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Reject values that would make every job fail.
    pub fn validate(&self) -> Result<()> {
        if self.open_timeout_ms == 0 {
            return Err(LabelwerkError::Config("open_timeout_ms must be positive".into()));
        }
        if self.print_timeout_ms == 0 {
            return Err(LabelwerkError::Config("print_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "open_timeout_ms": 8000 }"#)
            .expect("parse partial config");
        assert_eq!(config.open_timeout(), Duration::from_secs(8));
        assert_eq!(config.print_timeout_ms, 30_000);
        assert_eq!(config.default_label_size, LabelSize::DieCutW29H90);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AppConfig {
            open_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
