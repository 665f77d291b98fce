// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print settings resolution.
//
// Maps (model, label size, artifact kind, orientation) onto the driver's
// `PrintSettings`. Unknown model or label names fall back to the configured
// defaults instead of failing the job; every fallback is recorded and
// logged.

use std::path::PathBuf;

use labelwerk_core::{
    AppConfig, ArtifactKind, Fallback, Halftone, LabelSize, Orientation, PrintSettings,
    PrinterModel, ScaleMode,
};
use serde::Serialize;
use tracing::warn;

/// Settings plus any fields that were substituted with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    pub settings: PrintSettings,
    pub fallbacks: Vec<Fallback>,
}

/// Static resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResolver {
    pub work_dir: PathBuf,
    pub auto_cut: bool,
    pub default_orientation: Orientation,
    pub image_halftone: Halftone,
    pub default_model: PrinterModel,
    pub default_label_size: LabelSize,
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SettingsResolver {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            work_dir: config.work_path(),
            auto_cut: config.auto_cut,
            default_orientation: config.default_orientation,
            image_halftone: config.image_halftone,
            default_model: config.default_model,
            default_label_size: config.default_label_size,
        }
    }

    /// Pure mapping from typed inputs to driver settings.
    pub fn resolve(
        &self,
        model: PrinterModel,
        label_size: LabelSize,
        kind: ArtifactKind,
        orientation: Option<Orientation>,
        copies: u32,
    ) -> PrintSettings {
        PrintSettings {
            model,
            label_size,
            auto_cut: self.auto_cut,
            scale_mode: ScaleMode::FitPaperAspect,
            orientation: orientation.unwrap_or(self.default_orientation),
            // PDFs keep the driver's own halftone.
            halftone: match kind {
                ArtifactKind::Image => Some(self.image_halftone),
                ArtifactKind::Pdf => None,
            },
            copies: copies.max(1),
            work_path: self.work_dir.clone(),
        }
    }

    /// Parse a model name, falling back to the default.
    pub fn select_model(&self, name: Option<&str>) -> (PrinterModel, Option<Fallback>) {
        let Some(name) = name else {
            return (self.default_model, None);
        };
        match PrinterModel::from_name(name) {
            Some(model) => (model, None),
            None => {
                warn!(
                    requested = name,
                    used = %self.default_model,
                    "unknown printer model, using default"
                );
                (
                    self.default_model,
                    Some(Fallback::Model {
                        requested: name.to_string(),
                        used: self.default_model,
                    }),
                )
            }
        }
    }

    /// Parse a label size name, falling back to the default.
    pub fn select_label_size(&self, name: Option<&str>) -> (LabelSize, Option<Fallback>) {
        let Some(name) = name else {
            return (self.default_label_size, None);
        };
        match LabelSize::from_name(name) {
            Some(size) => (size, None),
            None => {
                warn!(
                    requested = name,
                    used = %self.default_label_size,
                    "unknown label size, using default"
                );
                (
                    self.default_label_size,
                    Some(Fallback::LabelSize {
                        requested: name.to_string(),
                        used: self.default_label_size,
                    }),
                )
            }
        }
    }

    /// Resolve from the string names a host UI sends.
    pub fn resolve_named(
        &self,
        model: Option<&str>,
        label_size: Option<&str>,
        kind: ArtifactKind,
        orientation: Option<Orientation>,
        copies: u32,
    ) -> ResolvedSettings {
        let (model, model_fallback) = self.select_model(model);
        let (label_size, label_fallback) = self.select_label_size(label_size);
        ResolvedSettings {
            settings: self.resolve(model, label_size, kind, orientation, copies),
            fallbacks: model_fallback.into_iter().chain(label_fallback).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SettingsResolver {
        SettingsResolver {
            work_dir: PathBuf::from("/data/spool"),
            ..SettingsResolver::default()
        }
    }

    #[test]
    fn unknown_label_size_falls_back_and_is_recorded() {
        let resolved = resolver().resolve_named(
            Some("QL_820NWB"),
            Some("DieCutW999H1"),
            ArtifactKind::Image,
            None,
            1,
        );
        assert_eq!(resolved.settings.label_size, LabelSize::DieCutW29H90);
        assert_eq!(
            resolved.fallbacks,
            vec![Fallback::LabelSize {
                requested: "DieCutW999H1".into(),
                used: LabelSize::DieCutW29H90,
            }]
        );
    }

    #[test]
    fn unknown_model_falls_back_and_is_recorded() {
        let resolved =
            resolver().resolve_named(Some("QL-1110NWB"), None, ArtifactKind::Pdf, None, 1);
        assert_eq!(resolved.settings.model, PrinterModel::Ql820Nwb);
        assert!(matches!(resolved.fallbacks.as_slice(), [Fallback::Model { .. }]));
    }

    #[test]
    fn known_names_resolve_without_fallback() {
        let resolved = resolver().resolve_named(
            Some("ql-810w"),
            Some("dieCutW62H29"),
            ArtifactKind::Image,
            Some(Orientation::Portrait),
            2,
        );
        assert!(resolved.fallbacks.is_empty());
        assert_eq!(resolved.settings.model, PrinterModel::Ql810W);
        assert_eq!(resolved.settings.label_size, LabelSize::DieCutW62H29);
        assert_eq!(resolved.settings.orientation, Orientation::Portrait);
        assert_eq!(resolved.settings.copies, 2);
    }

    #[test]
    fn resolution_is_deterministic() {
        let r = resolver();
        let a = r.resolve(PrinterModel::Ql800, LabelSize::RollW62, ArtifactKind::Image, None, 1);
        let b = r.resolve(PrinterModel::Ql800, LabelSize::RollW62, ArtifactKind::Image, None, 1);
        assert_eq!(a, b);
    }

    #[test]
    fn defaults_match_label_printing_conventions() {
        let s = resolver().resolve(
            PrinterModel::Ql820Nwb,
            LabelSize::DieCutW29H90,
            ArtifactKind::Image,
            None,
            0,
        );
        assert!(s.auto_cut);
        assert_eq!(s.scale_mode, ScaleMode::FitPaperAspect);
        assert_eq!(s.orientation, Orientation::Landscape);
        assert_eq!(s.halftone, Some(Halftone::Threshold));
        assert_eq!(s.copies, 1);
        assert_eq!(s.work_path, PathBuf::from("/data/spool"));
    }

    #[test]
    fn pdf_keeps_driver_halftone() {
        let s = resolver().resolve(
            PrinterModel::Ql820Nwb,
            LabelSize::DieCutW29H90,
            ArtifactKind::Pdf,
            None,
            1,
        );
        assert_eq!(s.halftone, None);
    }
}
