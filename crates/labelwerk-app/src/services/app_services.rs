// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Loads configuration, builds the platform bridge
// and the job orchestrator, and turns loosely-typed print requests into
// jobs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use labelwerk_bridge::{NativeAdapter, PlatformBridge, ScriptedBridge, platform_bridge};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{
    AppConfig, ArtifactKind, ConnectionType, DiscoveredPrinter, Fallback, JobOutcome, LabelSize,
    Orientation, PrintJob, PrintRequest, PrinterModel, validate_address,
};
use labelwerk_print::artifact::{infer_kind, strip_file_scheme};
use labelwerk_print::{CancellationToken, JobOrchestrator, PendingJob, discover_printers};
use serde::Serialize;
use tracing::{info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// A submitted request: the running job plus any settings that fell back
/// to defaults while building it.
pub struct Submission {
    pub pending: PendingJob,
    pub fallbacks: Vec<Fallback>,
}

/// Terminal report for a print request.
#[derive(Debug, Clone, Serialize)]
pub struct PrintReport {
    pub outcome: JobOutcome,
    pub fallbacks: Vec<Fallback>,
}

/// Settings to change in the saved config. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub open_timeout_ms: Option<u64>,
    pub print_timeout_ms: Option<u64>,
    pub auto_cut: Option<bool>,
    pub default_model: Option<String>,
    pub default_label_size: Option<String>,
    pub default_orientation: Option<Orientation>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.open_timeout_ms.is_none()
            && self.print_timeout_ms.is_none()
            && self.auto_cut.is_none()
            && self.default_model.is_none()
            && self.default_label_size.is_none()
            && self.default_orientation.is_none()
    }

    /// Apply to `config`. Unknown model or label names are rejected rather
    /// than silently replaced by a default.
    pub fn apply_to(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(ms) = self.open_timeout_ms {
            config.open_timeout_ms = ms;
        }
        if let Some(ms) = self.print_timeout_ms {
            config.print_timeout_ms = ms;
        }
        if let Some(auto_cut) = self.auto_cut {
            config.auto_cut = auto_cut;
        }
        if let Some(name) = &self.default_model {
            config.default_model = PrinterModel::from_name(name)
                .ok_or_else(|| LabelwerkError::Config(format!("unknown printer model {name:?}")))?;
        }
        if let Some(name) = &self.default_label_size {
            config.default_label_size = LabelSize::from_name(name)
                .ok_or_else(|| LabelwerkError::Config(format!("unknown label size {name:?}")))?;
        }
        if let Some(orientation) = self.default_orientation {
            config.default_orientation = orientation;
        }
        Ok(())
    }
}

/// Shared application services.
///
/// Cheap to clone; the orchestrator and bridge are behind `Arc`.
#[derive(Clone)]
pub struct LabelServices {
    orchestrator: JobOrchestrator,
    adapter: Arc<dyn NativeAdapter>,
    platform: String,
    data_dir: PathBuf,
    /// The config the orchestrator was built from.
    config: AppConfig,
}

impl LabelServices {
    /// Initialise from the default data directory. With `simulate`, a
    /// scripted bridge with one paired QL-820NWB stands in for the radios.
    pub fn init(simulate: bool) -> Result<Self> {
        let dir = data_dir::data_dir();
        let config = load_config(&dir);
        config.validate()?;
        info!(path = %dir.display(), simulate, "initialising label services");

        if simulate {
            let bridge =
                ScriptedBridge::new().with_paired(Some("QL-820NWB5291"), "6C:B2:FD:94:22:2F");
            Ok(Self::with_bridge(Arc::new(bridge), dir, config))
        } else {
            Ok(Self::with_bridge(Arc::new(platform_bridge()), dir, config))
        }
    }

    pub fn with_bridge<B: PlatformBridge + 'static>(
        bridge: Arc<B>,
        data_dir: PathBuf,
        config: AppConfig,
    ) -> Self {
        let platform = bridge.platform_name().to_string();
        Self {
            orchestrator: JobOrchestrator::with_bridge(bridge.clone(), &config),
            adapter: bridge,
            platform,
            data_dir,
            config,
        }
    }

    pub fn platform_name(&self) -> &str {
        &self.platform
    }

    // -- Jobs ----------------------------------------------------------------

    /// Turn a host request into a typed job, recording any fallbacks.
    ///
    /// When no kind is given it is inferred from the extension; files with
    /// no recognised extension are treated as images and rejected during
    /// validation.
    pub fn build_job(&self, request: &PrintRequest) -> (PrintJob, Vec<Fallback>) {
        let path = PathBuf::from(strip_file_scheme(&request.artifact_path));
        let kind = request
            .artifact_kind
            .or_else(|| infer_kind(&path))
            .unwrap_or(ArtifactKind::Image);

        let resolver = self.orchestrator.resolver();
        let (model, model_fallback) = resolver.select_model(request.printer_model.as_deref());
        let (label_size, label_fallback) =
            resolver.select_label_size(request.label_size.as_deref());

        let mut job = PrintJob::new(request.connection_type, request.address.clone(), path, kind)
            .with_model(model)
            .with_label_size(label_size)
            .with_copies(request.copies.unwrap_or(1));
        if let Some(orientation) = request.orientation {
            job = job.with_orientation(orientation);
        }

        let fallbacks = model_fallback.into_iter().chain(label_fallback).collect();
        (job, fallbacks)
    }

    pub fn submit(&self, request: &PrintRequest, cancel: CancellationToken) -> Submission {
        let (job, fallbacks) = self.build_job(request);
        let pending = self.orchestrator.submit_with_cancel(job, cancel);
        info!(job_id = %pending.job_id(), fallbacks = fallbacks.len(), "print request accepted");
        Submission { pending, fallbacks }
    }

    /// Submit and wait for the outcome.
    pub async fn print(&self, request: &PrintRequest) -> PrintReport {
        let Submission { pending, fallbacks } = self.submit(request, CancellationToken::new());
        PrintReport {
            outcome: pending.outcome().await,
            fallbacks,
        }
    }

    pub fn validate(&self, connection: ConnectionType, address: &str) -> bool {
        validate_address(connection, address)
    }

    /// Open and close a channel to check the printer is reachable.
    pub async fn probe(&self, connection: ConnectionType, address: &str) -> JobOutcome {
        self.orchestrator.probe(connection, address).await
    }

    /// Paired Brother printers.
    pub async fn discover(&self) -> Result<Vec<DiscoveredPrinter>> {
        let adapter = self.adapter.clone();
        tokio::task::spawn_blocking(move || discover_printers(adapter.as_ref()))
            .await
            .map_err(|e| LabelwerkError::Bridge(format!("discovery task failed: {e}")))?
    }

    // -- Config --------------------------------------------------------------

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Apply `update` to the current config and save it. Jobs pick the new
    /// values up on the next start.
    pub fn update_config(&self, update: &ConfigUpdate) -> Result<AppConfig> {
        let mut config = self.config.clone();
        update.apply_to(&mut config)?;
        save_config(&self.data_dir, &config)?;
        info!(path = %self.data_dir.join(CONFIG_FILE).display(), "configuration saved");
        Ok(config)
    }
}

/// Load `config.json`, falling back to defaults when missing or unreadable.
pub fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(_) => return AppConfig::default(),
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            AppConfig::default()
        }
    }
}

/// Validate `config` and write it to `config.json`.
pub fn save_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    config.validate()?;
    persist_config(data_dir, config)
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelwerk_core::{ErrorKind, OutcomeStatus};

    fn request(path: &str) -> PrintRequest {
        PrintRequest {
            connection_type: ConnectionType::Bluetooth,
            address: "6C:B2:FD:94:22:2F".into(),
            artifact_path: path.into(),
            artifact_kind: None,
            printer_model: Some("QL-820NWB".into()),
            label_size: Some("DieCutW62H29".into()),
            orientation: None,
            copies: None,
        }
    }

    fn services(dir: &Path, bridge: ScriptedBridge) -> LabelServices {
        LabelServices::with_bridge(Arc::new(bridge), dir.to_path_buf(), AppConfig::default())
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig {
            open_timeout_ms: 8_000,
            default_label_size: LabelSize::RollW62,
            ..AppConfig::default()
        };
        save_config(dir.path(), &config).expect("save");

        assert_eq!(load_config(dir.path()), config);
    }

    #[test]
    fn invalid_config_is_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = AppConfig {
            print_timeout_ms: 0,
            ..AppConfig::default()
        };
        assert!(save_config(dir.path(), &bad).is_err());
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn config_update_is_persisted_for_the_next_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(dir.path(), ScriptedBridge::new());

        let update = ConfigUpdate {
            print_timeout_ms: Some(45_000),
            default_label_size: Some("rollw62".into()),
            default_orientation: Some(Orientation::Portrait),
            ..ConfigUpdate::default()
        };
        assert!(!update.is_empty());
        let saved = svc.update_config(&update).expect("update");

        assert_eq!(saved.print_timeout_ms, 45_000);
        assert_eq!(saved.default_label_size, LabelSize::RollW62);
        assert_eq!(saved.default_model, PrinterModel::Ql820Nwb);
        assert_eq!(load_config(dir.path()), saved);
        // The running services keep the config they were built with.
        assert_eq!(svc.config(), &AppConfig::default());
    }

    #[test]
    fn config_update_rejects_unknown_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(dir.path(), ScriptedBridge::new());

        let update = ConfigUpdate {
            default_model: Some("QL-9999".into()),
            ..ConfigUpdate::default()
        };
        assert!(matches!(svc.update_config(&update), Err(LabelwerkError::Config(_))));
        assert!(!dir.path().join(CONFIG_FILE).exists());
        assert!(ConfigUpdate::default().is_empty());
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").expect("write");
        assert_eq!(load_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn build_job_infers_kind_and_records_fallbacks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(dir.path(), ScriptedBridge::new());

        let mut req = request("file:///data/labels/box-17.PDF");
        req.label_size = Some("Sticker99".into());
        req.orientation = Some(Orientation::Portrait);
        req.copies = Some(3);
        let (job, fallbacks) = svc.build_job(&req);

        assert_eq!(job.artifact_path, PathBuf::from("/data/labels/box-17.PDF"));
        assert_eq!(job.artifact_kind, ArtifactKind::Pdf);
        assert_eq!(job.printer_model, PrinterModel::Ql820Nwb);
        assert_eq!(job.label_size, LabelSize::DieCutW29H90);
        assert_eq!(job.orientation, Some(Orientation::Portrait));
        assert_eq!(job.copies, 3);
        assert_eq!(fallbacks.len(), 1);
    }

    #[tokio::test]
    async fn print_request_runs_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("label.png");
        std::fs::write(&image, b"\x89PNG").expect("write");
        let bridge = Arc::new(ScriptedBridge::new());
        let svc = LabelServices::with_bridge(
            bridge.clone(),
            dir.path().to_path_buf(),
            AppConfig::default(),
        );

        let uri = format!("file://{}", image.display());
        let report = svc.print(&request(&uri)).await;

        assert_eq!(report.outcome.status, OutcomeStatus::Succeeded);
        assert!(report.fallbacks.is_empty());
        assert_eq!(bridge.last_settings().map(|s| s.label_size), Some(LabelSize::DieCutW62H29));
    }

    #[tokio::test]
    async fn unknown_extension_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("label.docx");
        std::fs::write(&doc, b"PK").expect("write");
        let bridge = Arc::new(ScriptedBridge::new());
        let svc = LabelServices::with_bridge(
            bridge.clone(),
            dir.path().to_path_buf(),
            AppConfig::default(),
        );

        let report = svc.print(&request(&doc.to_string_lossy())).await;

        assert_eq!(report.outcome.error_kind, Some(ErrorKind::FileNotFound));
        assert_eq!(bridge.calls().open, 0);
    }

    #[tokio::test]
    async fn discovery_runs_on_the_injected_adapter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(
            dir.path(),
            ScriptedBridge::new().with_paired(Some("QL-810W"), "00:80:92:AA:BB:CC"),
        );
        let printers = svc.discover().await.expect("discover");
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].model, Some(PrinterModel::Ql810W));
    }
}
