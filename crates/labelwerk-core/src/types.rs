// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Labelwerk label printing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport used to reach the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Bluetooth,
    Wifi,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bluetooth => "bluetooth",
            Self::Wifi => "wifi",
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bluetooth" | "bt" => Ok(Self::Bluetooth),
            "wifi" | "wi-fi" | "network" => Ok(Self::Wifi),
            other => Err(format!("invalid connection type: {other}")),
        }
    }
}

/// Kind of rendered artifact handed to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Pdf,
}

impl ArtifactKind {
    /// File extensions (lowercase, without the dot) accepted for this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => &["jpg", "jpeg", "png", "bmp", "gif"],
            Self::Pdf => &["pdf"],
        }
    }

    /// Infer the artifact kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [Self::Image, Self::Pdf]
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Pdf => f.write_str("PDF"),
        }
    }
}

/// Supported Brother QL printer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrinterModel {
    /// QL-820NWB (Bluetooth + Wi-Fi). Used when a model name is not recognised.
    #[default]
    Ql820Nwb,
    Ql810W,
    Ql800,
}

impl PrinterModel {
    pub const ALL: &'static [PrinterModel] = &[Self::Ql820Nwb, Self::Ql810W, Self::Ql800];

    /// `PrinterModel` enum name in the vendor SDK.
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Ql820Nwb => "QL_820NWB",
            Self::Ql810W => "QL_810W",
            Self::Ql800 => "QL_800",
        }
    }

    /// Marketing name as printed on the device (and in its Bluetooth name).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ql820Nwb => "QL-820NWB",
            Self::Ql810W => "QL-810W",
            Self::Ql800 => "QL-800",
        }
    }

    /// Parse either the SDK or the marketing name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.sdk_name().eq_ignore_ascii_case(&wanted))
    }
}

impl std::fmt::Display for PrinterModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// QL label stock, named after `QLPrintSettings.LabelSize`.
///
/// Die-cut labels have a fixed height; continuous rolls are cut to the
/// rendered length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelSize {
    DieCutW17H54,
    DieCutW17H87,
    DieCutW23H23,
    DieCutW29H42,
    /// Standard address label. Used when a label size is not recognised.
    #[default]
    DieCutW29H90,
    DieCutW38H90,
    DieCutW39H48,
    DieCutW52H29,
    DieCutW54H29,
    DieCutW60H86,
    DieCutW62H29,
    DieCutW62H60,
    DieCutW62H75,
    DieCutW62H100,
    DieCutW102H51,
    DieCutW102H152,
    DieCutW103H164,
    RollW12,
    RollW29,
    RollW38,
    RollW50,
    RollW54,
    RollW62,
    RollW102,
}

impl LabelSize {
    pub const ALL: &'static [LabelSize] = &[
        Self::DieCutW17H54,
        Self::DieCutW17H87,
        Self::DieCutW23H23,
        Self::DieCutW29H42,
        Self::DieCutW29H90,
        Self::DieCutW38H90,
        Self::DieCutW39H48,
        Self::DieCutW52H29,
        Self::DieCutW54H29,
        Self::DieCutW60H86,
        Self::DieCutW62H29,
        Self::DieCutW62H60,
        Self::DieCutW62H75,
        Self::DieCutW62H100,
        Self::DieCutW102H51,
        Self::DieCutW102H152,
        Self::DieCutW103H164,
        Self::RollW12,
        Self::RollW29,
        Self::RollW38,
        Self::RollW50,
        Self::RollW54,
        Self::RollW62,
        Self::RollW102,
    ];

    /// Dimensions in millimetres (width, height). Height is `None` for
    /// continuous rolls.
    pub fn dimensions_mm(&self) -> (u32, Option<u32>) {
        match self {
            Self::DieCutW17H54 => (17, Some(54)),
            Self::DieCutW17H87 => (17, Some(87)),
            Self::DieCutW23H23 => (23, Some(23)),
            Self::DieCutW29H42 => (29, Some(42)),
            Self::DieCutW29H90 => (29, Some(90)),
            Self::DieCutW38H90 => (38, Some(90)),
            Self::DieCutW39H48 => (39, Some(48)),
            Self::DieCutW52H29 => (52, Some(29)),
            Self::DieCutW54H29 => (54, Some(29)),
            Self::DieCutW60H86 => (60, Some(86)),
            Self::DieCutW62H29 => (62, Some(29)),
            Self::DieCutW62H60 => (62, Some(60)),
            Self::DieCutW62H75 => (62, Some(75)),
            Self::DieCutW62H100 => (62, Some(100)),
            Self::DieCutW102H51 => (102, Some(51)),
            Self::DieCutW102H152 => (102, Some(152)),
            Self::DieCutW103H164 => (103, Some(164)),
            Self::RollW12 => (12, None),
            Self::RollW29 => (29, None),
            Self::RollW38 => (38, None),
            Self::RollW50 => (50, None),
            Self::RollW54 => (54, None),
            Self::RollW62 => (62, None),
            Self::RollW102 => (102, None),
        }
    }

    /// `QLPrintSettings.LabelSize` enum name in the vendor SDK.
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::DieCutW17H54 => "DieCutW17H54",
            Self::DieCutW17H87 => "DieCutW17H87",
            Self::DieCutW23H23 => "DieCutW23H23",
            Self::DieCutW29H42 => "DieCutW29H42",
            Self::DieCutW29H90 => "DieCutW29H90",
            Self::DieCutW38H90 => "DieCutW38H90",
            Self::DieCutW39H48 => "DieCutW39H48",
            Self::DieCutW52H29 => "DieCutW52H29",
            Self::DieCutW54H29 => "DieCutW54H29",
            Self::DieCutW60H86 => "DieCutW60H86",
            Self::DieCutW62H29 => "DieCutW62H29",
            Self::DieCutW62H60 => "DieCutW62H60",
            Self::DieCutW62H75 => "DieCutW62H75",
            Self::DieCutW62H100 => "DieCutW62H100",
            Self::DieCutW102H51 => "DieCutW102H51",
            Self::DieCutW102H152 => "DieCutW102H152",
            Self::DieCutW103H164 => "DieCutW103H164",
            Self::RollW12 => "RollW12",
            Self::RollW29 => "RollW29",
            Self::RollW38 => "RollW38",
            Self::RollW50 => "RollW50",
            Self::RollW54 => "RollW54",
            Self::RollW62 => "RollW62",
            Self::RollW102 => "RollW102",
        }
    }

    /// Parse an SDK label name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|size| size.sdk_name().eq_ignore_ascii_case(wanted))
    }

    /// Physical size for display, e.g. "62 x 29 mm die-cut".
    pub fn describe(&self) -> String {
        match self.dimensions_mm() {
            (width, Some(height)) => format!("{width} x {height} mm die-cut"),
            (width, None) => format!("{width} mm continuous"),
        }
    }
}

impl std::fmt::Display for LabelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}

/// Print orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    /// Labels are rendered wider than tall, so landscape is the default.
    #[default]
    Landscape,
}

impl Orientation {
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// How the driver converts greyscale to the printer's 1-bit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Halftone {
    Threshold,
    ErrorDiffusion,
    PatternDither,
}

impl Halftone {
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Threshold => "Threshold",
            Self::ErrorDiffusion => "ErrorDiffusion",
            Self::PatternDither => "PatternDither",
        }
    }
}

/// How the driver scales the artifact onto the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleMode {
    ActualSize,
    FitPageAspect,
    FitPaperAspect,
}

impl ScaleMode {
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::ActualSize => "ActualSize",
            Self::FitPageAspect => "FitPageAspect",
            Self::FitPaperAspect => "FitPaperAspect",
        }
    }
}

/// Driver-facing settings for a single print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettings {
    pub model: PrinterModel,
    pub label_size: LabelSize,
    pub auto_cut: bool,
    pub scale_mode: ScaleMode,
    pub orientation: Orientation,
    /// `None` leaves the driver's own default in place.
    pub halftone: Option<Halftone>,
    pub copies: u32,
    /// Directory the driver may use for temporary spool files.
    pub work_path: PathBuf,
}

/// A configuration value that was not recognised and was replaced by its
/// documented default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fallback {
    Model { requested: String, used: PrinterModel },
    LabelSize { requested: String, used: LabelSize },
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model { requested, used } => {
                write!(f, "unknown printer model {requested:?}, using {used}")
            }
            Self::LabelSize { requested, used } => {
                write!(f, "unknown label size {requested:?}, using {used}")
            }
        }
    }
}

/// A print request as it arrives from the host UI, with model and label
/// names still in string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    pub connection_type: ConnectionType,
    pub address: String,
    pub artifact_path: String,
    /// Inferred from the file extension when absent.
    pub artifact_kind: Option<ArtifactKind>,
    pub printer_model: Option<String>,
    pub label_size: Option<String>,
    pub orientation: Option<Orientation>,
    pub copies: Option<u32>,
}

/// A single print job. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub connection_type: ConnectionType,
    pub address: String,
    pub artifact_path: PathBuf,
    pub artifact_kind: ArtifactKind,
    pub printer_model: PrinterModel,
    pub label_size: LabelSize,
    /// Overrides the configured default orientation when set.
    pub orientation: Option<Orientation>,
    pub copies: u32,
    pub created_at: DateTime<Utc>,
}

impl PrintJob {
    pub fn new(
        connection_type: ConnectionType,
        address: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
        artifact_kind: ArtifactKind,
    ) -> Self {
        Self {
            id: JobId::new(),
            connection_type,
            address: address.into(),
            artifact_path: artifact_path.into(),
            artifact_kind,
            printer_model: PrinterModel::default(),
            label_size: LabelSize::default(),
            orientation: None,
            copies: 1,
            created_at: Utc::now(),
        }
    }

    pub fn with_model(mut self, model: PrinterModel) -> Self {
        self.printer_model = model;
        self
    }

    pub fn with_label_size(mut self, label_size: LabelSize) -> Self {
        self.label_size = label_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies.max(1);
        self
    }
}

/// Lifecycle stages of a job, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Created,
    Validating,
    Connecting,
    Configuring,
    Printing,
    Closing,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Validating => "validating",
            Self::Connecting => "connecting",
            Self::Configuring => "configuring",
            Self::Printing => "printing",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Closed error taxonomy reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAddress,
    AdapterUnsupported,
    AdapterDisabled,
    PermissionDenied,
    ConnectionTimeout,
    ChannelOpenFailed,
    FileNotFound,
    PrintFailed,
    Unknown,
}

/// Terminal status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    /// Stopped between stages by the caller's cancellation token.
    Cancelled,
}

/// The single terminal result of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub status: OutcomeStatus,
    pub error_kind: Option<ErrorKind>,
    /// Vendor result code, when the driver reported one.
    pub vendor_code: Option<String>,
    /// Stage the job was in when it failed or was cancelled.
    pub failed_stage: Option<JobStage>,
    /// Plain-English summary for display.
    pub message: String,
    /// Technical detail for logs and bug reports.
    pub detail: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl JobOutcome {
    pub fn succeeded(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            status: OutcomeStatus::Succeeded,
            error_kind: None,
            vendor_code: None,
            failed_stage: None,
            message: message.into(),
            detail: None,
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

/// A paired printer visible through the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredPrinter {
    pub name: String,
    pub address: String,
    pub connection_type: ConnectionType,
    /// Best guess at the model from the advertised name.
    pub model: Option<PrinterModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_size_parses_from_its_sdk_name() {
        for size in LabelSize::ALL {
            assert_eq!(LabelSize::from_name(size.sdk_name()), Some(*size));
            assert_eq!(
                LabelSize::from_name(&size.sdk_name().to_ascii_uppercase()),
                Some(*size)
            );
        }
    }

    #[test]
    fn model_accepts_marketing_and_sdk_names() {
        assert_eq!(PrinterModel::from_name("QL_820NWB"), Some(PrinterModel::Ql820Nwb));
        assert_eq!(PrinterModel::from_name("ql-810w"), Some(PrinterModel::Ql810W));
        assert_eq!(PrinterModel::from_name("QL-1100"), None);
    }

    #[test]
    fn artifact_kind_from_extension() {
        assert_eq!(ArtifactKind::from_extension("PNG"), Some(ArtifactKind::Image));
        assert_eq!(ArtifactKind::from_extension("pdf"), Some(ArtifactKind::Pdf));
        assert_eq!(ArtifactKind::from_extension("docx"), None);
    }

    #[test]
    fn copies_never_drop_below_one() {
        let job = PrintJob::new(ConnectionType::Wifi, "10.0.0.5", "/tmp/a.png", ArtifactKind::Image)
            .with_copies(0);
        assert_eq!(job.copies, 1);
    }

    #[test]
    fn die_cut_and_roll_are_described() {
        assert_eq!(LabelSize::DieCutW62H29.describe(), "62 x 29 mm die-cut");
        assert_eq!(LabelSize::RollW62.describe(), "62 mm continuous");
    }
}
