// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result codes reported by the Brother `lmprinter` SDK.
//
// The SDK exposes these as Java enums. Bridges convert them by enum name
// (`Enum.name()`) exactly once at the boundary; everything above the bridge
// compares the Rust enums directly.

use serde::{Deserialize, Serialize};

/// `OpenChannelError.ErrorCode`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenChannelCode {
    NoError,
    OpenStreamFailure,
    Timeout,
    /// A code this build does not know about, kept verbatim for diagnostics.
    Unrecognized(String),
}

impl OpenChannelCode {
    /// Map an SDK enum name onto a code.
    pub fn from_sdk_name(name: &str) -> Self {
        match name {
            "NoError" => Self::NoError,
            "OpenStreamFailure" => Self::OpenStreamFailure,
            "Timeout" => Self::Timeout,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn sdk_name(&self) -> &str {
        match self {
            Self::NoError => "NoError",
            Self::OpenStreamFailure => "OpenStreamFailure",
            Self::Timeout => "Timeout",
            Self::Unrecognized(name) => name,
        }
    }
}

impl std::fmt::Display for OpenChannelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}

/// `PrintError.ErrorCode`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrintErrorCode {
    NoError,
    PrintSettingsError,
    FilepathUrlError,
    PdfPageError,
    PrintSettingsNotSupported,
    SetModelError,
    SetLabelSizeError,
    UnsupportedFile,
    WrongLabel,
    Canceled,
    ChannelTimeout,
    ChannelStreamStatus,
    UnsupportedChannel,
    PaperEmpty,
    CoverOpen,
    Busy,
    PrinterTurnedOff,
    BatteryWeak,
    ExpansionBufferFull,
    CommunicationError,
    PaperJam,
    MediaCannotBeFed,
    OverHeat,
    HighVoltageAdapter,
    PrinterStatusUnknown,
    UnknownError,
    /// A code this build does not know about, kept verbatim for diagnostics.
    Unrecognized(String),
}

/// (code, SDK enum name) pairs. The SDK name is what `Enum.name()` returns.
const PRINT_ERROR_NAMES: &[(PrintErrorCode, &str)] = &[
    (PrintErrorCode::NoError, "NoError"),
    (PrintErrorCode::PrintSettingsError, "PrintSettingsError"),
    (PrintErrorCode::FilepathUrlError, "FilepathURLError"),
    (PrintErrorCode::PdfPageError, "PDFPageError"),
    (PrintErrorCode::PrintSettingsNotSupported, "PrintSettingsNotSupportError"),
    (PrintErrorCode::SetModelError, "SetModelError"),
    (PrintErrorCode::SetLabelSizeError, "SetLabelSizeError"),
    (PrintErrorCode::UnsupportedFile, "UnsupportedFile"),
    (PrintErrorCode::WrongLabel, "WrongLabelError"),
    (PrintErrorCode::Canceled, "Canceled"),
    (PrintErrorCode::ChannelTimeout, "ChannelTimeout"),
    (PrintErrorCode::ChannelStreamStatus, "ChannelErrorStreamStatusError"),
    (PrintErrorCode::UnsupportedChannel, "ChannelErrorUnsupportedChannel"),
    (PrintErrorCode::PaperEmpty, "PrinterStatusErrorPaperEmpty"),
    (PrintErrorCode::CoverOpen, "PrinterStatusErrorCoverOpen"),
    (PrintErrorCode::Busy, "PrinterStatusErrorBusy"),
    (PrintErrorCode::PrinterTurnedOff, "PrinterStatusErrorPrinterTurnedOff"),
    (PrintErrorCode::BatteryWeak, "PrinterStatusErrorBatteryWeak"),
    (PrintErrorCode::ExpansionBufferFull, "PrinterStatusErrorExpansionBufferFull"),
    (PrintErrorCode::CommunicationError, "PrinterStatusErrorCommunicationError"),
    (PrintErrorCode::PaperJam, "PrinterStatusErrorPaperJam"),
    (PrintErrorCode::MediaCannotBeFed, "PrinterStatusErrorMediaCannotBeFed"),
    (PrintErrorCode::OverHeat, "PrinterStatusErrorOverHeat"),
    (PrintErrorCode::HighVoltageAdapter, "PrinterStatusErrorHighVoltageAdapter"),
    (PrintErrorCode::PrinterStatusUnknown, "PrinterStatusErrorUnknownError"),
    (PrintErrorCode::UnknownError, "UnknownError"),
];

impl PrintErrorCode {
    /// Map an SDK enum name onto a code.
    pub fn from_sdk_name(name: &str) -> Self {
        PRINT_ERROR_NAMES
            .iter()
            .find(|(_, sdk)| *sdk == name)
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| Self::Unrecognized(name.to_string()))
    }

    pub fn sdk_name(&self) -> &str {
        if let Self::Unrecognized(name) = self {
            return name;
        }
        PRINT_ERROR_NAMES
            .iter()
            .find(|(code, _)| code == self)
            .map(|(_, sdk)| *sdk)
            .unwrap_or("UnknownError")
    }

    /// Whether the printer itself reported a physical condition (paper,
    /// cover, power) as opposed to a settings or transport problem.
    pub fn is_printer_status(&self) -> bool {
        matches!(
            self,
            Self::PaperEmpty
                | Self::CoverOpen
                | Self::Busy
                | Self::PrinterTurnedOff
                | Self::BatteryWeak
                | Self::ExpansionBufferFull
                | Self::CommunicationError
                | Self::PaperJam
                | Self::MediaCannotBeFed
                | Self::OverHeat
                | Self::HighVoltageAdapter
                | Self::PrinterStatusUnknown
        )
    }
}

impl std::fmt::Display for PrintErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}
