// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result translation.
//
// Converts driver failures into `LabelwerkError`, classifies errors into the
// closed `ErrorKind` taxonomy and builds the terminal `JobOutcome`.

use chrono::Utc;
use labelwerk_bridge::DriverError;
use labelwerk_core::error::LabelwerkError;
use labelwerk_core::human_errors::humanize_error;
use labelwerk_core::{
    ErrorKind, JobId, JobOutcome, JobStage, OpenChannelCode, OutcomeStatus, PrintErrorCode,
};

/// Convert a failed `open_channel` into a `LabelwerkError`.
pub fn translate_open_error(address: &str, err: DriverError) -> LabelwerkError {
    match err {
        DriverError::OpenChannel(code) => LabelwerkError::ChannelOpen {
            address: address.to_string(),
            code,
        },
        DriverError::Print(code) => LabelwerkError::Print { code },
        DriverError::Exception(message) => LabelwerkError::Driver(message),
    }
}

/// Convert a failed `apply_settings` or `print_artifact` into a
/// `LabelwerkError`.
pub fn translate_print_error(err: DriverError) -> LabelwerkError {
    match err {
        DriverError::Print(code) => LabelwerkError::Print { code },
        DriverError::OpenChannel(code) => LabelwerkError::Driver(format!(
            "unexpected open-channel code while printing: {code}"
        )),
        DriverError::Exception(message) => LabelwerkError::Driver(message),
    }
}

/// Classify a `LabelwerkError` into the caller-facing taxonomy.
pub fn classify_error(err: &LabelwerkError) -> ErrorKind {
    match err {
        LabelwerkError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
        LabelwerkError::FileNotFound(_) | LabelwerkError::ArtifactMismatch { .. } => {
            ErrorKind::FileNotFound
        }

        LabelwerkError::AdapterUnsupported(_) | LabelwerkError::PlatformUnavailable => {
            ErrorKind::AdapterUnsupported
        }
        LabelwerkError::AdapterDisabled(_) => ErrorKind::AdapterDisabled,
        LabelwerkError::PermissionDenied(_) => ErrorKind::PermissionDenied,

        // The SDK's own connect timeout and ours are the same condition.
        LabelwerkError::ConnectionTimeout { .. }
        | LabelwerkError::ChannelOpen {
            code: OpenChannelCode::Timeout,
            ..
        } => ErrorKind::ConnectionTimeout,
        LabelwerkError::ChannelOpen { .. } => ErrorKind::ChannelOpenFailed,

        // The driver refused the file itself.
        LabelwerkError::Print {
            code: PrintErrorCode::FilepathUrlError,
        } => ErrorKind::FileNotFound,
        LabelwerkError::Print { .. } | LabelwerkError::PrintTimeout { .. } => {
            ErrorKind::PrintFailed
        }

        LabelwerkError::Cancelled
        | LabelwerkError::Driver(_)
        | LabelwerkError::Bridge(_)
        | LabelwerkError::Config(_)
        | LabelwerkError::Io(_)
        | LabelwerkError::Serialization(_) => ErrorKind::Unknown,
    }
}

/// Vendor code carried by an error, if any.
pub fn vendor_code(err: &LabelwerkError) -> Option<String> {
    match err {
        LabelwerkError::ChannelOpen { code, .. } => Some(code.sdk_name().to_string()),
        LabelwerkError::Print { code } => Some(code.sdk_name().to_string()),
        _ => None,
    }
}

/// Terminal outcome for a job that stopped with `err` during `stage`.
pub fn outcome_for_error(job_id: JobId, stage: JobStage, err: &LabelwerkError) -> JobOutcome {
    let status = match err {
        LabelwerkError::Cancelled => OutcomeStatus::Cancelled,
        _ => OutcomeStatus::Failed,
    };
    let error_kind = match status {
        OutcomeStatus::Cancelled => None,
        _ => Some(classify_error(err)),
    };
    let human = humanize_error(err);
    JobOutcome {
        job_id,
        status,
        error_kind,
        vendor_code: vendor_code(err),
        failed_stage: Some(stage),
        message: human.message,
        detail: Some(err.to_string()),
        finished_at: Utc::now(),
    }
}
