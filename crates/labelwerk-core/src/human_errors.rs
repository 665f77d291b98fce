// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the host UI presents the failure.

use crate::error::LabelwerkError;
use crate::types::ConnectionType;
use crate::vendor::PrintErrorCode;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Printer asleep, out of range, busy. Trying again may work.
    Transient,
    /// User must do something (switch on Bluetooth, load labels, close cover).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. a bad address or the wrong file.
    Permanent,
    /// A physical purchase is needed (power adapter, label stock).
    BuyRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same job again is worthwhile.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

fn radio_name(connection: ConnectionType) -> &'static str {
    match connection {
        ConnectionType::Bluetooth => "Bluetooth",
        ConnectionType::Wifi => "Wi-Fi",
    }
}

/// Convert a `LabelwerkError` into a `HumanError`.
pub fn humanize_error(err: &LabelwerkError) -> HumanError {
    match err {
        LabelwerkError::InvalidAddress { connection, .. } => match connection {
            ConnectionType::Bluetooth => HumanError {
                message: "The printer's Bluetooth address doesn't look right.".into(),
                suggestion: "It should look like 6C:B2:FD:94:22:2F. You can find it on the printer's settings label.".into(),
                retriable: false,
                severity: Severity::Permanent,
            },
            ConnectionType::Wifi => HumanError {
                message: "The printer's network address doesn't look right.".into(),
                suggestion: "It should look like 192.168.1.100. Print the printer's network settings page to find it.".into(),
                retriable: false,
                severity: Severity::Permanent,
            },
        },

        LabelwerkError::FileNotFound(_) => HumanError {
            message: "The label file couldn't be found.".into(),
            suggestion: "It may have been moved or deleted. Create the label again and retry.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::ArtifactMismatch { expected, .. } => HumanError {
            message: "The label file is the wrong type.".into(),
            suggestion: format!(
                "The printer was asked for a {expected} file. Create the label again and retry."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        LabelwerkError::AdapterUnsupported(connection) => HumanError {
            message: format!("This device doesn't have {}.", radio_name(*connection)),
            suggestion: "Try connecting to the printer a different way.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        LabelwerkError::AdapterDisabled(connection) => HumanError {
            message: format!("{} is turned off.", radio_name(*connection)),
            suggestion: format!(
                "Turn on {} in your device settings, then try again.",
                radio_name(*connection)
            ),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::PermissionDenied(_) => HumanError {
            message: "The app isn't allowed to talk to the printer.".into(),
            suggestion: "Allow the app to use Bluetooth and nearby devices in your device settings.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::ConnectionTimeout { .. } => HumanError {
            message: "The printer didn't answer in time.".into(),
            suggestion: "Make sure the printer is switched on and close to this device, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::ChannelOpen { .. } => HumanError {
            message: "We couldn't connect to the printer.".into(),
            suggestion: "Check the printer is on, paired with this device, and not connected to another phone.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::Print { code } => humanize_print_code(code),

        LabelwerkError::PrintTimeout { .. } => HumanError {
            message: "The printer stopped responding while printing.".into(),
            suggestion: "Check whether a label came out before printing again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::Cancelled => HumanError {
            message: "Printing was cancelled.".into(),
            suggestion: "Nothing was sent to the printer after you cancelled.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::Driver(_) | LabelwerkError::Bridge(_) => HumanError {
            message: "Something went wrong talking to the printer.".into(),
            suggestion: "Try again. If this keeps happening, restart the printer and the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::PlatformUnavailable => HumanError {
            message: "Printing isn't available on this device.".into(),
            suggestion: "Use the app on a phone or tablet to print labels.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        LabelwerkError::Config(_) | LabelwerkError::Serialization(_) => HumanError {
            message: "The app's settings couldn't be read.".into(),
            suggestion: "Reset the printer settings and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read the label file.".into(),
                    suggestion: "Create the label again and retry.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }
    }
}

/// Vendor print codes into human-readable messages.
fn humanize_print_code(code: &PrintErrorCode) -> HumanError {
    match code {
        PrintErrorCode::PaperEmpty => HumanError {
            message: "The printer is out of labels.".into(),
            suggestion: "Load a new label roll, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::CoverOpen => HumanError {
            message: "The printer's cover is open.".into(),
            suggestion: "Close the roll compartment cover, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::PaperJam | PrintErrorCode::MediaCannotBeFed => HumanError {
            message: "The labels are stuck in the printer.".into(),
            suggestion: "Open the cover, pull the label roll back gently, cut off the crumpled part and reload it.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::WrongLabel | PrintErrorCode::SetLabelSizeError => HumanError {
            message: "The labels in the printer don't match the chosen label size.".into(),
            suggestion: "Load the right label roll or choose the size that matches the roll in the printer.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::BatteryWeak => HumanError {
            message: "The printer's battery is low.".into(),
            suggestion: "Plug the printer in or charge it, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::HighVoltageAdapter => HumanError {
            message: "The printer is using the wrong power adapter.".into(),
            suggestion: "Use the adapter that came with the printer. A replacement may need to be bought.".into(),
            retriable: false,
            severity: Severity::BuyRequired,
        },
        PrintErrorCode::OverHeat => HumanError {
            message: "The printer is too hot.".into(),
            suggestion: "Let the printer cool down for a few minutes, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        PrintErrorCode::PrinterTurnedOff => HumanError {
            message: "The printer is switched off.".into(),
            suggestion: "Switch the printer on, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::Busy | PrintErrorCode::ExpansionBufferFull => HumanError {
            message: "The printer is busy.".into(),
            suggestion: "Wait for the current label to finish, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        PrintErrorCode::ChannelTimeout
        | PrintErrorCode::ChannelStreamStatus
        | PrintErrorCode::CommunicationError => HumanError {
            message: "The connection to the printer was interrupted.".into(),
            suggestion: "Move closer to the printer and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        PrintErrorCode::UnsupportedFile
        | PrintErrorCode::FilepathUrlError
        | PrintErrorCode::PdfPageError => HumanError {
            message: "The printer couldn't read the label file.".into(),
            suggestion: "Create the label again and retry.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        PrintErrorCode::SetModelError
        | PrintErrorCode::PrintSettingsError
        | PrintErrorCode::PrintSettingsNotSupported
        | PrintErrorCode::UnsupportedChannel => HumanError {
            message: "The printer can't handle those settings.".into(),
            suggestion: "Check the printer model and label size in the settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        PrintErrorCode::Canceled => HumanError {
            message: "The printer cancelled the job.".into(),
            suggestion: "Try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        PrintErrorCode::NoError
        | PrintErrorCode::PrinterStatusUnknown
        | PrintErrorCode::UnknownError
        | PrintErrorCode::Unrecognized(_) => HumanError {
            message: "The printer had a problem.".into(),
            suggestion: format!(
                "Try again. If this keeps happening, switch the printer off and on. (Code: {code})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_adapter_is_action_required() {
        let human = humanize_error(&LabelwerkError::AdapterDisabled(ConnectionType::Bluetooth));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("Bluetooth"));
    }

    #[test]
    fn bad_address_is_permanent() {
        let err = LabelwerkError::InvalidAddress {
            connection: ConnectionType::Wifi,
            address: "printer..local".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn empty_roll_is_action_required() {
        let err = LabelwerkError::Print { code: PrintErrorCode::PaperEmpty };
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn wrong_adapter_is_buy_required() {
        let err = LabelwerkError::Print { code: PrintErrorCode::HighVoltageAdapter };
        assert_eq!(humanize_error(&err).severity, Severity::BuyRequired);
    }

    #[test]
    fn unrecognized_code_is_shown_to_the_user() {
        let err = LabelwerkError::Print {
            code: PrintErrorCode::Unrecognized("PrinterStatusErrorCutterJam".into()),
        };
        assert!(humanize_error(&err).suggestion.contains("PrinterStatusErrorCutterJam"));
    }
}
