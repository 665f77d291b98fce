// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: platform bridge abstractions.
//
// The orchestrator never touches the radio or the vendor SDK directly. It
// talks to two injected capabilities: a `NativeAdapter` (is Bluetooth/Wi-Fi
// present, enabled, permitted?) and a `PrinterDriver` (the Brother SDK's
// open/configure/print/close surface). Each platform provides one bridge
// implementing both.

pub mod scripted;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use scripted::{CallCounts, ScriptedBridge};
pub use traits::*;

/// Bridge type for the target operating system.
#[cfg(target_os = "android")]
pub type NativeBridge = android::AndroidBridge;

/// Bridge type for the target operating system.
#[cfg(not(target_os = "android"))]
pub type NativeBridge = stub::StubBridge;

/// Construct the bridge for the target operating system.
pub fn platform_bridge() -> NativeBridge {
    #[cfg(target_os = "android")]
    {
        // Android: JNI into BluetoothManager and the Brother lmprinter SDK.
        android::AndroidBridge::new()
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no radios, every adapter reports unsupported.
        stub::StubBridge
    }
}
