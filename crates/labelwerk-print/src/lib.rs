// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print: channel sessions, print-settings resolution, result
// translation and the job orchestrator. This crate sits between the core
// domain types in `labelwerk-core` and the platform bridges in
// `labelwerk-bridge`.

pub mod artifact;
pub mod discovery;
pub mod orchestrator;
pub mod session;
pub mod settings;
pub mod translate;

pub use discovery::discover_printers;
pub use orchestrator::{JobOrchestrator, PendingJob};
pub use session::ChannelSession;
pub use settings::{ResolvedSettings, SettingsResolver};
pub use tokio_util::sync::CancellationToken;
