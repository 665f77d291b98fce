// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: label printing for Brother QL printers over Bluetooth and Wi-Fi.
//
// Entry point. Initialises logging, loads configuration, builds the platform
// bridge and runs one command.

mod services;

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use labelwerk_core::human_errors::humanize_error;
use labelwerk_core::{
    AppConfig, ArtifactKind, ConnectionType, JobOutcome, Orientation, PrintRequest,
};
use serde::Serialize;

use services::app_services::{ConfigUpdate, LabelServices};

#[derive(Debug, Parser)]
#[command(name = "labelwerk", version, about = "Print labels on Brother QL printers")]
struct Cli {
    /// Use a simulated printer instead of the device radios.
    #[arg(long, global = true)]
    simulate: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print an image or PDF.
    Print {
        /// bluetooth or wifi
        #[arg(short, long, default_value = "bluetooth")]
        connection: ConnectionType,
        /// MAC address (Bluetooth) or IP/hostname (Wi-Fi).
        address: String,
        /// Path or file:// URI of the rendered label.
        file: String,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Printer model, e.g. QL-820NWB.
        #[arg(long)]
        model: Option<String>,
        /// Label stock, e.g. DieCutW29H90.
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,
        #[arg(long)]
        copies: Option<u32>,
    },
    /// Check an address without contacting the printer.
    Validate {
        #[arg(short, long, default_value = "bluetooth")]
        connection: ConnectionType,
        address: String,
    },
    /// List paired Brother printers.
    Discover,
    /// Check that a printer is reachable.
    Status {
        #[arg(short, long, default_value = "bluetooth")]
        connection: ConnectionType,
        address: String,
    },
    /// Show the saved settings, or change them with the options below.
    Config {
        #[arg(long)]
        open_timeout_ms: Option<u64>,
        #[arg(long)]
        print_timeout_ms: Option<u64>,
        #[arg(long)]
        auto_cut: Option<bool>,
        /// Default printer model, e.g. QL-810W.
        #[arg(long)]
        model: Option<String>,
        /// Default label stock, e.g. RollW62.
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Image,
    Pdf,
}

impl From<KindArg> for ArtifactKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Image => ArtifactKind::Image,
            KindArg::Pdf => ArtifactKind::Pdf,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(orientation: OrientationArg) -> Self {
        match orientation {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let svc = match LabelServices::init(cli.simulate) {
        Ok(svc) => svc,
        Err(e) => {
            let human = humanize_error(&e);
            eprintln!("{}\n{}", human.message, human.suggestion);
            tracing::error!(error = %e, "could not start");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    tracing::info!(platform = svc.platform_name(), "Labelwerk starting");

    match cli.command {
        Command::Print {
            connection,
            address,
            file,
            kind,
            model,
            label,
            orientation,
            copies,
        } => {
            let request = PrintRequest {
                connection_type: connection,
                address,
                artifact_path: file,
                artifact_kind: kind.map(Into::into),
                printer_model: model,
                label_size: label,
                orientation: orientation.map(Into::into),
                copies,
            };
            let report = svc.print(&request).await;
            if cli.json {
                emit_json(&report);
            } else {
                for fallback in &report.fallbacks {
                    eprintln!("warning: {fallback}");
                }
                print_outcome(&report.outcome);
            }
            exit_for(&report.outcome)
        }

        Command::Validate { connection, address } => {
            let valid = svc.validate(connection, &address);
            if cli.json {
                emit_json(&serde_json::json!({
                    "address": address,
                    "connection": connection,
                    "valid": valid,
                }));
            } else if valid {
                println!("{address} is a valid {connection} address");
            } else {
                println!("{address} is not a valid {connection} address");
            }
            if valid { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) }
        }

        Command::Discover => match svc.discover().await {
            Ok(printers) => {
                if cli.json {
                    emit_json(&printers);
                } else if printers.is_empty() {
                    println!("No paired Brother printers found.");
                } else {
                    for p in &printers {
                        let model = p
                            .model
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "unknown model".into());
                        println!("{}  {}  ({model})", p.address, p.name);
                    }
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                let human = humanize_error(&e);
                eprintln!("{}\n{}", human.message, human.suggestion);
                ExitCode::from(EXIT_FAILED)
            }
        },

        Command::Status { connection, address } => {
            let outcome = svc.probe(connection, &address).await;
            if cli.json {
                emit_json(&outcome);
            } else {
                print_outcome(&outcome);
            }
            exit_for(&outcome)
        }

        Command::Config {
            open_timeout_ms,
            print_timeout_ms,
            auto_cut,
            model,
            label,
            orientation,
        } => {
            let update = ConfigUpdate {
                open_timeout_ms,
                print_timeout_ms,
                auto_cut,
                default_model: model,
                default_label_size: label,
                default_orientation: orientation.map(Into::into),
            };
            let config = if update.is_empty() {
                svc.config().clone()
            } else {
                match svc.update_config(&update) {
                    Ok(config) => config,
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::from(EXIT_USAGE);
                    }
                }
            };
            if cli.json {
                emit_json(&config);
            } else {
                print_config(&config);
            }
            ExitCode::SUCCESS
        }
    }
}

fn print_config(config: &AppConfig) {
    let orientation = match config.default_orientation {
        Orientation::Portrait => "portrait",
        Orientation::Landscape => "landscape",
    };
    println!("open timeout    {} ms", config.open_timeout_ms);
    println!("print timeout   {} ms", config.print_timeout_ms);
    println!("auto cut        {}", if config.auto_cut { "on" } else { "off" });
    println!("orientation     {orientation}");
    println!("model           {}", config.default_model);
    println!(
        "label           {} ({})",
        config.default_label_size,
        config.default_label_size.describe()
    );
    println!("work dir        {}", config.work_path().display());
}

fn print_outcome(outcome: &JobOutcome) {
    if outcome.is_success() {
        println!("{}", outcome.message);
        return;
    }
    eprintln!("{}", outcome.message);
    if let Some(detail) = &outcome.detail {
        eprintln!("  {detail}");
    }
}

fn emit_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "could not serialize output"),
    }
}

fn exit_for(outcome: &JobOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
