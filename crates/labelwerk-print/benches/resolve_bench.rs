// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pure paths run on every job: address
// validation and print-settings resolution.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use labelwerk_core::{ArtifactKind, ConnectionType, LabelSize, PrinterModel, validate_address};
use labelwerk_print::SettingsResolver;

fn bench_address_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_address");

    group.bench_function("bluetooth_mac", |b| {
        b.iter(|| {
            validate_address(black_box(ConnectionType::Bluetooth), black_box("6C:B2:FD:94:22:2F"))
        })
    });

    group.bench_function("wifi_ipv4", |b| {
        b.iter(|| validate_address(black_box(ConnectionType::Wifi), black_box("192.168.1.100")))
    });

    group.bench_function("wifi_hostname", |b| {
        b.iter(|| {
            validate_address(black_box(ConnectionType::Wifi), black_box("brw6cb2fd94222f.local"))
        })
    });

    group.bench_function("rejected_mac", |b| {
        b.iter(|| {
            validate_address(black_box(ConnectionType::Bluetooth), black_box("6C:B2:FD:94:22:ZZ"))
        })
    });

    group.finish();
}

fn bench_settings_resolution(c: &mut Criterion) {
    let resolver = SettingsResolver::default();
    let mut group = c.benchmark_group("resolve_settings");

    group.bench_function("typed", |b| {
        b.iter(|| {
            resolver.resolve(
                black_box(PrinterModel::Ql820Nwb),
                black_box(LabelSize::DieCutW62H29),
                ArtifactKind::Image,
                None,
                1,
            )
        })
    });

    group.bench_function("named_known", |b| {
        b.iter(|| {
            resolver.resolve_named(
                black_box(Some("QL-820NWB")),
                black_box(Some("DieCutW62H29")),
                ArtifactKind::Pdf,
                None,
                1,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_address_validation, bench_settings_resolution);
criterion_main!(benches);
