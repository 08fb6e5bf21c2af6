// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for payload signing, verification and hashing in the
// filesender-security crate.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use filesender_core::Signer;
use filesender_security::{EcdsaSigner, SigningCredential, hash_bytes, verify_payload};

/// Sign documents from a small receipt up to a full scanned page.
fn bench_sign(c: &mut Criterion) {
    let credential = SigningCredential::generate().expect("key generation failed");
    let signer = EcdsaSigner::new();

    let mut group = c.benchmark_group("ecdsa_sign");
    for &(label, size) in &[("1 KiB", 1024usize), ("100 KiB", 100 * 1024), ("1 MiB", 1024 * 1024)] {
        let content = vec![0x5Au8; size];
        group.bench_with_input(BenchmarkId::from_parameter(label), &content, |b, content| {
            b.iter(|| signer.sign(black_box(content), &credential).expect("sign failed"));
        });
    }
    group.finish();
}

/// Verify a 10 KiB payload.
fn bench_verify(c: &mut Criterion) {
    let credential = SigningCredential::generate().expect("key generation failed");
    let payload = EcdsaSigner::new()
        .sign(&vec![0x42u8; 10 * 1024], &credential)
        .expect("sign failed");

    c.bench_function("verify_payload (10 KiB)", |b| {
        b.iter(|| {
            verify_payload(black_box(payload.as_bytes()), credential.public_key())
                .expect("verify failed")
        });
    });
}

/// SHA-256 used for outbox file names.
fn bench_hash(c: &mut Criterion) {
    let data = vec![0xABu8; 1024 * 1024];
    c.bench_function("hash_bytes (1 MiB)", |b| b.iter(|| hash_bytes(black_box(&data))));
}

criterion_group!(benches, bench_sign, bench_verify, bench_hash);
criterion_main!(benches);
