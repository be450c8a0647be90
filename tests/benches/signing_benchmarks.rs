//! # Signing Benchmarks
//!
//! | Operation | Input |
//! |-----------|-------|
//! | Canonical hash | one transfer |
//! | PSS sign / verify | RSA-2048 |
//! | Message sign / verify | secp256k1, P-256 |
//! | Vault seal | PBKDF2 at the minimum iteration count |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sok_crypto::{
    sign_message, sign_transfer, verify_message, verify_transfer, KeyKind, KeyVault, Keypair,
};
use sok_transaction::TransferTransaction;
use std::time::Duration;

fn bench_transfer_hash(c: &mut Criterion) {
    let tx = TransferTransaction::new(
        "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----\n",
        "SOrecipientK",
        4.0,
    );
    c.bench_function("transfer_hash", |b| b.iter(|| black_box(tx.hash_bytes())));
}

fn bench_transfer_signatures(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer-pss");
    group.measurement_time(Duration::from_secs(10));

    let wallet = Keypair::generate().expect("rsa keygen");
    let hash = [0x5a_u8; 32];
    let signature = sign_transfer(wallet.private_key(), &hash).expect("sign");

    group.bench_function("sign", |b| {
        b.iter(|| sign_transfer(wallet.private_key(), black_box(&hash)))
    });
    group.bench_function("verify", |b| {
        b.iter(|| verify_transfer(wallet.public_key(), black_box(&hash), &signature))
    });
    group.finish();
}

fn bench_message_signatures(c: &mut Criterion) {
    let mut group = c.benchmark_group("message-ecdsa");
    for kind in [KeyKind::Secp256k1, KeyKind::P256] {
        let wallet = Keypair::generate_kind(kind).expect("ec keygen");
        let signature = sign_message(wallet.private_key(), "heartbeat").expect("sign");
        group.bench_function(format!("{kind}_sign"), |b| {
            b.iter(|| sign_message(wallet.private_key(), black_box("heartbeat")))
        });
        group.bench_function(format!("{kind}_verify"), |b| {
            b.iter(|| verify_message(wallet.public_key(), black_box("heartbeat"), &signature))
        });
    }
    group.finish();
}

fn bench_vault_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("vault");
    group.sample_size(10);
    let vault = KeyVault::new();
    let text = Keypair::generate_kind(KeyKind::P256)
        .and_then(|k| k.export_private_text())
        .expect("export");
    group.bench_function("seal", |b| b.iter(|| vault.seal(&text, black_box("pw"))));
    group.finish();
}

criterion_group!(
    benches,
    bench_transfer_hash,
    bench_transfer_signatures,
    bench_message_signatures,
    bench_vault_seal
);
criterion_main!(benches);
