//! SM2 encryption benchmarks

use core::hint::black_box;
use criterion::{
    BenchmarkGroup, BenchmarkId, Criterion, criterion_group, criterion_main,
    measurement::Measurement,
};
use hex_literal::hex;
use rand_core::OsRng;
use sm2_pke::{DecryptingKey, PointForm};

const DECRYPTING_KEY_BYTES: [u8; 32] =
    hex!("1cf6bc6c7f642a84994119e206c9f0753ff100709f4fd12f2338c1be60bf4175");

const MSG_LENS: [usize; 3] = [32, 1024, 16384];

fn decrypting_key() -> DecryptingKey {
    DecryptingKey::from_bytes(&DECRYPTING_KEY_BYTES.into()).unwrap()
}

fn bench_encrypt<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let ek = black_box(decrypting_key().encrypting_key().clone());
    for len in MSG_LENS {
        let msg = black_box(vec![0x5a; len]);
        group.bench_with_input(BenchmarkId::new("encrypt", len), &msg, |b, msg| {
            b.iter(|| ek.encrypt(&mut OsRng, msg))
        });
    }
}

fn bench_decrypt<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let dk = black_box(decrypting_key());
    for len in MSG_LENS {
        let ciphertext = black_box(
            dk.encrypting_key()
                .encrypt(&mut OsRng, &vec![0x5a; len])
                .unwrap(),
        );
        group.bench_with_input(
            BenchmarkId::new("decrypt", len),
            &ciphertext,
            |b, ciphertext| b.iter(|| dk.decrypt(ciphertext)),
        );
    }
}

fn bench_decrypt_compressed<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let dk = black_box(decrypting_key().with_point_form(PointForm::Compressed));
    let ciphertext = black_box(
        dk.encrypting_key()
            .encrypt(&mut OsRng, b"example message")
            .unwrap(),
    );
    group.bench_function("decrypt compressed", |b| {
        b.iter(|| dk.decrypt(&ciphertext))
    });
}

fn bench_pke(c: &mut Criterion) {
    let mut group = c.benchmark_group("SM2PKE");
    bench_encrypt(&mut group);
    bench_decrypt(&mut group);
    bench_decrypt_compressed(&mut group);
    group.finish();
}

criterion_group!(benches, bench_pke);
criterion_main!(benches);
