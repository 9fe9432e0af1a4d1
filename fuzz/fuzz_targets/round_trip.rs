#![no_main]
// Seeded encryption must always decrypt back to the input.
use libfuzzer_sys::fuzz_target;
use rand_chacha::{ChaChaRng, rand_core::SeedableRng};
use sm2_pke::{DecryptingKey, Error, Mode, PointForm, elliptic_curve::NonZeroScalar, sm2::Sm2};

fuzz_target!(|data: &[u8]| {
    if data.len() < 32 {
        return;
    }
    let (seed, msg) = data.split_at(32);
    let mut rng = ChaChaRng::from_seed(seed.try_into().unwrap());

    let mode = if seed[0] & 1 == 0 {
        Mode::C1C2C3
    } else {
        Mode::C1C3C2
    };
    let point_form = match seed[1] % 3 {
        0 => PointForm::Compressed,
        1 => PointForm::Uncompressed,
        _ => PointForm::Hybrid,
    };

    let dk = DecryptingKey::new_with_mode(NonZeroScalar::<Sm2>::random(&mut rng), mode)
        .with_point_form(point_form);
    let ek = dk.encrypting_key();

    match ek.encrypt(&mut rng, msg) {
        Ok(ciphertext) => {
            assert_eq!(ciphertext.len(), ek.encrypted_len::<sm2_pke::Sm3>(msg.len()).unwrap());
            assert_eq!(dk.decrypt(&ciphertext).unwrap(), msg);
        }
        Err(err) => {
            assert!(msg.is_empty());
            assert_eq!(err, Error::EmptyMessage);
        }
    }
});
