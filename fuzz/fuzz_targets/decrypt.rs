#![no_main]
// Decoding and decrypting untrusted ciphertexts must fail cleanly, never panic.
use libfuzzer_sys::fuzz_target;
use sm2_pke::{
    Cipher, DecryptingKey, Error, Mode, PointForm, Sm2, Sm3, elliptic_curve::NonZeroScalar,
};

const SECRET_KEY: [u8; 32] = [
    0x3d, 0xdd, 0x2a, 0x36, 0x79, 0xbf, 0x6f, 0x1d, 0xfc, 0x3b, 0x49, 0xd3, 0xe9, 0x91, 0x14, 0x71,
    0x8e, 0x48, 0xec, 0x17, 0x0e, 0xb4, 0xe4, 0xd3, 0xa8, 0x20, 0x52, 0xda, 0xb1, 0x9e, 0x8b, 0x50,
];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, ciphertext)) = data.split_first() else {
        return;
    };

    let point_form = match selector % 3 {
        0 => PointForm::Compressed,
        1 => PointForm::Uncompressed,
        _ => PointForm::Hybrid,
    };
    let mode = if selector & 0x80 == 0 {
        Mode::C1C2C3
    } else {
        Mode::C1C3C2
    };

    if let Ok(cipher) = Cipher::<Sm2, Sm3>::from_slice(ciphertext, point_form, mode) {
        // a decoded ciphertext re-encodes to the same bytes
        assert_eq!(cipher.to_vec(point_form, mode).unwrap(), ciphertext);
    }

    let secret_scalar = NonZeroScalar::<Sm2>::try_from(SECRET_KEY.as_slice()).unwrap();
    let dk = DecryptingKey::new_with_mode(secret_scalar, mode).with_point_form(point_form);
    match dk.decrypt(ciphertext) {
        Ok(msg) => assert_eq!(dk.decrypted_len::<Sm3>(ciphertext.len()), Ok(msg.len())),
        Err(err) => assert!(matches!(
            err,
            Error::InvalidCiphertext | Error::AuthenticationFailed
        )),
    }
});
