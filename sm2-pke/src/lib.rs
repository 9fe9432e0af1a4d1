#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

extern crate alloc;

#[macro_use]
mod macros;

mod cipher;
mod decrypting;
mod encrypting;
mod error;
mod point;

pub mod kdf;

pub use elliptic_curve::{self, rand_core};
pub use sm2::{self, Sm2};
pub use sm3::{self, Sm3};

pub use crate::{
    cipher::{Cipher, Mode},
    decrypting::DecryptingKey,
    encrypting::{EncryptingKey, MAX_ENCRYPT_ATTEMPTS},
    error::{Error, Result},
    kdf::{Kdf, X963Kdf},
    point::PointForm,
};

use elliptic_curve::{CurveArithmetic, PrimeCurve};

/// Elliptic curves SM2 encryption can be performed over.
///
/// Implemented for every prime order curve, whose cofactor is 1. Curves with
/// a cofactor `h > 1` must implement this trait themselves; encryption then
/// rejects public keys and decryption rejects ephemeral points `P` for which
/// `[h]P` is the point at infinity.
pub trait EncryptionCurve: CurveArithmetic {
    /// Cofactor `h` of the curve group.
    const COFACTOR: u64;
}

impl<C: CurveArithmetic + PrimeCurve> EncryptionCurve for C {
    const COFACTOR: u64 = 1;
}

#[cfg(test)]
mod tests {
    use crate::{DecryptingKey, Error, Mode, PointForm, X963Kdf};
    use hex_literal::hex;
    use p256::{NistP256, NonZeroScalar};
    use rand_core::OsRng;
    use sha2::Sha256;

    #[test]
    fn round_trip_over_p256() {
        let dk = DecryptingKey::<NistP256>::new(&p256::SecretKey::random(&mut OsRng))
            .with_point_form(PointForm::Compressed);
        let ek = dk.encrypting_key();

        let ciphertext = ek.encrypt_digest::<Sha256>(&mut OsRng, b"p256").unwrap();
        assert_eq!(ciphertext.len(), 33 + 4 + 32);
        assert_eq!(ciphertext.len(), ek.encrypted_len::<Sha256>(4).unwrap());
        assert_eq!(dk.decrypt_digest::<Sha256>(&ciphertext).unwrap(), b"p256");
    }

    #[test]
    fn separate_kdf_and_mac_digests() {
        let secret = hex!("c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721");
        let dk = DecryptingKey::<NistP256>::new_with_mode(
            NonZeroScalar::try_from(secret.as_slice()).unwrap(),
            Mode::C1C3C2,
        );
        let ek = dk.encrypting_key();

        let cipher = ek
            .encrypt_cipher::<_, sm3::Sm3>(&mut OsRng, &X963Kdf::<Sha256>::new(), b"mixed")
            .unwrap();
        assert_eq!(cipher.c3().len(), 32);
        assert_eq!(
            dk.decrypt_cipher(&X963Kdf::<Sha256>::new(), &cipher).unwrap(),
            b"mixed"
        );

        // a KDF mismatch is caught by the tag
        assert_eq!(
            dk.decrypt_cipher(&X963Kdf::<sm3::Sm3>::new(), &cipher),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn curve_errors_convert() {
        let err: elliptic_curve::Error = Error::AuthenticationFailed.into();
        assert_eq!(err, elliptic_curve::Error);
    }
}
