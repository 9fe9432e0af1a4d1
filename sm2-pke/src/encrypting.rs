//! Support for SM2 encryption.
//!
//! ## Algorithm
//!
//! ```text
//! A1: pick a random number k in [1, n-1] via a random number generator
//! A2: calculate the elliptic curve point C1=[k]G=(x1, y1)
//! A3: calculate S=[h]PB, fail if S is the point at infinity
//! A4: calculate the elliptic curve point [k]PB=(x2, y2)
//! A5: calculate t=KDF(x2 || y2, klen), return to A1 if t is all zero
//! A6: calculate C2=M xor t
//! A7: calculate C3=Hash(x2 || M || y2)
//! A8: the ciphertext is C=C1 || C2 || C3
//! ```
//!
//! The return to A1 is bounded by [`MAX_ENCRYPT_ATTEMPTS`].

use crate::{
    Cipher, EncryptionCurve, Error, Mode, PointForm, Result,
    kdf::{Kdf, X963Kdf, is_all_zero},
    point::{SharedPoint, passes_cofactor_check},
};
use alloc::vec::Vec;
use elliptic_curve::{
    AffinePoint, FieldBytesSize, NonZeroScalar, ProjectivePoint, PublicKey,
    group::Curve as _,
    ops::MulByGenerator,
    rand_core::CryptoRngCore,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
};
use sm2::Sm2;
use sm3::{Sm3, digest::Digest};

/// Maximum number of ephemeral keys tried before encryption gives up on an
/// all-zero key stream.
pub const MAX_ENCRYPT_ATTEMPTS: usize = 8;

/// SM2 public key used for encrypting messages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptingKey<C: EncryptionCurve = Sm2> {
    public_key: PublicKey<C>,
    mode: Mode,
    point_form: PointForm,
}

impl<C> EncryptingKey<C>
where
    C: EncryptionCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Initialize [`EncryptingKey`] from a [`PublicKey`], with the default
    /// [`Mode`] and [`PointForm`].
    pub fn new(public_key: PublicKey<C>) -> Self {
        Self::new_with_mode(public_key, Mode::default())
    }

    /// Initialize [`EncryptingKey`] from a [`PublicKey`] and set the field
    /// order of the ciphertext.
    pub fn new_with_mode(public_key: PublicKey<C>, mode: Mode) -> Self {
        Self {
            public_key,
            mode,
            point_form: PointForm::default(),
        }
    }

    /// Set the encoding of `C1` in produced ciphertexts.
    pub fn with_point_form(mut self, point_form: PointForm) -> Self {
        self.point_form = point_form;
        self
    }

    /// Initialize [`EncryptingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let public_key = PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self::new(public_key))
    }

    /// Initialize [`EncryptingKey`] from an affine point.
    ///
    /// Returns [`Error::InvalidPublicKey`] if the given affine point is the
    /// additive identity (a.k.a. point at infinity).
    pub fn from_affine(affine: AffinePoint<C>) -> Result<Self> {
        let public_key = PublicKey::from_affine(affine).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self::new(public_key))
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint<C> {
        self.public_key.as_affine()
    }

    /// Borrow the inner [`PublicKey`].
    pub fn public_key(&self) -> &PublicKey<C> {
        &self.public_key
    }

    /// Serialize the public key as a SEC1 [`EncodedPoint`].
    pub fn to_encoded_point(&self, compress: bool) -> EncodedPoint<C> {
        self.public_key.as_affine().to_encoded_point(compress)
    }

    /// Field order of produced ciphertexts.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Encoding of `C1` in produced ciphertexts.
    pub fn point_form(&self) -> PointForm {
        self.point_form
    }

    /// Encrypt a message, using `Sm3` as both KDF and MAC digest.
    pub fn encrypt(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_digest::<Sm3>(rng, msg)
    }

    /// Encrypt a message, using `D` as both KDF and MAC digest.
    pub fn encrypt_digest<D: Digest>(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = self.encrypt_cipher::<X963Kdf<D>, D>(rng, &X963Kdf::new(), msg)?;
        cipher.to_vec(self.point_form, self.mode)
    }

    /// Length of the ciphertext [`EncryptingKey::encrypt_digest`] produces
    /// for a `msg_len` byte message.
    ///
    /// Returns [`Error::MessageTooLong`] if the length overflows `usize`.
    pub fn encrypted_len<D: Digest>(&self, msg_len: usize) -> Result<usize> {
        Cipher::<C, D>::encoded_len(self.point_form, msg_len)
    }

    /// Encrypt a message into `out`, using `D` as both KDF and MAC digest.
    ///
    /// Returns the ciphertext length, or [`Error::BufferTooSmall`] with the
    /// required length before doing any work if `out` is too short.
    pub fn encrypt_into<D: Digest>(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
        out: &mut [u8],
    ) -> Result<usize> {
        let required = self.encrypted_len::<D>(msg.len())?;
        if out.len() < required {
            return Err(Error::BufferTooSmall { required });
        }

        let cipher = self.encrypt_cipher::<X963Kdf<D>, D>(rng, &X963Kdf::new(), msg)?;
        cipher.encode_into(self.point_form, self.mode, out)
    }

    /// Encrypt a message with the key derivation function `kdf` and the MAC
    /// digest `D`, returning the ciphertext value.
    pub fn encrypt_cipher<K: Kdf, D: Digest>(
        &self,
        rng: &mut impl CryptoRngCore,
        kdf: &K,
        msg: &[u8],
    ) -> Result<Cipher<C, D>> {
        if msg.is_empty() {
            return Err(Error::EmptyMessage);
        }
        if <D as Digest>::output_size() == 0 {
            return Err(Error::Domain);
        }

        for _ in 0..MAX_ENCRYPT_ATTEMPTS {
            // A1: pick k in [1, n-1]
            let k = NonZeroScalar::<C>::random(&mut *rng);

            if let Some(cipher) = encrypt_with_scalar(&self.public_key, k, kdf, msg)? {
                return Ok(cipher);
            }
            debug!("all-zero key stream, retrying with a fresh ephemeral key");
        }

        warn!(
            max_attempts = MAX_ENCRYPT_ATTEMPTS,
            "SM2 encryption gave up on all-zero key streams"
        );
        Err(Error::EncryptionFailed)
    }
}

impl<C> From<PublicKey<C>> for EncryptingKey<C>
where
    C: EncryptionCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    fn from(public_key: PublicKey<C>) -> Self {
        Self::new(public_key)
    }
}

impl<C: EncryptionCurve> AsRef<AffinePoint<C>> for EncryptingKey<C> {
    fn as_ref(&self) -> &AffinePoint<C> {
        self.public_key.as_affine()
    }
}

/// Single encryption attempt with the ephemeral scalar `k` (steps A2-A8).
///
/// Returns `None` if the key stream is all zero.
pub(crate) fn encrypt_with_scalar<C, K, D>(
    public_key: &PublicKey<C>,
    k: NonZeroScalar<C>,
    kdf: &K,
    msg: &[u8],
) -> Result<Option<Cipher<C, D>>>
where
    C: EncryptionCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    K: Kdf,
    D: Digest,
{
    let k = *k;

    // A2: C1 = [k]G
    let c1 = ProjectivePoint::<C>::mul_by_generator(&k).to_affine();

    // A3: [h]PB must not be the point at infinity
    if !passes_cofactor_check::<C>(public_key.as_affine()) {
        return Err(Error::InvalidPublicKey);
    }

    // A4: (x2, y2) = [k]PB
    let shared = SharedPoint::new::<C>(&(public_key.to_projective() * k).to_affine())?;

    // A5: t = KDF(x2 || y2, klen)
    let t = kdf.derive(shared.as_bytes(), msg.len())?;
    if is_all_zero(&t) {
        return Ok(None);
    }

    // A6: C2 = M xor t
    let c2 = msg.iter().zip(t.iter()).map(|(m, t)| m ^ t).collect();

    // A7: C3 = Hash(x2 || M || y2)
    let c3 = shared.tag::<D>(msg);

    Ok(Some(Cipher::new(c1, c2, c3)))
}

#[cfg(test)]
mod tests {
    use super::encrypt_with_scalar;
    use crate::{Mode, PointForm, X963Kdf};
    use hex_literal::hex;
    use sm2::{NonZeroScalar, PublicKey, Sm2};
    use sm3::Sm3;

    const SECRET_KEY: [u8; 32] =
        hex!("3DDD2A3679BF6F1DFC3B49D3E99114718E48EC170EB4E4D3A82052DAB19E8B50");
    const EPHEMERAL_KEY: [u8; 32] =
        hex!("59276E27D506861A16680F3AD9C02DCCEF3CC1FA3CDBE4CE6D54B80DEAC1BC21");
    const MSG: &[u8] = b"encryption standard";

    const CIPHER: [u8; 116] = hex!(
        "0404ebfc718e8d1798620432268e77feb6415e2ede0e073c0f4f640ecd2e149a73"
        "e858f9d81e5430a57b36daab8f950a3c64e6ee6a63094d99283aff767e124df0"
        "a344d5526d29285757eb85ba1961ec71e6b8ea"
        "80b3ecad278c6474bbef4dbb0cbf6a8479541ab59e2d8fabec247f4a38076251"
    );

    fn public_key() -> PublicKey {
        let d = NonZeroScalar::try_from(SECRET_KEY.as_slice()).unwrap();
        PublicKey::from_secret_scalar(&d)
    }

    #[test]
    fn fixed_ephemeral_key_matches_vector() {
        let k = NonZeroScalar::try_from(EPHEMERAL_KEY.as_slice()).unwrap();
        let cipher = encrypt_with_scalar::<Sm2, _, Sm3>(
            &public_key(),
            k,
            &X963Kdf::<Sm3>::new(),
            MSG,
        )
        .unwrap()
        .unwrap();

        assert_eq!(cipher.c2().len(), MSG.len());
        assert_eq!(
            cipher.to_vec(PointForm::Uncompressed, Mode::C1C2C3).unwrap(),
            CIPHER
        );
    }
}
