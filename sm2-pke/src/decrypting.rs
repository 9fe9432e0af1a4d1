//! Support for SM2 decryption.
//!
//! ## Algorithm
//!
//! ```text
//! B1: get C1 from C, fail if it is not a point of the curve
//! B2: calculate S=[h]C1, fail if S is the point at infinity
//! B3: calculate [dB]C1=(x2, y2)
//! B4: calculate t=KDF(x2 || y2, klen)
//! B5: get C2 from C and calculate M'=C2 xor t
//! B6: calculate u=Hash(x2 || M' || y2), fail if u != C3
//! B7: the plaintext is M'
//! ```

use crate::{
    Cipher, EncryptingKey, EncryptionCurve, Error, Mode, PointForm, Result,
    kdf::{Kdf, X963Kdf},
    point::{SharedPoint, passes_cofactor_check},
};
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use elliptic_curve::{
    AffinePoint, FieldBytes, FieldBytesSize, NonZeroScalar, PrimeField, ProjectivePoint,
    PublicKey, SecretKey,
    group::Curve as _,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    subtle::{Choice, ConstantTimeEq},
};
use sm2::Sm2;
use sm3::{Sm3, digest::Digest};
use zeroize::Zeroize;

/// SM2 secret key used for decrypting messages.
#[derive(Clone)]
pub struct DecryptingKey<C: EncryptionCurve = Sm2> {
    secret_scalar: NonZeroScalar<C>,
    encrypting_key: EncryptingKey<C>,
}

impl<C> DecryptingKey<C>
where
    C: EncryptionCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Create a [`DecryptingKey`] from a [`SecretKey`], with the default
    /// [`Mode`] and [`PointForm`].
    pub fn new(secret_key: &SecretKey<C>) -> Self {
        Self::new_with_mode(secret_key.to_nonzero_scalar(), Mode::default())
    }

    /// Create a [`DecryptingKey`] from a non-zero scalar and set the field
    /// order of accepted ciphertexts.
    pub fn new_with_mode(secret_scalar: NonZeroScalar<C>, mode: Mode) -> Self {
        Self {
            secret_scalar,
            encrypting_key: EncryptingKey::new_with_mode(
                PublicKey::from_secret_scalar(&secret_scalar),
                mode,
            ),
        }
    }

    /// Set the encoding of `C1` in accepted ciphertexts. The corresponding
    /// [`EncryptingKey`] uses the same form.
    pub fn with_point_form(mut self, point_form: PointForm) -> Self {
        self.encrypting_key = self.encrypting_key.with_point_form(point_form);
        self
    }

    /// Parse decrypting key from big endian-encoded bytes.
    pub fn from_bytes(bytes: &FieldBytes<C>) -> Result<Self> {
        let secret_scalar =
            Option::<NonZeroScalar<C>>::from(NonZeroScalar::from_repr(bytes.clone()))
                .ok_or(Error::InvalidPrivateKey)?;
        Ok(Self::from_nonzero_scalar(secret_scalar))
    }

    /// Parse decrypting key from a big endian-encoded byte slice containing a
    /// secret scalar value.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let secret_scalar =
            NonZeroScalar::<C>::try_from(slice).map_err(|_| Error::InvalidPrivateKey)?;
        Ok(Self::from_nonzero_scalar(secret_scalar))
    }

    /// Create a decrypting key from a non-zero scalar.
    pub fn from_nonzero_scalar(secret_scalar: NonZeroScalar<C>) -> Self {
        Self::new_with_mode(secret_scalar, Mode::default())
    }

    /// Serialize as bytes.
    pub fn to_bytes(&self) -> FieldBytes<C> {
        self.secret_scalar.to_repr()
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar<C> {
        &self.secret_scalar
    }

    /// Get the [`EncryptingKey`] which corresponds to this [`DecryptingKey`].
    pub fn encrypting_key(&self) -> &EncryptingKey<C> {
        &self.encrypting_key
    }

    /// Field order of accepted ciphertexts.
    pub fn mode(&self) -> Mode {
        self.encrypting_key.mode()
    }

    /// Encoding of `C1` in accepted ciphertexts.
    pub fn point_form(&self) -> PointForm {
        self.encrypting_key.point_form()
    }

    /// Decrypt a ciphertext, using `Sm3` as both KDF and MAC digest.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_digest::<Sm3>(ciphertext)
    }

    /// Decrypt a ciphertext, using `D` as both KDF and MAC digest.
    pub fn decrypt_digest<D: Digest>(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Cipher::<C, D>::from_slice(ciphertext, self.point_form(), self.mode())
            .inspect_err(|_| debug!("malformed SM2 ciphertext"))?;
        self.decrypt_cipher(&X963Kdf::<D>::new(), &cipher)
    }

    /// Length of the message in a `ciphertext_len` byte ciphertext.
    ///
    /// Returns [`Error::InvalidCiphertext`] if no message fits.
    pub fn decrypted_len<D: Digest>(&self, ciphertext_len: usize) -> Result<usize> {
        let overhead = Cipher::<C, D>::encoded_len(self.point_form(), 0)?;
        match ciphertext_len.checked_sub(overhead) {
            Some(len) if len > 0 => Ok(len),
            _ => Err(Error::InvalidCiphertext),
        }
    }

    /// Decrypt a ciphertext into `out`, using `D` as both KDF and MAC digest.
    ///
    /// Returns the message length, or [`Error::BufferTooSmall`] with the
    /// required length if `out` is too short. `out` is only written once the
    /// ciphertext has been authenticated.
    pub fn decrypt_into<D: Digest>(&self, ciphertext: &[u8], out: &mut [u8]) -> Result<usize> {
        let required = self.decrypted_len::<D>(ciphertext.len())?;
        let out = out
            .get_mut(..required)
            .ok_or(Error::BufferTooSmall { required })?;

        let mut msg = self.decrypt_digest::<D>(ciphertext)?;
        out.copy_from_slice(&msg);
        msg.zeroize();
        Ok(required)
    }

    /// Decrypt a ciphertext value with the key derivation function `kdf` and
    /// the MAC digest `D`.
    pub fn decrypt_cipher<K: Kdf, D: Digest>(
        &self,
        kdf: &K,
        cipher: &Cipher<C, D>,
    ) -> Result<Vec<u8>> {
        if <D as Digest>::output_size() == 0 {
            return Err(Error::Domain);
        }

        // B2: [h]C1 must not be the point at infinity
        if !passes_cofactor_check::<C>(cipher.c1()) {
            debug!("SM2 ciphertext point failed the cofactor check");
            return Err(Error::InvalidCiphertext);
        }

        // B3: (x2, y2) = [dB]C1
        let shared_point = ProjectivePoint::<C>::from(*cipher.c1()) * *self.secret_scalar;
        let shared = SharedPoint::new::<C>(&shared_point.to_affine())?;

        // B4: t = KDF(x2 || y2, klen)
        let t = kdf.derive(shared.as_bytes(), cipher.c2().len())?;

        // B5: M' = C2 xor t
        let mut msg: Vec<u8> = cipher.c2().iter().zip(t.iter()).map(|(c, t)| c ^ t).collect();

        // B6: u = Hash(x2 || M' || y2) must equal C3
        let u = shared.tag::<D>(&msg);
        if !bool::from(u.as_slice().ct_eq(cipher.c3().as_slice())) {
            msg.zeroize();
            debug!("SM2 ciphertext failed authentication");
            return Err(Error::AuthenticationFailed);
        }

        // B7: output M'
        Ok(msg)
    }
}

//
// Other trait impls
//

impl<C: EncryptionCurve> AsRef<EncryptingKey<C>> for DecryptingKey<C> {
    fn as_ref(&self) -> &EncryptingKey<C> {
        &self.encrypting_key
    }
}

impl<C: EncryptionCurve> ConstantTimeEq for DecryptingKey<C> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_scalar.ct_eq(&other.secret_scalar)
    }
}

impl<C: EncryptionCurve> Debug for DecryptingKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptingKey")
            .field("encrypting_key", &self.encrypting_key)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl<C: EncryptionCurve> Eq for DecryptingKey<C> {}
impl<C: EncryptionCurve> PartialEq for DecryptingKey<C> {
    fn eq(&self, other: &DecryptingKey<C>) -> bool {
        self.ct_eq(other).into()
    }
}
