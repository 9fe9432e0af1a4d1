//! SM2 ciphertext `C = C1 || C2 || C3` and its wire encoding.
//!
//! ```text
//! C1: ephemeral public key [k]G, in the agreed point form
//! C2: masked message, as long as the message
//! C3: authentication tag, as long as the digest output
//! ```
//!
//! The encoding has no length prefixes or separators: the field boundaries
//! follow from the point form, the digest size and the total length.

use crate::{Error, PointForm, Result};
use alloc::{vec, vec::Vec};
use core::fmt::{self, Debug};
use elliptic_curve::{
    AffinePoint, CurveArithmetic, FieldBytesSize, Group,
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
};
use sm2::Sm2;
use sm3::{
    Sm3,
    digest::{Output, OutputSizeUser},
};

/// Order of the ciphertext fields on the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    /// `C1 || C2 || C3`, as in GM/T 0003-2010.
    #[default]
    C1C2C3,
    /// `C1 || C3 || C2`, as in GM/T 0003-2012.
    C1C3C2,
}

/// SM2 ciphertext value over the curve `C`, authenticated with the digest
/// `D`.
///
/// The tag length is fixed by `D`. `c1` is never the identity and `c2` is
/// never empty.
pub struct Cipher<C: CurveArithmetic = Sm2, D: OutputSizeUser = Sm3> {
    c1: AffinePoint<C>,
    c2: Vec<u8>,
    c3: Output<D>,
}

impl<C, D> Cipher<C, D>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    D: OutputSizeUser,
{
    /// Assemble a ciphertext from its components.
    ///
    /// Returns [`Error::InvalidCiphertext`] if `c1` is the identity or `c2`
    /// is empty.
    pub fn from_parts(c1: AffinePoint<C>, c2: Vec<u8>, c3: Output<D>) -> Result<Self> {
        if bool::from(C::ProjectivePoint::from(c1).is_identity()) || c2.is_empty() {
            return Err(Error::InvalidCiphertext);
        }

        Ok(Self { c1, c2, c3 })
    }

    /// Built by encryption, which upholds the invariants itself.
    pub(crate) fn new(c1: AffinePoint<C>, c2: Vec<u8>, c3: Output<D>) -> Self {
        Self { c1, c2, c3 }
    }

    /// Length of an encoded ciphertext for a `msg_len` byte message.
    ///
    /// Returns [`Error::MessageTooLong`] if the length overflows `usize`.
    pub fn encoded_len(point_form: PointForm, msg_len: usize) -> Result<usize> {
        point_form
            .encoded_len::<C>()
            .checked_add(D::output_size())
            .and_then(|overhead| overhead.checked_add(msg_len))
            .ok_or(Error::MessageTooLong)
    }

    /// Decode a ciphertext.
    ///
    /// Inputs no longer than the point and tag alone are rejected: empty
    /// messages aren't representable.
    pub fn from_slice(bytes: &[u8], point_form: PointForm, mode: Mode) -> Result<Self> {
        let point_len = point_form.encoded_len::<C>();
        let tag_len = D::output_size();
        if bytes.len() <= point_len + tag_len {
            return Err(Error::InvalidCiphertext);
        }

        let (c1, rest) = bytes.split_at(point_len);
        let (c2, c3) = match mode {
            Mode::C1C2C3 => rest.split_at(rest.len() - tag_len),
            Mode::C1C3C2 => {
                let (c3, c2) = rest.split_at(tag_len);
                (c2, c3)
            }
        };

        let c1 = point_form.decode::<C>(c1)?;
        let c3 = Output::<D>::from_exact_iter(c3.iter().copied()).ok_or(Error::InvalidCiphertext)?;

        Ok(Self {
            c1,
            c2: c2.to_vec(),
            c3,
        })
    }

    /// Encode into `out`, returning the number of bytes written.
    ///
    /// Returns [`Error::BufferTooSmall`] with the required length if `out`
    /// is too short.
    pub fn encode_into(&self, point_form: PointForm, mode: Mode, out: &mut [u8]) -> Result<usize> {
        let len = Self::encoded_len(point_form, self.c2.len())?;
        let out = out
            .get_mut(..len)
            .ok_or(Error::BufferTooSmall { required: len })?;

        let (c1_out, rest) = out.split_at_mut(point_form.encoded_len::<C>());
        point_form.encode_into::<C>(&self.c1, c1_out)?;

        match mode {
            Mode::C1C2C3 => {
                let (c2_out, c3_out) = rest.split_at_mut(self.c2.len());
                c2_out.copy_from_slice(&self.c2);
                c3_out.copy_from_slice(&self.c3);
            }
            Mode::C1C3C2 => {
                let (c3_out, c2_out) = rest.split_at_mut(self.c3.len());
                c3_out.copy_from_slice(&self.c3);
                c2_out.copy_from_slice(&self.c2);
            }
        }

        Ok(len)
    }

    /// Encode to a [`Vec`].
    pub fn to_vec(&self, point_form: PointForm, mode: Mode) -> Result<Vec<u8>> {
        let mut out = vec![0u8; Self::encoded_len(point_form, self.c2.len())?];
        self.encode_into(point_form, mode, &mut out)?;
        Ok(out)
    }

    /// Get C1
    pub fn c1(&self) -> &AffinePoint<C> {
        &self.c1
    }

    /// Get C2
    pub fn c2(&self) -> &[u8] {
        &self.c2
    }

    /// Get C3
    pub fn c3(&self) -> &Output<D> {
        &self.c3
    }

    /// Split into `(C1, C2, C3)`.
    pub fn into_parts(self) -> (AffinePoint<C>, Vec<u8>, Output<D>) {
        (self.c1, self.c2, self.c3)
    }
}

impl<C: CurveArithmetic, D: OutputSizeUser> Clone for Cipher<C, D> {
    fn clone(&self) -> Self {
        Self {
            c1: self.c1,
            c2: self.c2.clone(),
            c3: self.c3.clone(),
        }
    }
}

impl<C: CurveArithmetic, D: OutputSizeUser> Debug for Cipher<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("c1", &self.c1)
            .field("c2", &self.c2)
            .field("c3", &self.c3)
            .finish()
    }
}

impl<C: CurveArithmetic, D: OutputSizeUser> PartialEq for Cipher<C, D> {
    fn eq(&self, other: &Self) -> bool {
        self.c1 == other.c1 && self.c2 == other.c2 && self.c3 == other.c3
    }
}

impl<C: CurveArithmetic, D: OutputSizeUser> Eq for Cipher<C, D> {}
