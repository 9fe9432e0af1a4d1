//! Curve point handling: the octet encodings of `C1`, the cofactor check,
//! and the shared point `(x2, y2)`.

use crate::{EncryptionCurve, Error, Result};
use alloc::vec::Vec;
use elliptic_curve::{
    AffinePoint, CurveArithmetic, FieldBytesSize, Group,
    generic_array::typenum::Unsigned,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, Tag, ToEncodedPoint},
};
use sm3::digest::{Digest, Output};
use zeroize::Zeroizing;

/// Leading octet of an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Leading octet of a hybrid point with even `y`. Odd `y` sets the low bit.
const HYBRID_TAG: u8 = 0x06;

/// Octet encoding used for the ephemeral point `C1`.
///
/// See SEC 1 § 2.3.3 and ANSI X9.62 § 4.3.6. Both parties must agree on the
/// form since the ciphertext doesn't carry it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum PointForm {
    /// `02 || x` or `03 || x`, depending on the parity of `y`.
    Compressed,
    /// `04 || x || y`.
    #[default]
    Uncompressed,
    /// `06 || x || y` or `07 || x || y`, depending on the parity of `y`.
    Hybrid,
}

impl PointForm {
    /// Length in bytes of a non-identity point of the curve `C` in this form.
    pub fn encoded_len<C: CurveArithmetic>(self) -> usize {
        let field_len = C::FieldBytesSize::USIZE;
        match self {
            PointForm::Compressed => 1 + field_len,
            PointForm::Uncompressed | PointForm::Hybrid => 1 + 2 * field_len,
        }
    }

    /// Write `point` to `out`, which must be exactly
    /// [`PointForm::encoded_len`] bytes long.
    pub(crate) fn encode_into<C>(self, point: &AffinePoint<C>, out: &mut [u8]) -> Result<()>
    where
        C: CurveArithmetic,
        AffinePoint<C>: ToEncodedPoint<C>,
        FieldBytesSize<C>: ModulusSize,
    {
        let encoded = point.to_encoded_point(self == PointForm::Compressed);
        let bytes = encoded.as_bytes();

        // only the identity has a different length
        if bytes.len() != out.len() {
            return Err(Error::Domain);
        }
        out.copy_from_slice(bytes);

        if self == PointForm::Hybrid {
            let y_parity = out.last().map_or(0, |&byte| byte & 1);
            if let Some(tag) = out.first_mut() {
                *tag = HYBRID_TAG | y_parity;
            }
        }

        Ok(())
    }

    /// Parse a point of the curve `C` in this form.
    pub(crate) fn decode<C>(self, bytes: &[u8]) -> Result<AffinePoint<C>>
    where
        C: CurveArithmetic,
        AffinePoint<C>: FromEncodedPoint<C>,
        FieldBytesSize<C>: ModulusSize,
    {
        if bytes.len() != self.encoded_len::<C>() {
            return Err(Error::InvalidCiphertext);
        }

        let encoded = match self {
            PointForm::Compressed | PointForm::Uncompressed => {
                let encoded =
                    EncodedPoint::<C>::from_bytes(bytes).map_err(|_| Error::InvalidCiphertext)?;
                let tag_matches = match encoded.tag() {
                    Tag::CompressedEvenY | Tag::CompressedOddY => self == PointForm::Compressed,
                    Tag::Uncompressed => self == PointForm::Uncompressed,
                    _ => false,
                };
                if !tag_matches {
                    return Err(Error::InvalidCiphertext);
                }
                encoded
            }
            PointForm::Hybrid => {
                let (&tag, coordinates) = bytes.split_first().ok_or(Error::InvalidCiphertext)?;
                let y_parity = coordinates.last().map_or(0, |&byte| byte & 1);
                if tag != HYBRID_TAG | y_parity {
                    return Err(Error::InvalidCiphertext);
                }

                let mut uncompressed = Vec::with_capacity(bytes.len());
                uncompressed.push(UNCOMPRESSED_TAG);
                uncompressed.extend_from_slice(coordinates);
                EncodedPoint::<C>::from_bytes(&uncompressed).map_err(|_| Error::InvalidCiphertext)?
            }
        };

        Option::from(AffinePoint::<C>::from_encoded_point(&encoded)).ok_or(Error::InvalidCiphertext)
    }
}

/// Does `[h]P` differ from the point at infinity?
pub(crate) fn passes_cofactor_check<C: EncryptionCurve>(point: &AffinePoint<C>) -> bool {
    let h = <C::Scalar as From<u64>>::from(C::COFACTOR);
    let s = C::ProjectivePoint::from(*point) * h;
    !bool::from(s.is_identity())
}

/// Shared point `(x2, y2)` serialized as two field element octet strings.
///
/// The uncompressed encoding `04 || x2 || y2` has its coordinates at fixed
/// offsets: `x2` is `[1, 1 + L)` and `y2` is `[1 + L, 1 + 2L)`, where `L` is
/// the field size in bytes. Only `x2 || y2` is kept.
pub(crate) struct SharedPoint {
    coordinates: Zeroizing<Vec<u8>>,
    field_len: usize,
}

impl SharedPoint {
    /// Serialize `point`. Fails if its encoding doesn't have the layout above,
    /// which is only the case for the identity.
    pub(crate) fn new<C>(point: &AffinePoint<C>) -> Result<Self>
    where
        C: CurveArithmetic,
        AffinePoint<C>: ToEncodedPoint<C>,
        FieldBytesSize<C>: ModulusSize,
    {
        let field_len = C::FieldBytesSize::USIZE;
        let encoded = point.to_encoded_point(false);

        match encoded.as_bytes().split_first() {
            Some((&UNCOMPRESSED_TAG, coordinates)) if coordinates.len() == 2 * field_len => {
                Ok(Self {
                    coordinates: Zeroizing::new(coordinates.to_vec()),
                    field_len,
                })
            }
            _ => Err(Error::Domain),
        }
    }

    /// `x2 || y2`, the input to the KDF.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.coordinates
    }

    pub(crate) fn x(&self) -> &[u8] {
        &self.coordinates[..self.field_len]
    }

    pub(crate) fn y(&self) -> &[u8] {
        &self.coordinates[self.field_len..]
    }

    /// Authentication tag `Hash(x2 || msg || y2)`.
    pub(crate) fn tag<D: Digest>(&self, msg: &[u8]) -> Output<D> {
        D::new()
            .chain_update(self.x())
            .chain_update(msg)
            .chain_update(self.y())
            .finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::{PointForm, SharedPoint, passes_cofactor_check};
    use crate::{EncryptionCurve, Error};
    use alloc::vec;
    use elliptic_curve::{Group, group::Curve as _};
    use sm2::{AffinePoint, ProjectivePoint, Sm2};

    fn point() -> AffinePoint {
        (ProjectivePoint::generator().double() + ProjectivePoint::generator()).to_affine()
    }

    #[test]
    fn encoded_lengths() {
        assert_eq!(PointForm::Compressed.encoded_len::<Sm2>(), 33);
        assert_eq!(PointForm::Uncompressed.encoded_len::<Sm2>(), 65);
        assert_eq!(PointForm::Hybrid.encoded_len::<Sm2>(), 65);
    }

    #[test]
    fn forms_decode_to_same_point() {
        for form in [
            PointForm::Compressed,
            PointForm::Uncompressed,
            PointForm::Hybrid,
        ] {
            let mut buf = vec![0u8; form.encoded_len::<Sm2>()];
            form.encode_into::<Sm2>(&point(), &mut buf).unwrap();
            assert_eq!(form.decode::<Sm2>(&buf).unwrap(), point());
        }
    }

    #[test]
    fn hybrid_tag_carries_y_parity() {
        let mut hybrid = [0u8; 65];
        PointForm::Hybrid
            .encode_into::<Sm2>(&point(), &mut hybrid)
            .unwrap();
        assert_eq!(hybrid[0], 0x06 | (hybrid[64] & 1));

        // flip the parity bit in the tag only
        hybrid[0] ^= 1;
        assert_eq!(
            PointForm::Hybrid.decode::<Sm2>(&hybrid),
            Err(Error::InvalidCiphertext)
        );
    }

    #[test]
    fn form_mismatch_rejected() {
        let mut uncompressed = [0u8; 65];
        PointForm::Uncompressed
            .encode_into::<Sm2>(&point(), &mut uncompressed)
            .unwrap();
        assert_eq!(
            PointForm::Hybrid.decode::<Sm2>(&uncompressed),
            Err(Error::InvalidCiphertext)
        );
        assert_eq!(
            PointForm::Compressed.decode::<Sm2>(&uncompressed),
            Err(Error::InvalidCiphertext)
        );
    }

    #[test]
    fn off_curve_point_rejected() {
        let mut uncompressed = [0u8; 65];
        PointForm::Uncompressed
            .encode_into::<Sm2>(&point(), &mut uncompressed)
            .unwrap();
        uncompressed[64] ^= 1;
        assert_eq!(
            PointForm::Uncompressed.decode::<Sm2>(&uncompressed),
            Err(Error::InvalidCiphertext)
        );
    }

    #[test]
    fn cofactor_check() {
        assert_eq!(<Sm2 as EncryptionCurve>::COFACTOR, 1);
        assert!(passes_cofactor_check::<Sm2>(&point()));
        assert!(!passes_cofactor_check::<Sm2>(&AffinePoint::IDENTITY));
    }

    #[test]
    fn identity_has_no_shared_coordinates() {
        assert!(matches!(
            SharedPoint::new::<Sm2>(&AffinePoint::IDENTITY),
            Err(Error::Domain)
        ));
    }

    #[test]
    fn shared_coordinates_split() {
        let shared = SharedPoint::new::<Sm2>(&point()).unwrap();
        assert_eq!(shared.x().len(), 32);
        assert_eq!(shared.y().len(), 32);
        assert_eq!([shared.x(), shared.y()].concat(), shared.as_bytes());
    }
}
