//! Key derivation for the SM2 key stream.
//!
//! SM2 encryption masks the message with `t = KDF(x2 || y2, klen)`, where
//! `(x2, y2)` is the shared point. The KDF is the ANSI X9.63 construction
//! without `SharedInfo`:
//!
//! ```text
//! K_i = H(Z || ct)    ct = 0x00000001, 0x00000002, ...
//! t   = leftmost klen bytes of K_1 || K_2 || ...
//! ```

use crate::{Error, Result};
use alloc::{vec, vec::Vec};
use core::{fmt, marker::PhantomData};
use sm3::{Sm3, digest::Digest};
use zeroize::Zeroizing;

/// Key derivation function used to expand the shared secret into a key
/// stream.
pub trait Kdf {
    /// Fill `out` with key stream derived from the shared secret `z`.
    fn derive_into(&self, z: &[u8], out: &mut [u8]) -> Result<()>;

    /// Derive `len` bytes of key stream from the shared secret `z`.
    fn derive(&self, z: &[u8], len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.derive_into(z, &mut out)?;
        Ok(out)
    }
}

/// ANSI X9.63 key derivation function over the digest `D`.
pub struct X963Kdf<D = Sm3> {
    digest: PhantomData<D>,
}

impl<D> X963Kdf<D> {
    /// Create a new X9.63 KDF.
    pub const fn new() -> Self {
        Self {
            digest: PhantomData,
        }
    }
}

impl<D: Digest> Kdf for X963Kdf<D> {
    fn derive_into(&self, z: &[u8], out: &mut [u8]) -> Result<()> {
        let block_size = <D as Digest>::output_size();
        if block_size == 0 {
            return Err(Error::KdfUnavailable);
        }

        // the counter is 32 bits wide and never wraps
        let blocks = out.len().div_ceil(block_size);
        if u32::try_from(blocks).is_err() {
            return Err(Error::KdfUnavailable);
        }

        for (ct, chunk) in (1..=u32::MAX).zip(out.chunks_mut(block_size)) {
            let block = D::new()
                .chain_update(z)
                .chain_update(ct.to_be_bytes())
                .finalize();
            chunk.copy_from_slice(&block[..chunk.len()]);
        }

        Ok(())
    }
}

impl<D> Clone for X963Kdf<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for X963Kdf<D> {}

impl<D> Default for X963Kdf<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for X963Kdf<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X963Kdf").finish_non_exhaustive()
    }
}

/// Is every byte of `bytes` zero?
///
/// Inspects the whole input regardless of where the first non-zero byte is.
/// An all-zero key stream would leave the message unmasked, so encryption
/// rejects it.
pub fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, &byte| acc | byte) == 0
}
