//! Error types.

use core::fmt::{self, Display, Formatter};

/// Result type with the `sm2-pke` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// SM2 encryption and decryption errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Curve or digest parameters are unusable with this scheme.
    Domain,

    /// The key derivation function can't produce the requested key stream.
    KdfUnavailable,

    /// Public key is malformed or fails the cofactor check.
    InvalidPublicKey,

    /// Secret key bytes do not encode a scalar in `[1, n-1]`.
    InvalidPrivateKey,

    /// Ciphertext is malformed or its ephemeral point fails the cofactor
    /// check.
    InvalidCiphertext,

    /// Empty messages can't be represented in the ciphertext format.
    EmptyMessage,

    /// Message length doesn't fit a ciphertext addressable in memory.
    MessageTooLong,

    /// Every ephemeral key tried produced an all-zero key stream.
    EncryptionFailed,

    /// Authentication tag mismatch.
    AuthenticationFailed,

    /// Output buffer is too small.
    BufferTooSmall {
        /// Number of bytes the operation needs.
        required: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Domain => write!(f, "unsupported curve or digest parameters"),
            Error::KdfUnavailable => write!(f, "key derivation function unavailable"),
            Error::InvalidPublicKey => write!(f, "public key is invalid"),
            Error::InvalidPrivateKey => write!(f, "private key is invalid"),
            // same text for both failure kinds
            Error::InvalidCiphertext | Error::AuthenticationFailed => {
                write!(f, "decryption failed")
            }
            Error::EmptyMessage => write!(f, "message is empty"),
            Error::MessageTooLong => write!(f, "message is too long"),
            Error::EncryptionFailed => write!(f, "encryption failed"),
            Error::BufferTooSmall { required } => {
                write!(f, "output buffer too small: {required} bytes required")
            }
        }
    }
}

impl core::error::Error for Error {}

impl From<Error> for elliptic_curve::Error {
    fn from(_: Error) -> Self {
        elliptic_curve::Error
    }
}
