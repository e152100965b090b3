//! Error types.

use core::fmt;

use sealbox_crypto::CryptoError;

/// Failures surfaced by the public API.
///
/// The taxonomy is closed and small; every error propagates to the caller,
/// nothing is retried internally. AEAD authentication failure is *not* an
/// error; it is the `None` result of [`open`](crate::ReceiverContext::open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An algorithm identifier outside the recognized registries, or one the
    /// configured backend has no implementation for.
    UnsupportedAlgorithm,

    /// A capability the selected algorithms do not provide, such as `seal`
    /// or `open` on an export-only context.
    NotImplemented,

    /// An inconsistent `(mode, psk, psk_id)` triple reached the key
    /// schedule.
    InvalidPskInputs,

    /// `seal` or `open` attempted with the sequence counter at `2^64 - 1`.
    SequenceOverflow,

    /// A KDF expand request past `255 * Nh` bytes.
    OutputTooLong,

    /// Malformed serialized key material.
    InvalidKeyMaterial,

    /// A backend-internal failure, such as an unavailable entropy source.
    Crypto(CryptoError),
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm => write!(f, "unsupported algorithm"),
            Self::NotImplemented => write!(f, "not implemented"),
            Self::InvalidPskInputs => write!(f, "invalid PSK inputs"),
            Self::SequenceOverflow => write!(f, "sequence number overflow"),
            Self::OutputTooLong => write!(f, "KDF output length limit exceeded"),
            Self::InvalidKeyMaterial => write!(f, "malformed key material"),
            Self::Crypto(e) => write!(f, "crypto backend error: {e}"),
        }
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::UnsupportedAlgorithm => Self::UnsupportedAlgorithm,
            CryptoError::NotImplemented => Self::NotImplemented,
            CryptoError::InvalidKeyMaterial => Self::InvalidKeyMaterial,
            CryptoError::OutputTooLong => Self::OutputTooLong,
            other => Self::Crypto(other),
        }
    }
}
