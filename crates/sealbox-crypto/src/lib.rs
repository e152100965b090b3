#![doc = include_str!("../README.md")]
#![no_std]
#![forbid(unsafe_code, unused_must_use)]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    missing_docs,
    unused_import_braces,
    unused_qualifications
)]
#![allow(clippy::must_use_candidate)]

mod id;
pub mod kdf;
mod material;

#[cfg(feature = "backend-rustcrypto")]
pub mod backend;

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;
use core::fmt;

pub use crate::id::{AeadId, CipherSuite, KdfId, KemId};
pub use crate::material::{
    AeadMaterial, EncapKey, Okm, Prk, PrivateKey, PublicKey, SharedSecret,
};

/// The cryptographic primitives an HPKE instantiation draws on.
///
/// A backend must be internally stateless apart from its random number
/// generator: the same inputs to any deterministic operation yield the same
/// outputs, on any backend value, at any time. Configurations hand a backend
/// value to every context they set up, so a context can finish derivations
/// and seal/open on its own.
pub trait Crypto: fmt::Debug + Send + Sync {
    /// Fills `buf` with cryptographically secure random bytes.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InsufficientRandomness`] if the entropy source fails.
    fn secure_random_fill(&mut self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// Whether this backend can perform the group operations of the KEM.
    fn is_kem_supported(&self, alg: KemId) -> bool;

    /// Whether this backend can perform the KDF.
    fn is_kdf_supported(&self, alg: KdfId) -> bool;

    /// Whether this backend can perform the AEAD.
    fn is_aead_supported(&self, alg: AeadId) -> bool;

    /// `Extract(salt, ikm)`: extracts a pseudorandom key of `Nh` bytes from
    /// input keying material and an optional salt.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn kdf_extract(&self, alg: KdfId, salt: &[u8], ikm: &[u8]) -> Result<Prk, CryptoError>;

    /// [`kdf_extract`](Crypto::kdf_extract) over the concatenation of several
    /// input slices.
    ///
    /// The default implementation concatenates into a scratch buffer;
    /// backends with native multi-part input can override it.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn kdf_extract_concated(
        &self,
        alg: KdfId,
        salt: &[u8],
        ikms: &[&[u8]],
    ) -> Result<Prk, CryptoError> {
        self.kdf_extract(alg, salt, &ikms.concat())
    }

    /// `Expand(prk, info, L)`: expands a pseudorandom key into `len` bytes of
    /// output keying material.
    ///
    /// # Errors
    ///
    /// [`CryptoError::OutputTooLong`] past `255 * Nh` bytes; see
    /// [`CryptoError`] for the rest.
    fn kdf_expand(
        &self,
        alg: KdfId,
        prk: &Prk,
        info: &[u8],
        len: usize,
    ) -> Result<Okm, CryptoError>;

    /// [`kdf_expand`](Crypto::kdf_expand) over the concatenation of several
    /// info slices.
    ///
    /// # Errors
    ///
    /// See [`kdf_expand`](Crypto::kdf_expand).
    fn kdf_expand_multi_info(
        &self,
        alg: KdfId,
        prk: &Prk,
        infos: &[&[u8]],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        self.kdf_expand(alg, prk, &infos.concat(), len)
    }

    /// `Seal(key, nonce, aad, pt)`: encrypts and authenticates `plaintext`
    /// with associated data `aad`, returning ciphertext with the tag
    /// appended.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn aead_seal(
        &self,
        material: &AeadMaterial,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// `Open(key, nonce, aad, ct)`: verifies and decrypts `ciphertext`.
    ///
    /// Authentication failure is a negative result, `Ok(None)`, not an
    /// error: callers observe it without unwinding, and the tag comparison
    /// inside the AEAD implementation stays constant-time.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`]; reserved for backend-internal failures.
    fn aead_open(
        &self,
        material: &AeadMaterial,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Option<Vec<u8>>, CryptoError>;

    /// Validates a serialized private key for the KEM and wraps it.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyMaterial`] for a malformed encoding,
    /// [`CryptoError::UnsupportedAlgorithm`] if the backend lacks the KEM.
    fn sk_from_bytes(&self, alg: KemId, bytes: &[u8]) -> Result<PrivateKey, CryptoError>;

    /// Validates a serialized public key for the KEM and wraps it.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyMaterial`] for a malformed point encoding,
    /// [`CryptoError::UnsupportedAlgorithm`] if the backend lacks the KEM.
    fn pk_from_bytes(&self, alg: KemId, bytes: &[u8]) -> Result<PublicKey, CryptoError>;

    /// `pk(skX)`: computes the public key belonging to a private key.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn pk_of(&self, alg: KemId, sk: &PrivateKey) -> Result<PublicKey, CryptoError>;

    /// `DH(skX, pkY)`: a non-interactive Diffie-Hellman exchange producing
    /// `Ndh` bytes of shared secret.
    ///
    /// # Errors
    ///
    /// See [`CryptoError`].
    fn dh(&self, alg: KemId, sk_x: &PrivateKey, pk_y: &PublicKey)
    -> Result<SharedSecret, CryptoError>;
}

/// Failures raised by the primitive layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// The algorithm identifier is not in the recognized set, or the backend
    /// has no implementation for it.
    UnsupportedAlgorithm,

    /// The algorithm is recognized but does not provide this capability.
    NotImplemented,

    /// Malformed serialized key material: wrong length, an invalid point
    /// encoding, or a scalar outside the group order.
    InvalidKeyMaterial,

    /// A KDF expand request past `255 * Nh` bytes.
    OutputTooLong,

    /// The operating system's entropy source is unavailable.
    InsufficientRandomness,

    /// A failure inside the backing crypto library that its API does not let
    /// us classify further.
    Internal(&'static str),
}

impl core::error::Error for CryptoError {}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm => write!(f, "unsupported algorithm"),
            Self::NotImplemented => write!(f, "operation not implemented for this algorithm"),
            Self::InvalidKeyMaterial => write!(f, "malformed key material"),
            Self::OutputTooLong => write!(f, "KDF output length limit exceeded"),
            Self::InsufficientRandomness => write!(f, "entropy source unavailable"),
            Self::Internal(what) => write!(f, "crypto backend failure: {what}"),
        }
    }
}
