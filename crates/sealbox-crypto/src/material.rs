//! Typed byte containers for the values that cross the primitive boundary.
//!
//! Everything secret-bearing is wiped on drop and compares in constant time.
//! The wiping is best-effort: the compiler may elide the stores once the
//! value is provably dead, and values moved before the drop leave the old
//! location untouched. The inline smallvec storage keeps typical key sizes
//! off the heap, so secrets are not silently copied by reallocation.

use core::fmt;
use core::ops::Deref;

use smallvec::SmallVec;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::{AeadId, CryptoError, KemId};

macro_rules! as_bytes {
    ($name:ident) => {
        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.bytes
            }
        }

        impl Deref for $name {
            type Target = [u8];

            fn deref(&self) -> &[u8] {
                &self.bytes
            }
        }
    };
}

macro_rules! debug_hex {
    ($name:ident) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&const_hex::encode(&self.bytes))
                    .finish()
            }
        }
    };
}

macro_rules! debug_redacted {
    ($name:ident) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

macro_rules! wipe_on_drop {
    ($name:ident) => {
        impl Drop for $name {
            fn drop(&mut self) {
                self.bytes.as_mut_slice().zeroize();
            }
        }
    };
}

macro_rules! constant_time_eq {
    ($name:ident) => {
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.bytes
                    .as_slice()
                    .ct_eq(other.bytes.as_slice())
                    .into()
            }
        }

        impl Eq for $name {}
    };
}

/// A KEM public key, held in its serialized wire form.
///
/// The length is validated against the KEM on construction; whether the bytes
/// encode a valid group element is the backend's call.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: SmallVec<[u8; 133]>,
}

as_bytes!(PublicKey);
debug_hex!(PublicKey);

impl PublicKey {
    /// Wraps a serialized public key of the given KEM.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyMaterial`] if the length does not match the
    /// KEM's `Npk`.
    pub fn new(alg: KemId, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != alg.n_pk() {
            return Err(CryptoError::InvalidKeyMaterial);
        }

        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
        })
    }
}

/// A KEM private key. Wiped on drop, constant-time equality, redacted
/// `Debug`.
pub struct PrivateKey {
    bytes: SmallVec<[u8; 66]>,
}

as_bytes!(PrivateKey);
debug_redacted!(PrivateKey);
wipe_on_drop!(PrivateKey);
constant_time_eq!(PrivateKey);

impl PrivateKey {
    /// Wraps a serialized private key of the given KEM.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyMaterial`] if the length does not match the
    /// KEM's `Nsk`.
    pub fn new(alg: KemId, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != alg.n_sk() {
            return Err(CryptoError::InvalidKeyMaterial);
        }

        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
        })
    }
}

/// The encapsulation blob (`enc`) a sender transmits alongside the first
/// ciphertext. For DHKEMs this is the serialized ephemeral public key.
#[derive(Clone, PartialEq, Eq)]
pub struct EncapKey {
    bytes: SmallVec<[u8; 133]>,
}

as_bytes!(EncapKey);
debug_hex!(EncapKey);

impl EncapKey {
    /// Wraps an encapsulation received over the wire.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Reuses an ephemeral public key as the encapsulation, without copying.
    pub fn from_public_key(pk: PublicKey) -> Self {
        Self { bytes: pk.bytes }
    }
}

/// The KEM shared secret feeding the key schedule.
pub struct SharedSecret {
    bytes: SmallVec<[u8; 64]>,
}

as_bytes!(SharedSecret);
debug_redacted!(SharedSecret);
wipe_on_drop!(SharedSecret);
constant_time_eq!(SharedSecret);

impl SharedSecret {
    /// Wraps raw shared-secret bytes produced by a group operation.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Takes ownership of expanded keying material as the shared secret.
    pub fn from_okm(mut okm: Okm) -> Self {
        Self {
            bytes: core::mem::take(&mut okm.bytes),
        }
    }
}

/// A pseudorandom key, the output of HKDF-Extract.
pub struct Prk {
    bytes: SmallVec<[u8; 64]>,
}

as_bytes!(Prk);
debug_redacted!(Prk);
wipe_on_drop!(Prk);
constant_time_eq!(Prk);

impl Prk {
    /// Wraps extracted bytes. Backend implementations use this; there is no
    /// strength check on the value.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Takes ownership of expanded keying material to be reused as a PRK, as
    /// the exporter secret is.
    pub fn from_okm(mut okm: Okm) -> Self {
        Self {
            bytes: core::mem::take(&mut okm.bytes),
        }
    }
}

/// Output keying material, the result of HKDF-Expand.
pub struct Okm {
    bytes: SmallVec<[u8; 64]>,
}

as_bytes!(Okm);
debug_hex!(Okm);
wipe_on_drop!(Okm);
constant_time_eq!(Okm);

impl Okm {
    /// An empty buffer to expand into.
    pub const fn empty() -> Self {
        Self {
            bytes: SmallVec::new_const(),
        }
    }

    /// Resizes the buffer to `len` and returns it for the backend to fill.
    pub fn as_mut_buffer(&mut self, len: usize) -> &mut [u8] {
        self.bytes.resize(len, 0);
        &mut self.bytes
    }

    /// Mutable view of the current contents.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

/// The AEAD key and base nonce a context encrypts under.
///
/// Kept as fixed-size arrays per algorithm so the backend dispatches
/// statically; wiped on drop.
#[non_exhaustive]
pub enum AeadMaterial {
    /// AES-128-GCM
    Aes128Gcm {
        /// The AEAD key.
        key: [u8; 16],

        /// The base nonce.
        nonce: [u8; 12],
    },

    /// AES-256-GCM
    Aes256Gcm {
        /// The AEAD key.
        key: [u8; 32],

        /// The base nonce.
        nonce: [u8; 12],
    },

    /// ChaCha20-Poly1305
    ChaCha20Poly1305 {
        /// The AEAD key.
        key: [u8; 32],

        /// The base nonce.
        nonce: [u8; 12],
    },
}

/// `xor(base_nonce, I2OSP(seq, Nn))`: the sequence number is written
/// big-endian, left-padded with zeros to the nonce width, so only the
/// trailing eight bytes can differ.
fn xor_nonce(base: &[u8; 12], seq: u64) -> [u8; 12] {
    let mut nonce = *base;

    for (n, s) in nonce
        .iter_mut()
        .rev()
        .zip(seq.to_be_bytes().into_iter().rev())
    {
        *n ^= s;
    }

    nonce
}

impl AeadMaterial {
    /// Binds a derived key and base nonce to the AEAD algorithm.
    ///
    /// Returns `Ok(None)` for [`AeadId::EXPORT_ONLY`], which has no key or
    /// nonce at all.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidKeyMaterial`] if either length is wrong for the
    /// algorithm.
    pub fn new(alg: AeadId, key: &[u8], nonce: &[u8]) -> Result<Option<Self>, CryptoError> {
        macro_rules! fit {
            ($bytes:expr) => {
                $bytes
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?
            };
        }

        Ok(Some(match alg {
            AeadId::AES_128_GCM => Self::Aes128Gcm {
                key: fit!(key),
                nonce: fit!(nonce),
            },
            AeadId::AES_256_GCM => Self::Aes256Gcm {
                key: fit!(key),
                nonce: fit!(nonce),
            },
            AeadId::CHACHA20_POLY1305 => Self::ChaCha20Poly1305 {
                key: fit!(key),
                nonce: fit!(nonce),
            },
            AeadId::EXPORT_ONLY => return Ok(None),
        }))
    }

    /// The AEAD algorithm this material belongs to.
    pub const fn aead_id(&self) -> AeadId {
        match self {
            Self::Aes128Gcm { .. } => AeadId::AES_128_GCM,
            Self::Aes256Gcm { .. } => AeadId::AES_256_GCM,
            Self::ChaCha20Poly1305 { .. } => AeadId::CHACHA20_POLY1305,
        }
    }

    /// The AEAD key.
    pub const fn key(&self) -> &[u8] {
        match self {
            Self::Aes128Gcm { key, .. } => key,
            Self::Aes256Gcm { key, .. } | Self::ChaCha20Poly1305 { key, .. } => key,
        }
    }

    /// The base nonce.
    pub const fn nonce(&self) -> &[u8] {
        match self {
            Self::Aes128Gcm { nonce, .. }
            | Self::Aes256Gcm { nonce, .. }
            | Self::ChaCha20Poly1305 { nonce, .. } => nonce,
        }
    }

    /// A copy of this material carrying the per-message nonce for sequence
    /// number `seq`. The copy wipes itself on drop like the original.
    pub fn for_message(&self, seq: u64) -> Self {
        match self {
            Self::Aes128Gcm { key, nonce } => Self::Aes128Gcm {
                key: *key,
                nonce: xor_nonce(nonce, seq),
            },
            Self::Aes256Gcm { key, nonce } => Self::Aes256Gcm {
                key: *key,
                nonce: xor_nonce(nonce, seq),
            },
            Self::ChaCha20Poly1305 { key, nonce } => Self::ChaCha20Poly1305 {
                key: *key,
                nonce: xor_nonce(nonce, seq),
            },
        }
    }
}

impl fmt::Debug for AeadMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AeadMaterial")
            .field(&self.aead_id())
            .finish()
    }
}

impl Zeroize for AeadMaterial {
    fn zeroize(&mut self) {
        match self {
            Self::Aes128Gcm { key, nonce } => {
                key.zeroize();
                nonce.zeroize();
            }
            Self::Aes256Gcm { key, nonce } | Self::ChaCha20Poly1305 { key, nonce } => {
                key.zeroize();
                nonce.zeroize();
            }
        }
    }
}

impl Drop for AeadMaterial {
    fn drop(&mut self) {
        self.zeroize();
    }
}
