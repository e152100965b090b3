//! [`Crypto`] primitives backed by the RustCrypto project crates.
//!
//! # Coverage
//!
//! | KEM | Supported |
//! |:-:|:-:|
//! | DHKEM_P256_SHA256 | ✅ |
//! | DHKEM_P384_SHA384 | ✅ |
//! | DHKEM_P521_SHA512 | ✅ |
//! | DHKEM_X25519_SHA256 | ✅ |
//! | DHKEM_X448_SHA512 | ❌ no maintained implementation |
//!
//! All three KDFs and all three concrete AEADs are supported.

use alloc::vec::Vec;

use aead::{Aead, KeyInit, Payload};
use elliptic_curve::sec1::ToEncodedPoint;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

use crate::{
    AeadId, AeadMaterial, Crypto, CryptoError, KdfId, KemId, Okm, Prk, PrivateKey, PublicKey,
    SharedSecret,
};

/// See the [module-level](self) documentation.
#[derive(Debug, Clone)]
pub struct Backend {
    rng: ChaCha20Rng,
}

impl Backend {
    /// Prepares a backend with a fresh ChaCha20 CSPRNG seeded from the
    /// operating system.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InsufficientRandomness`] if the OS entropy source is
    /// unavailable.
    pub fn new() -> Result<Self, CryptoError> {
        Ok(Self {
            rng: ChaCha20Rng::from_rng(OsRng)
                .map_err(|_| CryptoError::InsufficientRandomness)?,
        })
    }
}

impl Crypto for Backend {
    fn secure_random_fill(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.rng
            .try_fill_bytes(buf)
            .map_err(|_| CryptoError::InsufficientRandomness)
    }

    fn is_kem_supported(&self, alg: KemId) -> bool {
        !matches!(alg, KemId::DHKEM_X448_SHA512)
    }

    fn is_kdf_supported(&self, _alg: KdfId) -> bool {
        true
    }

    fn is_aead_supported(&self, _alg: AeadId) -> bool {
        true
    }

    fn kdf_extract(&self, alg: KdfId, salt: &[u8], ikm: &[u8]) -> Result<Prk, CryptoError> {
        macro_rules! extract {
            ($hash:ty) => {{
                let (prk, _) = hkdf::Hkdf::<$hash>::extract(Some(salt), ikm);
                Ok(Prk::new(prk.as_slice()))
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => extract!(sha2::Sha256),
            KdfId::HKDF_SHA384 => extract!(sha2::Sha384),
            KdfId::HKDF_SHA512 => extract!(sha2::Sha512),
        }
    }

    fn kdf_expand(
        &self,
        alg: KdfId,
        prk: &Prk,
        info: &[u8],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        macro_rules! expand {
            ($hash:ty) => {{
                let hkdf = hkdf::Hkdf::<$hash>::from_prk(prk)
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                let mut okm = Okm::empty();
                hkdf.expand(info, okm.as_mut_buffer(len))
                    .map_err(|_| CryptoError::OutputTooLong)?;
                Ok(okm)
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => expand!(sha2::Sha256),
            KdfId::HKDF_SHA384 => expand!(sha2::Sha384),
            KdfId::HKDF_SHA512 => expand!(sha2::Sha512),
        }
    }

    fn kdf_expand_multi_info(
        &self,
        alg: KdfId,
        prk: &Prk,
        infos: &[&[u8]],
        len: usize,
    ) -> Result<Okm, CryptoError> {
        macro_rules! expand {
            ($hash:ty) => {{
                let hkdf = hkdf::Hkdf::<$hash>::from_prk(prk)
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                let mut okm = Okm::empty();
                hkdf.expand_multi_info(infos, okm.as_mut_buffer(len))
                    .map_err(|_| CryptoError::OutputTooLong)?;
                Ok(okm)
            }};
        }

        match alg {
            KdfId::HKDF_SHA256 => expand!(sha2::Sha256),
            KdfId::HKDF_SHA384 => expand!(sha2::Sha384),
            KdfId::HKDF_SHA512 => expand!(sha2::Sha512),
        }
    }

    fn aead_seal(
        &self,
        material: &AeadMaterial,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        macro_rules! seal {
            ($cipher:ty, $key:expr, $nonce:expr) => {
                <$cipher>::new($key.into())
                    .encrypt(
                        $nonce.into(),
                        Payload {
                            msg: plaintext,
                            aad,
                        },
                    )
                    .map_err(|_| CryptoError::Internal("AEAD seal"))
            };
        }

        match material {
            AeadMaterial::Aes128Gcm { key, nonce } => seal!(aes_gcm::Aes128Gcm, key, nonce),
            AeadMaterial::Aes256Gcm { key, nonce } => seal!(aes_gcm::Aes256Gcm, key, nonce),
            AeadMaterial::ChaCha20Poly1305 { key, nonce } => {
                seal!(chacha20poly1305::ChaCha20Poly1305, key, nonce)
            }
        }
    }

    fn aead_open(
        &self,
        material: &AeadMaterial,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Option<Vec<u8>>, CryptoError> {
        // A ciphertext shorter than the tag cannot authenticate.
        if ciphertext.len() < material.aead_id().n_tag() {
            return Ok(None);
        }

        macro_rules! open {
            ($cipher:ty, $key:expr, $nonce:expr) => {
                <$cipher>::new($key.into())
                    .decrypt(
                        $nonce.into(),
                        Payload {
                            msg: ciphertext,
                            aad,
                        },
                    )
                    .ok()
            };
        }

        Ok(match material {
            AeadMaterial::Aes128Gcm { key, nonce } => open!(aes_gcm::Aes128Gcm, key, nonce),
            AeadMaterial::Aes256Gcm { key, nonce } => open!(aes_gcm::Aes256Gcm, key, nonce),
            AeadMaterial::ChaCha20Poly1305 { key, nonce } => {
                open!(chacha20poly1305::ChaCha20Poly1305, key, nonce)
            }
        })
    }

    fn sk_from_bytes(&self, alg: KemId, bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
        if bytes.len() != alg.n_sk() {
            return Err(CryptoError::InvalidKeyMaterial);
        }

        macro_rules! validate {
            ($curve:ident) => {{
                let sk = $curve::SecretKey::from_slice(bytes)
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;

                PrivateKey::new(alg, sk.to_bytes().as_slice())
            }};
        }

        match alg {
            KemId::DHKEM_P256_SHA256 => validate!(p256),
            KemId::DHKEM_P384_SHA384 => validate!(p384),
            KemId::DHKEM_P521_SHA512 => validate!(p521),
            // Every 32-byte string is a valid X25519 scalar after clamping.
            KemId::DHKEM_X25519_SHA256 => PrivateKey::new(alg, bytes),
            KemId::DHKEM_X448_SHA512 => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    fn pk_from_bytes(&self, alg: KemId, bytes: &[u8]) -> Result<PublicKey, CryptoError> {
        if bytes.len() != alg.n_pk() {
            return Err(CryptoError::InvalidKeyMaterial);
        }

        macro_rules! validate {
            ($curve:ident) => {{
                $curve::PublicKey::from_sec1_bytes(bytes)
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;

                PublicKey::new(alg, bytes)
            }};
        }

        match alg {
            KemId::DHKEM_P256_SHA256 => validate!(p256),
            KemId::DHKEM_P384_SHA384 => validate!(p384),
            KemId::DHKEM_P521_SHA512 => validate!(p521),
            // Every 32-byte string decodes as an X25519 point.
            KemId::DHKEM_X25519_SHA256 => PublicKey::new(alg, bytes),
            KemId::DHKEM_X448_SHA512 => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    fn pk_of(&self, alg: KemId, sk: &PrivateKey) -> Result<PublicKey, CryptoError> {
        macro_rules! public_of {
            ($curve:ident) => {{
                let sk = $curve::SecretKey::from_slice(sk.as_ref())
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;

                PublicKey::new(alg, sk.public_key().to_encoded_point(false).as_bytes())
            }};
        }

        match alg {
            KemId::DHKEM_P256_SHA256 => public_of!(p256),
            KemId::DHKEM_P384_SHA384 => public_of!(p384),
            KemId::DHKEM_P521_SHA512 => public_of!(p521),
            KemId::DHKEM_X25519_SHA256 => {
                let raw: [u8; 32] = sk
                    .as_ref()
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                let sk = x25519_dalek::StaticSecret::from(raw);

                PublicKey::new(alg, x25519_dalek::PublicKey::from(&sk).as_bytes())
            }
            KemId::DHKEM_X448_SHA512 => Err(CryptoError::UnsupportedAlgorithm),
        }
    }

    fn dh(
        &self,
        alg: KemId,
        sk_x: &PrivateKey,
        pk_y: &PublicKey,
    ) -> Result<SharedSecret, CryptoError> {
        macro_rules! ecdh {
            ($curve:ident) => {{
                let sk = $curve::SecretKey::from_slice(sk_x.as_ref())
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                let pk = $curve::PublicKey::from_sec1_bytes(pk_y.as_ref())
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;

                let shared = elliptic_curve::ecdh::diffie_hellman(
                    &sk.to_nonzero_scalar(),
                    pk.as_affine(),
                );

                Ok(SharedSecret::new(shared.raw_secret_bytes().as_slice()))
            }};
        }

        match alg {
            KemId::DHKEM_P256_SHA256 => ecdh!(p256),
            KemId::DHKEM_P384_SHA384 => ecdh!(p384),
            KemId::DHKEM_P521_SHA512 => ecdh!(p521),
            KemId::DHKEM_X25519_SHA256 => {
                let sk: [u8; 32] = sk_x
                    .as_ref()
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;
                let pk: [u8; 32] = pk_y
                    .as_ref()
                    .try_into()
                    .map_err(|_| CryptoError::InvalidKeyMaterial)?;

                let shared = x25519_dalek::StaticSecret::from(sk)
                    .diffie_hellman(&x25519_dalek::PublicKey::from(pk));

                Ok(SharedSecret::new(shared.as_bytes()))
            }
            KemId::DHKEM_X448_SHA512 => Err(CryptoError::UnsupportedAlgorithm),
        }
    }
}
