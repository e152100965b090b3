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

pub mod context;
pub mod error;
pub mod kem;

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

pub use sealbox_crypto::*;

pub use crate::context::{Context, Receiver, ReceiverContext, Sender, SenderContext};
pub use crate::error::Error;

/// An HPKE configuration: a ciphersuite committed to at construction.
///
/// The value is immutable and freely shareable; every `setup_*` call takes
/// its own backend value and hands it to the context it creates, so contexts
/// produced here never synchronize with each other or with this
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct Hpke<C> {
    cipher_suite: CipherSuite,

    _backend: PhantomData<C>,
}

impl<C: Crypto> Hpke<C> {
    /// A configuration for the given ciphersuite.
    pub const fn new(cipher_suite: CipherSuite) -> Self {
        Self {
            cipher_suite,
            _backend: PhantomData,
        }
    }

    /// A configuration from raw IANA code points.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedAlgorithm`] if any code point is outside its
    /// registry.
    pub fn from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self, Error> {
        Ok(Self::new(CipherSuite {
            kem: KemId::try_from_int(kem)?,
            kdf: KdfId::try_from_int(kdf)?,
            aead: AeadId::try_from_int(aead)?,
        }))
    }

    /// The ciphersuite this configuration commits to.
    pub const fn cipher_suite(&self) -> CipherSuite {
        self.cipher_suite
    }

    /// `SetupBaseS(pkR, info)`: encryption to a public key.
    ///
    /// ```text
    /// shared_secret, enc = Encap(pkR)
    /// return enc, KeySchedule(mode_base, shared_secret, info,
    ///                         default_psk, default_psk_id)
    /// ```
    ///
    /// Returns the encapsulation to transmit alongside the ciphertexts, and
    /// the sender context.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn setup_base_s(
        &self,
        mut backend: C,
        pk_r: &PublicKey,
        info: &[u8],
    ) -> Result<(EncapKey, SenderContext<C>), Error> {
        let (shared_secret, enc) = kem::encap(&mut backend, self.cipher_suite.kem, pk_r)?;

        let context = self.key_schedule(backend, Mode::Base, &shared_secret, info, &[], &[])?;

        Ok((enc, context))
    }

    /// `SetupBaseR(enc, skR, info)`: the receiving half of
    /// [`setup_base_s`](Self::setup_base_s).
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn setup_base_r(
        &self,
        backend: C,
        enc: &EncapKey,
        sk_r: &PrivateKey,
        info: &[u8],
    ) -> Result<ReceiverContext<C>, Error> {
        let shared_secret = kem::decap(&backend, self.cipher_suite.kem, enc, sk_r)?;

        self.key_schedule(backend, Mode::Base, &shared_secret, info, &[], &[])
    }

    /// `SetupPSKS(pkR, info, psk, psk_id)`: base-mode encryption with a
    /// pre-shared key mixed into the key schedule, letting the recipient
    /// authenticate that the sender held `psk`.
    ///
    /// Both `psk` and `psk_id` must be non-empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPskInputs`] for an inconsistent PSK pair; see
    /// [`Error`] for the rest.
    pub fn setup_psk_s(
        &self,
        mut backend: C,
        pk_r: &PublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<(EncapKey, SenderContext<C>), Error> {
        let (shared_secret, enc) = kem::encap(&mut backend, self.cipher_suite.kem, pk_r)?;

        let context = self.key_schedule(backend, Mode::Psk, &shared_secret, info, psk, psk_id)?;

        Ok((enc, context))
    }

    /// `SetupPSKR(enc, skR, info, psk, psk_id)`: the receiving half of
    /// [`setup_psk_s`](Self::setup_psk_s).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPskInputs`] for an inconsistent PSK pair; see
    /// [`Error`] for the rest.
    pub fn setup_psk_r(
        &self,
        backend: C,
        enc: &EncapKey,
        sk_r: &PrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<ReceiverContext<C>, Error> {
        let shared_secret = kem::decap(&backend, self.cipher_suite.kem, enc, sk_r)?;

        self.key_schedule(backend, Mode::Psk, &shared_secret, info, psk, psk_id)
    }

    /// `SetupAuthS(pkR, info, skS)`: encryption authenticated by the
    /// sender's KEM key pair. The recipient derives the same context only if
    /// the encapsulation really was produced with `sk_s`.
    ///
    /// This authenticates the key pair and nothing else; an application that
    /// wants ciphertexts bound to a higher-level identity should fold that
    /// identity into `info`.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn setup_auth_s(
        &self,
        mut backend: C,
        pk_r: &PublicKey,
        info: &[u8],
        sk_s: &PrivateKey,
    ) -> Result<(EncapKey, SenderContext<C>), Error> {
        let (shared_secret, enc) =
            kem::auth_encap(&mut backend, self.cipher_suite.kem, pk_r, sk_s)?;

        let context = self.key_schedule(backend, Mode::Auth, &shared_secret, info, &[], &[])?;

        Ok((enc, context))
    }

    /// `SetupAuthR(enc, skR, info, pkS)`: the receiving half of
    /// [`setup_auth_s`](Self::setup_auth_s).
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn setup_auth_r(
        &self,
        backend: C,
        enc: &EncapKey,
        sk_r: &PrivateKey,
        info: &[u8],
        pk_s: &PublicKey,
    ) -> Result<ReceiverContext<C>, Error> {
        let shared_secret = kem::auth_decap(&backend, self.cipher_suite.kem, enc, pk_s, sk_r)?;

        self.key_schedule(backend, Mode::Auth, &shared_secret, info, &[], &[])
    }

    /// `SetupAuthPSKS(pkR, info, psk, psk_id, skS)`: both authentication
    /// mechanisms at once: the authenticated KEM variant plus the PSK in
    /// the key schedule.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPskInputs`] for an inconsistent PSK pair; see
    /// [`Error`] for the rest.
    pub fn setup_auth_psk_s(
        &self,
        mut backend: C,
        pk_r: &PublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        sk_s: &PrivateKey,
    ) -> Result<(EncapKey, SenderContext<C>), Error> {
        let (shared_secret, enc) =
            kem::auth_encap(&mut backend, self.cipher_suite.kem, pk_r, sk_s)?;

        let context =
            self.key_schedule(backend, Mode::AuthPsk, &shared_secret, info, psk, psk_id)?;

        Ok((enc, context))
    }

    /// `SetupAuthPSKR(enc, skR, info, psk, psk_id, pkS)`: the receiving half
    /// of [`setup_auth_psk_s`](Self::setup_auth_psk_s).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPskInputs`] for an inconsistent PSK pair; see
    /// [`Error`] for the rest.
    pub fn setup_auth_psk_r(
        &self,
        backend: C,
        enc: &EncapKey,
        sk_r: &PrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        pk_s: &PublicKey,
    ) -> Result<ReceiverContext<C>, Error> {
        let shared_secret = kem::auth_decap(&backend, self.cipher_suite.kem, enc, pk_s, sk_r)?;

        self.key_schedule(backend, Mode::AuthPsk, &shared_secret, info, psk, psk_id)
    }

    /// `VerifyPSKInputs(mode, psk, psk_id)`: a PSK and its id come together
    /// or not at all, and only in the modes that carry them. The defaults
    /// are the empty string.
    const fn verify_psk_inputs(mode: Mode, psk: &[u8], psk_id: &[u8]) -> Result<(), Error> {
        let got_psk = !psk.is_empty();
        let got_psk_id = !psk_id.is_empty();

        if got_psk != got_psk_id {
            return Err(Error::InvalidPskInputs);
        }

        if got_psk && matches!(mode, Mode::Base | Mode::Auth) {
            return Err(Error::InvalidPskInputs);
        }

        if !got_psk && matches!(mode, Mode::Psk | Mode::AuthPsk) {
            return Err(Error::InvalidPskInputs);
        }

        Ok(())
    }

    /// The draft-05 key schedule:
    ///
    /// ```text
    /// def KeySchedule(mode, shared_secret, info, psk, psk_id):
    ///   VerifyPSKInputs(mode, psk, psk_id)
    ///
    ///   psk_id_hash = LabeledExtract("", "psk_id_hash", psk_id)
    ///   info_hash = LabeledExtract("", "info_hash", info)
    ///   key_schedule_context = concat(mode, psk_id_hash, info_hash)
    ///
    ///   psk_hash = LabeledExtract("", "psk_hash", psk)
    ///   secret = LabeledExtract(psk_hash, "secret", shared_secret)
    ///
    ///   key = LabeledExpand(secret, "key", key_schedule_context, Nk)
    ///   nonce = LabeledExpand(secret, "nonce", key_schedule_context, Nn)
    ///   exporter_secret = LabeledExpand(secret, "exp", key_schedule_context, Nh)
    ///
    ///   return Context(key, nonce, 0, exporter_secret)
    /// ```
    ///
    /// Note the draft-05 shape, frozen here for wire compatibility: the PSK
    /// enters as `psk_hash`, which then *salts* the extraction of `secret`
    /// from the KEM shared secret, and the expand labels are `"nonce"` and
    /// `"exp"`. Later revisions moved these around; mixing revisions breaks
    /// interoperability.
    pub(crate) fn key_schedule<Role>(
        &self,
        backend: C,
        mode: Mode,
        shared_secret: &SharedSecret,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<Context<C, Role>, Error> {
        Self::verify_psk_inputs(mode, psk, psk_id)?;

        let suite_id = self.cipher_suite.suite_id();
        let kdf_id = self.cipher_suite.kdf;

        let psk_id_hash =
            kdf::labeled_extract(&backend, kdf_id, &suite_id, &[], "psk_id_hash", psk_id)?;
        let info_hash = kdf::labeled_extract(&backend, kdf_id, &suite_id, &[], "info_hash", info)?;

        let mut key_schedule_context =
            Vec::with_capacity(1 + psk_id_hash.len() + info_hash.len());
        key_schedule_context.push(mode as u8);
        key_schedule_context.extend_from_slice(&psk_id_hash);
        key_schedule_context.extend_from_slice(&info_hash);

        let psk_hash = kdf::labeled_extract(&backend, kdf_id, &suite_id, &[], "psk_hash", psk)?;
        let secret =
            kdf::labeled_extract(&backend, kdf_id, &suite_id, &psk_hash, "secret", shared_secret)?;

        let key = kdf::labeled_expand(
            &backend,
            kdf_id,
            &suite_id,
            &secret,
            "key",
            &key_schedule_context,
            self.cipher_suite.aead.n_key(),
        )?;
        let nonce = kdf::labeled_expand(
            &backend,
            kdf_id,
            &suite_id,
            &secret,
            "nonce",
            &key_schedule_context,
            self.cipher_suite.aead.n_nonce(),
        )?;
        let exporter_secret = kdf::labeled_expand(
            &backend,
            kdf_id,
            &suite_id,
            &secret,
            "exp",
            &key_schedule_context,
            kdf_id.n_hash(),
        )?;

        let aead = AeadMaterial::new(self.cipher_suite.aead, &key, &nonce)?;

        Ok(Context::new(
            self.cipher_suite,
            aead,
            Prk::from_okm(exporter_secret),
            backend,
        ))
    }
}

/// The HPKE mode byte.
///
/// | Mode | Value |
/// |:-:|:-:|
/// | base | 0x00 |
/// | psk | 0x01 |
/// | auth | 0x02 |
/// | auth_psk | 0x03 |
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Base mode.
    Base = 0x00,

    /// Pre-shared key mode.
    Psk = 0x01,

    /// Asymmetrically authenticated mode.
    Auth = 0x02,

    /// PSK and asymmetric authentication combined.
    AuthPsk = 0x03,
}

impl Mode {
    /// Looks a mode up by its wire byte.
    ///
    /// # Errors
    ///
    /// [`UnknownMode`] for anything past 0x03.
    pub const fn try_from_int(value: u8) -> Result<Self, UnknownMode> {
        match value {
            0x00 => Ok(Self::Base),
            0x01 => Ok(Self::Psk),
            0x02 => Ok(Self::Auth),
            0x03 => Ok(Self::AuthPsk),
            other => Err(UnknownMode(other)),
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = UnknownMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from_int(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Mode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;

        Mode::try_from_int(value).map_err(serde::de::Error::custom)
    }
}

/// Error indicating a mode byte outside the defined range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMode(pub u8);

impl core::error::Error for UnknownMode {}

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HPKE mode: {:#04x}", self.0)
    }
}
