//! The stateful encryption context produced by the key schedule.
//!
//! Setup does the expensive public-key work once; the context then amortizes
//! it over any number of sealed messages. To keep nonces from ever repeating
//! the context is stateful: a monotonically increasing sequence number is
//! folded into the base nonce for every `seal`/`open`, and the context must
//! therefore be treated as a single-writer value.

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use sealbox_crypto::{kdf, AeadMaterial, CipherSuite, Crypto, Okm, Prk};
use subtle::ConstantTimeEq;

use crate::error::Error;

/// Marker type for a [`Context`] held by the sending party.
#[derive(Debug)]
pub struct Sender;

/// Marker type for a [`Context`] held by the receiving party.
#[derive(Debug)]
pub struct Receiver;

/// A sender-side context: [`seal`](Context::seal) and
/// [`export`](Context::export).
pub type SenderContext<C> = Context<C, Sender>;

/// A receiver-side context: [`open`](Context::open) and
/// [`export`](Context::export).
pub type ReceiverContext<C> = Context<C, Receiver>;

/// The symmetric state both parties share after setup.
///
/// Holds the AEAD key and base nonce (absent for export-only suites), the
/// exporter secret, and the sequence number, plus the backend value used to
/// finish derivations, so a context stays usable independently of the
/// [`Hpke`](crate::Hpke) configuration that produced it.
///
/// Dropping a context wipes its secret fields, best-effort.
pub struct Context<C, Role> {
    pub(crate) cipher_suite: CipherSuite,
    pub(crate) aead: Option<AeadMaterial>,
    pub(crate) seq: u64,
    pub(crate) exporter_secret: Prk,
    pub(crate) crypto_backend: C,
    pub(crate) _role: PhantomData<Role>,
}

impl<C, Role> Context<C, Role> {
    pub(crate) fn new(
        cipher_suite: CipherSuite,
        aead: Option<AeadMaterial>,
        exporter_secret: Prk,
        crypto_backend: C,
    ) -> Self {
        Self {
            cipher_suite,
            aead,
            seq: 0,
            exporter_secret,
            crypto_backend,
            _role: PhantomData,
        }
    }

    /// The nonce the next `seal` or `open` will use:
    ///
    /// ```text
    /// xor(base_nonce, I2OSP(seq, Nn))
    /// ```
    ///
    /// Empty for export-only suites.
    pub fn current_nonce(&self) -> Vec<u8> {
        match &self.aead {
            Some(material) => material.for_message(self.seq).nonce().to_vec(),
            None => Vec::new(),
        }
    }

    /// The number of messages this context has processed.
    pub const fn sequence(&self) -> u64 {
        self.seq
    }

    /// Advances the sequence counter, or fails at the `2^64 - 1` ceiling
    /// without changing anything.
    fn increment_seq(&mut self) -> Result<(), Error> {
        self.seq = self
            .seq
            .checked_add(1)
            .ok_or(Error::SequenceOverflow)?;

        Ok(())
    }
}

impl<C: Crypto> Context<C, Sender> {
    /// Encrypts `pt` with associated data `aad` under the next nonce:
    ///
    /// ```text
    /// def Context.Seal(aad, pt):
    ///   ct = Seal(self.key, self.ComputeNonce(self.seq), aad, pt)
    ///   self.IncrementSeq()
    ///   return ct
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::SequenceOverflow`] once the counter is exhausted; the
    /// ciphertext is *not* surfaced in that case. [`Error::NotImplemented`]
    /// on an export-only context.
    pub fn seal(&mut self, aad: &[u8], pt: &[u8]) -> Result<Vec<u8>, Error> {
        let material = self.aead.as_ref().ok_or(Error::NotImplemented)?;

        let ct = self
            .crypto_backend
            .aead_seal(&material.for_message(self.seq), aad, pt)?;

        self.increment_seq()?;

        Ok(ct)
    }
}

impl<C: Crypto> Context<C, Receiver> {
    /// Verifies and decrypts `ct` with associated data `aad` under the next
    /// nonce:
    ///
    /// ```text
    /// def Context.Open(aad, ct):
    ///   maybe_pt = Open(self.key, self.ComputeNonce(self.seq), aad, ct)
    ///   self.IncrementSeq()
    ///   return maybe_pt
    /// ```
    ///
    /// Authentication failure is the `Ok(None)` result, and the sequence
    /// counter advances *regardless* of it. This mirrors the sender, which
    /// advances on every ciphertext it produces: a reordered, dropped or
    /// forged message surfaces as open failures from that point on instead
    /// of silently desynchronizing the stream. Replay and skip recovery are
    /// the application's business.
    ///
    /// # Errors
    ///
    /// [`Error::SequenceOverflow`] once the counter is exhausted;
    /// [`Error::NotImplemented`] on an export-only context.
    pub fn open(&mut self, aad: &[u8], ct: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let material = self.aead.as_ref().ok_or(Error::NotImplemented)?;

        let maybe_pt = self
            .crypto_backend
            .aead_open(&material.for_message(self.seq), aad, ct)?;

        self.increment_seq()?;

        Ok(maybe_pt)
    }
}

impl<C: Crypto, Role> Context<C, Role> {
    /// Derives `length` bytes of application keying material bound to
    /// `exporter_context`, disjoint from the AEAD key:
    ///
    /// ```text
    /// def Context.Export(exporter_context, L):
    ///   return LabeledExpand(self.exporter_secret, "sec", exporter_context, L)
    /// ```
    ///
    /// Exporting never touches the sequence counter; both parties obtain the
    /// same value no matter how many messages either side has processed.
    ///
    /// # Errors
    ///
    /// [`Error::OutputTooLong`] past the KDF's `255 * Nh` expand limit.
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Okm, Error> {
        kdf::labeled_expand(
            &self.crypto_backend,
            self.cipher_suite.kdf,
            &self.cipher_suite.suite_id(),
            &self.exporter_secret,
            "sec",
            exporter_context,
            length,
        )
        .map_err(Into::into)
    }
}

/// Contexts are equal when their suite bytes, AEAD key and base nonce,
/// exporter secret and sequence number all match. The secret fields are
/// compared in constant time, and the clauses combine without short-circuits.
impl<C, Role> PartialEq for Context<C, Role> {
    fn eq(&self, other: &Self) -> bool {
        let aead = match (&self.aead, &other.aead) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.aead_id() == b.aead_id()
                    && bool::from(a.key().ct_eq(b.key()) & a.nonce().ct_eq(b.nonce()))
            }
            _ => false,
        };

        let suite = self.cipher_suite.suite_id() == other.cipher_suite.suite_id();
        let exporter = bool::from(
            self.exporter_secret
                .as_ref()
                .ct_eq(other.exporter_secret.as_ref()),
        );

        suite & aead & exporter & (self.seq == other.seq)
    }
}

impl<C, Role> Eq for Context<C, Role> {}

/// Secret fields stay out of the rendering.
impl<C, Role> fmt::Debug for Context<C, Role> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cipher_suite", &self.cipher_suite)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}
