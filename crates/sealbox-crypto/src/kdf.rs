//! The labeled extract/expand wrappers.
//!
//! These are the only path through which the key schedule, the export
//! interface and the DHKEM construction reach the KDF. Every derived secret
//! is thereby bound to three things: the protocol revision (the `"HPKE-05 "`
//! prefix, trailing space included), the ciphersuite (`suite_id`), and the
//! purpose of the derivation (`label`). The byte layouts below are wire
//! contracts with conforming draft-05 peers and must not be reordered.

use crate::{Crypto, CryptoError, KdfId, Okm, Prk};

/// The draft-05 domain-separation prefix, 8 ASCII bytes.
const VERSION_LABEL: &[u8] = b"HPKE-05 ";

/// `LabeledExtract(salt, label, ikm)`:
///
/// ```text
/// labeled_ikm = concat("HPKE-05 ", suite_id, label, ikm)
/// return Extract(salt, labeled_ikm)
/// ```
///
/// # Errors
///
/// See [`CryptoError`].
pub fn labeled_extract<C: Crypto>(
    backend: &C,
    alg: KdfId,
    suite_id: &[u8],
    salt: &[u8],
    label: &str,
    ikm: &[u8],
) -> Result<Prk, CryptoError> {
    backend.kdf_extract_concated(
        alg,
        salt,
        &[VERSION_LABEL, suite_id, label.as_bytes(), ikm],
    )
}

/// `LabeledExpand(prk, label, info, L)`:
///
/// ```text
/// labeled_info = concat(I2OSP(L, 2), "HPKE-05 ", suite_id, label, info)
/// return Expand(prk, labeled_info, L)
/// ```
///
/// # Errors
///
/// [`CryptoError::OutputTooLong`] for `len > 255 * Nh`; see [`CryptoError`]
/// for the rest.
pub fn labeled_expand<C: Crypto>(
    backend: &C,
    alg: KdfId,
    suite_id: &[u8],
    prk: &Prk,
    label: &str,
    info: &[u8],
    len: usize,
) -> Result<Okm, CryptoError> {
    if len > 255 * alg.n_hash() {
        return Err(CryptoError::OutputTooLong);
    }

    // `len` fits in two bytes: 255 * Nh is at most 16320.
    #[allow(clippy::cast_possible_truncation)]
    let length_prefix = (len as u16).to_be_bytes();

    backend.kdf_expand_multi_info(
        alg,
        prk,
        &[
            &length_prefix,
            VERSION_LABEL,
            suite_id,
            label.as_bytes(),
            info,
        ],
        len,
    )
}
