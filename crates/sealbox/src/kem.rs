//! The DH-based KEM construction and key management.
//!
//! Everything here is generic over the backend's group operations: the
//! DHKEM recipe turns `DH()` exchanges into the fixed-length shared secret
//! the key schedule consumes, via the labeled KDF under the KEM-scoped
//! domain separator `"KEM" || I2OSP(kem_id, 2)`.

use alloc::vec::Vec;

use sealbox_crypto::{
    kdf, Crypto, CryptoError, EncapKey, KemId, PrivateKey, PublicKey, SharedSecret,
};
use zeroize::Zeroizing;

use crate::error::Error;

/// `GenerateKeyPair()`: a fresh random key pair, realized as
/// `DeriveKeyPair(random(Nsk))`.
///
/// # Errors
///
/// See [`Error`].
pub fn generate_key_pair<C: Crypto>(
    backend: &mut C,
    alg: KemId,
) -> Result<(PrivateKey, PublicKey), Error> {
    let mut ikm = Zeroizing::new([0u8; 66]);
    let ikm = &mut ikm[..alg.n_sk()];
    backend.secure_random_fill(ikm)?;

    derive_key_pair(backend, alg, ikm)
}

/// `DeriveKeyPair(ikm)`: deterministic key derivation from input keying
/// material, stable per suite.
///
/// The Montgomery curves take the KDF output as the scalar directly:
///
/// ```text
/// dkp_prk = LabeledExtract("", "dkp_prk", ikm)
/// sk = LabeledExpand(dkp_prk, "sk", "", Nsk)
/// ```
///
/// The NIST curves rejection-sample candidate field elements, masking the
/// leading byte down to the field width first:
///
/// ```text
/// while sk == 0 or sk >= order:
///   bytes = LabeledExpand(dkp_prk, "candidate", I2OSP(counter, 1), Nsk)
///   bytes[0] = bytes[0] & bitmask
///   sk = OS2IP(bytes)
///   counter = counter + 1
/// ```
///
/// # Errors
///
/// [`Error::InvalidKeyMaterial`] if no valid key emerges within 256
/// candidates; see [`Error`] for the rest.
pub fn derive_key_pair<C: Crypto>(
    backend: &C,
    alg: KemId,
    ikm: &[u8],
) -> Result<(PrivateKey, PublicKey), Error> {
    let suite_id = alg.suite_id();
    let kdf_id = alg.kdf_id();

    let dkp_prk = kdf::labeled_extract(backend, kdf_id, &suite_id, &[], "dkp_prk", ikm)?;

    let sk = match alg.sk_bitmask() {
        None => {
            let sk =
                kdf::labeled_expand(backend, kdf_id, &suite_id, &dkp_prk, "sk", &[], alg.n_sk())?;

            backend.sk_from_bytes(alg, &sk)?
        }
        Some(bitmask) => {
            let mut counter = 0u8;

            loop {
                let mut candidate = kdf::labeled_expand(
                    backend,
                    kdf_id,
                    &suite_id,
                    &dkp_prk,
                    "candidate",
                    &counter.to_be_bytes(),
                    alg.n_sk(),
                )?;
                candidate.as_mut_slice()[0] &= bitmask;

                match backend.sk_from_bytes(alg, &candidate) {
                    Ok(sk) => break sk,
                    Err(CryptoError::InvalidKeyMaterial) => {}
                    Err(e) => return Err(e.into()),
                }

                counter = counter
                    .checked_add(1)
                    .ok_or(Error::InvalidKeyMaterial)?;
            }
        }
    };

    let pk = backend.pk_of(alg, &sk)?;

    Ok((sk, pk))
}

/// `SerializePublicKey(pkX)`: public keys are already held in wire form.
pub fn serialize_public(pk: &PublicKey) -> Vec<u8> {
    pk.as_ref().to_vec()
}

/// `DeserializePublicKey(pkXm)`: validates length and point encoding.
///
/// # Errors
///
/// [`Error::InvalidKeyMaterial`] for a malformed encoding.
pub fn deserialize_public<C: Crypto>(
    backend: &C,
    alg: KemId,
    bytes: &[u8],
) -> Result<PublicKey, Error> {
    backend.pk_from_bytes(alg, bytes).map_err(Into::into)
}

/// `SerializePrivateKey(skX)`: the scalar bytes. DHKEM private keys all have
/// a canonical fixed-width encoding.
pub fn serialize_private(sk: &PrivateKey) -> Vec<u8> {
    sk.as_ref().to_vec()
}

/// `DeserializePrivateKey(skXm)`: validates length and scalar range.
///
/// # Errors
///
/// [`Error::InvalidKeyMaterial`] for a malformed encoding.
pub fn deserialize_private<C: Crypto>(
    backend: &C,
    alg: KemId,
    bytes: &[u8],
) -> Result<PrivateKey, Error> {
    backend.sk_from_bytes(alg, bytes).map_err(Into::into)
}

/// `Encap(pkR)`:
///
/// ```text
/// skE, pkE = GenerateKeyPair()
/// dh = DH(skE, pkR)
/// enc = SerializePublicKey(pkE)
/// kem_context = concat(enc, SerializePublicKey(pkR))
/// shared_secret = ExtractAndExpand(dh, kem_context)
/// return shared_secret, enc
/// ```
///
/// # Errors
///
/// See [`Error`].
pub fn encap<C: Crypto>(
    backend: &mut C,
    alg: KemId,
    pk_r: &PublicKey,
) -> Result<(SharedSecret, EncapKey), Error> {
    let (sk_e, pk_e) = generate_key_pair(backend, alg)?;

    let dh = backend.dh(alg, &sk_e, pk_r)?;

    let enc = EncapKey::from_public_key(pk_e);
    let kem_context = [enc.as_ref(), pk_r.as_ref()].concat();

    let shared_secret = extract_and_expand(backend, alg, &dh, &kem_context)?;

    Ok((shared_secret, enc))
}

/// `Decap(enc, skR)`: recovers the shared secret of a matching [`encap`].
///
/// # Errors
///
/// [`Error::InvalidKeyMaterial`] if `enc` is not a valid point encoding; see
/// [`Error`] for the rest.
pub fn decap<C: Crypto>(
    backend: &C,
    alg: KemId,
    enc: &EncapKey,
    sk_r: &PrivateKey,
) -> Result<SharedSecret, Error> {
    let pk_e = backend.pk_from_bytes(alg, enc.as_ref())?;

    let dh = backend.dh(alg, sk_r, &pk_e)?;

    let pk_rm = backend.pk_of(alg, sk_r)?;
    let kem_context = [enc.as_ref(), pk_rm.as_ref()].concat();

    extract_and_expand(backend, alg, &dh, &kem_context)
}

/// `AuthEncap(pkR, skS)`: like [`encap`], with a second exchange against the
/// sender's static key folded in so the recipient can authenticate it:
///
/// ```text
/// dh = concat(DH(skE, pkR), DH(skS, pkR))
/// kem_context = concat(enc, pkRm, pkSm)
/// ```
///
/// # Errors
///
/// See [`Error`].
pub fn auth_encap<C: Crypto>(
    backend: &mut C,
    alg: KemId,
    pk_r: &PublicKey,
    sk_s: &PrivateKey,
) -> Result<(SharedSecret, EncapKey), Error> {
    let (sk_e, pk_e) = generate_key_pair(backend, alg)?;

    let dh_e = backend.dh(alg, &sk_e, pk_r)?;
    let dh_s = backend.dh(alg, sk_s, pk_r)?;
    let dh = Zeroizing::new([dh_e.as_ref(), dh_s.as_ref()].concat());

    let enc = EncapKey::from_public_key(pk_e);
    let pk_sm = backend.pk_of(alg, sk_s)?;
    let kem_context = [enc.as_ref(), pk_r.as_ref(), pk_sm.as_ref()].concat();

    let shared_secret = extract_and_expand(backend, alg, &dh, &kem_context)?;

    Ok((shared_secret, enc))
}

/// `AuthDecap(enc, pkS, skR)`: recovers the shared secret of a matching
/// [`auth_encap`]. The value only agrees with the sender's if `enc` was
/// produced with the private key belonging to `pk_s`.
///
/// # Errors
///
/// See [`Error`].
pub fn auth_decap<C: Crypto>(
    backend: &C,
    alg: KemId,
    enc: &EncapKey,
    pk_s: &PublicKey,
    sk_r: &PrivateKey,
) -> Result<SharedSecret, Error> {
    let pk_e = backend.pk_from_bytes(alg, enc.as_ref())?;

    let dh_e = backend.dh(alg, sk_r, &pk_e)?;
    let dh_s = backend.dh(alg, sk_r, pk_s)?;
    let dh = Zeroizing::new([dh_e.as_ref(), dh_s.as_ref()].concat());

    let pk_rm = backend.pk_of(alg, sk_r)?;
    let kem_context = [enc.as_ref(), pk_rm.as_ref(), pk_s.as_ref()].concat();

    extract_and_expand(backend, alg, &dh, &kem_context)
}

/// `ExtractAndExpand(dh, kem_context)`:
///
/// ```text
/// eae_prk = LabeledExtract("", "eae_prk", dh)
/// shared_secret = LabeledExpand(eae_prk, "shared_secret", kem_context, Nsecret)
/// ```
fn extract_and_expand<C: Crypto>(
    backend: &C,
    alg: KemId,
    dh: &[u8],
    kem_context: &[u8],
) -> Result<SharedSecret, Error> {
    let suite_id = alg.suite_id();
    let kdf_id = alg.kdf_id();

    let eae_prk = kdf::labeled_extract(backend, kdf_id, &suite_id, &[], "eae_prk", dh)?;

    let okm = kdf::labeled_expand(
        backend,
        kdf_id,
        &suite_id,
        &eae_prk,
        "shared_secret",
        kem_context,
        alg.n_secret(),
    )?;

    Ok(SharedSecret::from_okm(okm))
}
