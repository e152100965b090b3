//! Testing the group operations of the RustCrypto backend.

#![cfg(feature = "backend-rustcrypto")]

use sealbox_crypto::backend::RustCryptoBackend;
use sealbox_crypto::{Crypto, CryptoError, KemId, PrivateKey};

fn backend() -> RustCryptoBackend {
    RustCryptoBackend::new().unwrap()
}

/// Fills a buffer with random bytes until it validates as a private key.
///
/// For the NIST curves a rejection pass is needed; the P-521 top byte is
/// masked down to one bit so the loop terminates quickly.
fn random_sk(backend: &mut RustCryptoBackend, alg: KemId) -> PrivateKey {
    let mut buf = vec![0u8; alg.n_sk()];

    loop {
        backend.secure_random_fill(&mut buf).unwrap();
        if let Some(mask) = alg.sk_bitmask() {
            buf[0] &= mask;
        }

        if let Ok(sk) = backend.sk_from_bytes(alg, &buf) {
            return sk;
        }
    }
}

/// RFC 7748, section 6.1: the X25519 Diffie-Hellman test vector.
#[test]
fn x25519_matches_rfc7748() {
    let backend = backend();
    let alg = KemId::DHKEM_X25519_SHA256;

    let sk_a = backend
        .sk_from_bytes(
            alg,
            &const_hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap(),
        )
        .unwrap();
    let sk_b = backend
        .sk_from_bytes(
            alg,
            &const_hex::decode("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb")
                .unwrap(),
        )
        .unwrap();

    let pk_a = backend.pk_of(alg, &sk_a).unwrap();
    let pk_b = backend.pk_of(alg, &sk_b).unwrap();

    assert_eq!(
        const_hex::encode(&*pk_a),
        "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
    );
    assert_eq!(
        const_hex::encode(&*pk_b),
        "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f"
    );

    let expected = "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742";
    assert_eq!(
        const_hex::encode(&*backend.dh(alg, &sk_a, &pk_b).unwrap()),
        expected
    );
    assert_eq!(
        const_hex::encode(&*backend.dh(alg, &sk_b, &pk_a).unwrap()),
        expected
    );
}

#[test_case::test_matrix(
    [
        KemId::DHKEM_P256_SHA256,
        KemId::DHKEM_P384_SHA384,
        KemId::DHKEM_P521_SHA512,
        KemId::DHKEM_X25519_SHA256
    ]
)]
fn diffie_hellman_commutes(alg: KemId) {
    let mut backend = backend();
    assert!(backend.is_kem_supported(alg));

    let sk_1 = random_sk(&mut backend, alg);
    let sk_2 = random_sk(&mut backend, alg);
    let pk_1 = backend.pk_of(alg, &sk_1).unwrap();
    let pk_2 = backend.pk_of(alg, &sk_2).unwrap();

    let left = backend.dh(alg, &sk_1, &pk_2).unwrap();
    let right = backend.dh(alg, &sk_2, &pk_1).unwrap();

    assert_eq!(left, right);
}

#[test]
fn malformed_keys_are_rejected() {
    let backend = backend();

    // SEC1 tag byte must be 0x02, 0x03 or 0x04.
    assert_eq!(
        backend
            .pk_from_bytes(KemId::DHKEM_P256_SHA256, &[0xAA; 65])
            .unwrap_err(),
        CryptoError::InvalidKeyMaterial
    );

    // Wrong lengths.
    assert_eq!(
        backend
            .pk_from_bytes(KemId::DHKEM_P256_SHA256, &[0x04; 33])
            .unwrap_err(),
        CryptoError::InvalidKeyMaterial
    );
    assert_eq!(
        backend
            .sk_from_bytes(KemId::DHKEM_X25519_SHA256, &[0x11; 31])
            .unwrap_err(),
        CryptoError::InvalidKeyMaterial
    );

    // The zero scalar is outside the group.
    assert_eq!(
        backend
            .sk_from_bytes(KemId::DHKEM_P256_SHA256, &[0x00; 32])
            .unwrap_err(),
        CryptoError::InvalidKeyMaterial
    );
}

#[test]
fn x448_is_reported_unsupported() {
    let backend = backend();
    let alg = KemId::DHKEM_X448_SHA512;

    assert!(!backend.is_kem_supported(alg));
    assert_eq!(
        backend.sk_from_bytes(alg, &[0x11; 56]).unwrap_err(),
        CryptoError::UnsupportedAlgorithm
    );
    assert_eq!(
        backend.pk_from_bytes(alg, &[0x11; 56]).unwrap_err(),
        CryptoError::UnsupportedAlgorithm
    );
}
