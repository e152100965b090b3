//! Mode-specific scenarios: what each authentication mechanism actually
//! buys, and how mismatched inputs surface.

#![cfg(feature = "backend-rustcrypto")]

use sealbox::backend::RustCryptoBackend;
use sealbox::{kem, AeadId, CipherSuite, Error, Hpke, KdfId, KemId, PrivateKey, PublicKey};

const SUITE: CipherSuite = CipherSuite {
    kem: KemId::DHKEM_X25519_SHA256,
    kdf: KdfId::HKDF_SHA256,
    aead: AeadId::AES_128_GCM,
};

fn backend() -> RustCryptoBackend {
    RustCryptoBackend::new().unwrap()
}

fn recipient_pair() -> (PrivateKey, PublicKey) {
    kem::generate_key_pair(&mut backend(), SUITE.kem).unwrap()
}

/// Two messages through the most common suite, in order.
#[test]
fn base_mode_hello_world() {
    let hpke = Hpke::new(SUITE);
    let (sk_r, pk_r) = recipient_pair();

    let (enc, mut ctx_s) = hpke.setup_base_s(backend(), &pk_r, b"").unwrap();
    let mut ctx_r = hpke.setup_base_r(backend(), &enc, &sk_r, b"").unwrap();

    let ct_hello = ctx_s.seal(b"", b"Hello").unwrap();
    let ct_world = ctx_s.seal(b"", b"World").unwrap();

    assert_eq!(
        ctx_r.open(b"", &ct_hello).unwrap().as_deref(),
        Some(&b"Hello"[..])
    );
    assert_eq!(
        ctx_r.open(b"", &ct_world).unwrap().as_deref(),
        Some(&b"World"[..])
    );
}

#[test]
fn psk_mode_rejects_a_wrong_psk_silently() {
    let hpke = Hpke::new(SUITE);
    let (sk_r, pk_r) = recipient_pair();

    let (enc, mut ctx_s) = hpke
        .setup_psk_s(backend(), &pk_r, b"", b"0123456789abcdef", b"id")
        .unwrap();

    // Setup succeeds with the wrong PSK; only the derived keys differ.
    let mut ctx_r = hpke
        .setup_psk_r(backend(), &enc, &sk_r, b"", b"fedcba9876543210", b"id")
        .unwrap();

    let ct = ctx_s.seal(b"aad", b"psk protected").unwrap();
    assert_eq!(ctx_r.open(b"aad", &ct).unwrap(), None);

    // And the right PSK opens it.
    let mut ctx_r = hpke
        .setup_psk_r(backend(), &enc, &sk_r, b"", b"0123456789abcdef", b"id")
        .unwrap();
    assert_eq!(
        ctx_r.open(b"aad", &ct).unwrap().as_deref(),
        Some(&b"psk protected"[..])
    );
}

#[test]
fn auth_mode_rejects_a_substituted_sender_key() {
    let hpke = Hpke::new(SUITE);
    let (sk_r, pk_r) = recipient_pair();
    let (sk_s, pk_s) = kem::generate_key_pair(&mut backend(), SUITE.kem).unwrap();
    let (_, pk_mallory) = kem::generate_key_pair(&mut backend(), SUITE.kem).unwrap();

    let (enc, mut ctx_s) = hpke
        .setup_auth_s(backend(), &pk_r, b"", &sk_s)
        .unwrap();

    let mut ctx_r = hpke
        .setup_auth_r(backend(), &enc, &sk_r, b"", &pk_mallory)
        .unwrap();

    let ct = ctx_s.seal(b"", b"authenticated").unwrap();
    assert_eq!(ctx_r.open(b"", &ct).unwrap(), None);

    let mut ctx_r = hpke
        .setup_auth_r(backend(), &enc, &sk_r, b"", &pk_s)
        .unwrap();
    assert_eq!(
        ctx_r.open(b"", &ct).unwrap().as_deref(),
        Some(&b"authenticated"[..])
    );
}

#[test]
fn mismatched_info_strings_never_line_up() {
    let hpke = Hpke::new(SUITE);
    let (sk_r, pk_r) = recipient_pair();

    let (enc, mut ctx_s) = hpke
        .setup_base_s(backend(), &pk_r, b"sender info")
        .unwrap();
    let mut ctx_r = hpke
        .setup_base_r(backend(), &enc, &sk_r, b"receiver info")
        .unwrap();

    let ct = ctx_s.seal(b"", b"bound to info").unwrap();
    assert_eq!(ctx_r.open(b"", &ct).unwrap(), None);
    assert_ne!(
        ctx_s.export(b"exp", 32).unwrap(),
        ctx_r.export(b"exp", 32).unwrap()
    );
}

#[test]
fn psk_setup_rejects_inconsistent_inputs() {
    let hpke = Hpke::new(SUITE);
    let (sk_r, pk_r) = recipient_pair();

    assert_eq!(
        hpke.setup_psk_s(backend(), &pk_r, b"", b"", b"id")
            .unwrap_err(),
        Error::InvalidPskInputs
    );
    assert_eq!(
        hpke.setup_psk_s(backend(), &pk_r, b"", b"0123456789abcdef", b"")
            .unwrap_err(),
        Error::InvalidPskInputs
    );
    assert_eq!(
        hpke.setup_psk_s(backend(), &pk_r, b"", b"", b"").unwrap_err(),
        Error::InvalidPskInputs
    );

    // The receiving half enforces the same rule before touching the KDF.
    let (enc, _) = hpke
        .setup_psk_s(backend(), &pk_r, b"", b"0123456789abcdef", b"id")
        .unwrap();
    assert_eq!(
        hpke.setup_psk_r(backend(), &enc, &sk_r, b"", b"0123456789abcdef", b"")
            .unwrap_err(),
        Error::InvalidPskInputs
    );
}

#[test]
fn x448_suites_error_out_of_setup() {
    let hpke = Hpke::new(CipherSuite {
        kem: KemId::DHKEM_X448_SHA512,
        ..SUITE
    });
    let (_, pk_r) = recipient_pair();

    assert_eq!(
        hpke.setup_base_s(backend(), &pk_r, b"").unwrap_err(),
        Error::UnsupportedAlgorithm
    );
}

#[test]
fn tampered_enc_is_rejected_as_key_material() {
    let hpke = Hpke::new(CipherSuite {
        kem: KemId::DHKEM_P256_SHA256,
        ..SUITE
    });
    let mut backend_r = backend();
    let (sk_r, pk_r) = kem::generate_key_pair(&mut backend_r, KemId::DHKEM_P256_SHA256).unwrap();

    let (enc, _) = hpke.setup_base_s(backend(), &pk_r, b"").unwrap();

    // Corrupt the SEC1 tag byte; the point no longer parses.
    let mut bad = enc.as_ref().to_vec();
    bad[0] = 0xAA;
    let bad_enc = sealbox::EncapKey::new(&bad);

    assert_eq!(
        hpke.setup_base_r(backend_r, &bad_enc, &sk_r, b"").unwrap_err(),
        Error::InvalidKeyMaterial
    );
}
