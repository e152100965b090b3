//! Testing the KDF surface and the labeled wrapper layouts.

#![cfg(feature = "backend-rustcrypto")]

use sealbox_crypto::backend::RustCryptoBackend;
use sealbox_crypto::{kdf, Crypto, CryptoError, KdfId};

fn backend() -> RustCryptoBackend {
    RustCryptoBackend::new().unwrap()
}

/// RFC 5869, test case 1 (SHA-256, basic).
#[test]
fn extract_and_expand_match_rfc5869_case_1() {
    let backend = backend();

    let ikm = [0x0b; 22];
    let salt = const_hex::decode("000102030405060708090a0b0c").unwrap();
    let info = const_hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();

    let prk = backend
        .kdf_extract(KdfId::HKDF_SHA256, &salt, &ikm)
        .unwrap();
    assert_eq!(
        const_hex::encode(&*prk),
        "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5"
    );

    let okm = backend
        .kdf_expand(KdfId::HKDF_SHA256, &prk, &info, 42)
        .unwrap();
    assert_eq!(
        const_hex::encode(&*okm),
        "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
    );
}

/// RFC 5869, test case 3 (SHA-256, zero-length salt and info).
#[test]
fn extract_and_expand_match_rfc5869_case_3() {
    let backend = backend();

    let ikm = [0x0b; 22];

    let prk = backend
        .kdf_extract(KdfId::HKDF_SHA256, &[], &ikm)
        .unwrap();
    assert_eq!(
        const_hex::encode(&*prk),
        "19ef24a32c717b167f33a91d6f648bdf96596776afdb6377ac434c1c293ccb04"
    );

    let okm = backend
        .kdf_expand(KdfId::HKDF_SHA256, &prk, &[], 42)
        .unwrap();
    assert_eq!(
        const_hex::encode(&*okm),
        "8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d9d201395faa4b61a96c8"
    );
}

#[test_case::test_matrix([KdfId::HKDF_SHA256, KdfId::HKDF_SHA384, KdfId::HKDF_SHA512])]
fn labeled_extract_is_extract_of_the_labeled_ikm(alg: KdfId) {
    let backend = backend();

    let suite_id = b"HPKE\x00\x20\x00\x01\x00\x03";
    let salt = b"labeled extract salt";
    let ikm = b"labeled extract ikm";

    let labeled = kdf::labeled_extract(&backend, alg, suite_id, salt, "test", ikm).unwrap();

    let mut manual_ikm = Vec::new();
    manual_ikm.extend_from_slice(b"HPKE-05 ");
    manual_ikm.extend_from_slice(suite_id);
    manual_ikm.extend_from_slice(b"test");
    manual_ikm.extend_from_slice(ikm);

    let manual = backend.kdf_extract(alg, salt, &manual_ikm).unwrap();

    assert_eq!(labeled, manual);
}

#[test_case::test_matrix([KdfId::HKDF_SHA256, KdfId::HKDF_SHA384, KdfId::HKDF_SHA512])]
fn labeled_expand_is_expand_of_the_labeled_info(alg: KdfId) {
    let backend = backend();

    let suite_id = b"HPKE\x00\x20\x00\x01\x00\x03";
    let info = b"labeled expand info";
    let prk = kdf::labeled_extract(&backend, alg, suite_id, &[], "prk", b"ikm").unwrap();

    let labeled = kdf::labeled_expand(&backend, alg, suite_id, &prk, "test", info, 77).unwrap();

    let mut manual_info = Vec::new();
    manual_info.extend_from_slice(&77u16.to_be_bytes());
    manual_info.extend_from_slice(b"HPKE-05 ");
    manual_info.extend_from_slice(suite_id);
    manual_info.extend_from_slice(b"test");
    manual_info.extend_from_slice(info);

    let manual = backend.kdf_expand(alg, &prk, &manual_info, 77).unwrap();

    assert_eq!(labeled, manual);
    assert_eq!(labeled.len(), 77);
}

#[test]
fn multi_part_inputs_equal_their_concatenation() {
    let backend = backend();
    let alg = KdfId::HKDF_SHA384;

    let salt = b"salt";
    let ikm = b"0123456789abcdef0123456789abcdef";

    let whole = backend.kdf_extract(alg, salt, ikm).unwrap();
    let parts = backend
        .kdf_extract_concated(alg, salt, &[&ikm[..7], &ikm[7..20], &ikm[20..]])
        .unwrap();
    assert_eq!(whole, parts);

    let info = b"some expansion info";
    let one = backend.kdf_expand(alg, &whole, info, 48).unwrap();
    let many = backend
        .kdf_expand_multi_info(alg, &whole, &[&info[..4], &info[4..]], 48)
        .unwrap();
    assert_eq!(one, many);
}

#[test_case::test_matrix([KdfId::HKDF_SHA256, KdfId::HKDF_SHA384, KdfId::HKDF_SHA512])]
fn expand_enforces_the_output_limit(alg: KdfId) {
    let backend = backend();

    let prk = backend.kdf_extract(alg, b"salt", b"ikm").unwrap();

    let max = 255 * alg.n_hash();
    assert!(kdf::labeled_expand(&backend, alg, b"suite", &prk, "test", b"", max).is_ok());
    assert_eq!(
        kdf::labeled_expand(&backend, alg, b"suite", &prk, "test", b"", max + 1).unwrap_err(),
        CryptoError::OutputTooLong
    );
    assert_eq!(
        backend.kdf_expand(alg, &prk, b"info", max + 1).unwrap_err(),
        CryptoError::OutputTooLong
    );
}
