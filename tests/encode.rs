//! Round-trip tests for the encoder profiles.

use pkcs12::{
    decode, decode_chain, der::Decode, der::Encode, rand_core::{CryptoRng, RngCore},
    to_pem, Certificate, EncoderProfile, Error, PrivateKey,
};

/// RSA PKCS#8 key and its self-signed certificate (DER, via `openssl pkey`
/// / `openssl x509`).
const RSA_KEY_DER: &[u8] = include_bytes!("examples/rsa-key.der");
const RSA_CERT_DER: &[u8] = include_bytes!("examples/rsa-cert.der");

/// CA-signed RSA leaf and the CA certificate.
const LEAF_KEY_DER: &[u8] = include_bytes!("examples/leaf-key.der");
const LEAF_CERT_DER: &[u8] = include_bytes!("examples/leaf-cert.der");
const CA_CERT_DER: &[u8] = include_bytes!("examples/ca-cert.der");

/// ECDSA P-256 key pair.
const P256_KEY_DER: &[u8] = include_bytes!("examples/p256-key.der");
const P256_CERT_DER: &[u8] = include_bytes!("examples/p256-cert.der");

/// SM2 key pair (SM3-signed certificate).
const SM2_KEY_DER: &[u8] = include_bytes!("examples/sm2-key.der");
const SM2_CERT_DER: &[u8] = include_bytes!("examples/sm2-cert.der");

/// Deterministic RNG (splitmix-style) so encoding is reproducible.
struct TestRng(u64);

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), pkcs12::rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for TestRng {}

fn key(der: &[u8]) -> PrivateKey {
    PrivateKey::from_pkcs8_der(der).unwrap()
}

fn cert(der: &[u8]) -> Certificate {
    Certificate::from_der(der).unwrap()
}

fn spki(key: &PrivateKey) -> Vec<u8> {
    key.subject_public_key_info().unwrap().to_der().unwrap()
}

/// Profiles under test, with the password used for each.
fn profiles() -> Vec<(EncoderProfile, &'static str)> {
    vec![
        (EncoderProfile::LEGACY, "password"),
        (EncoderProfile::PASSWORDLESS, ""),
        (EncoderProfile::MODERN_2023, "password"),
        (EncoderProfile::SHANG_MI_2024, "password"),
    ]
}

#[test]
fn every_profile_round_trips_rsa() {
    let key_in = key(RSA_KEY_DER);
    let cert_in = cert(RSA_CERT_DER);
    for (profile, password) in profiles() {
        let pfx = profile
            .encode(&mut TestRng(1), &key_in, &cert_in, &[], password)
            .unwrap();
        let (key_out, cert_out) = decode(&pfx, password).unwrap();
        assert_eq!(cert_out.to_der().unwrap(), RSA_CERT_DER);
        assert_eq!(spki(&key_out), spki(&key_in));
        assert_eq!(key_out.to_pkcs8_der().as_slice(), RSA_KEY_DER);
    }
}

#[test]
fn every_profile_round_trips_p256() {
    let key_in = key(P256_KEY_DER);
    let cert_in = cert(P256_CERT_DER);
    for (profile, password) in profiles() {
        let pfx = profile
            .encode(&mut TestRng(2), &key_in, &cert_in, &[], password)
            .unwrap();
        let (key_out, cert_out) = decode(&pfx, password).unwrap();
        assert_eq!(cert_out.to_der().unwrap(), P256_CERT_DER);
        assert_eq!(spki(&key_out), spki(&key_in));
    }
}

/// Re-encoding SM2 material with the ShangMi profile (SM4-GCM bags and
/// PBMAC1-SM3) preserves every decode invariant.
#[test]
fn shangmi_profile_round_trips_sm2() {
    let key_in = key(SM2_KEY_DER);
    let cert_in = cert(SM2_CERT_DER);
    let pfx = EncoderProfile::SHANG_MI_2024
        .encode(&mut TestRng(3), &key_in, &cert_in, &[], "password")
        .unwrap();
    let (key_out, cert_out) = decode(&pfx, "password").unwrap();
    assert!(matches!(key_out, PrivateKey::Sm2(_)));
    assert_eq!(cert_out.to_der().unwrap(), SM2_CERT_DER);
    assert_eq!(spki(&key_out), spki(&key_in));
}

#[test]
fn wrong_password_fails_for_every_mac_bearing_profile() {
    let key_in = key(RSA_KEY_DER);
    let cert_in = cert(RSA_CERT_DER);
    for (profile, password) in profiles() {
        if profile == EncoderProfile::PASSWORDLESS {
            continue;
        }
        let pfx = profile
            .encode(&mut TestRng(4), &key_in, &cert_in, &[], password)
            .unwrap();
        assert!(matches!(
            decode(&pfx, "wrong password"),
            Err(Error::IncorrectPassword)
        ));
    }
}

#[test]
fn chain_round_trip() {
    let key_in = key(LEAF_KEY_DER);
    let leaf_in = cert(LEAF_CERT_DER);
    let ca_in = cert(CA_CERT_DER);
    let pfx = EncoderProfile::MODERN_2023
        .encode(
            &mut TestRng(5),
            &key_in,
            &leaf_in,
            core::slice::from_ref(&ca_in),
            "password",
        )
        .unwrap();

    // The extra certificate must reject the single-pair decode...
    assert!(matches!(
        decode(&pfx, "password"),
        Err(Error::UnexpectedStructure(_))
    ));

    // ...while the chain decode ties the leaf to the key by localKeyID.
    let (key_out, leaf_out, ca_out) = decode_chain(&pfx, "password").unwrap();
    assert_eq!(leaf_out.to_der().unwrap(), LEAF_CERT_DER);
    assert_eq!(ca_out.len(), 1);
    assert_eq!(ca_out[0].to_der().unwrap(), CA_CERT_DER);
    assert_eq!(spki(&key_out), spki(&key_in));
}

/// A MAC-less container can only be read back with an empty password, so
/// the passwordless profile must refuse a non-empty one up front.
#[test]
fn passwordless_requires_an_empty_password() {
    let key_in = key(RSA_KEY_DER);
    let cert_in = cert(RSA_CERT_DER);
    assert!(matches!(
        EncoderProfile::PASSWORDLESS.encode(&mut TestRng(11), &key_in, &cert_in, &[], "hunter2"),
        Err(Error::UnexpectedStructure(_))
    ));
}

#[test]
fn encoding_is_deterministic_for_a_fixed_rng() {
    let key_in = key(RSA_KEY_DER);
    let cert_in = cert(RSA_CERT_DER);
    let a = EncoderProfile::MODERN_2023
        .encode(&mut TestRng(6), &key_in, &cert_in, &[], "password")
        .unwrap();
    let b = EncoderProfile::MODERN_2023
        .encode(&mut TestRng(6), &key_in, &cert_in, &[], "password")
        .unwrap();
    assert_eq!(a, b);

    let c = EncoderProfile::MODERN_2023
        .encode(&mut TestRng(7), &key_in, &cert_in, &[], "password")
        .unwrap();
    assert_ne!(a, c);
}

#[test]
fn to_pem_emits_typed_blocks_with_linked_key_ids() {
    let key_in = key(RSA_KEY_DER);
    let cert_in = cert(RSA_CERT_DER);
    let pfx = EncoderProfile::MODERN_2023
        .encode(&mut TestRng(8), &key_in, &cert_in, &[], "password")
        .unwrap();

    let blocks = to_pem(&pfx, "password").unwrap();
    assert_eq!(blocks.len(), 2);

    let key_block = blocks.iter().find(|b| b.tag() == "PRIVATE KEY").unwrap();
    let cert_block = blocks.iter().find(|b| b.tag() == "CERTIFICATE").unwrap();
    assert_eq!(key_block.contents(), RSA_KEY_DER);
    assert_eq!(cert_block.contents(), RSA_CERT_DER);

    // The leaf and key carry the same localKeyId header.
    let key_id = key_block.headers().get("localKeyId").unwrap().to_string();
    let cert_id = cert_block.headers().get("localKeyId").unwrap().to_string();
    assert_eq!(key_id, cert_id);
    assert!(!key_id.is_empty());

    // The armor itself parses back.
    let armor = pkcs12::pem::encode(key_block);
    let reparsed = pkcs12::pem::parse(armor).unwrap();
    assert_eq!(reparsed.contents(), RSA_KEY_DER);
}
