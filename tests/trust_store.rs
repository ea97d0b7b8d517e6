//! Trust-store decoding and encoding tests.

use pkcs12::{
    decode_trust_store, der::Decode, der::Encode, oid, rand_core::{CryptoRng, RngCore},
    Certificate, EncoderProfile, Error,
};

/// Java trust store produced by keytool:
///
/// ```text
/// $ keytool -importcert -noprompt -alias interop-root -file ca.crt \
///     -keystore truststore.p12 -storetype PKCS12 -storepass changeit
/// ```
///
/// One cert bag carrying the Oracle `trustedKeyUsage` attribute, inside
/// PBES2/AES-256-CBC encrypted data, HMAC-SHA-256 MAC with 10000 iterations.
const KEYTOOL_TRUSTSTORE_P12: &[u8] = include_bytes!("examples/truststore.p12");

/// Bare cert bag without keys, encryption or MAC:
///
/// ```text
/// $ openssl pkcs12 -export -nokeys -in ca.crt -certpbe NONE -nomac \
///     -passout pass: -out certonly.p12
/// ```
const CERT_ONLY_P12: &[u8] = include_bytes!("examples/certonly.p12");

/// A key-bearing PFX, which a trust store must reject.
const AES256_P12: &[u8] = include_bytes!("examples/aes256.p12");

const CA_CERT_DER: &[u8] = include_bytes!("examples/ca-cert.der");
const SM2_CA_CERT_DER: &[u8] = include_bytes!("examples/sm2ca-cert.der");

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

#[test]
fn decode_keytool_trust_store() {
    let certs = decode_trust_store(KEYTOOL_TRUSTSTORE_P12, "changeit").unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].to_der().unwrap(), CA_CERT_DER);
}

#[test]
fn decode_bare_cert_bags() {
    let certs = decode_trust_store(CERT_ONLY_P12, "").unwrap();
    assert_eq!(certs.len(), 1);
    assert_eq!(certs[0].to_der().unwrap(), CA_CERT_DER);
}

#[test]
fn key_material_is_rejected() {
    assert!(matches!(
        decode_trust_store(AES256_P12, "password"),
        Err(Error::UnexpectedStructure(_))
    ));
}

#[test]
fn trust_store_round_trips() {
    let ca = Certificate::from_der(CA_CERT_DER).unwrap();
    let sm2_ca = Certificate::from_der(SM2_CA_CERT_DER).unwrap();
    let certs = [ca, sm2_ca];

    for (profile, password) in [
        (EncoderProfile::LEGACY, "password"),
        (EncoderProfile::MODERN_2023, "password"),
        (EncoderProfile::SHANG_MI_2024, "password"),
        (EncoderProfile::PASSWORDLESS, ""),
    ] {
        let pfx = profile
            .encode_trust_store(&mut TestRng(9), &certs, password)
            .unwrap();
        let decoded = decode_trust_store(&pfx, password).unwrap();
        let mut expected: Vec<Vec<u8>> = certs.iter().map(|c| c.to_der().unwrap()).collect();
        let mut actual: Vec<Vec<u8>> = decoded.iter().map(|c| c.to_der().unwrap()).collect();
        expected.sort();
        actual.sort();
        assert_eq!(expected, actual);
    }
}

#[test]
fn passwordless_trust_store_requires_an_empty_password() {
    let ca = Certificate::from_der(CA_CERT_DER).unwrap();
    assert!(matches!(
        EncoderProfile::PASSWORDLESS.encode_trust_store(
            &mut TestRng(12),
            core::slice::from_ref(&ca),
            "hunter2"
        ),
        Err(Error::UnexpectedStructure(_))
    ));
}

/// Encoded trust-store entries carry the Java marker and a friendly name so
/// keytool can list them.
#[test]
fn encoded_entries_carry_the_java_attributes() {
    use pkcs12::{pfx::Pfx, safe_bag::SafeBag};

    let ca = Certificate::from_der(CA_CERT_DER).unwrap();
    let pfx_der = EncoderProfile::PASSWORDLESS
        .encode_trust_store(&mut TestRng(10), core::slice::from_ref(&ca), "")
        .unwrap();

    let pfx = Pfx::from_der(&pfx_der).unwrap();
    let content = pfx.authenticated_content().unwrap();
    let content_infos = Vec::<pkcs12::pfx::ContentInfo>::from_der(&content).unwrap();
    let bags = Vec::<SafeBag>::from_der(&content_infos[0].data_content().unwrap()).unwrap();
    assert_eq!(bags.len(), 1);
    assert_eq!(bags[0].bag_id, oid::CERT_BAG);

    let attrs = bags[0].attributes();
    assert!(attrs.trusted_key_usage);
    assert_eq!(attrs.friendly_name.as_deref(), Some("Interop Test Root CA"));
}
