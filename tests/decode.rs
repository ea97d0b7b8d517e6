//! PFX decoding tests against OpenSSL-generated containers.

use pkcs12::{
    der::Encode, decode, decode_chain, oid, Certificate, Error, NamedCurve, PrivateKey,
};

/// RSA key + self-signed cert, legacy suites, generated with:
///
/// ```text
/// $ openssl pkcs12 -export -legacy -inkey rsa.key -in rsa.crt -passout pass:password -out legacy.p12
/// ```
///
/// Certificate bags: pbeWithSHAAnd40BitRC2-CBC; shrouded key:
/// pbeWithSHAAnd3-KeyTripleDES-CBC; MAC: HMAC-SHA-1, 2048 iterations.
const LEGACY_P12: &[u8] = include_bytes!("examples/legacy.p12");

/// Same key pair, modern suites, generated with:
///
/// ```text
/// $ openssl pkcs12 -export -inkey rsa.key -in rsa.crt -certpbe AES-256-CBC \
///     -keypbe AES-256-CBC -iter 2000 -macalg sha256 -macsaltlen 16 \
///     -passout pass:password -out aes256.p12
/// ```
const AES256_P12: &[u8] = include_bytes!("examples/aes256.p12");

/// PBMAC1 container (PBKDF2-HMAC-SHA-256, key length 32), generated with:
///
/// ```text
/// $ openssl pkcs12 -export -inkey rsa.key -in rsa.crt -certpbe AES-256-CBC \
///     -keypbe AES-256-CBC -iter 2000 -pbmac1_pbkdf2 -pbmac1_pbkdf2_md sha256 \
///     -passout pass:password -out pbmac1.p12
/// ```
const PBMAC1_P12: &[u8] = include_bytes!("examples/pbmac1.p12");

/// CA-signed leaf plus the CA certificate (`-certfile ca.crt`).
const CHAIN_P12: &[u8] = include_bytes!("examples/chain.p12");

/// Exported with an empty password (`-passout pass:`), MAC present.
const EMPTY_PASSWORD_P12: &[u8] = include_bytes!("examples/emptypass.p12");

/// Exported with `-nomac -passout pass:`: no integrity protection.
const NO_MAC_P12: &[u8] = include_bytes!("examples/nomac.p12");

/// Exported with `-nomaciter`: MacData `iterations` omitted (DEFAULT 1).
const MAC_ITER_1_P12: &[u8] = include_bytes!("examples/maciter1.p12");

/// ECDSA P-256 key, AES-128 cert bags, AES-192 shrouded key, SHA-1 MAC.
const P256_P12: &[u8] = include_bytes!("examples/p256.p12");

/// SM2 key + SM3 self-signed cert, PBES2/SM4-CBC, SM3 MAC, generated with:
///
/// ```text
/// $ openssl pkcs12 -export -inkey sm2.key -in sm2.crt -certpbe SM4-CBC \
///     -keypbe SM4-CBC -iter 1000 -macalg sm3 -passout pass:123456 -out sm2-sm4.p12
/// ```
const SM2_SM4_P12: &[u8] = include_bytes!("examples/sm2-sm4.p12");

/// SM2 leaf signed by an SM2 CA, with the CA certificate included.
const SM2_CHAIN_P12: &[u8] = include_bytes!("examples/sm2-chain.p12");

fn common_name(cert: &Certificate) -> Option<String> {
    for rdn in cert.tbs_certificate.subject.0.iter() {
        for atv in rdn.0.iter() {
            if atv.oid == oid::COMMON_NAME {
                return core::str::from_utf8(atv.value.value())
                    .ok()
                    .map(Into::into);
            }
        }
    }
    None
}

fn assert_key_matches(key: &PrivateKey, cert: &Certificate) {
    assert_eq!(
        key.subject_public_key_info().unwrap().to_der().unwrap(),
        cert.tbs_certificate
            .subject_public_key_info
            .to_der()
            .unwrap()
    );
}

#[test]
fn decode_legacy_rc2_and_3des() {
    let (key, cert) = decode(LEGACY_P12, "password").unwrap();
    assert_eq!(common_name(&cert).as_deref(), Some("pkcs12.example.test"));
    assert!(matches!(key, PrivateKey::Rsa(_)));
    assert_key_matches(&key, &cert);
}

#[test]
fn decode_pbes2_aes256() {
    let (key, cert) = decode(AES256_P12, "password").unwrap();
    assert_eq!(common_name(&cert).as_deref(), Some("pkcs12.example.test"));
    assert!(matches!(key, PrivateKey::Rsa(_)));
    assert_key_matches(&key, &cert);

    // A single-pair container decodes as a chain with no CA certificates.
    let (_, _, ca_certs) = decode_chain(AES256_P12, "password").unwrap();
    assert!(ca_certs.is_empty());
}

#[test]
fn decode_pbmac1() {
    let (key, cert) = decode(PBMAC1_P12, "password").unwrap();
    assert_key_matches(&key, &cert);
}

#[test]
fn wrong_password_is_rejected_by_the_mac() {
    for pfx in [LEGACY_P12, AES256_P12, PBMAC1_P12] {
        assert!(matches!(
            decode(pfx, "not the password"),
            Err(Error::IncorrectPassword)
        ));
    }
}

#[test]
fn chain_certificates_reject_plain_decode() {
    assert!(matches!(
        decode(CHAIN_P12, "password"),
        Err(Error::UnexpectedStructure(_))
    ));
}

#[test]
fn decode_chain_selects_leaf_by_local_key_id() {
    let (key, leaf, ca_certs) = decode_chain(CHAIN_P12, "password").unwrap();
    assert_eq!(common_name(&leaf).as_deref(), Some("leaf.example.test"));
    assert_eq!(ca_certs.len(), 1);
    assert_eq!(
        common_name(&ca_certs[0]).as_deref(),
        Some("Interop Test Root CA")
    );
    assert_key_matches(&key, &leaf);
}

#[test]
fn decode_with_empty_password() {
    let (key, cert) = decode(EMPTY_PASSWORD_P12, "").unwrap();
    assert_key_matches(&key, &cert);
}

#[test]
fn mac_absence_is_tolerated_only_without_password() {
    let (key, cert) = decode(NO_MAC_P12, "").unwrap();
    assert_key_matches(&key, &cert);
}

#[test]
fn absent_mac_iterations_default_to_one() {
    let (key, cert) = decode(MAC_ITER_1_P12, "password").unwrap();
    assert_key_matches(&key, &cert);
}

#[test]
fn decode_ecdsa_p256() {
    let (key, cert) = decode(P256_P12, "password").unwrap();
    match &key {
        PrivateKey::Ecdsa(ec) => assert_eq!(ec.curve(), NamedCurve::P256),
        other => panic!("expected an ECDSA key, got {:?}", other),
    }
    assert_key_matches(&key, &cert);
}

#[test]
fn decode_shangmi_sm4_cbc() {
    let (key, cert) = decode(SM2_SM4_P12, "123456").unwrap();
    assert_eq!(common_name(&cert).as_deref(), Some("sm2.example.test"));
    assert!(matches!(key, PrivateKey::Sm2(_)));
    assert_key_matches(&key, &cert);
}

#[test]
fn decode_shangmi_chain() {
    let (key, leaf, ca_certs) = decode_chain(SM2_CHAIN_P12, "123456").unwrap();
    assert_eq!(common_name(&leaf).as_deref(), Some("sm2-leaf.example.test"));
    assert!(!ca_certs.is_empty());
    assert!(matches!(key, PrivateKey::Sm2(_)));
    assert_key_matches(&key, &leaf);
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut pfx = AES256_P12.to_vec();
    pfx.push(0x00);
    assert!(matches!(decode(&pfx, "password"), Err(Error::Asn1(_))));
}

#[test]
fn truncated_input_is_rejected() {
    let pfx = &AES256_P12[..AES256_P12.len() - 7];
    assert!(matches!(decode(pfx, "password"), Err(Error::Asn1(_))));
}
