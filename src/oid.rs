//! Object identifiers used by PKCS#12.
//!
//! Sources: [RFC 7292 Appendix D], [RFC 8018 Appendix C], GB/T 33560 for the
//! ShangMi algorithm arcs, and the Oracle/Java arc for trust-store markers.
//!
//! [RFC 7292 Appendix D]: https://datatracker.ietf.org/doc/html/rfc7292#appendix-D
//! [RFC 8018 Appendix C]: https://datatracker.ietf.org/doc/html/rfc8018#appendix-C

use der::asn1::ObjectIdentifier;

/// `pkcs-12-keyBag` Object Identifier (OID).
pub const KEY_BAG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.1");

/// `pkcs-12-pkcs8ShroudedKeyBag` Object Identifier (OID).
pub const PKCS8_SHROUDED_KEY_BAG: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.2");

/// `pkcs-12-certBag` Object Identifier (OID).
pub const CERT_BAG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.3");

/// `pkcs-12-crlBag` Object Identifier (OID).
pub const CRL_BAG: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.4");

/// `pkcs-12-secretBag` Object Identifier (OID).
pub const SECRET_BAG: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.10.1.5");

/// `x509Certificate` certificate bag type (OID).
pub const X509_CERTIFICATE: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.22.1");

/// `pkcs-7-data` content type (OID).
pub const PKCS7_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");

/// `pkcs-7-signedData` content type (OID). Recognised but not supported.
pub const PKCS7_SIGNED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// `pkcs-7-envelopedData` content type (OID). Recognised but not supported.
pub const PKCS7_ENVELOPED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.3");

/// `pkcs-7-encryptedData` content type (OID).
pub const PKCS7_ENCRYPTED_DATA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.6");

/// `pbeWithSHAAnd3-KeyTripleDES-CBC` Object Identifier (OID).
pub const PBE_WITH_SHA1_AND_3_KEY_TRIPLE_DES_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.3");

/// `pbeWithSHAAnd128BitRC2-CBC` Object Identifier (OID).
pub const PBE_WITH_SHA1_AND_128_BIT_RC2_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.5");

/// `pbeWithSHAAnd40BitRC2-CBC` Object Identifier (OID).
pub const PBE_WITH_SHA1_AND_40_BIT_RC2_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.12.1.6");

/// Password-Based Encryption Scheme 2 (PBES2) OID.
///
/// <https://datatracker.ietf.org/doc/html/rfc8018#section-6.2>
pub const PBES2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.13");

/// Password-Based Key Derivation Function 2 (PBKDF2) OID.
pub const PBKDF2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.12");

/// Password-Based Message Authentication Code 1 (PBMAC1) OID.
///
/// <https://datatracker.ietf.org/doc/html/rfc9579>
pub const PBMAC1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.14");

/// HMAC-SHA-1 (for use with PBKDF2 and PBMAC1).
pub const HMAC_WITH_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.7");

/// HMAC-SHA-256 (for use with PBKDF2 and PBMAC1).
pub const HMAC_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.9");

/// HMAC-SM3 (for use with PBKDF2 and PBMAC1).
pub const HMAC_WITH_SM3: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.156.10197.1.401.2");

/// AES-128 in CBC mode.
pub const AES_128_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2");

/// AES-192 in CBC mode.
pub const AES_192_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.22");

/// AES-256 in CBC mode.
pub const AES_256_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");

/// Three-key triple DES in CBC mode (`des-EDE3-CBC`).
pub const DES_EDE3_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.7");

/// RC2 in CBC mode (`rc2-CBC`), with an explicit effective-key-bits parameter.
pub const RC2_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.3.2");

/// SM4 in CBC mode.
pub const SM4_CBC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.156.10197.1.104.2");

/// SM4 in GCM mode.
pub const SM4_GCM: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.156.10197.1.104.8");

/// SHA-1 digest algorithm.
pub const SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");

/// SHA-256 digest algorithm.
pub const SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

/// SM3 digest algorithm.
pub const SM3: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.156.10197.1.401");

/// PKCS#9 `friendlyName` attribute (BMPString value).
pub const FRIENDLY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.20");

/// PKCS#9 `localKeyID` attribute (OCTET STRING value).
pub const LOCAL_KEY_ID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.21");

/// Oracle `trustedKeyUsage` attribute marking Java trust-store entries.
pub const ORACLE_TRUSTED_KEY_USAGE: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.113894.746875.1.1");

/// `anyExtendedKeyUsage`, the value carried by [`ORACLE_TRUSTED_KEY_USAGE`].
pub const ANY_EXTENDED_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");

/// `rsaEncryption` key algorithm.
pub const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// `id-ecPublicKey` key algorithm.
pub const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// NIST P-224 named curve (`secp224r1`).
pub const SECP224R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.33");

/// NIST P-256 named curve (`prime256v1`).
pub const PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// NIST P-384 named curve (`secp384r1`).
pub const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

/// NIST P-521 named curve (`secp521r1`).
pub const SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// SM2 named curve (`sm2p256v1`).
pub const SM2_P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.156.10197.1.301");

/// X.501 `commonName` attribute type.
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
