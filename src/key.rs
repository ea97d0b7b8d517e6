//! Typed private keys and PKCS#8 handling.
//!
//! The crate deliberately carries no big-number or elliptic-curve
//! arithmetic: public keys are recovered purely by parsing. PKCS#1
//! `RSAPrivateKey` embeds the modulus and public exponent, and SEC1
//! `ECPrivateKey` (used by both NIST curves and SM2) usually embeds the
//! public point.

use crate::{
    kdf::Password,
    oid,
    pbes::{any_from, Scheme},
    Error, Result,
};
use alloc::vec::Vec;
use der::{
    asn1::{BitString, ObjectIdentifier, OctetString},
    Decode, Encode, Sequence,
};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use zeroize::Zeroizing;

/// Named elliptic curves recognised in PKCS#8 key material.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NamedCurve {
    /// NIST P-224
    P224,
    /// NIST P-256
    P256,
    /// NIST P-384
    P384,
    /// NIST P-521
    P521,
}

impl NamedCurve {
    /// Get the Object Identifier (OID) for this curve.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::P224 => oid::SECP224R1,
            Self::P256 => oid::PRIME256V1,
            Self::P384 => oid::SECP384R1,
            Self::P521 => oid::SECP521R1,
        }
    }

    fn from_oid(curve: ObjectIdentifier) -> Option<Self> {
        match curve {
            o if o == oid::SECP224R1 => Some(Self::P224),
            o if o == oid::PRIME256V1 => Some(Self::P256),
            o if o == oid::SECP384R1 => Some(Self::P384),
            o if o == oid::SECP521R1 => Some(Self::P521),
            _ => None,
        }
    }
}

/// A private key extracted from a PFX or a PKCS#8 document.
///
/// Decoders return one of the closed set of variants; callers pattern-match
/// on it. The key material itself is kept as zeroized PKCS#8 DER.
#[derive(Clone, Debug)]
pub enum PrivateKey {
    /// RSA key.
    Rsa(RsaPrivateKey),

    /// ECDSA key on a NIST prime curve.
    Ecdsa(EcdsaPrivateKey),

    /// SM2 key (an EC key on the `sm2p256v1` curve).
    Sm2(Sm2PrivateKey),
}

/// RSA private key material.
#[derive(Clone, Debug)]
pub struct RsaPrivateKey {
    pkcs8: Zeroizing<Vec<u8>>,
}

/// ECDSA private key material with its curve.
#[derive(Clone, Debug)]
pub struct EcdsaPrivateKey {
    curve: NamedCurve,
    pkcs8: Zeroizing<Vec<u8>>,
}

impl EcdsaPrivateKey {
    /// The curve this key lives on.
    pub fn curve(&self) -> NamedCurve {
        self.curve
    }
}

/// SM2 private key material.
#[derive(Clone, Debug)]
pub struct Sm2PrivateKey {
    pkcs8: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    /// Parse a plaintext PKCS#8 `PrivateKeyInfo` document.
    pub fn from_pkcs8_der(der_bytes: &[u8]) -> Result<Self> {
        let info = pkcs8::PrivateKeyInfo::from_der(der_bytes)?;
        let pkcs8_der = Zeroizing::new(der_bytes.to_vec());
        match info.algorithm.oid {
            o if o == oid::RSA_ENCRYPTION => {
                // Validate the embedded RSAPrivateKey now, so decoding can
                // fail early instead of at public-key extraction.
                pkcs1::RsaPrivateKey::from_der(info.private_key)?;
                Ok(Self::Rsa(RsaPrivateKey { pkcs8: pkcs8_der }))
            }
            o if o == oid::EC_PUBLIC_KEY => {
                sec1::EcPrivateKey::from_der(info.private_key)?;
                let curve = algorithm_curve(&info.algorithm)?;
                if curve == oid::SM2_P256 {
                    Ok(Self::Sm2(Sm2PrivateKey { pkcs8: pkcs8_der }))
                } else {
                    let curve = NamedCurve::from_oid(curve).ok_or(Error::Unsupported(curve))?;
                    Ok(Self::Ecdsa(EcdsaPrivateKey {
                        curve,
                        pkcs8: pkcs8_der,
                    }))
                }
            }
            o => Err(Error::Unsupported(o)),
        }
    }

    /// Decrypt and parse a PKCS#8 `EncryptedPrivateKeyInfo` document.
    ///
    /// This is the standalone entry point for encrypted PKCS#8 blobs; it
    /// shares the cipher suites and key derivation of the PFX pipeline.
    pub fn from_encrypted_pkcs8_der(der_bytes: &[u8], password: &str) -> Result<Self> {
        let info = EncryptedPrivateKeyInfo::from_der(der_bytes)?;
        let plaintext = info.decrypt(&Password::new(password))?;
        Self::from_pkcs8_der(&plaintext)
    }

    /// The PKCS#8 `PrivateKeyInfo` encoding of this key.
    pub fn to_pkcs8_der(&self) -> Zeroizing<Vec<u8>> {
        match self {
            Self::Rsa(key) => key.pkcs8.clone(),
            Self::Ecdsa(key) => key.pkcs8.clone(),
            Self::Sm2(key) => key.pkcs8.clone(),
        }
    }

    /// The `SubjectPublicKeyInfo` matching this key.
    ///
    /// Errors with [`Error::UnexpectedStructure`] if the key material does
    /// not carry its public component (possible for EC keys whose PKCS#8
    /// encoding omits the public point).
    pub fn subject_public_key_info(&self) -> Result<SubjectPublicKeyInfoOwned> {
        self.subject_public_key_info_opt()?.ok_or(
            Error::UnexpectedStructure("private key does not carry its public component"),
        )
    }

    /// As [`Self::subject_public_key_info`], but `None` when the public
    /// component is simply absent.
    pub(crate) fn subject_public_key_info_opt(&self) -> Result<Option<SubjectPublicKeyInfoOwned>> {
        let pkcs8_der = self.to_pkcs8_der();
        let info = pkcs8::PrivateKeyInfo::from_der(&pkcs8_der)?;
        match self {
            Self::Rsa(_) => {
                let key = pkcs1::RsaPrivateKey::from_der(info.private_key)?;
                let public_der = key.public_key().to_der()?;
                Ok(Some(SubjectPublicKeyInfoOwned {
                    algorithm: AlgorithmIdentifierOwned {
                        oid: oid::RSA_ENCRYPTION,
                        parameters: Some(crate::pbes::null_any()?),
                    },
                    subject_public_key: BitString::from_bytes(&public_der)?,
                }))
            }
            Self::Ecdsa(_) | Self::Sm2(_) => {
                let curve = algorithm_curve(&info.algorithm)?;
                let key = sec1::EcPrivateKey::from_der(info.private_key)?;
                let Some(point) = key.public_key else {
                    return Ok(None);
                };
                Ok(Some(SubjectPublicKeyInfoOwned {
                    algorithm: AlgorithmIdentifierOwned {
                        oid: oid::EC_PUBLIC_KEY,
                        parameters: Some(any_from(&curve)?),
                    },
                    subject_public_key: BitString::from_bytes(point)?,
                }))
            }
        }
    }
}

/// Extract the named-curve OID from an EC key's `AlgorithmIdentifier`.
fn algorithm_curve(alg: &spki::AlgorithmIdentifierRef<'_>) -> Result<ObjectIdentifier> {
    let params = alg
        .parameters
        .ok_or(Error::UnexpectedStructure("EC key without curve parameters"))?;
    Ok(ObjectIdentifier::from_der(&params.to_der()?)?)
}

/// PKCS#8 `EncryptedPrivateKeyInfo` (RFC 5208 Section 6).
///
/// ```text
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
///     encryptedData        EncryptedData }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EncryptedPrivateKeyInfo {
    /// Password-based encryption scheme protecting `encrypted_data`.
    pub encryption_algorithm: AlgorithmIdentifierOwned,

    /// Encrypted `PrivateKeyInfo` bytes.
    pub encrypted_data: OctetString,
}

impl EncryptedPrivateKeyInfo {
    /// Encrypt a plaintext PKCS#8 document under `scheme`.
    pub fn encrypt(scheme: &Scheme, password: &Password<'_>, pkcs8_der: &[u8]) -> Result<Self> {
        Ok(Self {
            encryption_algorithm: scheme.to_algorithm()?,
            encrypted_data: OctetString::new(scheme.encrypt(password, pkcs8_der)?)?,
        })
    }

    /// Decrypt to the plaintext PKCS#8 document.
    pub fn decrypt(&self, password: &Password<'_>) -> Result<Zeroizing<Vec<u8>>> {
        let scheme = Scheme::from_algorithm(&self.encryption_algorithm)?;
        scheme.decrypt(password, self.encrypted_data.as_bytes())
    }
}
