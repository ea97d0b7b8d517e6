//! PFX integrity protection.
//!
//! Two constructions are supported: the legacy PKCS#12 MAC (HMAC keyed via
//! the v1 KDF with purpose byte 3, over SHA-1, SHA-256 or SM3) and PBMAC1 of
//! [RFC 9579] (PBKDF2-derived key plus an explicit HMAC scheme). The MAC
//! covers the DER content bytes of the authenticated `data` ContentInfo, not
//! the whole PFX.
//!
//! [RFC 9579]: https://datatracker.ietf.org/doc/html/rfc9579

use crate::{
    kdf::{self, KeyPurpose, Password},
    oid,
    pbes::{any_from, decode_params, null_any, derive_pbkdf2, Pbkdf2Params, Pbkdf2Prf},
    Error, Result,
};
use alloc::vec::Vec;
use der::{asn1::OctetString, Sequence};
use digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use sm3::Sm3;
use spki::AlgorithmIdentifierOwned;
use zeroize::Zeroizing;

/// `DigestInfo` as used inside [`MacData`].
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct DigestInfo {
    /// MAC algorithm: a digest OID for the legacy construction, or `pbmac1`.
    pub algorithm: AlgorithmIdentifierOwned,

    /// The MAC value itself.
    pub digest: OctetString,
}

/// PKCS#12 `MacData` (RFC 7292 Section 4).
///
/// ```text
/// MacData ::= SEQUENCE {
///     mac         DigestInfo,
///     macSalt     OCTET STRING,
///     iterations  INTEGER DEFAULT 1 }
/// ```
///
/// Files in the wild omit `iterations` when it is 1; decoding preserves that
/// default. Every profile this crate writes uses a count of at least 2048,
/// so the integer is always explicit on encode.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct MacData {
    /// MAC algorithm and value.
    pub mac: DigestInfo,

    /// KDF salt.
    pub mac_salt: OctetString,

    /// KDF iteration count.
    #[asn1(default = "default_mac_iterations")]
    pub iterations: u32,
}

fn default_mac_iterations() -> u32 {
    1
}

impl MacData {
    /// Verify the MAC over `content` (the authenticated `data` bytes).
    ///
    /// Comparison is constant-time; any mismatch is reported as
    /// [`Error::IncorrectPassword`] so a MAC failure cannot be told apart
    /// from a wrong password.
    pub fn verify(&self, content: &[u8], password: &Password<'_>) -> Result<()> {
        let tag = self.mac.digest.as_bytes();
        let salt = self.mac_salt.as_bytes();
        match self.mac.algorithm.oid {
            o if o == oid::SHA1 => {
                let key = legacy_key::<Sha1>(password, salt, self.iterations, 20)?;
                verify_tag::<Hmac<Sha1>>(&key, content, tag)
            }
            o if o == oid::SHA256 => {
                let key = legacy_key::<Sha256>(password, salt, self.iterations, 32)?;
                verify_tag::<Hmac<Sha256>>(&key, content, tag)
            }
            o if o == oid::SM3 => {
                let key = legacy_key::<Sm3>(password, salt, self.iterations, 32)?;
                verify_tag::<Hmac<Sm3>>(&key, content, tag)
            }
            o if o == oid::PBMAC1 => {
                let params = Pbmac1Parameters::from_algorithm(&self.mac.algorithm)?;
                let key = params.derive_key(password)?;
                match params.scheme {
                    Pbkdf2Prf::HmacWithSha1 => verify_tag::<Hmac<Sha1>>(&key, content, tag),
                    Pbkdf2Prf::HmacWithSha256 => verify_tag::<Hmac<Sha256>>(&key, content, tag),
                    Pbkdf2Prf::HmacWithSm3 => verify_tag::<Hmac<Sm3>>(&key, content, tag),
                }
            }
            o => Err(Error::Unsupported(o)),
        }
    }

    /// Compute a legacy PKCS#12 MAC over `content`.
    pub fn create_legacy(
        digest_oid: der::asn1::ObjectIdentifier,
        salt: Vec<u8>,
        iterations: u32,
        content: &[u8],
        password: &Password<'_>,
    ) -> Result<Self> {
        let tag = match digest_oid {
            o if o == oid::SHA1 => {
                let key = legacy_key::<Sha1>(password, &salt, iterations, 20)?;
                compute_tag::<Hmac<Sha1>>(&key, content)?
            }
            o if o == oid::SHA256 => {
                let key = legacy_key::<Sha256>(password, &salt, iterations, 32)?;
                compute_tag::<Hmac<Sha256>>(&key, content)?
            }
            o if o == oid::SM3 => {
                let key = legacy_key::<Sm3>(password, &salt, iterations, 32)?;
                compute_tag::<Hmac<Sm3>>(&key, content)?
            }
            o => return Err(Error::Unsupported(o)),
        };
        Ok(Self {
            mac: DigestInfo {
                algorithm: AlgorithmIdentifierOwned {
                    oid: digest_oid,
                    parameters: Some(null_any()?),
                },
                digest: OctetString::new(tag)?,
            },
            mac_salt: OctetString::new(salt)?,
            iterations,
        })
    }

    /// Compute a PBMAC1 MAC over `content`.
    pub fn create_pbmac1(
        params: Pbmac1Parameters,
        content: &[u8],
        password: &Password<'_>,
    ) -> Result<Self> {
        let key = params.derive_key(password)?;
        let tag = match params.scheme {
            Pbkdf2Prf::HmacWithSha1 => compute_tag::<Hmac<Sha1>>(&key, content)?,
            Pbkdf2Prf::HmacWithSha256 => compute_tag::<Hmac<Sha256>>(&key, content)?,
            Pbkdf2Prf::HmacWithSm3 => compute_tag::<Hmac<Sm3>>(&key, content)?,
        };
        let salt = params.kdf.salt.clone();
        Ok(Self {
            mac: DigestInfo {
                algorithm: params.to_algorithm()?,
                digest: OctetString::new(tag)?,
            },
            // PBMAC1 carries its salt inside the PBKDF2 parameters; the
            // outer macSalt is still required by the MacData grammar.
            mac_salt: OctetString::new(salt)?,
            iterations: params.kdf.iterations,
        })
    }
}

/// PBMAC1 parameters (RFC 9579 Section 4).
///
/// ```text
/// PBMAC1-params ::= SEQUENCE {
///     keyDerivationFunc AlgorithmIdentifier {{PBMAC1-KDFs}},
///     messageAuthScheme AlgorithmIdentifier {{PBMAC1-MACs}} }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pbmac1Parameters {
    /// PBKDF2 key derivation parameters.
    pub kdf: Pbkdf2Params,

    /// Message authentication scheme (an HMAC selector).
    pub scheme: Pbkdf2Prf,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct Pbmac1ParamsAsn1 {
    kdf: AlgorithmIdentifierOwned,
    message_auth_scheme: AlgorithmIdentifierOwned,
}

impl Pbmac1Parameters {
    fn from_algorithm(alg: &AlgorithmIdentifierOwned) -> Result<Self> {
        let params: Pbmac1ParamsAsn1 = decode_params(alg.parameters.as_ref())?;
        Ok(Self {
            kdf: Pbkdf2Params::from_algorithm(&params.kdf)?,
            scheme: Pbkdf2Prf::from_algorithm(&params.message_auth_scheme)?,
        })
    }

    fn to_algorithm(&self) -> Result<AlgorithmIdentifierOwned> {
        let params = Pbmac1ParamsAsn1 {
            kdf: self.kdf.to_algorithm()?,
            message_auth_scheme: self.scheme.to_algorithm()?,
        };
        Ok(AlgorithmIdentifierOwned {
            oid: oid::PBMAC1,
            parameters: Some(any_from(&params)?),
        })
    }

    /// MAC key: PBKDF2 over the raw UTF-8 password. The key length defaults
    /// to the auth scheme's hash output but may be overridden by the PBKDF2
    /// parameters.
    fn derive_key(&self, password: &Password<'_>) -> Result<Zeroizing<Vec<u8>>> {
        let key_len = self
            .kdf
            .key_length
            .map(usize::from)
            .unwrap_or_else(|| self.scheme.output_size());
        derive_pbkdf2(
            self.kdf.prf,
            password.as_utf8(),
            &self.kdf.salt,
            self.kdf.iterations,
            key_len,
        )
    }
}

/// Key for the legacy construction: v1 KDF with the MAC purpose byte.
fn legacy_key<D>(
    password: &Password<'_>,
    salt: &[u8],
    iterations: u32,
    len: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    D: digest::Digest + digest::core_api::BlockSizeUser,
{
    kdf::derive_key::<D>(password, salt, KeyPurpose::Mac, iterations, len)
}

fn verify_tag<M: Mac + KeyInit>(key: &[u8], content: &[u8], tag: &[u8]) -> Result<()> {
    let mut mac: M = KeyInit::new_from_slice(key).map_err(|_| Error::KeyLength)?;
    Mac::update(&mut mac, content);
    mac.verify_slice(tag).map_err(|_| Error::IncorrectPassword)
}

fn compute_tag<M: Mac + KeyInit>(key: &[u8], content: &[u8]) -> Result<Vec<u8>> {
    let mut mac: M = KeyInit::new_from_slice(key).map_err(|_| Error::KeyLength)?;
    mac.update(content);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn legacy_mac_round_trip() {
        let password = Password::new("hunter2");
        let content = b"authenticated content";
        for digest_oid in [oid::SHA1, oid::SHA256, oid::SM3] {
            let mac = MacData::create_legacy(
                digest_oid,
                hex!("000102030405060708090a0b0c0d0e0f").to_vec(),
                2048,
                content,
                &password,
            )
            .unwrap();
            mac.verify(content, &password).unwrap();
            assert!(matches!(
                mac.verify(content, &Password::new("wrong")),
                Err(Error::IncorrectPassword)
            ));
            assert!(matches!(
                mac.verify(b"tampered content", &password),
                Err(Error::IncorrectPassword)
            ));
        }
    }

    #[test]
    fn pbmac1_round_trip() {
        let password = Password::new("hunter2");
        let content = b"authenticated content";
        let params = Pbmac1Parameters {
            kdf: Pbkdf2Params {
                salt: hex!("a0a1a2a3a4a5a6a7").to_vec(),
                iterations: 1000,
                key_length: Some(32),
                prf: Pbkdf2Prf::HmacWithSha256,
            },
            scheme: Pbkdf2Prf::HmacWithSha256,
        };
        let mac = MacData::create_pbmac1(params, content, &password).unwrap();
        mac.verify(content, &password).unwrap();
        assert!(matches!(
            mac.verify(content, &Password::new("wrong")),
            Err(Error::IncorrectPassword)
        ));
    }

    /// Varying the PBKDF2 key length or PRF must change the tag; identical
    /// parameters must reproduce it.
    #[test]
    fn pbmac1_parameters_are_load_bearing() {
        let password = Password::new("hunter2");
        let content = b"authenticated content";
        let base = Pbmac1Parameters {
            kdf: Pbkdf2Params {
                salt: hex!("a0a1a2a3a4a5a6a7").to_vec(),
                iterations: 100,
                key_length: Some(32),
                prf: Pbkdf2Prf::HmacWithSha256,
            },
            scheme: Pbkdf2Prf::HmacWithSha256,
        };
        let tag = |params: Pbmac1Parameters| {
            MacData::create_pbmac1(params, content, &password)
                .unwrap()
                .mac
                .digest
        };

        assert_eq!(tag(base.clone()), tag(base.clone()));

        let mut short_key = base.clone();
        short_key.kdf.key_length = Some(16);
        assert_ne!(tag(base.clone()), tag(short_key));

        let mut other_prf = base.clone();
        other_prf.kdf.prf = Pbkdf2Prf::HmacWithSm3;
        assert_ne!(tag(base), tag(other_prf));
    }
}
