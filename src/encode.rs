//! PFX assembly: encoder profiles and the encode operations.

use crate::{
    decode::subject_common_name,
    kdf::Password,
    key::{EncryptedPrivateKeyInfo, PrivateKey},
    mac::{MacData, Pbmac1Parameters},
    oid,
    pbes::{
        Pbes2Cipher, Pbes2Parameters, Pbkdf2Params, Pbkdf2Prf, Pkcs12Parameters, Pkcs12Pbe, Scheme,
    },
    pfx::{ContentInfo, EncryptedData, Pfx, VERSION_3},
    safe_bag::{BagAttributes, CertBag, SafeBag},
    Error, Result,
};
use alloc::{vec, vec::Vec};
use der::{Decode, Encode};
use digest::Digest;
use rand_core::CryptoRngCore;
use sha1::Sha1;
use x509_cert::Certificate;

/// Cipher suite selected by an [`EncoderProfile`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SuiteChoice {
    /// `pbeWithSHAAnd40BitRC2-CBC`
    PbeSha1Rc2_40,
    /// `pbeWithSHAAnd3-KeyTripleDES-CBC`
    PbeSha1TripleDes,
    /// PBES2 with AES-256-CBC and PBKDF2-HMAC-SHA-256
    Pbes2Aes256,
    /// PBES2 with SM4-GCM and PBKDF2-HMAC-SM3
    Pbes2Sm4Gcm,
}

impl SuiteChoice {
    /// Instantiate the suite with fresh salt and IV material.
    fn instantiate(
        self,
        rng: &mut impl CryptoRngCore,
        iterations: u32,
        salt_len: usize,
    ) -> Scheme {
        match self {
            Self::PbeSha1Rc2_40 => Scheme::Pkcs12(Pkcs12Parameters {
                kind: Pkcs12Pbe::Sha1And40BitRc2Cbc,
                salt: random_vec(rng, salt_len),
                iterations,
            }),
            Self::PbeSha1TripleDes => Scheme::Pkcs12(Pkcs12Parameters {
                kind: Pkcs12Pbe::Sha1And3KeyTripleDesCbc,
                salt: random_vec(rng, salt_len),
                iterations,
            }),
            Self::Pbes2Aes256 => Scheme::Pbes2(Pbes2Parameters {
                kdf: Pbkdf2Params {
                    salt: random_vec(rng, salt_len),
                    iterations,
                    key_length: None,
                    prf: Pbkdf2Prf::HmacWithSha256,
                },
                cipher: Pbes2Cipher::Aes256Cbc {
                    iv: random_array(rng),
                },
            }),
            Self::Pbes2Sm4Gcm => Scheme::Pbes2(Pbes2Parameters {
                kdf: Pbkdf2Params {
                    salt: random_vec(rng, salt_len),
                    iterations,
                    key_length: None,
                    prf: Pbkdf2Prf::HmacWithSm3,
                },
                cipher: Pbes2Cipher::Sm4Gcm {
                    nonce: random_array(rng),
                },
            }),
        }
    }
}

/// MAC construction selected by an [`EncoderProfile`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MacChoice {
    /// Legacy PKCS#12 MAC with HMAC-SHA-1.
    LegacySha1,
    /// PBMAC1 with the given PRF as both KDF PRF and auth scheme.
    Pbmac1(Pbkdf2Prf),
}

/// Immutable encoder configuration: which suites protect certificate bags
/// and shrouded keys, which MAC seals the container, and the iteration and
/// salt parameters shared by all of them.
///
/// Use one of the provided constants; the fields are deliberately not
/// public so that profiles stay closed values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncoderProfile {
    bag_cipher: Option<SuiteChoice>,
    key_cipher: Option<SuiteChoice>,
    mac: Option<MacChoice>,
    iterations: u32,
    salt_len: usize,
}

impl EncoderProfile {
    /// Maximum interoperability with old consumers: RC2-40 certificate
    /// bags, 3DES shrouded keys, HMAC-SHA-1 MAC, 2048 iterations.
    pub const LEGACY: EncoderProfile = EncoderProfile {
        bag_cipher: Some(SuiteChoice::PbeSha1Rc2_40),
        key_cipher: Some(SuiteChoice::PbeSha1TripleDes),
        mac: Some(MacChoice::LegacySha1),
        iterations: 2048,
        salt_len: 8,
    };

    /// No encryption and no MAC, for keys already sealed by other means
    /// (e.g. HSM transport). Must be used with an empty password; decoders
    /// reject MAC-less containers otherwise.
    pub const PASSWORDLESS: EncoderProfile = EncoderProfile {
        bag_cipher: None,
        key_cipher: None,
        mac: None,
        iterations: 1,
        salt_len: 0,
    };

    /// Current best practice: PBES2/AES-256-CBC everywhere and a
    /// PBMAC1-HMAC-SHA-256 MAC, 600 000 iterations.
    pub const MODERN_2023: EncoderProfile = EncoderProfile {
        bag_cipher: Some(SuiteChoice::Pbes2Aes256),
        key_cipher: Some(SuiteChoice::Pbes2Aes256),
        mac: Some(MacChoice::Pbmac1(Pbkdf2Prf::HmacWithSha256)),
        iterations: 600_000,
        salt_len: 16,
    };

    /// Chinese national algorithm profile: PBES2/SM4-GCM everywhere and a
    /// PBMAC1-HMAC-SM3 MAC, 600 000 iterations.
    pub const SHANG_MI_2024: EncoderProfile = EncoderProfile {
        bag_cipher: Some(SuiteChoice::Pbes2Sm4Gcm),
        key_cipher: Some(SuiteChoice::Pbes2Sm4Gcm),
        mac: Some(MacChoice::Pbmac1(Pbkdf2Prf::HmacWithSm3)),
        iterations: 600_000,
        salt_len: 16,
    };

    /// Serialize a private key, its leaf certificate and an optional CA
    /// chain into a DER-encoded PFX.
    ///
    /// The leaf and key bags are linked by a fresh 20-byte `localKeyID`
    /// derived from the leaf's `SubjectPublicKeyInfo`. The output is
    /// deterministic for a given `rng`.
    pub fn encode(
        &self,
        rng: &mut impl CryptoRngCore,
        key: &PrivateKey,
        leaf: &Certificate,
        ca_certs: &[Certificate],
        password: &str,
    ) -> Result<Vec<u8>> {
        let password = Password::new(password);
        let local_key_id =
            Sha1::digest(leaf.tbs_certificate.subject_public_key_info.to_der()?).to_vec();
        let id_attrs = BagAttributes {
            friendly_name: None,
            local_key_id: Some(local_key_id),
            trusted_key_usage: false,
        };

        // Certificate bags, leaf first.
        let mut cert_bags = Vec::with_capacity(ca_certs.len() + 1);
        cert_bags.push(cert_bag(leaf, id_attrs.to_set()?)?);
        for ca in ca_certs {
            cert_bags.push(cert_bag(ca, None)?);
        }
        let cert_content = self.protect_bags(rng, cert_bags, &password)?;

        // The key goes into its own `data` content info, shrouded when the
        // profile carries a key cipher.
        let pkcs8_der = key.to_pkcs8_der();
        let key_bag = match self.key_cipher {
            Some(suite) => {
                let scheme = suite.instantiate(rng, self.iterations, self.salt_len);
                let shrouded = EncryptedPrivateKeyInfo::encrypt(&scheme, &password, &pkcs8_der)?;
                SafeBag::new(
                    oid::PKCS8_SHROUDED_KEY_BAG,
                    crate::pbes::any_from(&shrouded)?,
                    id_attrs.to_set()?,
                )
            }
            None => SafeBag::new(
                oid::KEY_BAG,
                der::asn1::Any::from_der(&pkcs8_der)?,
                id_attrs.to_set()?,
            ),
        };
        let key_content = ContentInfo::new_data(vec![key_bag].to_der()?)?;

        self.seal(rng, vec![cert_content, key_content], &password)
    }

    /// Serialize certificates into a trust-store PFX: cert bags tagged with
    /// the Java `trustedKeyUsage` marker and a `friendlyName` equal to the
    /// subject common name. No key material is present; the MAC still
    /// protects the structure.
    pub fn encode_trust_store(
        &self,
        rng: &mut impl CryptoRngCore,
        certs: &[Certificate],
        password: &str,
    ) -> Result<Vec<u8>> {
        let password = Password::new(password);
        let mut bags = Vec::with_capacity(certs.len());
        for cert in certs {
            let attrs = BagAttributes {
                friendly_name: subject_common_name(cert),
                local_key_id: None,
                trusted_key_usage: true,
            };
            bags.push(cert_bag(cert, attrs.to_set()?)?);
        }
        let content = self.protect_bags(rng, bags, &password)?;
        self.seal(rng, vec![content], &password)
    }

    /// Wrap safe bags in a content info, encrypting with the bag cipher
    /// when the profile has one.
    fn protect_bags(
        &self,
        rng: &mut impl CryptoRngCore,
        bags: Vec<SafeBag>,
        password: &Password<'_>,
    ) -> Result<ContentInfo> {
        let safe_contents = bags.to_der()?;
        match self.bag_cipher {
            Some(suite) => {
                let scheme = suite.instantiate(rng, self.iterations, self.salt_len);
                let ciphertext = scheme.encrypt(password, &safe_contents)?;
                ContentInfo::new_encrypted(EncryptedData::new(scheme.to_algorithm()?, ciphertext)?)
            }
            None => ContentInfo::new_data(safe_contents),
        }
    }

    /// Assemble the authenticated-safe sequence, compute the MAC and encode
    /// the final PFX.
    fn seal(
        &self,
        rng: &mut impl CryptoRngCore,
        content_infos: Vec<ContentInfo>,
        password: &Password<'_>,
    ) -> Result<Vec<u8>> {
        // A MAC-less container is only readable with an empty password, so
        // accepting one here would break the encode/decode round trip.
        if self.mac.is_none() && !password.is_empty() {
            return Err(Error::UnexpectedStructure(
                "profile writes no MAC; password must be empty",
            ));
        }
        let auth_content = content_infos.to_der()?;
        let mac_data = match self.mac {
            Some(MacChoice::LegacySha1) => Some(MacData::create_legacy(
                oid::SHA1,
                random_vec(rng, self.salt_len),
                self.iterations,
                &auth_content,
                password,
            )?),
            Some(MacChoice::Pbmac1(prf)) => {
                let params = Pbmac1Parameters {
                    kdf: Pbkdf2Params {
                        salt: random_vec(rng, self.salt_len),
                        iterations: self.iterations,
                        // RFC 9579 requires an explicit key length.
                        key_length: Some(prf.output_size() as u16),
                        prf,
                    },
                    scheme: prf,
                };
                Some(MacData::create_pbmac1(params, &auth_content, password)?)
            }
            None => None,
        };

        let pfx = Pfx {
            version: VERSION_3,
            auth_safe: ContentInfo::new_data(auth_content)?,
            mac_data,
        };
        Ok(pfx.to_der()?)
    }
}

fn cert_bag(cert: &Certificate, attrs: Option<x509_cert::attr::Attributes>) -> Result<SafeBag> {
    let bag = CertBag::new_x509(cert.to_der()?)?;
    Ok(SafeBag::new(
        oid::CERT_BAG,
        crate::pbes::any_from(&bag)?,
        attrs,
    ))
}

fn random_vec(rng: &mut impl CryptoRngCore, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

fn random_array<const N: usize>(rng: &mut impl CryptoRngCore) -> [u8; N] {
    let mut out = [0u8; N];
    rng.fill_bytes(&mut out);
    out
}
