//! Password-based encryption suites used inside PKCS#12 containers.
//!
//! Two families coexist: the historical PKCS#12 PBE modes of [RFC 7292
//! Appendix C] (SHA-1 based v1 KDF with 3DES or RC2) and PBES2 of [RFC 8018
//! Section 6.2] (PBKDF2 plus an explicit cipher, here AES-CBC, 3DES, RC2,
//! SM4-CBC or SM4-GCM). The set of suites is historically stable, so it is
//! modelled as closed enums rather than an open registry.
//!
//! [RFC 7292 Appendix C]: https://datatracker.ietf.org/doc/html/rfc7292#appendix-C
//! [RFC 8018 Section 6.2]: https://datatracker.ietf.org/doc/html/rfc8018#section-6.2

use crate::{
    kdf::{self, KeyPurpose, Password},
    oid, Error, Result,
};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{aead::Aead, AesGcm, Nonce};
use alloc::vec::Vec;
use cipher::{
    block_padding::Pkcs7, consts::U12, BlockCipher, BlockDecryptMut, BlockEncryptMut, InnerIvInit,
    KeyInit, KeyIvInit,
};
use der::{
    asn1::{Any, OctetString},
    Decode, DecodeOwned, Encode, Sequence,
};
use des::TdesEde3;
use rc2::Rc2;
use sha1::Sha1;
use sha2::Sha256;
use sm3::Sm3;
use sm4::Sm4;
use spki::AlgorithmIdentifierOwned;
use zeroize::Zeroizing;

/// SM4-GCM instantiation of the generic GCM construction.
type Sm4GcmCipher = AesGcm<Sm4, U12>;

/// GCM authentication tag length emitted and required by this crate.
const GCM_TAG_SIZE: u8 = 16;

/// Decode `T` from the parameters field of an `AlgorithmIdentifier`.
pub(crate) fn decode_params<T: DecodeOwned>(params: Option<&Any>) -> Result<T> {
    match params {
        Some(any) => Ok(T::from_der(&any.to_der()?)?),
        None => Err(Error::UnexpectedStructure("missing algorithm parameters")),
    }
}

/// Re-encode a value as an [`Any`] so it can be attached as parameters.
pub(crate) fn any_from<T: Encode>(value: &T) -> Result<Any> {
    Ok(Any::from_der(&value.to_der()?)?)
}

/// Decode a typed value out of an [`Any`].
pub(crate) fn decode_any<T: DecodeOwned>(any: &Any) -> Result<T> {
    Ok(T::from_der(&any.to_der()?)?)
}

/// ASN.1 `NULL` as an [`Any`].
pub(crate) fn null_any() -> Result<Any> {
    Ok(Any::from_der(&[0x05, 0x00])?)
}

/// PKCS#12 `pkcs-12PbeParams` (RFC 7292 Appendix C).
///
/// ```text
/// pkcs-12PbeParams ::= SEQUENCE {
///     salt        OCTET STRING,
///     iterations  INTEGER }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct Pkcs12PbeParamsAsn1 {
    salt: OctetString,
    iterations: u32,
}

/// PBES2 parameters (RFC 8018 Appendix A.4).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct Pbes2ParamsAsn1 {
    kdf: AlgorithmIdentifierOwned,
    encryption: AlgorithmIdentifierOwned,
}

/// PBKDF2 parameters (RFC 8018 Appendix A.2).
///
/// ```text
/// PBKDF2-params ::= SEQUENCE {
///     salt CHOICE { specified OCTET STRING, ... },
///     iterationCount INTEGER (1..MAX),
///     keyLength INTEGER (1..MAX) OPTIONAL,
///     prf AlgorithmIdentifier DEFAULT algid-hmacWithSHA1 }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct Pbkdf2ParamsAsn1 {
    salt: OctetString,
    iteration_count: u32,
    key_length: Option<u16>,
    prf: Option<AlgorithmIdentifierOwned>,
}

/// RC2-CBC parameters (RFC 2268 Section 6), with the version/effective-bits
/// table encoding.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct Rc2CbcParamsAsn1 {
    version: Option<u32>,
    iv: OctetString,
}

/// GCM parameters (RFC 5084).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct GcmParamsAsn1 {
    nonce: OctetString,
    #[asn1(default = "gcm_icv_len_default")]
    icv_len: u8,
}

fn gcm_icv_len_default() -> u8 {
    12
}

/// Pseudo-random function used with PBKDF2, both as the PBES2 KDF PRF and as
/// the PBMAC1 message authentication scheme (the OIDs are shared).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pbkdf2Prf {
    /// HMAC with SHA-1
    HmacWithSha1,

    /// HMAC with SHA-256
    HmacWithSha256,

    /// HMAC with SM3
    HmacWithSm3,
}

impl Pbkdf2Prf {
    /// Get the Object Identifier (OID) for this algorithm.
    pub fn oid(self) -> der::asn1::ObjectIdentifier {
        match self {
            Self::HmacWithSha1 => oid::HMAC_WITH_SHA1,
            Self::HmacWithSha256 => oid::HMAC_WITH_SHA256,
            Self::HmacWithSm3 => oid::HMAC_WITH_SM3,
        }
    }

    /// Output length of the underlying hash in bytes.
    pub fn output_size(self) -> usize {
        match self {
            Self::HmacWithSha1 => 20,
            Self::HmacWithSha256 => 32,
            Self::HmacWithSm3 => 32,
        }
    }

    pub(crate) fn from_algorithm(alg: &AlgorithmIdentifierOwned) -> Result<Self> {
        // Parameters are NULL (or absent, as some encoders omit them).
        match alg.oid {
            o if o == oid::HMAC_WITH_SHA1 => Ok(Self::HmacWithSha1),
            o if o == oid::HMAC_WITH_SHA256 => Ok(Self::HmacWithSha256),
            o if o == oid::HMAC_WITH_SM3 => Ok(Self::HmacWithSm3),
            o => Err(Error::Unsupported(o)),
        }
    }

    pub(crate) fn to_algorithm(self) -> Result<AlgorithmIdentifierOwned> {
        Ok(AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters: Some(null_any()?),
        })
    }
}

impl Default for Pbkdf2Prf {
    /// RFC 8018 Appendix A.2: `prf ... DEFAULT algid-hmacWithSHA1`.
    fn default() -> Self {
        Self::HmacWithSha1
    }
}

/// Derive key material with PBKDF2 over the raw UTF-8 password.
pub(crate) fn derive_pbkdf2(
    prf: Pbkdf2Prf,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if iterations == 0 {
        return Err(Error::UnexpectedStructure("KDF iteration count is zero"));
    }
    let mut key = Zeroizing::new(alloc::vec![0u8; out_len]);
    match prf {
        Pbkdf2Prf::HmacWithSha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut key),
        Pbkdf2Prf::HmacWithSha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key)
        }
        Pbkdf2Prf::HmacWithSm3 => pbkdf2::pbkdf2_hmac::<Sm3>(password, salt, iterations, &mut key),
    }
    Ok(key)
}

/// Historical PKCS#12 PBE modes (v1 KDF over SHA-1).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pkcs12Pbe {
    /// `pbeWithSHAAnd3-KeyTripleDES-CBC`
    Sha1And3KeyTripleDesCbc,

    /// `pbeWithSHAAnd128BitRC2-CBC`
    Sha1And128BitRc2Cbc,

    /// `pbeWithSHAAnd40BitRC2-CBC`
    Sha1And40BitRc2Cbc,
}

impl Pkcs12Pbe {
    /// Get the Object Identifier (OID) for this suite.
    pub fn oid(self) -> der::asn1::ObjectIdentifier {
        match self {
            Self::Sha1And3KeyTripleDesCbc => oid::PBE_WITH_SHA1_AND_3_KEY_TRIPLE_DES_CBC,
            Self::Sha1And128BitRc2Cbc => oid::PBE_WITH_SHA1_AND_128_BIT_RC2_CBC,
            Self::Sha1And40BitRc2Cbc => oid::PBE_WITH_SHA1_AND_40_BIT_RC2_CBC,
        }
    }

    /// Cipher key size in bytes.
    pub fn key_size(self) -> usize {
        match self {
            Self::Sha1And3KeyTripleDesCbc => 24,
            Self::Sha1And128BitRc2Cbc => 16,
            Self::Sha1And40BitRc2Cbc => 5,
        }
    }

    /// RC2 effective key bits, where applicable.
    fn rc2_effective_bits(self) -> Option<usize> {
        match self {
            Self::Sha1And3KeyTripleDesCbc => None,
            Self::Sha1And128BitRc2Cbc => Some(128),
            Self::Sha1And40BitRc2Cbc => Some(40),
        }
    }
}

/// Parameters for a historical PKCS#12 PBE suite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pkcs12Parameters {
    /// Selected PBE mode.
    pub kind: Pkcs12Pbe,

    /// KDF salt.
    pub salt: Vec<u8>,

    /// KDF iteration count.
    pub iterations: u32,
}

/// PBKDF2 parameters for PBES2 (and PBMAC1).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pbkdf2Params {
    /// PBKDF2 salt.
    pub salt: Vec<u8>,

    /// PBKDF2 iteration count.
    pub iterations: u32,

    /// Explicit output length. When absent the cipher's (or MAC hash's)
    /// natural key size is used.
    pub key_length: Option<u16>,

    /// Pseudo-random function.
    pub prf: Pbkdf2Prf,
}

impl Pbkdf2Params {
    pub(crate) fn from_algorithm(alg: &AlgorithmIdentifierOwned) -> Result<Self> {
        if alg.oid != oid::PBKDF2 {
            return Err(Error::Unsupported(alg.oid));
        }
        let params: Pbkdf2ParamsAsn1 = decode_params(alg.parameters.as_ref())?;
        let prf = match &params.prf {
            Some(alg) => Pbkdf2Prf::from_algorithm(alg)?,
            None => Pbkdf2Prf::default(),
        };
        Ok(Self {
            salt: params.salt.as_bytes().to_vec(),
            iterations: params.iteration_count,
            key_length: params.key_length,
            prf,
        })
    }

    pub(crate) fn to_algorithm(&self) -> Result<AlgorithmIdentifierOwned> {
        let params = Pbkdf2ParamsAsn1 {
            salt: OctetString::new(self.salt.as_slice())?,
            iteration_count: self.iterations,
            key_length: self.key_length,
            prf: if self.prf == Pbkdf2Prf::default() {
                None
            } else {
                Some(self.prf.to_algorithm()?)
            },
        };
        Ok(AlgorithmIdentifierOwned {
            oid: oid::PBKDF2,
            parameters: Some(any_from(&params)?),
        })
    }
}

/// Symmetric cipher selected by a PBES2 suite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pbes2Cipher {
    /// AES-128 in CBC mode.
    Aes128Cbc {
        /// Initialization vector.
        iv: [u8; 16],
    },

    /// AES-192 in CBC mode.
    Aes192Cbc {
        /// Initialization vector.
        iv: [u8; 16],
    },

    /// AES-256 in CBC mode.
    Aes256Cbc {
        /// Initialization vector.
        iv: [u8; 16],
    },

    /// Three-key triple DES in CBC mode.
    DesEde3Cbc {
        /// Initialization vector.
        iv: [u8; 8],
    },

    /// RC2 in CBC mode with a variable effective key size.
    Rc2Cbc {
        /// RC2 effective key bits.
        effective_bits: u32,
        /// Initialization vector.
        iv: [u8; 8],
    },

    /// SM4 in CBC mode.
    Sm4Cbc {
        /// Initialization vector.
        iv: [u8; 16],
    },

    /// SM4 in GCM mode with a 16-byte authentication tag.
    Sm4Gcm {
        /// GCM nonce.
        nonce: [u8; 12],
    },
}

impl Pbes2Cipher {
    /// Get the Object Identifier (OID) for this cipher.
    pub fn oid(&self) -> der::asn1::ObjectIdentifier {
        match self {
            Self::Aes128Cbc { .. } => oid::AES_128_CBC,
            Self::Aes192Cbc { .. } => oid::AES_192_CBC,
            Self::Aes256Cbc { .. } => oid::AES_256_CBC,
            Self::DesEde3Cbc { .. } => oid::DES_EDE3_CBC,
            Self::Rc2Cbc { .. } => oid::RC2_CBC,
            Self::Sm4Cbc { .. } => oid::SM4_CBC,
            Self::Sm4Gcm { .. } => oid::SM4_GCM,
        }
    }

    /// Cipher key size in bytes.
    pub fn key_size(&self) -> usize {
        match self {
            Self::Aes128Cbc { .. } => 16,
            Self::Aes192Cbc { .. } => 24,
            Self::Aes256Cbc { .. } => 32,
            Self::DesEde3Cbc { .. } => 24,
            Self::Rc2Cbc { effective_bits, .. } => (*effective_bits as usize + 7) / 8,
            Self::Sm4Cbc { .. } => 16,
            Self::Sm4Gcm { .. } => 16,
        }
    }

    fn from_algorithm(alg: &AlgorithmIdentifierOwned) -> Result<Self> {
        match alg.oid {
            o if o == oid::AES_128_CBC => Ok(Self::Aes128Cbc {
                iv: iv_param(alg.parameters.as_ref())?,
            }),
            o if o == oid::AES_192_CBC => Ok(Self::Aes192Cbc {
                iv: iv_param(alg.parameters.as_ref())?,
            }),
            o if o == oid::AES_256_CBC => Ok(Self::Aes256Cbc {
                iv: iv_param(alg.parameters.as_ref())?,
            }),
            o if o == oid::DES_EDE3_CBC => Ok(Self::DesEde3Cbc {
                iv: iv_param(alg.parameters.as_ref())?,
            }),
            o if o == oid::SM4_CBC => Ok(Self::Sm4Cbc {
                iv: iv_param(alg.parameters.as_ref())?,
            }),
            o if o == oid::RC2_CBC => {
                let params: Rc2CbcParamsAsn1 = decode_params(alg.parameters.as_ref())?;
                Ok(Self::Rc2Cbc {
                    effective_bits: rc2_version_to_bits(params.version)?,
                    iv: params
                        .iv
                        .as_bytes()
                        .try_into()
                        .map_err(|_| Error::UnexpectedStructure("bad RC2 IV length"))?,
                })
            }
            o if o == oid::SM4_GCM => {
                let params: GcmParamsAsn1 = decode_params(alg.parameters.as_ref())?;
                if params.icv_len != GCM_TAG_SIZE {
                    return Err(Error::UnexpectedStructure("GCM tag length must be 16"));
                }
                Ok(Self::Sm4Gcm {
                    nonce: params
                        .nonce
                        .as_bytes()
                        .try_into()
                        .map_err(|_| Error::UnexpectedStructure("bad GCM nonce length"))?,
                })
            }
            o => Err(Error::Unsupported(o)),
        }
    }

    fn to_algorithm(&self) -> Result<AlgorithmIdentifierOwned> {
        let parameters = match self {
            Self::Aes128Cbc { iv } | Self::Aes192Cbc { iv } | Self::Aes256Cbc { iv } => {
                any_from(&OctetString::new(iv.as_slice())?)?
            }
            Self::Sm4Cbc { iv } => any_from(&OctetString::new(iv.as_slice())?)?,
            Self::DesEde3Cbc { iv } => any_from(&OctetString::new(iv.as_slice())?)?,
            Self::Rc2Cbc { effective_bits, iv } => any_from(&Rc2CbcParamsAsn1 {
                version: rc2_bits_to_version(*effective_bits)?,
                iv: OctetString::new(iv.as_slice())?,
            })?,
            Self::Sm4Gcm { nonce } => any_from(&GcmParamsAsn1 {
                nonce: OctetString::new(nonce.as_slice())?,
                icv_len: GCM_TAG_SIZE,
            })?,
        };
        Ok(AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters: Some(parameters),
        })
    }
}

/// Read a fixed-length CBC IV from an OCTET STRING parameter.
fn iv_param<const N: usize>(params: Option<&Any>) -> Result<[u8; N]> {
    let iv: OctetString = decode_params(params)?;
    iv.as_bytes()
        .try_into()
        .map_err(|_| Error::UnexpectedStructure("bad IV length"))
}

/// RC2 effective-key-bits encoding of RFC 2268 Section 6.
fn rc2_version_to_bits(version: Option<u32>) -> Result<u32> {
    match version {
        None => Ok(32),
        Some(160) => Ok(40),
        Some(120) => Ok(64),
        Some(58) => Ok(128),
        Some(v) if v >= 256 => Ok(v),
        Some(_) => Err(Error::UnexpectedStructure("reserved RC2 version value")),
    }
}

/// Inverse of [`rc2_version_to_bits`]; 32 effective bits encode as an
/// absent version field, matching what the decoder derives them from.
fn rc2_bits_to_version(bits: u32) -> Result<Option<u32>> {
    match bits {
        32 => Ok(None),
        40 => Ok(Some(160)),
        64 => Ok(Some(120)),
        128 => Ok(Some(58)),
        v if v >= 256 => Ok(Some(v)),
        _ => Err(Error::UnexpectedStructure("unsupported RC2 key size")),
    }
}

/// PBES2 parameters: a PBKDF2 key derivation plus a cipher.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pbes2Parameters {
    /// Key derivation function.
    pub kdf: Pbkdf2Params,

    /// Symmetric cipher.
    pub cipher: Pbes2Cipher,
}

/// Password-based encryption scheme attached to an `encryptedData` content
/// info or a PKCS#8 `EncryptedPrivateKeyInfo`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scheme {
    /// Historical PKCS#12 PBE (v1 KDF).
    Pkcs12(Pkcs12Parameters),

    /// PBES2 (PBKDF2 + explicit cipher).
    Pbes2(Pbes2Parameters),
}

impl Scheme {
    /// Parse a scheme from an `AlgorithmIdentifier`.
    pub fn from_algorithm(alg: &AlgorithmIdentifierOwned) -> Result<Self> {
        let pbe_kind = match alg.oid {
            o if o == oid::PBES2 => {
                let params: Pbes2ParamsAsn1 = decode_params(alg.parameters.as_ref())?;
                return Ok(Self::Pbes2(Pbes2Parameters {
                    kdf: Pbkdf2Params::from_algorithm(&params.kdf)?,
                    cipher: Pbes2Cipher::from_algorithm(&params.encryption)?,
                }));
            }
            o if o == oid::PBE_WITH_SHA1_AND_3_KEY_TRIPLE_DES_CBC => {
                Pkcs12Pbe::Sha1And3KeyTripleDesCbc
            }
            o if o == oid::PBE_WITH_SHA1_AND_128_BIT_RC2_CBC => Pkcs12Pbe::Sha1And128BitRc2Cbc,
            o if o == oid::PBE_WITH_SHA1_AND_40_BIT_RC2_CBC => Pkcs12Pbe::Sha1And40BitRc2Cbc,
            o => return Err(Error::Unsupported(o)),
        };

        let params: Pkcs12PbeParamsAsn1 = decode_params(alg.parameters.as_ref())?;
        Ok(Self::Pkcs12(Pkcs12Parameters {
            kind: pbe_kind,
            salt: params.salt.as_bytes().to_vec(),
            iterations: params.iterations,
        }))
    }

    /// Encode this scheme as an `AlgorithmIdentifier` with parameters.
    pub fn to_algorithm(&self) -> Result<AlgorithmIdentifierOwned> {
        match self {
            Self::Pkcs12(params) => Ok(AlgorithmIdentifierOwned {
                oid: params.kind.oid(),
                parameters: Some(any_from(&Pkcs12PbeParamsAsn1 {
                    salt: OctetString::new(params.salt.as_slice())?,
                    iterations: params.iterations,
                })?),
            }),
            Self::Pbes2(params) => Ok(AlgorithmIdentifierOwned {
                oid: oid::PBES2,
                parameters: Some(any_from(&Pbes2ParamsAsn1 {
                    kdf: params.kdf.to_algorithm()?,
                    encryption: params.cipher.to_algorithm()?,
                })?),
            }),
        }
    }

    /// Encrypt `plaintext` with a key derived from `password`.
    pub fn encrypt(&self, password: &Password<'_>, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Pkcs12(params) => {
                let (key, iv) = pkcs12_key_iv(params, password)?;
                match params.kind.rc2_effective_bits() {
                    None => cbc_encrypt::<TdesEde3>(&key, &iv, plaintext),
                    Some(bits) => rc2_encrypt(&key, bits, &iv, plaintext),
                }
            }
            Self::Pbes2(params) => {
                let key = pbes2_key(params, password)?;
                match &params.cipher {
                    Pbes2Cipher::Aes128Cbc { iv } => cbc_encrypt::<Aes128>(&key, iv, plaintext),
                    Pbes2Cipher::Aes192Cbc { iv } => cbc_encrypt::<Aes192>(&key, iv, plaintext),
                    Pbes2Cipher::Aes256Cbc { iv } => cbc_encrypt::<Aes256>(&key, iv, plaintext),
                    Pbes2Cipher::DesEde3Cbc { iv } => cbc_encrypt::<TdesEde3>(&key, iv, plaintext),
                    Pbes2Cipher::Rc2Cbc { effective_bits, iv } => {
                        rc2_encrypt(&key, *effective_bits as usize, iv, plaintext)
                    }
                    Pbes2Cipher::Sm4Cbc { iv } => cbc_encrypt::<Sm4>(&key, iv, plaintext),
                    Pbes2Cipher::Sm4Gcm { nonce } => {
                        let cipher =
                            Sm4GcmCipher::new_from_slice(&key).map_err(|_| Error::KeyLength)?;
                        cipher
                            .encrypt(Nonce::from_slice(nonce), plaintext)
                            .map_err(|_| Error::Decryption)
                    }
                }
            }
        }
    }

    /// Decrypt `ciphertext` with a key derived from `password`.
    ///
    /// CBC padding failures surface as [`Error::IncorrectPassword`]; a GCM
    /// authentication failure surfaces as [`Error::Decryption`].
    pub fn decrypt(
        &self,
        password: &Password<'_>,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Pkcs12(params) => {
                let (key, iv) = pkcs12_key_iv(params, password)?;
                match params.kind.rc2_effective_bits() {
                    None => cbc_decrypt::<TdesEde3>(&key, &iv, ciphertext),
                    Some(bits) => rc2_decrypt(&key, bits, &iv, ciphertext),
                }
            }
            Self::Pbes2(params) => {
                let key = pbes2_key(params, password)?;
                match &params.cipher {
                    Pbes2Cipher::Aes128Cbc { iv } => cbc_decrypt::<Aes128>(&key, iv, ciphertext),
                    Pbes2Cipher::Aes192Cbc { iv } => cbc_decrypt::<Aes192>(&key, iv, ciphertext),
                    Pbes2Cipher::Aes256Cbc { iv } => cbc_decrypt::<Aes256>(&key, iv, ciphertext),
                    Pbes2Cipher::DesEde3Cbc { iv } => cbc_decrypt::<TdesEde3>(&key, iv, ciphertext),
                    Pbes2Cipher::Rc2Cbc { effective_bits, iv } => {
                        rc2_decrypt(&key, *effective_bits as usize, iv, ciphertext)
                    }
                    Pbes2Cipher::Sm4Cbc { iv } => cbc_decrypt::<Sm4>(&key, iv, ciphertext),
                    Pbes2Cipher::Sm4Gcm { nonce } => {
                        let cipher =
                            Sm4GcmCipher::new_from_slice(&key).map_err(|_| Error::KeyLength)?;
                        cipher
                            .decrypt(Nonce::from_slice(nonce), ciphertext)
                            .map(Zeroizing::new)
                            .map_err(|_| Error::Decryption)
                    }
                }
            }
        }
    }
}

/// Derive the cipher key and IV for a historical PKCS#12 PBE suite.
///
/// The key and IV use distinct KDF purpose bytes over the same salt.
fn pkcs12_key_iv(
    params: &Pkcs12Parameters,
    password: &Password<'_>,
) -> Result<(Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>)> {
    let key = kdf::derive_key::<Sha1>(
        password,
        &params.salt,
        KeyPurpose::EncryptionKey,
        params.iterations,
        params.kind.key_size(),
    )?;
    let iv = kdf::derive_key::<Sha1>(
        password,
        &params.salt,
        KeyPurpose::Iv,
        params.iterations,
        8,
    )?;
    Ok((key, iv))
}

/// Derive the PBES2 cipher key, honouring an explicit PBKDF2 `keyLength`.
fn pbes2_key(params: &Pbes2Parameters, password: &Password<'_>) -> Result<Zeroizing<Vec<u8>>> {
    let natural = params.cipher.key_size();
    let key_len = match (params.kdf.key_length, &params.cipher) {
        // RC2 key size legitimately differs from the effective bits.
        (Some(len), Pbes2Cipher::Rc2Cbc { .. }) => len as usize,
        (Some(len), _) if len as usize == natural => natural,
        (Some(_), _) => return Err(Error::KeyLength),
        (None, _) => natural,
    };
    derive_pbkdf2(
        params.kdf.prf,
        password.as_utf8(),
        &params.kdf.salt,
        params.kdf.iterations,
        key_len,
    )
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let cipher = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| Error::KeyLength)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let cipher = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| Error::KeyLength)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::IncorrectPassword)
}

fn rc2_encrypt(key: &[u8], effective_bits: usize, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let rc2 = Rc2::new_with_eff_key_len(key, effective_bits);
    let cipher =
        cbc::Encryptor::<Rc2>::inner_iv_slice_init(rc2, iv).map_err(|_| Error::KeyLength)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn rc2_decrypt(
    key: &[u8],
    effective_bits: usize,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let rc2 = Rc2::new_with_eff_key_len(key, effective_bits);
    let cipher =
        cbc::Decryptor::<Rc2>::inner_iv_slice_init(rc2, iv).map_err(|_| Error::KeyLength)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::IncorrectPassword)
}
