//! Top-level PFX structure and PKCS#7 content wrappers.

use crate::{mac::MacData, oid, pbes::any_from, Error, Result};
use alloc::vec::Vec;
use der::{
    asn1::{Any, ObjectIdentifier, OctetString},
    Decode, Encode, Sequence,
};
use spki::AlgorithmIdentifierOwned;

/// The PFX format version implemented here (the only published one).
pub const VERSION_3: u8 = 3;

/// PKCS#12 `PFX` (RFC 7292 Section 4).
///
/// ```text
/// PFX ::= SEQUENCE {
///     version     INTEGER {v3(3)}(v3,...),
///     authSafe    ContentInfo,
///     macData     MacData OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Pfx {
    /// Format version, always 3.
    pub version: u8,

    /// Authenticated payload, a `data` ContentInfo wrapping the DER encoding
    /// of the `AuthenticatedSafe` sequence.
    pub auth_safe: ContentInfo,

    /// Integrity protection. Absent only for unprotected containers.
    pub mac_data: Option<MacData>,
}

impl Pfx {
    /// Content bytes of the authenticated payload: the DER encoding the MAC
    /// is computed over.
    ///
    /// Rejects payload types other than `data`; `signedData` (and any other
    /// recognised PKCS#7 type) reports [`Error::Unsupported`].
    pub fn authenticated_content(&self) -> Result<Vec<u8>> {
        if self.version != VERSION_3 {
            return Err(Error::UnexpectedStructure("PFX version is not 3"));
        }
        self.auth_safe.data_content()
    }
}

/// PKCS#7 `ContentInfo`.
///
/// ```text
/// ContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     content [0] EXPLICIT ANY DEFINED BY contentType OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ContentInfo {
    /// Content type OID.
    pub content_type: ObjectIdentifier,

    /// Content, interpreted according to `content_type`.
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub content: Option<Any>,
}

impl ContentInfo {
    /// Build a `data` ContentInfo wrapping `content` in an OCTET STRING.
    pub fn new_data(content: Vec<u8>) -> Result<Self> {
        Ok(Self {
            content_type: oid::PKCS7_DATA,
            content: Some(any_from(&OctetString::new(content)?)?),
        })
    }

    /// Build an `encryptedData` ContentInfo.
    pub fn new_encrypted(encrypted: EncryptedData) -> Result<Self> {
        Ok(Self {
            content_type: oid::PKCS7_ENCRYPTED_DATA,
            content: Some(any_from(&encrypted)?),
        })
    }

    /// Unwrap a `data` ContentInfo into its OCTET STRING contents.
    pub fn data_content(&self) -> Result<Vec<u8>> {
        if self.content_type != oid::PKCS7_DATA {
            return Err(Error::Unsupported(self.content_type));
        }
        let any = self
            .content
            .as_ref()
            .ok_or(Error::UnexpectedStructure("data content is absent"))?;
        let octets = OctetString::from_der(&any.to_der()?)?;
        Ok(octets.into_bytes())
    }

    /// Unwrap an `encryptedData` ContentInfo.
    pub fn encrypted_content(&self) -> Result<EncryptedData> {
        if self.content_type != oid::PKCS7_ENCRYPTED_DATA {
            return Err(Error::Unsupported(self.content_type));
        }
        let any = self
            .content
            .as_ref()
            .ok_or(Error::UnexpectedStructure("encrypted content is absent"))?;
        Ok(EncryptedData::from_der(&any.to_der()?)?)
    }
}

/// PKCS#7 `EncryptedData` (RFC 5652 Section 8).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EncryptedData {
    /// Syntax version; 0 for this profile.
    pub version: u8,

    /// The encrypted content and its encryption parameters.
    pub enc_content_info: EncryptedContentInfo,
}

/// PKCS#7 `EncryptedContentInfo`.
///
/// ```text
/// EncryptedContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     contentEncryptionAlgorithm ContentEncryptionAlgorithmIdentifier,
///     encryptedContent [0] IMPLICIT EncryptedContent OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EncryptedContentInfo {
    /// Type of the plaintext; `pkcs-7-data` inside a PFX.
    pub content_type: ObjectIdentifier,

    /// Password-based encryption algorithm and parameters.
    pub content_enc_alg: AlgorithmIdentifierOwned,

    /// Ciphertext.
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    pub encrypted_content: Option<OctetString>,
}

impl EncryptedData {
    /// Build an `EncryptedData` around a ciphertext and its algorithm.
    pub fn new(alg: AlgorithmIdentifierOwned, ciphertext: Vec<u8>) -> Result<Self> {
        Ok(Self {
            version: 0,
            enc_content_info: EncryptedContentInfo {
                content_type: oid::PKCS7_DATA,
                content_enc_alg: alg,
                encrypted_content: Some(OctetString::new(ciphertext)?),
            },
        })
    }

    /// The ciphertext bytes.
    pub fn ciphertext(&self) -> Result<&[u8]> {
        self.enc_content_info
            .encrypted_content
            .as_ref()
            .map(|octets| octets.as_bytes())
            .ok_or(Error::UnexpectedStructure("encrypted content is absent"))
    }
}
