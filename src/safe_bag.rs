//! Safe bags: the typed slots inside a PFX, and their PKCS#9 attributes.

use crate::{
    oid,
    pbes::{any_from, decode_any},
    Error, Result,
};
use alloc::{string::String, vec::Vec};
use core::cmp::Ordering;
use der::{
    asn1::{Any, BmpString, ObjectIdentifier, OctetString},
    DerOrd, Sequence, Tag, Tagged,
};
use x509_cert::attr::{Attribute, Attributes};

/// PKCS#12 `SafeBag` (RFC 7292 Section 4.2).
///
/// ```text
/// SafeBag ::= SEQUENCE {
///     bagId          BAG-TYPE.&id ({PKCS12BagSet}),
///     bagValue       [0] EXPLICIT BAG-TYPE.&Type({PKCS12BagSet}{@bagId}),
///     bagAttributes  SET OF PKCS12Attribute OPTIONAL }
/// ```
#[derive(Clone, Debug, Sequence)]
pub struct SafeBag {
    /// Bag type OID.
    pub bag_id: ObjectIdentifier,

    /// Bag contents, interpreted according to `bag_id`.
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT")]
    pub bag_value: Any,

    /// Optional attribute set (`friendlyName`, `localKeyID`, trust markers).
    pub bag_attributes: Option<Attributes>,
}

impl SafeBag {
    /// Build a bag around an already-encoded value.
    pub fn new(
        bag_id: ObjectIdentifier,
        bag_value: Any,
        bag_attributes: Option<Attributes>,
    ) -> Self {
        Self {
            bag_id,
            bag_value,
            bag_attributes,
        }
    }

    /// Parse this bag's attribute set into the fields PKCS#12 cares about.
    pub fn attributes(&self) -> BagAttributes {
        BagAttributes::from_set(self.bag_attributes.as_ref())
    }
}

/// `CertBag` (RFC 7292 Section 4.2.3).
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct CertBag {
    /// Certificate type; only `x509Certificate` is supported.
    pub cert_id: ObjectIdentifier,

    /// Certificate value; a DER certificate in an OCTET STRING for X.509.
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT")]
    pub cert_value: Any,
}

impl CertBag {
    /// Wrap a DER-encoded X.509 certificate.
    pub fn new_x509(cert_der: Vec<u8>) -> Result<Self> {
        Ok(Self {
            cert_id: oid::X509_CERTIFICATE,
            cert_value: any_from(&OctetString::new(cert_der)?)?,
        })
    }

    /// Unwrap the DER-encoded X.509 certificate.
    pub fn x509_der(&self) -> Result<Vec<u8>> {
        if self.cert_id != oid::X509_CERTIFICATE {
            return Err(Error::Unsupported(self.cert_id));
        }
        let octets: OctetString = decode_any(&self.cert_value)?;
        Ok(octets.into_bytes())
    }
}

/// `SecretBag` (RFC 7292 Section 4.2.5), carried by the Java trust-store
/// dialect.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SecretBag {
    /// Secret type OID.
    pub secret_type_id: ObjectIdentifier,

    /// Secret value.
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT")]
    pub secret_value: Any,
}

/// Parsed view of a bag's attribute set. Unrecognised attributes are
/// ignored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BagAttributes {
    /// PKCS#9 `friendlyName`.
    pub friendly_name: Option<String>,

    /// PKCS#9 `localKeyID`, linking a certificate bag to its key bag.
    pub local_key_id: Option<Vec<u8>>,

    /// Java `trustedKeyUsage` marker.
    pub trusted_key_usage: bool,
}

impl BagAttributes {
    fn from_set(attributes: Option<&Attributes>) -> Self {
        let mut out = Self::default();
        let Some(attributes) = attributes else {
            return out;
        };
        for attribute in attributes.iter() {
            let value = attribute.values.iter().next();
            match attribute.oid {
                o if o == oid::FRIENDLY_NAME => {
                    out.friendly_name = value.and_then(|any| {
                        if any.tag() == Tag::BmpString {
                            bmp_to_string(any.value())
                        } else {
                            None
                        }
                    });
                }
                o if o == oid::LOCAL_KEY_ID => {
                    out.local_key_id = value
                        .and_then(|any| decode_any::<OctetString>(any).ok())
                        .map(OctetString::into_bytes);
                }
                o if o == oid::ORACLE_TRUSTED_KEY_USAGE => {
                    out.trusted_key_usage = true;
                }
                _ => (),
            }
        }
        out
    }

    /// Encode these attributes as a `SET OF PKCS12Attribute`, or `None` when
    /// every field is empty.
    pub fn to_set(&self) -> Result<Option<Attributes>> {
        let mut attributes = Vec::new();
        if let Some(name) = &self.friendly_name {
            let bmp =
                BmpString::from_utf8(name).map_err(|_| {
                    Error::UnexpectedStructure("friendly name is not BMP-encodable")
                })?;
            attributes.push(attribute(oid::FRIENDLY_NAME, any_from(&bmp)?)?);
        }
        if let Some(id) = &self.local_key_id {
            attributes.push(attribute(
                oid::LOCAL_KEY_ID,
                any_from(&OctetString::new(id.as_slice())?)?,
            )?);
        }
        if self.trusted_key_usage {
            attributes.push(attribute(
                oid::ORACLE_TRUSTED_KEY_USAGE,
                any_from(&oid::ANY_EXTENDED_KEY_USAGE)?,
            )?);
        }
        if attributes.is_empty() {
            return Ok(None);
        }
        // SET OF requires DER ordering of the encoded elements.
        attributes.sort_by(|a, b| a.der_cmp(b).unwrap_or(Ordering::Equal));
        Ok(Some(attributes.try_into()?))
    }
}

fn attribute(attr_oid: ObjectIdentifier, value: Any) -> Result<Attribute> {
    Ok(Attribute {
        oid: attr_oid,
        values: alloc::vec![value].try_into()?,
    })
}

/// Decode big-endian UTF-16 (BMPString contents) into a `String`.
fn bmp_to_string(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<core::result::Result<String, _>>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_round_trip() {
        let attrs = BagAttributes {
            friendly_name: Some("leaf certificate".into()),
            local_key_id: Some(alloc::vec![0xab; 20]),
            trusted_key_usage: false,
        };
        let set = attrs.to_set().unwrap();
        assert!(set.is_some());
        let parsed = BagAttributes::from_set(set.as_ref());
        assert_eq!(parsed, attrs);
    }

    #[test]
    fn trusted_marker_round_trip() {
        let attrs = BagAttributes {
            friendly_name: Some("interop-root".into()),
            local_key_id: None,
            trusted_key_usage: true,
        };
        let set = attrs.to_set().unwrap();
        let parsed = BagAttributes::from_set(set.as_ref());
        assert!(parsed.trusted_key_usage);
        assert_eq!(parsed.friendly_name.as_deref(), Some("interop-root"));
    }

    #[test]
    fn empty_attribute_set_is_omitted() {
        assert!(BagAttributes::default().to_set().unwrap().is_none());
    }
}
