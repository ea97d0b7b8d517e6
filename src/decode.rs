//! PFX disassembly: MAC verification, safe-contents extraction and the
//! public decode operations.

use crate::{
    kdf::Password,
    key::{EncryptedPrivateKeyInfo, PrivateKey},
    oid,
    pbes::{decode_any, Scheme},
    pfx::{ContentInfo, Pfx},
    safe_bag::{BagAttributes, CertBag, SafeBag, SecretBag},
    Error, Result,
};
use alloc::{string::String, vec::Vec};
use der::{Decode, Encode};
use x509_cert::Certificate;
use zeroize::Zeroizing;

/// Everything recovered from a PFX after MAC verification and decryption.
struct ExtractedBags {
    keys: Vec<(PrivateKey, BagAttributes)>,
    certs: Vec<(Certificate, BagAttributes)>,
}

/// Decode a PFX containing exactly one private key and one certificate.
///
/// Containers carrying chain certificates are rejected; use
/// [`decode_chain`] for those.
pub fn decode(pfx_der: &[u8], password: &str) -> Result<(PrivateKey, Certificate)> {
    let bags = extract(pfx_der, password).map_err(conflate_decryption)?;
    let [(key, _)] = <[_; 1]>::try_from(bags.keys)
        .map_err(|_| Error::UnexpectedStructure("expected exactly one private key"))?;
    let [(cert, _)] = <[_; 1]>::try_from(bags.certs)
        .map_err(|_| Error::UnexpectedStructure("expected exactly one certificate"))?;
    check_key_matches(&key, &cert)?;
    Ok((key, cert))
}

/// Decode a PFX containing one private key, its certificate, and any number
/// of chain certificates.
///
/// The leaf is the certificate whose `localKeyID` matches the key bag's;
/// when either side lacks an ID the public key is compared instead.
pub fn decode_chain(
    pfx_der: &[u8],
    password: &str,
) -> Result<(PrivateKey, Certificate, Vec<Certificate>)> {
    let bags = extract(pfx_der, password).map_err(conflate_decryption)?;
    let [(key, key_attrs)] = <[_; 1]>::try_from(bags.keys)
        .map_err(|_| Error::UnexpectedStructure("expected exactly one private key"))?;
    if bags.certs.is_empty() {
        return Err(Error::UnexpectedStructure("no certificates present"));
    }

    let mut leaf_index = None;
    if let Some(key_id) = &key_attrs.local_key_id {
        leaf_index = bags
            .certs
            .iter()
            .position(|(_, attrs)| attrs.local_key_id.as_deref() == Some(key_id.as_slice()));
    }
    if leaf_index.is_none() {
        if let Some(spki) = key.subject_public_key_info_opt()? {
            let spki_der = spki.to_der()?;
            for (index, (cert, _)) in bags.certs.iter().enumerate() {
                if cert.tbs_certificate.subject_public_key_info.to_der()? == spki_der {
                    leaf_index = Some(index);
                    break;
                }
            }
        }
    }
    let leaf_index = leaf_index
        .ok_or(Error::UnexpectedStructure("no certificate matches the private key"))?;

    let mut certs = bags.certs;
    let (leaf, _) = certs.remove(leaf_index);
    check_key_matches(&key, &leaf)?;
    let ca_certs = certs.into_iter().map(|(cert, _)| cert).collect();
    Ok((key, leaf, ca_certs))
}

/// Decode a trust store: a PFX carrying only certificates, either in the
/// Java dialect (cert bags marked with the `trustedKeyUsage` attribute) or
/// as bare cert bags. Key material causes a rejection.
pub fn decode_trust_store(pfx_der: &[u8], password: &str) -> Result<Vec<Certificate>> {
    let bags = extract(pfx_der, password).map_err(conflate_decryption)?;
    if !bags.keys.is_empty() {
        return Err(Error::UnexpectedStructure("trust store contains key material"));
    }
    Ok(bags.certs.into_iter().map(|(cert, _)| cert).collect())
}

/// Transcode a PFX into PEM blocks.
///
/// Every certificate becomes a `CERTIFICATE` block and every private key a
/// `PRIVATE KEY` (plaintext PKCS#8) block. `localKeyId` (hex) and
/// `friendlyName` attributes are preserved as armor headers.
pub fn to_pem(pfx_der: &[u8], password: &str) -> Result<Vec<pem::Pem>> {
    let bags = extract(pfx_der, password).map_err(conflate_decryption)?;
    let mut blocks = Vec::new();
    for (key, attrs) in &bags.keys {
        let mut block = pem::Pem::new("PRIVATE KEY", key.to_pkcs8_der().to_vec());
        attach_headers(&mut block, attrs);
        blocks.push(block);
    }
    for (cert, attrs) in &bags.certs {
        let mut block = pem::Pem::new("CERTIFICATE", cert.to_der()?);
        attach_headers(&mut block, attrs);
        blocks.push(block);
    }
    Ok(blocks)
}

fn attach_headers(block: &mut pem::Pem, attrs: &BagAttributes) {
    if let Some(id) = &attrs.local_key_id {
        let _ = block
            .headers_mut()
            .add("localKeyId", &base16ct::lower::encode_string(id));
    }
    if let Some(name) = &attrs.friendly_name {
        let _ = block.headers_mut().add("friendlyName", name);
    }
}

/// GCM failures are deliberately indistinguishable from a wrong password at
/// the public boundary.
fn conflate_decryption(err: Error) -> Error {
    match err {
        Error::Decryption => Error::IncorrectPassword,
        other => other,
    }
}

/// Run the decode pipeline up to typed bags: parse the PFX, verify the MAC,
/// decrypt each content info, and type every safe bag.
fn extract(pfx_der: &[u8], password: &str) -> Result<ExtractedBags> {
    let password = Password::new(password);
    let pfx = Pfx::from_der(pfx_der)?;
    let auth_content = pfx.authenticated_content()?;

    match &pfx.mac_data {
        Some(mac_data) => mac_data.verify(&auth_content, &password)?,
        // Files without integrity protection are accepted only when no
        // password is in play (the passwordless profile).
        None => {
            if !password.is_empty() {
                return Err(Error::UnexpectedStructure("MAC is absent"));
            }
        }
    }

    let mut bags = ExtractedBags {
        keys: Vec::new(),
        certs: Vec::new(),
    };
    for content_info in Vec::<ContentInfo>::from_der(&auth_content)? {
        let safe_contents: Zeroizing<Vec<u8>> = match content_info.content_type {
            o if o == oid::PKCS7_DATA => Zeroizing::new(content_info.data_content()?),
            o if o == oid::PKCS7_ENCRYPTED_DATA => {
                let encrypted = content_info.encrypted_content()?;
                let scheme = Scheme::from_algorithm(&encrypted.enc_content_info.content_enc_alg)?;
                scheme.decrypt(&password, encrypted.ciphertext()?)?
            }
            o => return Err(Error::Unsupported(o)),
        };
        for bag in Vec::<SafeBag>::from_der(&safe_contents)? {
            collect_bag(&bag, &password, &mut bags)?;
        }
    }
    Ok(bags)
}

fn collect_bag(bag: &SafeBag, password: &Password<'_>, out: &mut ExtractedBags) -> Result<()> {
    let attrs = bag.attributes();
    match bag.bag_id {
        o if o == oid::KEY_BAG => {
            let key = PrivateKey::from_pkcs8_der(&bag.bag_value.to_der()?)?;
            out.keys.push((key, attrs));
        }
        o if o == oid::PKCS8_SHROUDED_KEY_BAG => {
            let shrouded: EncryptedPrivateKeyInfo = decode_any(&bag.bag_value)?;
            let plaintext = shrouded.decrypt(password)?;
            out.keys.push((PrivateKey::from_pkcs8_der(&plaintext)?, attrs));
        }
        o if o == oid::CERT_BAG => {
            let cert_bag: CertBag = decode_any(&bag.bag_value)?;
            let cert = Certificate::from_der(&cert_bag.x509_der()?)?;
            out.certs.push((cert, attrs));
        }
        o if o == oid::SECRET_BAG => {
            // The Java dialect occasionally wraps trust-store certificates
            // in secret bags; unwrap those and reject anything else.
            let secret: SecretBag = decode_any(&bag.bag_value)?;
            let cert_bag: CertBag =
                decode_any(&secret.secret_value).map_err(|_| Error::Unsupported(secret.secret_type_id))?;
            let cert = Certificate::from_der(&cert_bag.x509_der()?)?;
            out.certs.push((cert, attrs));
        }
        o if o == oid::CRL_BAG => (),
        o => return Err(Error::Unsupported(o)),
    }
    Ok(())
}

/// The leaf certificate's public key must equal the private key's public
/// component, whenever the latter is recoverable from the key material.
fn check_key_matches(key: &PrivateKey, cert: &Certificate) -> Result<()> {
    if let Some(spki) = key.subject_public_key_info_opt()? {
        if spki.to_der()? != cert.tbs_certificate.subject_public_key_info.to_der()? {
            return Err(Error::UnexpectedStructure(
                "certificate public key does not match private key",
            ));
        }
    }
    Ok(())
}

/// Subject common name, used as the friendly name of trust-store entries.
pub(crate) fn subject_common_name(cert: &Certificate) -> Option<String> {
    for rdn in cert.tbs_certificate.subject.0.iter() {
        for atv in rdn.0.iter() {
            if atv.oid == oid::COMMON_NAME {
                if let Ok(s) = core::str::from_utf8(atv.value.value()) {
                    return Some(s.into());
                }
            }
        }
    }
    None
}
