//! Pure Rust implementation of Personal Information Exchange Syntax
//! (PKCS#12) as described in [RFC 7292]: password-protected transport of
//! private keys and certificates.
//!
//! # About
//!
//! PKCS#12 (also known as PFX or P12) bundles one or more private keys and
//! X.509 certificates into a single DER-encoded container, protected by
//! password-derived encryption and an integrity MAC. This crate decodes and
//! encodes that container end to end:
//!
//! - the historical PBE suites (3DES and RC2 under the PKCS#12 v1 KDF) for
//!   reading files produced by older tooling;
//! - PBES2 with AES-128/192/256-CBC, 3DES, RC2, SM4-CBC and SM4-GCM;
//! - the legacy HMAC-SHA-1/SHA-256/SM3 container MAC and PBMAC1
//!   ([RFC 9579]);
//! - the ShangMi (SM2/SM3/SM4) algorithm family throughout.
//!
//! Reading is strict DER: trailing bytes are rejected at every nesting
//! level. Writing goes through an [`EncoderProfile`], a closed value
//! selecting the bag cipher, key cipher, MAC and iteration counts; the
//! provided profiles are [`EncoderProfile::LEGACY`],
//! [`EncoderProfile::PASSWORDLESS`], [`EncoderProfile::MODERN_2023`] and
//! [`EncoderProfile::SHANG_MI_2024`]. Encoding draws randomness only from
//! the RNG argument, so output is deterministic for a fixed RNG.
//!
//! Decoded private keys are returned as the closed [`PrivateKey`] enum
//! (RSA, ECDSA on the NIST prime curves, or SM2) carrying zeroized PKCS#8
//! material; certificates are [`x509_cert::Certificate`] values.
//!
//! [RFC 7292]: https://datatracker.ietf.org/doc/html/rfc7292
//! [RFC 9579]: https://datatracker.ietf.org/doc/html/rfc9579

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod decode;
mod encode;
mod error;

pub mod kdf;
pub mod key;
pub mod mac;
pub mod oid;
pub mod pbes;
pub mod pfx;
pub mod safe_bag;

pub use crate::{
    decode::{decode, decode_chain, decode_trust_store, to_pem},
    encode::EncoderProfile,
    error::{Error, Result},
    kdf::Password,
    key::{EncryptedPrivateKeyInfo, NamedCurve, PrivateKey},
};
pub use der::{self, asn1::ObjectIdentifier};
pub use pem;
pub use rand_core;
pub use spki;
pub use x509_cert::{self, Certificate};
pub use zeroize;
