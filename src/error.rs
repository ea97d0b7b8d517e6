//! Error types

use core::fmt;
use der::asn1::ObjectIdentifier;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Error type
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// ASN.1 DER-related errors: malformed encodings, trailing data after a
    /// top-level structure, out-of-range integers.
    Asn1(der::Error),

    /// MAC verification failed or a password-derived key failed to decrypt.
    ///
    /// CBC padding failures are reported as this variant, so invalid padding
    /// is indistinguishable from a wrong password.
    IncorrectPassword,

    /// An authenticated cipher rejected the ciphertext, e.g. a GCM tag
    /// mismatch.
    ///
    /// The top-level decode operations merge this variant into
    /// [`Error::IncorrectPassword`] before returning.
    Decryption,

    /// Algorithm or content type which is recognised but not supported.
    Unsupported(ObjectIdentifier),

    /// A PFX structural invariant was violated, e.g. a certificate bag whose
    /// `localKeyID` matches no key bag.
    UnexpectedStructure(&'static str),

    /// PBKDF2 parameters requested a key length which disagrees with the
    /// selected cipher.
    KeyLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Asn1(err) => write!(f, "PKCS#12 ASN.1 error: {}", err),
            Error::IncorrectPassword => f.write_str("password incorrect"),
            Error::Decryption => f.write_str("decryption failed"),
            Error::Unsupported(oid) => write!(f, "unsupported algorithm: {}", oid),
            Error::UnexpectedStructure(msg) => write!(f, "unexpected PFX structure: {}", msg),
            Error::KeyLength => f.write_str("invalid key length"),
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
