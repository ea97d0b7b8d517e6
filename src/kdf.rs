//! PKCS#12 password handling and key derivation.
//!
//! Implements the v1 KDF of [RFC 7292 Appendix B], which stretches a
//! BMPString-encoded password into cipher keys, initialization vectors and
//! MAC keys. PBES2 and PBMAC1 use PBKDF2 instead, fed with the raw UTF-8
//! password; both encodings are materialised by [`Password`].
//!
//! [RFC 7292 Appendix B]: https://datatracker.ietf.org/doc/html/rfc7292#appendix-B

use crate::{Error, Result};
use alloc::vec::Vec;
use digest::{core_api::BlockSizeUser, Digest};
use zeroize::Zeroizing;

/// Password handle carrying the caller's UTF-8 passphrase.
///
/// PKCS#12 uses two incompatible password encodings side by side: the v1 KDF
/// and the legacy MAC consume a big-endian UTF-16 (BMPString) byte sequence
/// *including* a two-byte NUL terminator, while PBKDF2-based constructions
/// (PBES2, PBMAC1) consume the raw UTF-8 bytes without terminator. Keeping
/// both behind one handle prevents call sites from picking the wrong form.
#[derive(Copy, Clone, Debug)]
pub struct Password<'a>(&'a str);

impl<'a> Password<'a> {
    /// Wrap a UTF-8 passphrase.
    pub fn new(password: &'a str) -> Self {
        Self(password)
    }

    /// Is the passphrase empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw UTF-8 form, used by PBKDF2 (PBES2 and PBMAC1).
    pub fn as_utf8(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// BMPString form: big-endian UTF-16 code units followed by a 0x0000
    /// terminator, used by the PKCS#12 v1 KDF and the legacy MAC.
    ///
    /// The empty password encodes as the bare terminator (two zero bytes),
    /// matching what Windows and OpenSSL produce.
    pub fn to_bmp(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity((self.0.len() + 1) * 2));
        for unit in self.0.encode_utf16() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        out.extend_from_slice(&[0, 0]);
        out
    }
}

impl<'a> From<&'a str> for Password<'a> {
    fn from(password: &'a str) -> Self {
        Self::new(password)
    }
}

/// Purpose of the derived material, the "ID byte" of RFC 7292 Appendix B.3.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyPurpose {
    /// ID 1: cipher key material.
    EncryptionKey,
    /// ID 2: initialization vector.
    Iv,
    /// ID 3: MAC key.
    Mac,
}

impl KeyPurpose {
    fn id(self) -> u8 {
        match self {
            KeyPurpose::EncryptionKey => 1,
            KeyPurpose::Iv => 2,
            KeyPurpose::Mac => 3,
        }
    }
}

/// Derive `out_len` bytes of key material with the PKCS#12 v1 KDF.
///
/// `D` is the underlying hash; all hashes used by PKCS#12 (SHA-1, SHA-256,
/// SM3) have a 64-byte block size, which is the `v` parameter of the
/// algorithm. An iteration count of zero is rejected.
pub fn derive_key<D>(
    password: &Password<'_>,
    salt: &[u8],
    purpose: KeyPurpose,
    iterations: u32,
    out_len: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    D: Digest + BlockSizeUser,
{
    if iterations == 0 {
        return Err(Error::UnexpectedStructure("KDF iteration count is zero"));
    }

    let v = D::block_size();
    let u = <D as Digest>::output_size();
    let bmp_password = password.to_bmp();

    // D = ID byte repeated v times; I = S' || P', each operand repeated up
    // to the nearest multiple of v.
    let diversifier = alloc::vec![purpose.id(); v];
    let mut i_buf = Zeroizing::new(repeat_to_block_multiple(salt, v));
    i_buf.extend_from_slice(&repeat_to_block_multiple(&bmp_password, v));

    let mut out = Zeroizing::new(Vec::with_capacity(out_len));
    while out.len() < out_len {
        let mut hasher = D::new();
        Digest::update(&mut hasher, &diversifier);
        Digest::update(&mut hasher, i_buf.as_slice());
        let mut block = hasher.finalize();
        for _ in 1..iterations {
            block = D::digest(&block);
        }

        let take = core::cmp::min(u, out_len - out.len());
        out.extend_from_slice(&block[..take]);
        if out.len() >= out_len {
            break;
        }

        // B = A repeated to v bytes; add B + 1 to every v-byte chunk of I,
        // big-endian with carry, modulo 2^(8v).
        let b = repeat_to_len(&block, v);
        for chunk in i_buf.chunks_mut(v) {
            add_one_plus(chunk, &b);
        }
    }

    Ok(out)
}

/// Concatenate copies of `data` up to `ceil(len / v) * v` bytes.
fn repeat_to_block_multiple(data: &[u8], v: usize) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    let target = ((data.len() + v - 1) / v) * v;
    repeat_to_len(data, target)
}

/// Concatenate copies of `data`, truncated to exactly `len` bytes.
fn repeat_to_len(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let take = core::cmp::min(data.len(), len - out.len());
        out.extend_from_slice(&data[..take]);
    }
    out
}

/// `chunk += addend + 1` as big-endian integers; the carry out of the top
/// byte is discarded. Both slices have length `v`.
fn add_one_plus(chunk: &mut [u8], addend: &[u8]) {
    let mut carry = 1u16;
    for (a, b) in chunk.iter_mut().rev().zip(addend.iter().rev()) {
        let sum = u16::from(*a) + u16::from(*b) + carry;
        *a = (sum & 0xff) as u8;
        carry = sum >> 8;
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_key, KeyPurpose, Password};
    use hex_literal::hex;
    use sha1::Sha1;

    /// Test vectors for the SHA-1 KDF published alongside the original
    /// PKCS#12 test suite ("smeg"/"queeg" vectors).
    #[test]
    fn sha1_smeg_encryption_key() {
        let key = derive_key::<Sha1>(
            &Password::new("smeg"),
            &hex!("0A58CF64530D823F"),
            KeyPurpose::EncryptionKey,
            1,
            24,
        )
        .unwrap();
        assert_eq!(
            key.as_slice(),
            hex!("8AAAE6297B6CB04642AB5B077851284EB7128F1A2A7FBCA3")
        );
    }

    #[test]
    fn sha1_smeg_iv() {
        let iv = derive_key::<Sha1>(
            &Password::new("smeg"),
            &hex!("0A58CF64530D823F"),
            KeyPurpose::Iv,
            1,
            8,
        )
        .unwrap();
        assert_eq!(iv.as_slice(), hex!("79993DFE048D3B76"));
    }

    #[test]
    fn sha1_queeg_iterated() {
        let key = derive_key::<Sha1>(
            &Password::new("queeg"),
            &hex!("05DEC959ACFF72F7"),
            KeyPurpose::EncryptionKey,
            1000,
            24,
        )
        .unwrap();
        assert_eq!(
            key.as_slice(),
            hex!("ED2034E36328830FF09DF1E1A07DD357185DAC0D4F9EB3D4")
        );
    }

    #[test]
    fn bmp_encoding_includes_terminator() {
        assert_eq!(Password::new("").to_bmp().as_slice(), [0u8, 0]);
        assert_eq!(
            Password::new("AB").to_bmp().as_slice(),
            [0x00u8, 0x41, 0x00, 0x42, 0x00, 0x00]
        );
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(derive_key::<Sha1>(
            &Password::new("smeg"),
            &hex!("0A58CF64530D823F"),
            KeyPurpose::Mac,
            0,
            20
        )
        .is_err());
    }
}
