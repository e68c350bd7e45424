//! Crypto interface.
//!
//! This module wraps the block cipher and hash used by the V5 envelope:
//! AES-128 in CBC mode with PKCS#7 padding, and SHA-256 for the
//! fresh-random integrity hash.

use core::fmt::{Debug, Formatter};

use aws_lc_rs::{
    cipher::{
        AES_128, DecryptionContext, EncryptionContext, PaddedBlockDecryptingKey,
        PaddedBlockEncryptingKey, UnboundCipherKey,
    },
    digest::{self, SHA256},
    iv::FixedLength,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{error::CryptoFault, specification::HASH_LEN};

/// The 128-bit key sealing and unsealing the V5 envelope.
///
/// The V5 generation of the protocol uses one well-known key shared by every
/// client and server ([`EnvelopeKey::v5`]). It is an interoperability
/// constant reproduced from the wire protocol, not a security boundary:
/// anyone holding the protocol description holds the key.
#[derive(Clone, Eq, PartialEq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey([u8; 16]);

impl EnvelopeKey {
    /// The fixed key of the V5 protocol generation.
    pub fn v5() -> Self {
        Self([
            0xCD, 0x7E, 0x79, 0x6F, 0x2A, 0xB2, 0x5D, 0xCB, 0x55, 0xFF, 0xC8, 0xEF, 0x83, 0x64,
            0xC4, 0x70,
        ])
    }

    /// Get a reference to the key's bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl AsRef<[u8]> for EnvelopeKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 16]> for EnvelopeKey {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

impl Debug for EnvelopeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EnvelopeKey").field(&"*****").finish()
    }
}

/// AES-128-CBC with PKCS#7 padding under a fixed key and caller-supplied IV.
///
/// Stateless apart from the key; one instance may serve any number of
/// independent exchanges.
#[derive(Debug)]
pub(crate) struct EnvelopeCipher {
    key: EnvelopeKey,
}

impl EnvelopeCipher {
    pub(crate) fn with_key(key: EnvelopeKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` with IV = `iv`, returning the padded ciphertext.
    /// The output length is always the next whole block multiple.
    pub(crate) fn encrypt(&self, plaintext: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>, CryptoFault> {
        let key = UnboundCipherKey::new(&AES_128, self.key.as_ref())
            .map_err(|_| CryptoFault::KeyRejected)?;
        let key =
            PaddedBlockEncryptingKey::cbc_pkcs7(key).map_err(|_| CryptoFault::KeyRejected)?;
        let mut in_out = plaintext.to_vec();
        key.less_safe_encrypt(&mut in_out, EncryptionContext::Iv128(FixedLength::from(*iv)))
            .map_err(|_| CryptoFault::EncryptFailed)?;
        Ok(in_out)
    }

    /// Decrypt `ciphertext` with IV = `iv`, returning the unpadded plaintext.
    pub(crate) fn decrypt(&self, ciphertext: &[u8], iv: &[u8; 16]) -> Result<Vec<u8>, CryptoFault> {
        let key = UnboundCipherKey::new(&AES_128, self.key.as_ref())
            .map_err(|_| CryptoFault::KeyRejected)?;
        let key =
            PaddedBlockDecryptingKey::cbc_pkcs7(key).map_err(|_| CryptoFault::KeyRejected)?;
        let mut in_out = ciphertext.to_vec();
        let plaintext = key
            .decrypt(&mut in_out, DecryptionContext::Iv128(FixedLength::from(*iv)))
            .map_err(|_| CryptoFault::DecryptFailed)?;
        Ok(plaintext.to_vec())
    }
}

/// SHA-256 digest of `data`.
pub(crate) fn sha256(data: &[u8]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(digest::digest(&SHA256, data).as_ref());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = EnvelopeCipher::with_key(EnvelopeKey::v5());
        let iv = [0x42u8; 16];
        let plaintext = b"activation request payload";

        let ciphertext = cipher.encrypt(plaintext, &iv).unwrap();
        assert_eq!(cipher.decrypt(&ciphertext, &iv).unwrap(), plaintext);
    }

    #[test]
    fn test_ciphertext_is_next_block_multiple() {
        let cipher = EnvelopeCipher::with_key(EnvelopeKey::v5());
        let iv = [0u8; 16];
        for len in [0usize, 1, 15, 16, 17, 48, 240] {
            let ciphertext = cipher.encrypt(&vec![0xAB; len], &iv).unwrap();
            assert_eq!(ciphertext.len(), (len / 16 + 1) * 16);
        }
    }

    #[test]
    fn test_decrypt_rejects_unaligned_ciphertext() {
        let cipher = EnvelopeCipher::with_key(EnvelopeKey::v5());
        let iv = [0u8; 16];
        assert_eq!(
            cipher.decrypt(&[0u8; 20], &iv),
            Err(CryptoFault::DecryptFailed)
        );
    }

    #[test]
    fn test_iv_prefix_shifts_plaintext_by_one_block() {
        // The V5 decode path feeds the raw salt back through the decryptor
        // as the first ciphertext block. The first plaintext block is then
        // opaque and the original plaintext follows, shifted by 16 bytes.
        let cipher = EnvelopeCipher::with_key(EnvelopeKey::v5());
        let iv = [0x5Au8; 16];
        let plaintext = b"0123456789abcdef0123456789abcdef";

        let ciphertext = cipher.encrypt(plaintext, &iv).unwrap();
        let mut prefixed = iv.to_vec();
        prefixed.extend_from_slice(&ciphertext);

        let shifted = cipher.decrypt(&prefixed, &iv).unwrap();
        assert_eq!(shifted.len(), 16 + plaintext.len());
        assert_eq!(&shifted[16..], plaintext);
    }

    #[test]
    fn test_sha256_known_answer() {
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap()
        );
    }
}
