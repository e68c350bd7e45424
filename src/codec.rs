//! Encode/decode of the V5 envelope frames.
//!
//! The decoder recovers the activation request from the client frame; the
//! encoder seals the business response into a frame the client accepts.
//! Both are pure computations over in-memory buffers and never produce
//! partial output.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::Config,
    crypto::{EnvelopeCipher, sha256},
    error::{Error, MalformedFrame},
    specification::{
        HASH_LEN, REQ_HDR_LEN, REQ_LEN_FIELDS_LEN, REQ_PAD_LEN, RES_PREFIX_LEN, RES_RESERVED,
        SALT_LEN, VERSION_LEN, response_padding_len,
    },
};

/// One decoded request, holding everything the encode step of the same
/// exchange needs. All values are local to a single request/response cycle
/// and are never shared across exchanges.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedRequest {
    /// Protocol minor/major version tag, echoed into the response.
    pub version: u32,
    /// The client-chosen salt, doubling as the AES IV for both directions.
    pub salt: [u8; 16],
    /// The first decrypted block, recovered by feeding the raw salt back
    /// through the decryptor. Used only for the response blinding XOR.
    pub inner_salt: [u8; 16],
    /// The decrypted activation request, handed to the business logic.
    pub inner_request: Vec<u8>,
}

/// Bidirectional mapping between V5 wire frames and plaintext payloads.
///
/// The codec is constructed from a [`Config`] carrying the fixed envelope
/// key. Decoding is stateless; encoding draws one fresh 16-byte random per
/// response from the codec's RNG.
#[derive(Debug)]
pub struct EnvelopeCodec {
    cipher: EnvelopeCipher,
    rng: StdRng,
}

impl EnvelopeCodec {
    /// Creates a codec with the RNG seeded from OS entropy.
    pub fn with_config(config: &Config) -> Self {
        Self::with_config_and_rng(config, StdRng::from_os_rng())
    }

    /// Creates a codec with a caller-supplied RNG.
    ///
    /// The RNG only feeds the per-response fresh random, which must be
    /// unique per response but carries no secrecy requirement. Supplying a
    /// seeded RNG makes frame construction deterministic, which is useful
    /// for tests and known-answer comparisons.
    pub fn with_config_and_rng(config: &Config, rng: StdRng) -> Self {
        Self {
            cipher: EnvelopeCipher::with_key(config.envelope_key.clone()),
            rng,
        }
    }

    /// Decode a request frame into the inner activation request.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedFrame`] if the frame violates the fixed layout,
    /// [`Error::CryptoFault`] if the reassembled ciphertext is rejected by
    /// the cipher. Either way no partial result escapes.
    pub fn decode(&self, frame: &[u8]) -> Result<DecodedRequest, Error> {
        if frame.len() < REQ_HDR_LEN {
            return Err(MalformedFrame::FrameTooShort {
                received: frame.len(),
                expected: REQ_HDR_LEN,
            }
            .into());
        }

        // The first declared length is redundant; the second must match the
        // buffer: body = version + salt + encrypted = frame - lengths - pad.
        let declared = u32::from_le_bytes(frame[4..8].try_into().unwrap());
        let actual = (frame.len() - REQ_LEN_FIELDS_LEN - REQ_PAD_LEN) as u32;
        if declared != actual {
            return Err(MalformedFrame::LengthMismatch { declared, actual }.into());
        }

        let version = u32::from_le_bytes(frame[8..12].try_into().unwrap());
        let salt: [u8; 16] = frame[12..REQ_HDR_LEN].try_into().unwrap();

        // Reassemble `salt ‖ encrypted ‖ pad`. The raw salt bytes double as
        // the first ciphertext block, so the first plaintext block is the
        // inner salt and the client's request follows one block later.
        let mut ciphertext = Vec::with_capacity(SALT_LEN + frame.len() - REQ_HDR_LEN);
        ciphertext.extend_from_slice(&salt);
        ciphertext.extend_from_slice(&frame[REQ_HDR_LEN..]);

        let plaintext = self.cipher.decrypt(&ciphertext, &salt)?;
        if plaintext.len() < SALT_LEN {
            return Err(MalformedFrame::InnerPayloadTooShort {
                received: plaintext.len(),
            }
            .into());
        }

        Ok(DecodedRequest {
            version,
            salt,
            inner_salt: plaintext[..SALT_LEN].try_into().unwrap(),
            inner_request: plaintext[SALT_LEN..].to_vec(),
        })
    }

    /// Seal a business response into a response frame for `exchange`.
    ///
    /// The plaintext laid out before encryption is
    /// `response ‖ blinding block ‖ SHA-256(fresh random)`, where the
    /// blinding block is the byte-wise XOR of the inner salt, the request
    /// salt and the fresh random. The hash is bound to the fresh random so
    /// the client can validate server authenticity, and the blinding block
    /// ties the exchange to both sides' salts.
    pub fn encode(
        &mut self,
        response: &[u8],
        exchange: &DecodedRequest,
    ) -> Result<Vec<u8>, Error> {
        let fresh_random: [u8; 16] = self.rng.random();
        let integrity_hash = sha256(&fresh_random);

        let mut blinding = [0u8; SALT_LEN];
        for i in 0..SALT_LEN {
            blinding[i] = exchange.inner_salt[i] ^ exchange.salt[i] ^ fresh_random[i];
        }

        let mut plaintext = Vec::with_capacity(response.len() + SALT_LEN + HASH_LEN);
        plaintext.extend_from_slice(response);
        plaintext.extend_from_slice(&blinding);
        plaintext.extend_from_slice(&integrity_hash);

        let encrypted = self.cipher.encrypt(&plaintext, &exchange.salt)?;

        let body_len = VERSION_LEN + SALT_LEN + encrypted.len();
        let padding_len = response_padding_len(body_len);
        let mut frame = Vec::with_capacity(RES_PREFIX_LEN + body_len + padding_len);
        frame.extend_from_slice(&(body_len as u32).to_le_bytes());
        frame.extend_from_slice(&RES_RESERVED);
        frame.extend_from_slice(&(body_len as u32).to_le_bytes());
        frame.extend_from_slice(&exchange.version.to_le_bytes());
        frame.extend_from_slice(&exchange.salt);
        frame.extend_from_slice(&encrypted);
        frame.resize(frame.len() + padding_len, 0);
        Ok(frame)
    }
}
