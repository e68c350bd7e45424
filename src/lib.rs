//! Kmswire is a server-side implementation of the V5 generation of the
//! volume-license activation wire protocol. It reproduces the externally
//! fixed binary frame layout and the protocol's non-standard combination of
//! AES-CBC and a salt-derived integrity hash, byte-for-byte compatible with
//! third-party activation clients.
//!
//! ## Quick Start
//!
//! The crate provides two composed components:
//!
//! * [`EnvelopeCodec`]
//!
//!   The codec maps between wire frames and plaintext activation payloads:
//!   [`EnvelopeCodec::decode`] authenticates and decrypts a request frame,
//!   [`EnvelopeCodec::encode`] seals a business response into a frame a real
//!   client accepts. It is a pure computation over in-memory buffers,
//!   following the sans-I/O principle; it never blocks and never returns
//!   partial output.
//!
//! * [`RpcDispatcher`]
//!
//!   The dispatcher routes an inbound frame by its message-type byte to a
//!   bind-handshake handler or the payload handler. Both collaborators are
//!   [`MessageHandler`]s supplied by the caller; [`EnvelopeHandler`] is the
//!   ready-made payload handler chaining the codec with an
//!   [`ActivationLogic`] implementation.
//!
//! Neither component owns a socket: the transport hands raw bytes to
//! [`RpcDispatcher::handle_request`] and writes the returned bytes back.
//! Concurrent exchanges need no coordination; every per-request value
//! (salt, inner salt, fresh random) is local to one call.
//!
//! ```
//! use kmswire::{
//!     ActivationLogic, BusinessLogicFault, Config, EnvelopeHandler, Error,
//!     MessageHandler, RpcDispatcher,
//! };
//!
//! struct Logic;
//!
//! impl ActivationLogic for Logic {
//!     fn execute(&mut self, inner_request: &[u8]) -> Result<Vec<u8>, BusinessLogicFault> {
//!         // Interpret the activation request, count licenses, and so on.
//!         Ok(inner_request.to_vec())
//!     }
//! }
//!
//! struct BindAck;
//!
//! impl MessageHandler for BindAck {
//!     fn handle_request(&mut self, frame: &[u8]) -> Result<Vec<u8>, Error> {
//!         // Build the bind acknowledgement frame here.
//!         Ok(frame.to_vec())
//!     }
//! }
//!
//! let mut dispatcher = RpcDispatcher::with_handlers(
//!     BindAck,
//!     EnvelopeHandler::with_config(&Config::v5(), Logic),
//! );
//! // Raw bytes from the transport go through `dispatcher.handle_request(..)`
//! // and the returned bytes go back out on the wire.
//! ```
//!
//! ## Configuration
//!
//! [`Config`] carries the 16-byte envelope key. The V5 generation uses one
//! well-known interoperability constant ([`Config::v5`]); it is not a
//! secret, merely a value both sides must share to produce identical
//! ciphertext. Other protocol generations substitute their own key, salt
//! and cipher rules into the same dispatcher and codec shape.
//!
//! ## Errors
//!
//! All failures surface through [`Error`]; none are retried internally,
//! because an activation exchange is not safe to repeat without the
//! client's cooperation. See the [`error`] module for the taxonomy and the
//! suggested handling strategy of each variant.
#![warn(missing_debug_implementations, missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;

mod codec;
mod crypto;
mod dispatch;
mod specification;

pub use codec::{DecodedRequest, EnvelopeCodec};
pub use config::Config;
pub use crypto::EnvelopeKey;
pub use dispatch::{ActivationLogic, EnvelopeHandler, MessageHandler, RpcDispatcher};
pub use error::{BusinessLogicFault, Error};

#[cfg(test)]
mod test {
    use crate::{
        crypto::EnvelopeCipher,
        specification::{REQ_PAD_LEN, SALT_LEN, VERSION_LEN},
    };

    /// Version tag of the V5 generation: minor 0, major 5, little-endian.
    pub(crate) const V5_VERSION: u32 = 0x0005_0000;

    /// Request-side mirror of the server encoder, producing what a real
    /// client transmits: the activation request is CBC-encrypted under the
    /// fixed key with IV = salt, and the salt itself acts as the implied
    /// first ciphertext block of the stream the server decrypts. The last
    /// four ciphertext bytes occupy the frame's trailing pad field.
    pub(crate) fn encode_request(
        cipher: &EnvelopeCipher,
        inner_request: &[u8],
        salt: [u8; 16],
        version: u32,
    ) -> Vec<u8> {
        let ciphertext = cipher.encrypt(inner_request, &salt).unwrap();
        let body_len = (VERSION_LEN + SALT_LEN + ciphertext.len() - REQ_PAD_LEN) as u32;

        let mut frame = Vec::new();
        frame.extend_from_slice(&body_len.to_le_bytes());
        frame.extend_from_slice(&body_len.to_le_bytes());
        frame.extend_from_slice(&version.to_le_bytes());
        frame.extend_from_slice(&salt);
        frame.extend_from_slice(&ciphertext);
        frame
    }
}
