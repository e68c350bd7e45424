//! Configuration for setting up an [`EnvelopeCodec`] or [`EnvelopeHandler`].
//!
//! The only decision to make is which envelope key to use. Real V5 clients
//! expect the well-known interoperability key, so [`Config::v5`] is almost
//! always the right choice; a caller-supplied key is useful for exercising
//! the codec in isolation.
//!
//! # Example
//!
//! ```
//! use kmswire::{Config, EnvelopeKey};
//!
//! // Interoperate with real clients:
//! let config = Config::v5();
//!
//! // Or pin a key of your own:
//! let config = Config::with_envelope_key(EnvelopeKey::from([0u8; 16]));
//! ```
//!
//! [`EnvelopeCodec`]: crate::EnvelopeCodec
//! [`EnvelopeHandler`]: crate::EnvelopeHandler
use crate::crypto::EnvelopeKey;

/// Configuration for the V5 envelope codec.
///
/// The key is fixed for the lifetime of any codec built from this config;
/// it is injected at construction and never mutated at runtime.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    pub(crate) envelope_key: EnvelopeKey,
}

impl Config {
    /// Configuration using the well-known V5 interoperability key.
    pub fn v5() -> Self {
        Self {
            envelope_key: EnvelopeKey::v5(),
        }
    }

    /// Configuration using a caller-supplied envelope key.
    pub fn with_envelope_key(envelope_key: EnvelopeKey) -> Self {
        Self { envelope_key }
    }
}
