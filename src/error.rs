//! All possible protocol errors.
//!
use core::{
    error,
    fmt::{Display, Formatter},
};
use std::io::{self, ErrorKind};

/// Enumeration of all possible protocol errors.
///
/// None of these are retried internally: an activation exchange is not safe
/// to repeat blindly without the client's cooperation, so every error is
/// surfaced to the caller, which should reset the connection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// A fixed header field or length invariant of the frame was violated.
    ///
    /// # Suggested error handling strategy
    ///
    /// This error is fatal to the current exchange. No partial response has
    /// been produced; the connection should be reset.
    MalformedFrame(MalformedFrame),

    /// The message-type discriminator did not match a known value.
    ///
    /// Only the bind handshake (`0x0b`) and the payload request (`0x00`)
    /// are meaningful; everything else is an error that must not be
    /// silently swallowed, so the caller can close the connection.
    UnhandledMessageType {
        /// The unrecognized discriminator byte.
        received: u8,
    },

    /// A cipher operation was rejected.
    ///
    /// With the frame-length guards in place the key and IV are always
    /// exactly 16 bytes, so this indicates either a ciphertext that is not
    /// block-aligned or an internal cipher failure. Treat it as an
    /// assertion-level fault, not a recoverable condition.
    CryptoFault(CryptoFault),

    /// The activation business-logic collaborator failed.
    ///
    /// The failure is propagated as-is; no response envelope is encoded.
    BusinessLogicFault(BusinessLogicFault),
}

/// Violations of the fixed frame layout.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MalformedFrame {
    /// The frame is shorter than its fixed header.
    FrameTooShort {
        /// The received frame length.
        received: usize,
        /// The minimum length the layout requires.
        expected: usize,
    },

    /// The second declared body length does not match the buffer size.
    LengthMismatch {
        /// The declared body length.
        declared: u32,
        /// The body length implied by the buffer size.
        actual: u32,
    },

    /// The decrypted request is too short to carry the inner salt.
    InnerPayloadTooShort {
        /// The decrypted plaintext length.
        received: usize,
    },
}

/// Failures inside the block-cipher operations.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum CryptoFault {
    /// The fixed key was rejected by the cipher construction.
    KeyRejected,

    /// Encryption of the response envelope failed.
    EncryptFailed,

    /// Decryption of the request envelope failed. Typically a ciphertext
    /// that is not a whole number of blocks or has invalid padding.
    DecryptFailed,
}

/// An opaque failure reported by the activation logic collaborator.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BusinessLogicFault {
    message: String,
}

impl BusinessLogicFault {
    /// Wrap a collaborator failure description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The collaborator's failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedFrame(err) => write!(f, "MalformedFrame: {}", err),
            Error::UnhandledMessageType { received } => {
                write!(f, "UnhandledMessageType: received {:#04x}", received)
            }
            Error::CryptoFault(err) => write!(f, "CryptoFault: {}", err),
            Error::BusinessLogicFault(err) => write!(f, "BusinessLogicFault: {}", err),
        }
    }
}

impl Display for MalformedFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            MalformedFrame::FrameTooShort { received, expected } => write!(
                f,
                "FrameTooShort: received {} bytes, expected at least {}",
                received, expected
            ),
            MalformedFrame::LengthMismatch { declared, actual } => write!(
                f,
                "LengthMismatch: declared body length {}, buffer implies {}",
                declared, actual
            ),
            MalformedFrame::InnerPayloadTooShort { received } => {
                write!(f, "InnerPayloadTooShort: received {} bytes", received)
            }
        }
    }
}

impl Display for CryptoFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CryptoFault::KeyRejected => write!(f, "KeyRejected"),
            CryptoFault::EncryptFailed => write!(f, "EncryptFailed"),
            CryptoFault::DecryptFailed => write!(f, "DecryptFailed"),
        }
    }
}

impl Display for BusinessLogicFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::MalformedFrame(err) => Some(err),
            Error::UnhandledMessageType { .. } => None,
            Error::CryptoFault(err) => Some(err),
            Error::BusinessLogicFault(err) => Some(err),
        }
    }
}

impl error::Error for MalformedFrame {}

impl error::Error for CryptoFault {}

impl error::Error for BusinessLogicFault {}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::new(ErrorKind::Other, e)
    }
}

impl From<MalformedFrame> for Error {
    fn from(e: MalformedFrame) -> Self {
        Error::MalformedFrame(e)
    }
}

impl From<CryptoFault> for Error {
    fn from(e: CryptoFault) -> Self {
        Error::CryptoFault(e)
    }
}

impl From<BusinessLogicFault> for Error {
    fn from(e: BusinessLogicFault) -> Self {
        Error::BusinessLogicFault(e)
    }
}
