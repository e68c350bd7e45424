//! Message-type routing and the V5 payload handler.
//!
//! The dispatcher inspects a single discriminator byte and hands the whole
//! frame to one of two collaborators: the bind-handshake handler or the
//! payload handler chain. It never touches the frame contents beyond that
//! byte and returns the selected handler's response unmodified.

use tracing::{debug, warn};

use crate::{
    codec::EnvelopeCodec,
    config::Config,
    error::{BusinessLogicFault, Error, MalformedFrame},
    specification::{MSG_TYPE_BIND, MSG_TYPE_OFFSET, MSG_TYPE_REQUEST},
};

/// A handler for one complete RPC frame.
///
/// Implemented by the bind-handshake collaborator and by the payload chain
/// (this crate ships [`EnvelopeHandler`] for the latter). A handler returns
/// the complete response frame or an error; it never produces partial
/// output.
pub trait MessageHandler {
    /// Handle `frame`, returning the bytes to write back to the transport.
    fn handle_request(&mut self, frame: &[u8]) -> Result<Vec<u8>, Error>;
}

/// The activation business logic.
///
/// From the codec's perspective this is a pure function from the decrypted
/// request to the response payload. A failure is propagated as
/// [`Error::BusinessLogicFault`] and no response envelope is encoded.
pub trait ActivationLogic {
    /// Interpret the decrypted activation request and produce the response
    /// payload to be sealed into the envelope.
    fn execute(&mut self, inner_request: &[u8]) -> Result<Vec<u8>, BusinessLogicFault>;
}

/// The closed set of meaningful message types. Anything else on the wire is
/// an error, never silently ignored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MessageType {
    Bind,
    Request,
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            MSG_TYPE_BIND => Ok(MessageType::Bind),
            MSG_TYPE_REQUEST => Ok(MessageType::Request),
            received => Err(Error::UnhandledMessageType { received }),
        }
    }
}

/// Routes inbound frames to the bind handler or the payload handler.
///
/// Stateless beyond delegation: routing has no side effects, and
/// independent requests may be dispatched concurrently, each on its own
/// dispatcher.
#[derive(Debug)]
pub struct RpcDispatcher<B, P> {
    bind_handler: B,
    payload_handler: P,
}

impl<B, P> RpcDispatcher<B, P>
where
    B: MessageHandler,
    P: MessageHandler,
{
    /// Creates a dispatcher over the two collaborating handlers.
    pub fn with_handlers(bind_handler: B, payload_handler: P) -> Self {
        Self {
            bind_handler,
            payload_handler,
        }
    }

    /// Route `frame` by its discriminator byte and return the selected
    /// handler's response.
    ///
    /// # Errors
    ///
    /// [`Error::UnhandledMessageType`] for an unknown discriminator,
    /// [`Error::MalformedFrame`] for a frame too short to carry one, plus
    /// whatever the selected handler surfaces. All of these are fatal to
    /// the current exchange and the caller should reset the connection.
    pub fn handle_request(&mut self, frame: &[u8]) -> Result<Vec<u8>, Error> {
        if frame.len() <= MSG_TYPE_OFFSET {
            return Err(MalformedFrame::FrameTooShort {
                received: frame.len(),
                expected: MSG_TYPE_OFFSET + 1,
            }
            .into());
        }
        match MessageType::try_from(frame[MSG_TYPE_OFFSET]) {
            Ok(MessageType::Bind) => {
                debug!(frame_len = frame.len(), "dispatching bind handshake");
                self.bind_handler.handle_request(frame)
            }
            Ok(MessageType::Request) => {
                debug!(frame_len = frame.len(), "dispatching payload request");
                self.payload_handler.handle_request(frame)
            }
            Err(err) => {
                warn!(%err, "dropping frame");
                Err(err)
            }
        }
    }
}

/// The V5 payload handler: envelope decode, business logic, envelope encode.
#[derive(Debug)]
pub struct EnvelopeHandler<L> {
    codec: EnvelopeCodec,
    logic: L,
}

impl<L> EnvelopeHandler<L> {
    /// Creates a handler with a codec built from `config`.
    pub fn with_config(config: &Config, logic: L) -> Self {
        Self {
            codec: EnvelopeCodec::with_config(config),
            logic,
        }
    }

    /// Creates a handler over an existing codec, e.g. one with a pinned RNG.
    pub fn with_codec(codec: EnvelopeCodec, logic: L) -> Self {
        Self { codec, logic }
    }
}

impl<L: ActivationLogic> MessageHandler for EnvelopeHandler<L> {
    fn handle_request(&mut self, frame: &[u8]) -> Result<Vec<u8>, Error> {
        let decoded = self.codec.decode(frame)?;
        debug!(
            version = decoded.version,
            request_len = decoded.inner_request.len(),
            "decoded activation request"
        );
        let response = self.logic.execute(&decoded.inner_request)?;
        self.codec.encode(&response, &decoded)
    }
}
