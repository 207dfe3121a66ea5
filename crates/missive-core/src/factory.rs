//! Intention-revealing constructors.
//!
//! `create_event`, `create_command` and `create_reply` behave identically;
//! the names exist so call sites say what they produce.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::MessageEnvelope;
use crate::errors::EnvelopeError;
use crate::input::EnvelopeInput;
use crate::normalize::normalize;

/// Default `type` of error replies.
pub const ERROR_REPLY_TYPE: &str = "error.reply";

/// Payload of an error reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorReply {
    /// Error payload without details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Creates an event envelope.
pub fn create_event<D: Serialize>(input: EnvelopeInput<D>) -> Result<MessageEnvelope<D>, EnvelopeError> {
    normalize(input)
}

/// Creates a command envelope.
pub fn create_command<D: Serialize>(
    input: EnvelopeInput<D>,
) -> Result<MessageEnvelope<D>, EnvelopeError> {
    normalize(input)
}

/// Creates a reply envelope.
pub fn create_reply<D: Serialize>(input: EnvelopeInput<D>) -> Result<MessageEnvelope<D>, EnvelopeError> {
    normalize(input)
}

/// Creates an error reply. `context.data` is replaced by `error`, and a
/// blank or missing `type` becomes [`ERROR_REPLY_TYPE`].
pub fn create_error_reply<C>(
    context: EnvelopeInput<C>,
    error: ErrorReply,
) -> Result<MessageEnvelope<ErrorReply>, EnvelopeError> {
    let mut input = context.with_data(error);
    if input
        .event_type
        .as_deref()
        .map_or(true, |t| t.trim().is_empty())
    {
        input.event_type = Some(ERROR_REPLY_TYPE.to_string());
    }
    normalize(input)
}
