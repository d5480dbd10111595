use interop_shims_protocol::error::{DecodeError, EncodeError};
use thiserror::Error;

/// Every failure a shim can hit. All of them end the run.
#[derive(Error, Debug)]
pub enum ShimError {
    /// Bad command line arity, unknown message type or malformed parameters
    #[error("Argument error: {0}")]
    Argument(String),
    /// Broker unreachable, channel closed or disconnected mid batch
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timed out waiting for message {received} of {expected} for subtype '{subtype}'")]
    ProtocolTimeout {
        subtype: String,
        expected: usize,
        received: usize,
    },
    #[error("Malformed {subtype} value '{value}': {reason}")]
    MalformedValue {
        subtype: String,
        value: String,
        reason: String,
    },
    #[error("Subtype '{subtype}' is not supported by {context}")]
    UnsupportedSubtype { subtype: String, context: String },
    #[error("{header} header invalid: {reason}")]
    HeaderValidation { header: String, reason: String },
    #[error("Unexpected message shape: expected {expected}, found {found}")]
    UnexpectedShape { expected: String, found: String },
    #[error("Message encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Message decoding failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShimError {
    pub(crate) fn malformed(
        subtype: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ShimError::MalformedValue {
            subtype: subtype.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(subtype: impl Into<String>, context: impl Into<String>) -> Self {
        ShimError::UnsupportedSubtype {
            subtype: subtype.into(),
            context: context.into(),
        }
    }

    pub(crate) fn header(header: impl Into<String>, reason: impl Into<String>) -> Self {
        ShimError::HeaderValidation {
            header: header.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ShimError::UnexpectedShape {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
