use serde::{Deserialize, Serialize};

/// Carried on every `_RESP` frame that failed. `ok` is always `false` here;
/// success responses carry their own `ok: true` plus domain fields instead
/// of reusing this type, since there is no single shared success shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error_code: String,
    pub error_msg: String,
}

impl ErrorEnvelope {
    pub fn new(error_code: impl Into<String>, error_msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: error_code.into(),
            error_msg: error_msg.into(),
        }
    }
}

/// Payload for the out-of-band `ERROR` frame (not tied to a specific request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfBandError {
    pub error_code: String,
    pub error_msg: String,
}

impl OutOfBandError {
    pub fn new(error_code: impl Into<String>, error_msg: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            error_msg: error_msg.into(),
        }
    }
}

/// Payload for frames that only ever need to report success, e.g.
/// `UNMUTE_MEMBER_RESP`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
