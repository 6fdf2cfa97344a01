use std::borrow::Cow;

use crate::error::ChaincodeResult;

/// Status of a successful call.
pub const OK: i32 = 200;
/// Status of a failed call.
pub const ERROR: i32 = 500;

/// What the hosting runtime receives back from `init` or `invoke`.
///
/// Success carries the operation's result as payload bytes; failure carries
/// only a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload: payload.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }

    /// Payload as text, replacing invalid UTF-8.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl From<ChaincodeResult<String>> for Response {
    fn from(result: ChaincodeResult<String>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

impl From<crate::error::ChaincodeError> for Response {
    fn from(e: crate::error::ChaincodeError) -> Self {
        Self::error(e.to_string())
    }
}
