use std::fmt;

use serde::Deserialize;

pub type Timestamp = u64;
pub type Epoch = u64;

/// One chat message as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    pub nickname: String,
    pub message: String,
}

/// Long-poll response body. The service answers `{"messages": []}` when its
/// hold timeout elapses with no new data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FeedBatch {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// Completion events emitted by the engine, one per issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoginCompleted {
        username: String,
        result: Result<(), RequestError>,
    },
    LogoutCompleted {
        result: Result<(), RequestError>,
    },
    PollCompleted {
        epoch: Epoch,
        result: Result<Vec<WireMessage>, RequestError>,
    },
    SubmitCompleted {
        result: Result<(), RequestError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    InvalidResponse,
    Cancelled,
    Network,
}

impl FailureKind {
    /// Classification tag carried on synthetic system messages.
    pub fn as_msgtype(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::InvalidResponse => "parsererror",
            FailureKind::Cancelled => "abort",
            FailureKind::InvalidUrl | FailureKind::HttpStatus(_) | FailureKind::Network => "error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidResponse => write!(f, "invalid response body"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
