use chrono::DateTime;

use crate::state::{ChatMessage, SessionState, Timestamp};

/// Formats a message timestamp as a `HH:MM:SS` wall-clock reading (UTC).
pub fn format_clock_time(timestamp: Timestamp) -> String {
    match DateTime::from_timestamp_millis(timestamp as i64) {
        Some(moment) => moment.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientViewModel {
    pub session: SessionState,
    pub login_error: Option<String>,
    pub compose_enabled: bool,
    pub messages: Vec<MessageRowView>,
    pub dirty: bool,
}

/// One rendered feed row, the input contract of the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRowView {
    pub timestamp: Option<Timestamp>,
    pub nickname: String,
    pub message: String,
    pub formatted_time: String,
    pub msgtype: Option<String>,
}

impl MessageRowView {
    pub(crate) fn from_message(message: &ChatMessage) -> Self {
        Self {
            timestamp: message.timestamp,
            nickname: message.nickname.clone(),
            message: message.message.clone(),
            // Synthetic messages have no timestamp and no clock reading.
            formatted_time: message.timestamp.map(format_clock_time).unwrap_or_default(),
            msgtype: message.msgtype.clone(),
        }
    }
}
