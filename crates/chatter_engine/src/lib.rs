//! Chatter engine: remote feed requests and effect execution.
mod client;
mod engine;
mod types;

pub use client::{FeedService, FeedSettings, ReqwestFeedService};
pub use engine::EngineHandle;
pub use types::{
    EngineEvent, Epoch, FailureKind, FeedBatch, RequestError, Timestamp, WireMessage,
};
