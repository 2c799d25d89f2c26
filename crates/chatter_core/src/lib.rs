//! Chatter core: pure session/poll state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    sanitize, ChatMessage, ClientState, Epoch, PollState, RemoteError, SessionState, Timestamp,
    SYSTEM_NICKNAME,
};
pub use update::update;
pub use view_model::{format_clock_time, ClientViewModel, MessageRowView};
