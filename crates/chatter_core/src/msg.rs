use crate::state::{ChatMessage, Epoch, RemoteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the login form with a desired username.
    LoginSubmitted(String),
    /// Remote authentication finished. `username` echoes the name the
    /// request was issued for.
    LoginCompleted {
        username: String,
        result: Result<(), RemoteError>,
    },
    /// User clicked logout.
    LogoutClicked,
    /// Remote deauthentication finished.
    LogoutCompleted { result: Result<(), RemoteError> },
    /// One long-poll request finished, successfully or not. `epoch` is the
    /// session generation the request was issued under.
    PollCompleted {
        epoch: Epoch,
        result: Result<Vec<ChatMessage>, RemoteError>,
    },
    /// User submitted the compose box.
    ComposeSubmitted(String),
    /// The outbound message post finished.
    SubmitCompleted { result: Result<(), RemoteError> },
    /// Client teardown; logs out best-effort without waiting for the server.
    Shutdown,
    /// Fallback for placeholder wiring.
    NoOp,
}
