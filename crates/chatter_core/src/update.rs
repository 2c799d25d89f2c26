use crate::state::sanitize;
use crate::{ChatMessage, ClientState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ClientState, msg: Msg) -> (ClientState, Vec<Effect>) {
    let effects = match msg {
        Msg::LoginSubmitted(raw) => {
            // The login form disables its button on empty input, but an
            // empty or whitespace name is still rejected here.
            let desired = raw.trim();
            if desired.is_empty() || state.session().is_logged_in() {
                return (state, Vec::new());
            }
            vec![Effect::Authenticate {
                username: desired.to_string(),
            }]
        }
        Msg::LoginCompleted { username, result } => match result {
            Ok(()) => {
                let epoch = state.begin_session(sanitize(&username));
                vec![Effect::Poll {
                    epoch,
                    since_timestamp: state.watermark(),
                }]
            }
            Err(error) => {
                state.set_login_error(error.reason);
                Vec::new()
            }
        },
        Msg::LogoutClicked | Msg::Shutdown => {
            // Optimistic logout: the local session flips and the poll loop
            // stops before the deauthentication request is even issued.
            let Some(username) = state.session().username().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            state.end_session();
            vec![Effect::CancelPoll, Effect::Deauthenticate { username }]
        }
        Msg::LogoutCompleted { result } => {
            match result {
                Ok(()) => Vec::new(),
                Err(error) => {
                    // Reported in the feed; the session is not reverted to
                    // logged-in.
                    state.append_messages(vec![ChatMessage::system(error)]);
                    Vec::new()
                }
            }
        }
        Msg::PollCompleted { epoch, result } => {
            if epoch != state.epoch() {
                // A previous session's poll resolving late; drop it whole.
                return (state, Vec::new());
            }
            if !state.session().is_logged_in() {
                state.set_poll_idle();
                return (state, Vec::new());
            }
            match result {
                Ok(batch) => state.append_messages(batch),
                Err(error) => state.append_messages(vec![ChatMessage::system(error)]),
            }
            // Failure never stops the loop; only losing the session does.
            vec![Effect::Poll {
                epoch,
                since_timestamp: state.watermark(),
            }]
        }
        Msg::ComposeSubmitted(text) => {
            let SessionState::LoggedIn { username } = state.session().clone() else {
                return (state, Vec::new());
            };
            if state.compose_busy() || text.trim().is_empty() {
                return (state, Vec::new());
            }
            // The compose affordance stays disabled until SubmitCompleted so
            // repeated activation cannot double-post.
            state.set_compose_busy(true);
            vec![Effect::Submit {
                nickname: username,
                message: text,
            }]
        }
        Msg::SubmitCompleted { result } => {
            state.set_compose_busy(false);
            match result {
                Ok(()) => vec![Effect::ClearCompose],
                // Submission failures go to the diagnostic log, not the feed.
                Err(_) => Vec::new(),
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
