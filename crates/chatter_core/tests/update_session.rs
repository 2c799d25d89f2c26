use std::sync::Once;

use chatter_core::{
    update, ChatMessage, ClientState, Effect, Msg, PollState, RemoteError, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn auth_error(reason: &str) -> RemoteError {
    RemoteError {
        msgtype: "error".to_string(),
        reason: reason.to_string(),
    }
}

fn login(state: ClientState, username: &str) -> (ClientState, Vec<Effect>) {
    let (state, _) = update(state, Msg::LoginSubmitted(username.to_string()));
    update(
        state,
        Msg::LoginCompleted {
            username: username.to_string(),
            result: Ok(()),
        },
    )
}

#[test]
fn login_submitted_issues_authentication_request() {
    init_logging();
    let state = ClientState::new();

    let (next, effects) = update(state, Msg::LoginSubmitted("  alice  ".to_string()));

    assert_eq!(next.session(), &SessionState::LoggedOut);
    assert_eq!(
        effects,
        vec![Effect::Authenticate {
            username: "alice".to_string(),
        }]
    );
}

#[test]
fn empty_username_is_rejected_defensively() {
    init_logging();
    let state = ClientState::new();

    let (next, effects) = update(state.clone(), Msg::LoginSubmitted("   ".to_string()));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn login_success_starts_poll_from_zero_watermark() {
    init_logging();
    let state = ClientState::new();

    let (next, effects) = login(state, "alice");

    assert_eq!(
        next.session(),
        &SessionState::LoggedIn {
            username: "alice".to_string(),
        }
    );
    assert_eq!(next.poll(), PollState::Awaiting);
    assert_eq!(
        effects,
        vec![Effect::Poll {
            epoch: 1,
            since_timestamp: 0,
        }]
    );
}

#[test]
fn login_success_sanitizes_username() {
    init_logging();
    let state = ClientState::new();

    let (next, _effects) = login(state, "<b>&x</b>");

    assert_eq!(
        next.session().username(),
        Some("&lt;b&gt;&amp;x&lt;/b&gt;")
    );
}

#[test]
fn login_failure_surfaces_error_without_polling() {
    init_logging();
    let state = ClientState::new();

    let (next, effects) = update(
        state,
        Msg::LoginCompleted {
            username: "alice".to_string(),
            result: Err(auth_error("Forbidden")),
        },
    );

    assert_eq!(next.session(), &SessionState::LoggedOut);
    assert_eq!(next.poll(), PollState::Idle);
    assert_eq!(next.view().login_error.as_deref(), Some("Forbidden"));
    assert!(effects.is_empty());
}

#[test]
fn login_success_clears_prior_error() {
    init_logging();
    let state = ClientState::new();
    let (state, _) = update(
        state,
        Msg::LoginCompleted {
            username: "alice".to_string(),
            result: Err(auth_error("Forbidden")),
        },
    );

    let (next, _effects) = login(state, "alice");

    assert_eq!(next.view().login_error, None);
}

#[test]
fn login_submitted_while_logged_in_is_ignored() {
    init_logging();
    let (state, _) = login(ClientState::new(), "alice");

    let (next, effects) = update(state.clone(), Msg::LoginSubmitted("bob".to_string()));

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn logout_flips_session_immediately_and_cancels_poll() {
    init_logging();
    let (state, _) = login(ClientState::new(), "alice");

    let (next, effects) = update(state, Msg::LogoutClicked);

    assert_eq!(next.session(), &SessionState::LoggedOut);
    assert_eq!(next.poll(), PollState::Idle);
    assert_eq!(
        effects,
        vec![
            Effect::CancelPoll,
            Effect::Deauthenticate {
                username: "alice".to_string(),
            },
        ]
    );
}

#[test]
fn logout_while_logged_out_is_ignored() {
    init_logging();
    let state = ClientState::new();

    let (next, effects) = update(state.clone(), Msg::LogoutClicked);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn logout_failure_reports_system_message_without_relogin() {
    init_logging();
    let (state, _) = login(ClientState::new(), "alice");
    let (state, _) = update(state, Msg::LogoutClicked);

    let (next, effects) = update(
        state,
        Msg::LogoutCompleted {
            result: Err(RemoteError {
                msgtype: "timeout".to_string(),
                reason: "timeout".to_string(),
            }),
        },
    );

    // The local session stays logged out; the failure shows up in the feed.
    assert_eq!(next.session(), &SessionState::LoggedOut);
    assert!(effects.is_empty());
    let rows = next.view().messages;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].nickname, "system");
    assert_eq!(rows[0].message, "timeout");
    assert_eq!(rows[0].msgtype.as_deref(), Some("timeout"));
}

#[test]
fn relogin_resumes_from_last_watermark() {
    init_logging();
    let (state, _) = login(ClientState::new(), "alice");
    let (state, _) = update(
        state,
        Msg::PollCompleted {
            epoch: 1,
            result: Ok(vec![ChatMessage {
                timestamp: Some(100),
                nickname: "bob".to_string(),
                message: "hi".to_string(),
                msgtype: None,
            }]),
        },
    );
    let (state, _) = update(state, Msg::LogoutClicked);

    let (next, effects) = login(state, "alice");

    assert_eq!(next.watermark(), 100);
    assert_eq!(
        effects,
        vec![Effect::Poll {
            epoch: 2,
            since_timestamp: 100,
        }]
    );
}

#[test]
fn shutdown_logs_out_best_effort() {
    init_logging();
    let (state, _) = login(ClientState::new(), "alice");

    let (next, effects) = update(state, Msg::Shutdown);

    assert_eq!(next.session(), &SessionState::LoggedOut);
    assert_eq!(
        effects,
        vec![
            Effect::CancelPoll,
            Effect::Deauthenticate {
                username: "alice".to_string(),
            },
        ]
    );

    let (final_state, effects) = update(next, Msg::Shutdown);
    assert_eq!(final_state.session(), &SessionState::LoggedOut);
    assert!(effects.is_empty());
}
