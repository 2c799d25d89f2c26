use chatter_core::{ClientViewModel, MessageRowView, SessionState};

/// Renders one feed row through the configured line template. `{time}`,
/// `{nickname}` and `{message}` are substituted.
pub fn message_line(template: &str, row: &MessageRowView) -> String {
    template
        .replace("{time}", &row.formatted_time)
        .replace("{nickname}", &row.nickname)
        .replace("{message}", &row.message)
}

pub fn message_lines(template: &str, rows: &[MessageRowView]) -> Vec<String> {
    rows.iter().map(|row| message_line(template, row)).collect()
}

/// Status lines describing what changed between two consecutive views.
pub fn transition_lines(previous: &ClientViewModel, current: &ClientViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    if previous.session != current.session {
        match &current.session {
            SessionState::LoggedIn { username } => {
                lines.push(format!("* signed in as {username}"));
            }
            SessionState::LoggedOut => lines.push("* signed out".to_string()),
        }
    }
    if current.login_error != previous.login_error {
        if let Some(reason) = &current.login_error {
            lines.push(format!("* login failed: {reason}"));
        }
    }
    lines
}
