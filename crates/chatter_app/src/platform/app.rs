use std::io::{self, BufRead};
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chatter_core::{update, ClientState, ClientViewModel, Msg};
use client_logging::client_error;

use super::config;
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::ui;

pub fn run_app() -> ExitCode {
    logging::initialize(LogDestination::File);
    let config = config::load(Path::new(config::CONFIG_PATH));
    let settings = match config.feed_settings() {
        Ok(settings) => settings,
        Err(err) => {
            client_error!("invalid configuration: {}", err);
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(msg_tx.clone(), settings);
    spawn_input_reader(msg_tx);

    println!("chatter: /login NAME to join, /logout to leave, /quit to exit");

    let mut state = ClientState::new();
    let mut last_view = ClientViewModel::default();
    let mut rendered_rows = 0;
    while let Ok(msg) = msg_rx.recv() {
        let quitting = matches!(msg, Msg::Shutdown);
        let (next, effects) = update(std::mem::take(&mut state), msg);
        state = next;
        runner.enqueue(effects);

        let view = state.view();
        if state.consume_dirty() {
            for line in ui::render::transition_lines(&last_view, &view) {
                println!("{line}");
            }
            for line in
                ui::render::message_lines(&config.message_format, &view.messages[rendered_rows..])
            {
                println!("{line}");
            }
            rendered_rows = view.messages.len();
            last_view = view;
        }

        if quitting {
            // Give the best-effort deauthentication a moment to leave.
            thread::sleep(Duration::from_millis(250));
            break;
        }
    }
    ExitCode::SUCCESS
}

/// Reads stdin lines and maps them onto state machine messages. Closing
/// stdin shuts the client down like `/quit`.
fn spawn_input_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(Msg::Shutdown) => {
                    let _ = msg_tx.send(Msg::Shutdown);
                    return;
                }
                Some(msg) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                None => {}
            }
        }
        let _ = msg_tx.send(Msg::Shutdown);
    });
}

fn parse_command(line: &str) -> Option<Msg> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("/login") {
        return Some(Msg::LoginSubmitted(rest.trim().to_string()));
    }
    if trimmed == "/logout" {
        return Some(Msg::LogoutClicked);
    }
    if trimmed == "/quit" {
        return Some(Msg::Shutdown);
    }
    Some(Msg::ComposeSubmitted(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::parse_command;
    use chatter_core::Msg;

    #[test]
    fn commands_map_to_messages() {
        assert_eq!(
            parse_command("/login alice"),
            Some(Msg::LoginSubmitted("alice".to_string()))
        );
        assert_eq!(parse_command("/logout"), Some(Msg::LogoutClicked));
        assert_eq!(parse_command("/quit"), Some(Msg::Shutdown));
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn plain_text_is_posted_verbatim() {
        assert_eq!(
            parse_command("hello  world "),
            Some(Msg::ComposeSubmitted("hello  world ".to_string()))
        );
    }
}
