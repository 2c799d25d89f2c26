use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chatter_core::{ChatMessage, Effect, Msg, RemoteError};
use chatter_engine::{EngineEvent, EngineHandle, FeedSettings, RequestError, WireMessage};
use client_logging::{client_debug, client_info, client_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(msg_tx: mpsc::Sender<Msg>, settings: FeedSettings) -> Self {
        let engine = EngineHandle::new(settings);
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Authenticate { username } => {
                    client_info!("login requested for {}", username);
                    self.engine.login(username);
                }
                Effect::Deauthenticate { username } => {
                    client_info!("logout requested for {}", username);
                    self.engine.logout(username);
                }
                Effect::CancelPoll => self.engine.cancel_poll(),
                Effect::Poll {
                    epoch,
                    since_timestamp,
                } => self.engine.poll(epoch, since_timestamp),
                Effect::Submit { nickname, message } => {
                    client_debug!("posting {} bytes as {}", message.len(), nickname);
                    self.engine.submit(nickname, message);
                }
                Effect::ClearCompose => {
                    // Line-oriented stdin has no compose buffer to clear.
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::LoginCompleted { username, result } => Msg::LoginCompleted {
            username,
            result: result.map_err(map_error),
        },
        EngineEvent::LogoutCompleted { result } => Msg::LogoutCompleted {
            result: result.map_err(map_error),
        },
        EngineEvent::PollCompleted { epoch, result } => Msg::PollCompleted {
            epoch,
            result: result
                .map(|batch| batch.into_iter().map(map_message).collect())
                .map_err(map_error),
        },
        EngineEvent::SubmitCompleted { result } => {
            // Submission failures are diagnostics, never feed content.
            if let Err(err) = &result {
                client_warn!("message post failed: {} ({})", err.message, err.kind);
            }
            Msg::SubmitCompleted {
                result: result.map_err(map_error),
            }
        }
    }
}

fn map_error(err: RequestError) -> RemoteError {
    RemoteError {
        msgtype: err.kind.as_msgtype().to_string(),
        reason: err.message,
    }
}

fn map_message(wire: WireMessage) -> ChatMessage {
    ChatMessage {
        timestamp: wire.timestamp,
        nickname: wire.nickname,
        message: wire.message,
        msgtype: None,
    }
}
