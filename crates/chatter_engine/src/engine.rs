use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use client_logging::{client_debug, client_trace};
use tokio_util::sync::CancellationToken;

use crate::client::{FeedService, FeedSettings, ReqwestFeedService};
use crate::{EngineEvent, Epoch, FailureKind, RequestError, Timestamp};

enum EngineCommand {
    Login { username: String },
    Logout { username: String },
    Poll { epoch: Epoch, since_timestamp: Timestamp },
    Submit { nickname: String, message: String },
    CancelPoll,
}

/// Handle to the request engine: commands in, completion events out.
///
/// All requests run on a background tokio runtime; completions are delivered
/// through [`EngineHandle::try_recv`] so the caller's single dispatch loop
/// stays the only writer of client state. Commands are processed in the
/// order they are sent, which keeps `CancelPoll` ahead of any re-login poll.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: FeedSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let service: Arc<dyn FeedService> = Arc::new(ReqwestFeedService::new(settings));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // Token guarding the one outstanding long-poll, if any.
            let mut poll_guard: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Poll { .. } = command {
                    poll_guard = Some(CancellationToken::new());
                } else if let EngineCommand::CancelPoll = command {
                    if let Some(token) = poll_guard.take() {
                        client_debug!("cancelling in-flight poll");
                        token.cancel();
                    }
                    continue;
                }
                let token = poll_guard.clone();
                let service = service.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(service.as_ref(), command, token, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn login(&self, username: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Login {
            username: username.into(),
        });
    }

    pub fn logout(&self, username: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Logout {
            username: username.into(),
        });
    }

    pub fn poll(&self, epoch: Epoch, since_timestamp: Timestamp) {
        let _ = self.cmd_tx.send(EngineCommand::Poll {
            epoch,
            since_timestamp,
        });
    }

    pub fn submit(&self, nickname: impl Into<String>, message: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            nickname: nickname.into(),
            message: message.into(),
        });
    }

    /// Aborts the outstanding long-poll. Its completion still arrives, as a
    /// `Cancelled` failure, and is discarded by the state machine's guards.
    pub fn cancel_poll(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelPoll);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    service: &dyn FeedService,
    command: EngineCommand,
    poll_token: Option<CancellationToken>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Login { username } => {
            let result = service.login(&username).await;
            let _ = event_tx.send(EngineEvent::LoginCompleted { username, result });
        }
        EngineCommand::Logout { username } => {
            let result = service.logout(&username).await;
            let _ = event_tx.send(EngineEvent::LogoutCompleted { result });
        }
        EngineCommand::Poll {
            epoch,
            since_timestamp,
        } => {
            client_trace!("poll issued epoch={epoch} since={since_timestamp}");
            let result = match poll_token {
                Some(token) => {
                    tokio::select! {
                        () = token.cancelled() => {
                            Err(RequestError::new(FailureKind::Cancelled, "poll aborted"))
                        }
                        result = service.fetch_since(since_timestamp) => result,
                    }
                }
                None => service.fetch_since(since_timestamp).await,
            };
            let _ = event_tx.send(EngineEvent::PollCompleted { epoch, result });
        }
        EngineCommand::Submit { nickname, message } => {
            let result = service.post_message(&nickname, &message).await;
            let _ = event_tx.send(EngineEvent::SubmitCompleted { result });
        }
        EngineCommand::CancelPoll => {
            // Handled synchronously in the command loop.
        }
    }
}
