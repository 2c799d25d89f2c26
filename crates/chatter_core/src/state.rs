use crate::view_model::{ClientViewModel, MessageRowView};

/// Unix epoch time in milliseconds, as reported by the feed service.
pub type Timestamp = u64;

/// Session generation counter. Incremented on every successful login so that
/// poll completions issued under an older session can be told apart and
/// discarded.
pub type Epoch = u64;

/// Nickname carried by synthetic messages the client fabricates for itself.
pub const SYSTEM_NICKNAME: &str = "system";

/// Escapes `&`, `<` and `>` so a nickname can later be embedded in markup
/// verbatim. The ampersand must be replaced first.
///
/// Not idempotent: sanitizing already-escaped text escapes its ampersands
/// again. Callers sanitize exactly once, at login time.
pub fn sanitize(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn {
        username: String,
    },
}

impl SessionState {
    /// The sanitized username, while logged in.
    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::LoggedOut => None,
            SessionState::LoggedIn { username } => Some(username),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }
}

/// Feed poller request state. `Awaiting` means exactly one poll request is
/// outstanding against the feed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Awaiting,
}

/// One chat message, immutable once received. Synthetic system messages have
/// no timestamp and carry a `msgtype` classification instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub timestamp: Option<Timestamp>,
    pub nickname: String,
    pub message: String,
    pub msgtype: Option<String>,
}

impl ChatMessage {
    /// Fabricates the system message shown in the feed when a remote call
    /// fails. Its absent timestamp keeps it from moving the watermark.
    pub fn system(error: RemoteError) -> Self {
        Self {
            timestamp: None,
            nickname: SYSTEM_NICKNAME.to_string(),
            message: error.reason,
            msgtype: Some(error.msgtype),
        }
    }
}

/// A classified remote-call failure, mirrored from the engine's taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Short classification tag (`timeout`, `error`, `parsererror`, `abort`).
    pub msgtype: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// The single owned client state: session identity, poll watermark and the
/// append-only message list. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientState {
    session: SessionState,
    poll: PollState,
    epoch: Epoch,
    watermark: Timestamp,
    messages: Vec<ChatMessage>,
    login_error: Option<String>,
    compose_busy: bool,
    dirty: bool,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn poll(&self) -> PollState {
        self.poll
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Timestamp of the newest real message seen so far; lower bound for the
    /// next incremental fetch.
    pub fn watermark(&self) -> Timestamp {
        self.watermark
    }

    pub fn view(&self) -> ClientViewModel {
        ClientViewModel {
            session: self.session.clone(),
            login_error: self.login_error.clone(),
            compose_enabled: self.session.is_logged_in() && !self.compose_busy,
            messages: self
                .messages
                .iter()
                .map(MessageRowView::from_message)
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the
    /// flag, so callers can coalesce rendering.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    /// Enters a new logged-in session and returns the fresh epoch. The
    /// watermark survives logout, so a resumed session continues from the
    /// last seen message instead of refetching history.
    pub(crate) fn begin_session(&mut self, username: String) -> Epoch {
        self.session = SessionState::LoggedIn { username };
        self.login_error = None;
        self.compose_busy = false;
        self.epoch += 1;
        self.poll = PollState::Awaiting;
        self.dirty = true;
        self.epoch
    }

    /// Optimistically leaves the session. The poll loop is stopped locally;
    /// an in-flight request resolves later and is discarded on arrival.
    pub(crate) fn end_session(&mut self) {
        self.session = SessionState::LoggedOut;
        self.poll = PollState::Idle;
        self.compose_busy = false;
        self.dirty = true;
    }

    pub(crate) fn set_poll_idle(&mut self) {
        self.poll = PollState::Idle;
    }

    pub(crate) fn set_login_error(&mut self, reason: String) {
        self.login_error = Some(reason);
        self.dirty = true;
    }

    pub(crate) fn set_compose_busy(&mut self, busy: bool) {
        if self.compose_busy != busy {
            self.compose_busy = busy;
            self.dirty = true;
        }
    }

    pub(crate) fn compose_busy(&self) -> bool {
        self.compose_busy
    }

    /// Appends a batch in receipt order and advances the watermark to the
    /// maximum present timestamp. Messages without a timestamp never move it.
    pub(crate) fn append_messages(&mut self, batch: Vec<ChatMessage>) {
        if batch.is_empty() {
            return;
        }
        for message in &batch {
            if let Some(timestamp) = message.timestamp {
                if timestamp > self.watermark {
                    self.watermark = timestamp;
                }
            }
        }
        self.messages.extend(batch);
        self.dirty = true;
    }
}
