use std::fmt;

/// The persistent transport's connection state, per spec.md §4.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state; no I/O accepted yet.
    Connecting,
    /// Handshake complete; accepts submissions.
    Connected,
    /// The socket dropped; reconnecting per the configured backoff.
    Reconnecting,
    /// Terminal; all submissions fail with `Closed`.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

impl ConnectionState {
    /// `true` if new submissions are accepted without qualification.
    pub const fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// `true` for the terminal state.
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
