use base64::{engine::general_purpose, Engine};
use std::fmt;

/// Basic or bearer authentication, injected into HTTP headers or a
/// WebSocket handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authorization {
    /// HTTP Basic auth, already base64-encoded `username:password`.
    Basic(String),
    /// Bearer auth.
    Bearer(String),
}

impl Authorization {
    /// Extracts basic auth credentials embedded in a URL's userinfo, if any.
    pub fn extract_from_url(url: &url::Url) -> Option<Self> {
        if url.has_authority() && !url.username().is_empty() {
            let username = url.username();
            let pass = url.password().unwrap_or_default();
            Some(Self::basic(username, pass))
        } else {
            None
        }
    }

    /// Builds a new basic auth value.
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let secret =
            general_purpose::STANDARD.encode(format!("{}:{}", username.as_ref(), password.as_ref()));
        Self::Basic(secret)
    }

    /// Builds a new bearer auth value.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Renders the full `Authorization` header value, secret included.
    ///
    /// Unlike [`Display`](fmt::Display), which only prints the scheme for
    /// safe logging, this is for building the actual request header.
    pub fn to_header_string(&self) -> String {
        match self {
            Self::Basic(secret) => format!("Basic {secret}"),
            Self::Bearer(secret) => format!("Bearer {secret}"),
        }
    }
}

impl fmt::Display for Authorization {
    // Only the scheme name is printed; the secret must never reach a log
    // line (spec.md §6's log-sink sanitization requirement).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(_) => write!(f, "Basic"),
            Self::Bearer(_) => write!(f, "Bearer"),
        }
    }
}
