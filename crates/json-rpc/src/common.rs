use serde::{Deserialize, Serialize};

/// A JSON-RPC request/response identifier.
///
/// Per spec.md's JSON-RPC model, requests Brane issues always carry a
/// `Number` id; `String` and `None` are accepted on deserialization because
/// a node's response (or a malformed third-party one) may echo either.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    /// A numeric id, Brane's own requests always use this form.
    Number(u64),
    /// A string id.
    String(String),
    /// No id was present (e.g. a notification, or a malformed response).
    None,
}

impl Id {
    /// `true` if this is [`Id::None`].
    pub const fn is_none(&self) -> bool {
        matches!(self, Id::None)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}
