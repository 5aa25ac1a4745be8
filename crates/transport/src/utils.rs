use crate::error::TransportError;
use serde::Serialize;
use serde_json::value::RawValue;
use std::future::Future;
use url::Url;

/// Best-effort guess at whether a URL points at a local endpoint, based on
/// its hostname. Callers should not rely on this for anything
/// security-sensitive.
pub fn guess_local_url(s: impl AsRef<str>) -> bool {
    fn inner(url: &str) -> bool {
        match url.parse::<Url>() {
            Ok(url) => {
                url.host_str().map_or(true, |host| host == "localhost" || host == "127.0.0.1")
            }
            Err(_) => false,
        }
    }
    inner(s.as_ref())
}

/// Serializes `s` to a [`RawValue`], mapping any serialization failure to a
/// [`TransportError`].
pub fn to_json_raw_value<S>(s: &S) -> Result<Box<RawValue>, TransportError>
where
    S: Serialize,
{
    RawValue::from_string(serde_json::to_string(s).map_err(TransportError::ser_err)?)
        .map_err(TransportError::ser_err)
}

/// Spawns a future as a detached background task.
#[doc(hidden)]
pub trait Spawnable {
    /// Spawns `self` onto the runtime.
    fn spawn_task(self);
}

impl<T> Spawnable for T
where
    T: Future<Output = ()> + Send + 'static,
{
    fn spawn_task(self) {
        tokio::spawn(self);
    }
}
