//! Pooled HTTP transport (C12): request/response only, a configurable
//! per-request connect timeout, and batch requests serialized as a single
//! JSON array and correlated back by `id`.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]

use brane_json_rpc::{RequestPacket, ResponsePacket};
use brane_transport::{utils::guess_local_url, TransportError, TransportErrorKind, TransportFut};
use std::{task, time::Duration};
use tower::Service;
use tracing::{debug, debug_span, trace, Instrument};
use url::Url;

/// An HTTP transport backed by a pooled [`reqwest::Client`].
///
/// Concurrent requests reuse the client's connection pool; `reqwest`'s
/// default connector already keeps idle connections alive per host, so no
/// additional pooling layer is needed here.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    /// Creates a new transport with a default client and no explicit
    /// connect timeout.
    pub fn new(url: Url) -> Self {
        Self { client: reqwest::Client::new(), url }
    }

    /// Creates a new transport whose client enforces `connect_timeout` on
    /// every connection attempt (spec.md §4.8's "configurable per-request
    /// connect timeout" obligation).
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build, which
    /// only happens if the platform's TLS backend can't be initialized.
    pub fn with_connect_timeout(url: Url, connect_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { client, url }
    }

    /// Creates a new transport with a caller-supplied client, e.g. one
    /// configured with custom headers or a proxy.
    pub const fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// `true` if this transport's URL resolves to `localhost`/`127.0.0.1`.
    pub fn guess_local(&self) -> bool {
        guess_local_url(self.url.as_str())
    }

    /// The transport's URL.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    fn request(&self, req: RequestPacket) -> TransportFut<'static> {
        let this = self.clone();
        let span = debug_span!("HttpTransport", url = %this.url);
        Box::pin(
            async move {
                let resp = this
                    .client
                    .post(this.url)
                    .json(&req)
                    .send()
                    .await
                    .map_err(TransportErrorKind::custom)?;

                let status = resp.status();
                debug!(%status, "received response from server");

                let body = resp.bytes().await.map_err(TransportErrorKind::custom)?;
                trace!(body = %String::from_utf8_lossy(&body), "response body");

                if !status.is_success() {
                    return Err(TransportErrorKind::http_status(
                        status.as_u16(),
                        String::from_utf8_lossy(&body).into_owned(),
                    ));
                }

                serde_json::from_slice(&body)
                    .map_err(|err| TransportError::deser_err(err, String::from_utf8_lossy(&body)))
            }
            .instrument(span),
        )
    }
}

impl Service<RequestPacket> for HttpTransport {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    // `reqwest::Client` pools connections internally and is always ready;
    // back-pressure, if any, happens inside `call`'s future.
    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        self.request(req)
    }
}

impl Service<RequestPacket> for &HttpTransport {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        self.request(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_local_matches_localhost() {
        let t = HttpTransport::new(Url::parse("http://localhost:8545").unwrap());
        assert!(t.guess_local());

        let t = HttpTransport::new(Url::parse("https://mainnet.example.com").unwrap());
        assert!(!t.guess_local());
    }
}
