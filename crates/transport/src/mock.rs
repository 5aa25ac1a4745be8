//! In-memory transport for unit tests.
//!
//! [`MockTransport`] returns responses pushed into its [`Asserter`]'s queue,
//! FIFO, without touching the network. This is the ambient test tooling
//! SPEC_FULL.md's §1.1 calls for; application crates use it to exercise
//! `brane-rpc-client`/`brane-provider` logic without a live node.
//!
//! ```ignore (dependency cycle)
//! let asserter = Asserter::new();
//! asserter.push_success(&12345u64);
//! // hand `asserter.clone()` to a MockTransport and run a request through it
//! ```

use crate::{TransportErrorKind, TransportResult};
use brane_json_rpc as j;
use std::{
    borrow::Cow,
    collections::VecDeque,
    sync::{Arc, PoisonError, RwLock},
};

/// A canned response pushed into an [`Asserter`].
pub type MockResponse = j::ResponsePayload;

/// FIFO queue of canned responses consumed by a [`MockTransport`].
#[derive(Debug, Clone, Default)]
pub struct Asserter {
    responses: Arc<RwLock<VecDeque<MockResponse>>>,
}

impl Asserter {
    /// Creates an empty asserter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a response onto the back of the queue.
    pub fn push(&self, response: MockResponse) {
        self.write_q().push_back(response);
    }

    /// Pushes a successful response, serializing `response`.
    ///
    /// # Panics
    ///
    /// Panics if serialization fails.
    #[track_caller]
    pub fn push_success<R: serde::Serialize>(&self, response: &R) {
        let s = serde_json::to_string(response).expect("response failed to serialize");
        self.push(MockResponse::Success(
            serde_json::value::RawValue::from_string(s).expect("serialized to invalid JSON"),
        ));
    }

    /// Pushes an error payload.
    pub fn push_failure(&self, error: j::ErrorPayload) {
        self.push(MockResponse::Failure(error));
    }

    /// Pushes a JSON-RPC internal-error (`-32603`) response with `msg`.
    pub fn push_failure_msg(&self, msg: impl Into<Cow<'static, str>>) {
        self.push_failure(j::ErrorPayload { code: -32603, message: msg.into().into_owned(), data: None });
    }

    /// Pops the next response.
    pub fn pop_response(&self) -> Option<MockResponse> {
        self.write_q().pop_front()
    }

    fn write_q(&self) -> impl std::ops::DerefMut<Target = VecDeque<MockResponse>> + '_ {
        self.responses.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A transport that serves responses from an [`Asserter`]'s queue.
#[derive(Clone, Debug)]
pub struct MockTransport {
    asserter: Asserter,
}

impl MockTransport {
    /// Creates a new mock transport backed by `asserter`.
    pub const fn new(asserter: Asserter) -> Self {
        Self { asserter }
    }

    /// The backing asserter.
    pub const fn asserter(&self) -> &Asserter {
        &self.asserter
    }

    async fn handle(self, req: j::RequestPacket) -> TransportResult<j::ResponsePacket> {
        Ok(match req {
            j::RequestPacket::Single(req) => j::ResponsePacket::Single(self.map_request(req)?),
            j::RequestPacket::Batch(reqs) => j::ResponsePacket::Batch(
                reqs.into_iter().map(|req| self.map_request(req)).collect::<TransportResult<_>>()?,
            ),
        })
    }

    fn map_request(&self, req: j::SerializedRequest) -> TransportResult<j::Response> {
        Ok(j::Response {
            id: req.id().clone(),
            payload: self
                .asserter
                .pop_response()
                .ok_or_else(|| TransportErrorKind::custom_str("empty asserter response queue"))?,
        })
    }
}

impl std::ops::Deref for MockTransport {
    type Target = Asserter;

    fn deref(&self) -> &Self::Target {
        &self.asserter
    }
}

impl tower::Service<j::RequestPacket> for MockTransport {
    type Response = j::ResponsePacket;
    type Error = crate::TransportError;
    type Future = crate::TransportFut<'static>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: j::RequestPacket) -> Self::Future {
        Box::pin(self.clone().handle(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brane_json_rpc::{Id, Request};
    use tower::Service;

    #[tokio::test]
    async fn serves_queued_responses_in_order() {
        let asserter = Asserter::new();
        asserter.push_success(&1u64);
        asserter.push_success(&2u64);
        let mut transport = MockTransport::new(asserter);

        let req = Request::new("eth_chainId", Id::Number(1), ()).serialize().unwrap();
        let resp = transport.call(req.into()).await.unwrap();
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn empty_queue_errors() {
        let mut transport = MockTransport::new(Asserter::new());
        let req = Request::new("eth_chainId", Id::Number(1), ()).serialize().unwrap();
        assert!(transport.call(req.into()).await.is_err());
    }
}
