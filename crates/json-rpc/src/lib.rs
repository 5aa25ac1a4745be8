//! JSON-RPC 2.0 data types: the request/response/notification model and
//! batch framing shared by every Brane transport. This crate does not
//! perform any I/O; see `brane-transport-http` and `brane-pubsub`.

mod common;
pub use common::Id;

mod error;
pub use error::RpcError;

mod notification;
pub use notification::{EthNotification, PubSubItem};

mod packet;
pub use packet::{RequestPacket, ResponsePacket};

mod request;
pub use request::{Request, SerializedRequest};

mod response;
pub use response::{
    BorrowedErrorPayload, BorrowedResponse, BorrowedResponsePayload, ErrorPayload, Response,
    ResponsePayload,
};

mod result;
pub use result::RpcResult;

use serde::{de::DeserializeOwned, Serialize};

/// A type usable as a JSON-RPC parameter. Blanket-implemented.
pub trait RpcParam: Serialize + Clone + Send + Sync + Unpin {}
impl<T> RpcParam for T where T: Serialize + Clone + Send + Sync + Unpin {}

/// A type usable as a JSON-RPC return value. Blanket-implemented.
///
/// Bounded by `'static` (can't borrow) to keep client-side code simple;
/// not suitable for server-side use.
pub trait RpcReturn: DeserializeOwned + Send + Sync + Unpin + 'static {}
impl<T> RpcReturn for T where T: DeserializeOwned + Send + Sync + Unpin + 'static {}

/// A type usable as both a JSON-RPC parameter and return value.
/// Blanket-implemented.
pub trait RpcObject: RpcParam + RpcReturn {}
impl<T> RpcObject for T where T: RpcParam + RpcReturn {}
