use crate::common::Id;
use serde::{ser::SerializeStruct, Serialize};
use serde_json::value::RawValue;

/// A JSON-RPC request whose params have not yet been serialized.
#[derive(Debug, Clone)]
pub struct Request<Params> {
    /// The method name, e.g. `"eth_getBalance"`.
    pub method: &'static str,
    /// The request id.
    pub id: Id,
    /// The request parameters.
    pub params: Params,
}

impl<Params> Request<Params> {
    /// Creates a new request.
    pub const fn new(method: &'static str, id: Id, params: Params) -> Self {
        Self { method, id, params }
    }
}

impl<Params: Serialize> Request<Params> {
    /// Serializes the params eagerly, producing a [`SerializedRequest`]
    /// ready to be written to a transport or placed in a batch.
    pub fn serialize(self) -> serde_json::Result<SerializedRequest> {
        let params = serde_json::value::to_raw_value(&self.params)?;
        Ok(SerializedRequest { method: self.method, id: self.id, params })
    }
}

impl<Params: Serialize> Serialize for Request<Params> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Request", 4)?;
        s.serialize_field("jsonrpc", "2.0")?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("method", self.method)?;
        s.serialize_field("params", &self.params)?;
        s.end()
    }
}

/// A request whose params have already been serialized to a [`RawValue`].
///
/// This is the unit [`crate::RequestPacket`] batches and transports operate
/// on: serialization only has to happen once, regardless of how many times
/// the request is retried or re-batched.
#[derive(Debug, Clone)]
pub struct SerializedRequest {
    method: &'static str,
    id: Id,
    params: Box<RawValue>,
}

impl SerializedRequest {
    /// The method name.
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// The request id.
    pub const fn id(&self) -> &Id {
        &self.id
    }

    /// The serialized params.
    pub fn params(&self) -> &RawValue {
        &self.params
    }

    /// `true` if this request subscribes to a pubsub notification stream.
    pub fn is_subscription(&self) -> bool {
        self.method == "eth_subscribe"
    }

    /// Consumes `self`, returning the full serialized request object
    /// (including the `"jsonrpc"` and `"method"` framing) as a boxed
    /// [`RawValue`].
    pub fn take_request(self) -> Box<RawValue> {
        serde_json::value::to_raw_value(&self)
            .expect("a SerializedRequest's fields are already valid JSON")
    }
}

impl Serialize for SerializedRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("SerializedRequest", 4)?;
        s.serialize_field("jsonrpc", "2.0")?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("method", self.method)?;
        s.serialize_field("params", &self.params)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_jsonrpc_framing() {
        let req = Request::new("eth_blockNumber", Id::Number(1), ());
        let serialized = req.serialize().unwrap();
        let value: serde_json::Value =
            serde_json::from_str(serialized.take_request().get()).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "eth_blockNumber");
        assert_eq!(value["id"], 1);
    }
}
