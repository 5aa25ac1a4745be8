mod error;
pub use error::{BorrowedErrorPayload, ErrorPayload};

mod payload;
pub use payload::{BorrowedResponsePayload, ResponsePayload};

use std::{fmt, marker::PhantomData};

use serde::{
    de::{DeserializeOwned, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::value::RawValue;

use crate::common::Id;

/// A JSON-RPC 2.0 response: an [`Id`] paired with a [`ResponsePayload`].
#[derive(Debug, Clone)]
pub struct Response<Payload = Box<RawValue>, ErrData = Box<RawValue>> {
    /// The id of the request this is responding to.
    pub id: Id,
    /// The response payload.
    pub payload: ResponsePayload<Payload, ErrData>,
}

/// A [`Response`] partially deserialized, borrowing its payload from the
/// deserializer. Used for intermediate deserialization where a caller wants
/// to inspect the `id` before committing to a payload type.
pub type BorrowedResponse<'a> = Response<&'a RawValue, &'a RawValue>;

impl BorrowedResponse<'_> {
    /// Copies borrowed data, producing an owned response.
    pub fn into_owned(self) -> Response {
        Response { id: self.id, payload: self.payload.into_owned() }
    }
}

impl<Payload, ErrData> Response<Payload, ErrData> {
    /// `true` if the response is a success.
    pub const fn is_success(&self) -> bool {
        self.payload.is_success()
    }

    /// `true` if the response is an error.
    pub const fn is_error(&self) -> bool {
        self.payload.is_error()
    }

    /// Fallible conversion to the success value.
    pub const fn as_success(&self) -> Option<&Payload> {
        self.payload.as_success()
    }

    /// Fallible conversion to the error object.
    pub const fn as_error(&self) -> Option<&ErrorPayload<ErrData>> {
        self.payload.as_error()
    }
}

impl<'a, Payload, ErrData> Response<Payload, ErrData>
where
    Payload: AsRef<RawValue> + 'a,
{
    /// Deserializes the success value, borrowing from it if necessary.
    pub fn try_success_as<T: Deserialize<'a>>(&'a self) -> Option<serde_json::Result<T>> {
        self.payload.try_success_as()
    }

    /// Deserializes the success value if present, transforming this
    /// response's payload type.
    pub fn deserialize_success<T: DeserializeOwned>(self) -> Result<Response<T, ErrData>, Self> {
        match self.payload.deserialize_success() {
            Ok(payload) => Ok(Response { id: self.id, payload }),
            Err(payload) => Err(Response { id: self.id, payload }),
        }
    }
}

impl<'de, Payload, ErrData> Deserialize<'de> for Response<Payload, ErrData>
where
    Payload: Deserialize<'de>,
    ErrData: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        enum Field {
            Result,
            Error,
            Id,
            Unknown,
        }

        impl<'de> Deserialize<'de> for Field {
            fn deserialize<D>(deserializer: D) -> Result<Field, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct FieldVisitor;
                impl serde::de::Visitor<'_> for FieldVisitor {
                    type Value = Field;
                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        f.write_str("`result`, `error` or `id`")
                    }
                    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Field, E> {
                        Ok(match value {
                            "result" => Field::Result,
                            "error" => Field::Error,
                            "id" => Field::Id,
                            _ => Field::Unknown,
                        })
                    }
                }
                deserializer.deserialize_identifier(FieldVisitor)
            }
        }

        struct ResponseVisitor<T>(PhantomData<T>);

        impl<'de, Payload, ErrData> Visitor<'de> for ResponseVisitor<fn() -> (Payload, ErrData)>
        where
            Payload: Deserialize<'de>,
            ErrData: Deserialize<'de>,
        {
            type Value = Response<Payload, ErrData>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON-RPC response object, with either a result or an error")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut result = None;
                let mut error = None;
                let mut id: Option<Id> = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Result => {
                            if result.is_some() {
                                return Err(serde::de::Error::duplicate_field("result"));
                            }
                            result = Some(map.next_value()?);
                        }
                        Field::Error => {
                            if error.is_some() {
                                return Err(serde::de::Error::duplicate_field("error"));
                            }
                            error = Some(map.next_value()?);
                        }
                        Field::Id => {
                            if id.is_some() {
                                return Err(serde::de::Error::duplicate_field("id"));
                            }
                            id = Some(map.next_value()?);
                        }
                        Field::Unknown => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                let id = id.unwrap_or(Id::None);

                match (result, error) {
                    (Some(result), None) => {
                        Ok(Response { id, payload: ResponsePayload::Success(result) })
                    }
                    (None, Some(error)) => {
                        Ok(Response { id, payload: ResponsePayload::Failure(error) })
                    }
                    (None, None) => Err(serde::de::Error::missing_field("result or error")),
                    (Some(_), Some(_)) => {
                        Err(serde::de::Error::custom("result and error are mutually exclusive"))
                    }
                }
            }
        }

        deserializer.deserialize_map(ResponseVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deser_success() {
        let response = r#"{"jsonrpc":"2.0","result":"california","id":1}"#;
        let response: Response = serde_json::from_str(response).unwrap();
        assert_eq!(response.id, Id::Number(1));
        assert!(response.is_success());
    }

    #[test]
    fn deser_err() {
        let response =
            r#"{"jsonrpc":"2.0","error":{"code":-32600,"message":"Invalid Request"},"id":null}"#;
        let response: Response = serde_json::from_str(response).unwrap();
        assert_eq!(response.id, Id::None);
        assert!(response.is_error());
    }

    #[test]
    fn deser_complex_success() {
        let response = r#"{"result":{"name":"california","population":39250000}}"#;
        let response: Response = serde_json::from_str(response).unwrap();
        assert_eq!(response.id, Id::None);
        assert!(response.is_success());
    }

    #[test]
    fn rejects_both_result_and_error() {
        let response = r#"{"result":1,"error":{"code":1,"message":"x"},"id":1}"#;
        assert!(serde_json::from_str::<Response>(response).is_err());
    }
}
