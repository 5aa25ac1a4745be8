use crate::ErrorPayload;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::value::RawValue;
use std::borrow::Borrow;

/// A JSON-RPC 2.0 response payload: the `result` or `error` field of a
/// [`Response`](crate::Response).
///
/// Does not implement `Serialize`/`Deserialize` directly; it is deserialized
/// as part of [`Response`](crate::Response), which must disambiguate which
/// field was present.
#[derive(Clone, Debug)]
pub enum ResponsePayload<Payload = Box<RawValue>, ErrData = Box<RawValue>> {
    /// A successful response payload.
    Success(Payload),
    /// An error response payload.
    Failure(ErrorPayload<ErrData>),
}

/// A [`ResponsePayload`] partially deserialized, borrowing from the
/// deserializer.
pub type BorrowedResponsePayload<'a> = ResponsePayload<&'a RawValue, &'a RawValue>;

impl BorrowedResponsePayload<'_> {
    /// Copies borrowed data, producing an owned payload.
    pub fn into_owned(self) -> ResponsePayload {
        match self {
            Self::Success(payload) => ResponsePayload::Success(payload.to_owned()),
            Self::Failure(error) => ResponsePayload::Failure(error.into_owned()),
        }
    }
}

impl<Payload, ErrData> ResponsePayload<Payload, ErrData> {
    /// Fallible conversion to the success value.
    pub const fn as_success(&self) -> Option<&Payload> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// Fallible conversion to the error object.
    pub const fn as_error(&self) -> Option<&ErrorPayload<ErrData>> {
        match self {
            Self::Failure(payload) => Some(payload),
            Self::Success(_) => None,
        }
    }

    /// `true` for [`ResponsePayload::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` for [`ResponsePayload::Failure`].
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl<'a, Payload, ErrData> ResponsePayload<Payload, ErrData>
where
    Payload: AsRef<RawValue> + 'a,
{
    /// Deserializes the success value, borrowing from it if necessary.
    pub fn try_success_as<T: Deserialize<'a>>(&'a self) -> Option<serde_json::Result<T>> {
        self.as_success().map(|payload| serde_json::from_str(payload.as_ref().get()))
    }

    /// Deserializes the success value if present, transforming this
    /// payload's type; passes a [`Failure`](Self::Failure) through
    /// unchanged.
    pub fn deserialize_success<T: DeserializeOwned>(self) -> Result<ResponsePayload<T, ErrData>, Self> {
        match self {
            Self::Success(ref payload) => match serde_json::from_str(payload.as_ref().get()) {
                Ok(payload) => Ok(ResponsePayload::Success(payload)),
                Err(_) => Err(self),
            },
            Self::Failure(e) => Ok(ResponsePayload::Failure(e)),
        }
    }
}

impl<'a, Payload, Data> ResponsePayload<Payload, Data>
where
    Data: Borrow<RawValue> + 'a,
{
    /// Deserializes the error's `data` field, borrowing from it if
    /// necessary.
    pub fn try_error_as<T: Deserialize<'a>>(&'a self) -> Option<serde_json::Result<T>> {
        self.as_error().and_then(|error| error.try_data_as::<T>())
    }

    /// Deserializes the error's `data` field if present, transforming this
    /// payload's error type; passes a [`Success`](Self::Success) through
    /// unchanged.
    pub fn deserialize_error<T: DeserializeOwned>(self) -> Result<ResponsePayload<Payload, T>, Self> {
        match self {
            Self::Failure(err) => match err.deser_data() {
                Ok(deser) => Ok(ResponsePayload::Failure(deser)),
                Err(err) => Err(ResponsePayload::Failure(err)),
            },
            Self::Success(payload) => Ok(ResponsePayload::Success(payload)),
        }
    }
}
