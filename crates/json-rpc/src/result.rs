use crate::{ErrorPayload, Response, ResponsePayload, RpcReturn};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::{borrow::Borrow, fmt::Debug};

/// The result of a JSON-RPC request: a success value, a server-returned
/// error response, or some other client-side error (transport failure,
/// serialization failure, ...).
#[must_use = "Results must be handled."]
#[derive(Debug)]
pub enum RpcResult<T, ErrData, E> {
    /// The server returned a successful response.
    Success(T),
    /// The server returned an error response; no transport or
    /// serialization error occurred.
    Failure(ErrorPayload<ErrData>),
    /// Some other error occurred (transport, serialization, ...).
    Err(E),
}

/// An [`RpcResult`] partially deserialized, borrowing from the
/// deserializer.
pub type BorrowedRpcResult<'a, E> = RpcResult<&'a RawValue, &'a RawValue, E>;

impl<E> BorrowedRpcResult<'_, E> {
    /// Copies borrowed data, producing an owned result.
    pub fn into_owned(self) -> RpcResult<Box<RawValue>, Box<RawValue>, E> {
        match self {
            RpcResult::Success(val) => RpcResult::Success(val.to_owned()),
            RpcResult::Failure(err) => RpcResult::Failure(err.into_owned()),
            RpcResult::Err(err) => RpcResult::Err(err),
        }
    }
}

impl<T, ErrData, E> RpcResult<T, ErrData, E> {
    /// `true` for [`RpcResult::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` for [`RpcResult::Failure`].
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// `true` for [`RpcResult::Err`].
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Unwraps the success value, panicking otherwise.
    pub fn unwrap(self) -> T
    where
        ErrData: Debug,
        E: Debug,
    {
        match self {
            Self::Success(val) => val,
            Self::Failure(err) => panic!("error response: {err:?}"),
            Self::Err(err) => panic!("error: {err:?}"),
        }
    }

    /// Applies `op` to the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> RpcResult<U, ErrData, E> {
        match self {
            Self::Success(val) => RpcResult::Success(op(val)),
            Self::Failure(err) => RpcResult::Failure(err),
            Self::Err(err) => RpcResult::Err(err),
        }
    }

    /// Applies `op` to the client-side error.
    pub fn map_err<U, F: FnOnce(E) -> U>(self, op: F) -> RpcResult<T, ErrData, U> {
        match self {
            Self::Success(val) => RpcResult::Success(val),
            Self::Failure(err) => RpcResult::Failure(err),
            Self::Err(err) => RpcResult::Err(op(err)),
        }
    }

    /// Shortcut for `map_err(Into::into)`.
    pub fn convert_err<U: From<E>>(self) -> RpcResult<T, ErrData, U> {
        self.map_err(Into::into)
    }

    /// Converts to `Option<T>`.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(val) => Some(val),
            _ => None,
        }
    }

    /// Converts to `Option<ErrorPayload<ErrData>>`.
    pub fn failure(self) -> Option<ErrorPayload<ErrData>> {
        match self {
            Self::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Converts to `Option<E>`.
    pub fn err(self) -> Option<E> {
        match self {
            Self::Err(err) => Some(err),
            _ => None,
        }
    }
}

impl<B, ErrData, E> RpcResult<B, ErrData, E>
where
    B: Borrow<RawValue>,
{
    /// Deserializes the success value. Passes `Failure`/`Err` through.
    pub fn deserialize_success<Resp: RpcReturn>(self) -> Result<RpcResult<Resp, ErrData, E>, Self> {
        match self {
            Self::Success(ref ok) => match serde_json::from_str(ok.borrow().get()) {
                Ok(val) => Ok(RpcResult::Success(val)),
                Err(_) => Err(self),
            },
            Self::Failure(err) => Ok(RpcResult::Failure(err)),
            Self::Err(err) => Ok(RpcResult::Err(err)),
        }
    }

    /// Deserializes the success value, transforming a deserialization
    /// failure with `f` instead of falling back to `Self`.
    pub fn try_deserialize_success_or_else<T, F>(self, f: F) -> RpcResult<T, ErrData, E>
    where
        T: RpcReturn,
        F: FnOnce(serde_json::Error, &str) -> E,
    {
        match self {
            Self::Success(val) => {
                let text = val.borrow().get();
                match serde_json::from_str(text) {
                    Ok(val) => RpcResult::Success(val),
                    Err(e) => RpcResult::Err(f(e, text)),
                }
            }
            Self::Failure(err) => RpcResult::Failure(err),
            Self::Err(err) => RpcResult::Err(err),
        }
    }
}

impl<T, B, E> RpcResult<T, B, E>
where
    B: Borrow<RawValue>,
{
    /// Deserializes the error's `data` field, if present.
    pub fn try_failure_as<'a, ErrData: Deserialize<'a>>(
        &'a self,
    ) -> Option<serde_json::Result<ErrData>> {
        match self {
            Self::Failure(err) => err.try_data_as::<ErrData>(),
            _ => None,
        }
    }
}

impl<Payload, ErrData, E> From<Response<Payload, ErrData>> for RpcResult<Payload, ErrData, E> {
    fn from(value: Response<Payload, ErrData>) -> Self {
        match value.payload {
            ResponsePayload::Success(res) => Self::Success(res),
            ResponsePayload::Failure(e) => Self::Failure(e),
        }
    }
}

impl<Payload, ErrData, E> From<Result<Response<Payload, ErrData>, E>>
    for RpcResult<Payload, ErrData, E>
{
    fn from(value: Result<Response<Payload, ErrData>, E>) -> Self {
        match value {
            Ok(res) => res.into(),
            Err(err) => Self::Err(err),
        }
    }
}
