use crate::{Response, ResponsePayload};
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Serialize,
};

const ID: &str = "id";
const SUBSCRIPTION: &str = "subscription";
const RESULT: &str = "result";
const ERROR: &str = "error";

/// An Ethereum-style subscription notification, distinct from a standard
/// JSON-RPC 2.0 notification: it carries a `subscription` field instead of
/// an `id`, and is delivered unsolicited over a persistent transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EthNotification<T = Box<serde_json::value::RawValue>> {
    /// The subscription id, as returned by the `eth_subscribe` call that
    /// created it.
    pub subscription: String,
    /// The notification payload.
    pub result: T,
}

/// An item received over a persistent (pubsub-capable) transport: either a
/// [`Response`] to a request this client sent, or an unsolicited
/// [`EthNotification`].
#[derive(Debug, Clone)]
pub enum PubSubItem {
    /// A response to an outstanding request.
    Response(Response),
    /// A subscription notification.
    Notification(EthNotification),
}

impl<'de> Deserialize<'de> for PubSubItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct PubSubItemVisitor;

        impl<'de> Visitor<'de> for PubSubItemVisitor {
            type Value = PubSubItem;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a JSON-RPC response or an Ethereum-style notification")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id = None;
                let mut subscription = None;
                let mut result = None;
                let mut error = None;

                while let Ok(Some(key)) = map.next_key() {
                    match key {
                        ID => {
                            if id.is_some() {
                                return Err(serde::de::Error::duplicate_field(ID));
                            }
                            id = Some(map.next_value()?);
                        }
                        SUBSCRIPTION => {
                            if subscription.is_some() {
                                return Err(serde::de::Error::duplicate_field(SUBSCRIPTION));
                            }
                            subscription = Some(map.next_value()?);
                        }
                        RESULT => {
                            if result.is_some() {
                                return Err(serde::de::Error::duplicate_field(RESULT));
                            }
                            result = Some(map.next_value()?);
                        }
                        ERROR => {
                            if error.is_some() {
                                return Err(serde::de::Error::duplicate_field(ERROR));
                            }
                            error = Some(map.next_value()?);
                        }
                        _ => {
                            let _ = map.next_value::<serde_json::Value>()?;
                        }
                    }
                }

                if let Some(id) = id {
                    if subscription.is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "unexpected {SUBSCRIPTION} in pubsub item"
                        )));
                    }
                    let payload = if let Some(error) = error {
                        ResponsePayload::Failure(error)
                    } else if let Some(result) = result {
                        ResponsePayload::Success(result)
                    } else {
                        return Err(serde::de::Error::custom(format!(
                            "missing `{RESULT}` or `{ERROR}` field in response"
                        )));
                    };
                    Ok(PubSubItem::Response(Response { id, payload }))
                } else {
                    if error.is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "unexpected `{ERROR}` field in {SUBSCRIPTION} notification"
                        )));
                    }
                    let subscription =
                        subscription.ok_or_else(|| serde::de::Error::missing_field(SUBSCRIPTION))?;
                    let result = result.ok_or_else(|| serde::de::Error::missing_field(RESULT))?;
                    Ok(PubSubItem::Notification(EthNotification { subscription, result }))
                }
            }
        }

        deserializer.deserialize_map(PubSubItemVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguates_response_from_notification() {
        let response = r#"{"jsonrpc":"2.0","id":1,"result":"ok"}"#;
        assert!(matches!(
            serde_json::from_str::<PubSubItem>(response).unwrap(),
            PubSubItem::Response(_)
        ));

        let notification =
            r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"subscription":"0xabc","result":42}}"#;
        // The outer `method`/`params` envelope is stripped by the transport
        // before reaching `PubSubItem`; here we deserialize the inner object.
        let inner = r#"{"subscription":"0xabc","result":42}"#;
        assert!(matches!(
            serde_json::from_str::<PubSubItem>(inner).unwrap(),
            PubSubItem::Notification(_)
        ));
        let _ = notification;
    }
}
