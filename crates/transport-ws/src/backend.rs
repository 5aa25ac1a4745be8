use crate::WsBackend;
use brane_pubsub::{ConnectionHandle, PubSubConnect};
use brane_transport::{utils::Spawnable, Authorization, TransportErrorKind, TransportResult};

use futures_util::{SinkExt, StreamExt};
use serde_json::value::RawValue;
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::{
    tungstenite::{self, client::IntoClientRequest, Message},
    MaybeTlsStream, WebSocketStream,
};

type TungsteniteStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const KEEPALIVE: u64 = 10;

/// Connection details for a websocket backend.
#[derive(Clone, Debug)]
pub struct WsConnect {
    url: String,
    auth: Option<Authorization>,
}

impl WsConnect {
    /// Creates a new websocket connection configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), auth: None }
    }

    /// Sets the authorization header used in the handshake request.
    pub fn with_auth(mut self, auth: Authorization) -> Self {
        self.auth = Some(auth);
        self
    }

    /// The URL this connector dials.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl IntoClientRequest for WsConnect {
    fn into_client_request(self) -> tungstenite::Result<tungstenite::handshake::client::Request> {
        let mut request: http::Request<()> = self.url.into_client_request()?;
        if let Some(auth) = self.auth {
            let mut auth_value = http::HeaderValue::from_str(&auth.to_header_string())?;
            auth_value.set_sensitive(true);
            request.headers_mut().insert(http::header::AUTHORIZATION, auth_value);
        }
        Ok(request)
    }
}

impl PubSubConnect for WsConnect {
    fn is_local(&self) -> bool {
        brane_transport::utils::guess_local_url(&self.url)
    }

    async fn connect(&self) -> TransportResult<ConnectionHandle> {
        let request =
            self.clone().into_client_request().map_err(TransportErrorKind::custom)?;
        let (socket, _) =
            tokio_tungstenite::connect_async(request).await.map_err(TransportErrorKind::custom)?;

        let (handle, interface) = ConnectionHandle::new();
        let backend = WsBackend { socket, interface };
        backend.spawn();

        Ok(handle)
    }
}

impl WsBackend<TungsteniteStream> {
    /// Handles a single inbound websocket message.
    #[allow(clippy::result_unit_err)]
    pub fn handle(&mut self, msg: Message) -> Result<(), ()> {
        match msg {
            Message::Text(text) => self.handle_text(text.as_str()),
            Message::Close(frame) => {
                if frame.is_some() {
                    error!(?frame, "received close frame with data");
                } else {
                    error!("WS server has gone away");
                }
                Err(())
            }
            Message::Binary(_) => {
                error!("received binary message, expected text");
                Err(())
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(()),
        }
    }

    /// Sends a message to the server.
    pub async fn send(&mut self, msg: Box<RawValue>) -> Result<(), tungstenite::Error> {
        self.socket.send(Message::Text(msg.get().to_owned().into())).await
    }

    /// Spawns the backend's read/write loop as a detached task.
    pub fn spawn(mut self) {
        let fut = async move {
            let mut errored = false;
            let keepalive = sleep(Duration::from_secs(KEEPALIVE));
            tokio::pin!(keepalive);
            loop {
                // Biased: new dispatches to the server take priority over
                // keepalive, which takes priority over inbound traffic.
                tokio::select! {
                    biased;
                    inst = self.interface.recv_from_frontend() => {
                        match inst {
                            Some(msg) => {
                                keepalive.set(sleep(Duration::from_secs(KEEPALIVE)));
                                if let Err(err) = self.send(msg).await {
                                    error!(%err, "WS connection error");
                                    errored = true;
                                    break
                                }
                            }
                            None => break,
                        }
                    }
                    _ = &mut keepalive => {
                        keepalive.set(sleep(Duration::from_secs(KEEPALIVE)));
                        if let Err(err) = self.socket.send(Message::Ping(Vec::new().into())).await {
                            error!(%err, "WS connection error");
                            errored = true;
                            break
                        }
                    }
                    resp = self.socket.next() => {
                        match resp {
                            Some(Ok(item)) => {
                                errored = self.handle(item).is_err();
                                if errored { break }
                            }
                            Some(Err(err)) => {
                                error!(%err, "WS connection error");
                                errored = true;
                                break
                            }
                            None => {
                                error!("WS server has gone away");
                                errored = true;
                                break
                            }
                        }
                    }
                }
            }
            if errored {
                self.interface.close_with_error();
            }
        };
        fut.spawn_task()
    }
}
