use crate::{
    config::PersistentTransportConfig,
    handle::ConnectionHandle,
    ix::PubSubInstruction,
    managers::{InFlight, RequestManager, SubscriptionManager},
    state::ConnectionState,
    sub::SubscriptionId,
    PubSubConnect, PubSubFrontend,
};

use brane_json_rpc::{Id, PubSubItem, Request, Response, ResponsePayload};
use serde_json::value::RawValue;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;

use brane_transport::{
    utils::{to_json_raw_value, Spawnable},
    TransportError, TransportErrorKind, TransportResult,
};

/// The pubsub service: owns the backend handle, the correlation and
/// subscription tables, and the state machine from spec.md §4.9.
pub(crate) struct PubSubService<T> {
    handle: ConnectionHandle,
    connector: T,
    config: PersistentTransportConfig,
    reqs: mpsc::UnboundedReceiver<PubSubInstruction>,
    subs: SubscriptionManager,
    in_flights: RequestManager,
    state: ConnectionState,
    writable: watch::Sender<bool>,
}

impl<T> PubSubService<T>
where
    T: PubSubConnect,
{
    /// Connects and spawns the service, returning a frontend handle.
    pub(crate) async fn connect(
        connector: T,
        config: PersistentTransportConfig,
    ) -> TransportResult<PubSubFrontend> {
        let handle = connector.connect().await?;

        let (tx, reqs) = mpsc::unbounded_channel();
        let (writable_tx, writable_rx) = watch::channel(true);
        let this = Self {
            handle,
            connector,
            config: config.clone(),
            reqs,
            subs: SubscriptionManager::default(),
            in_flights: RequestManager::default(),
            state: ConnectionState::Connected,
            writable: writable_tx,
        };
        this.spawn();
        Ok(PubSubFrontend::new(tx, writable_rx, config.default_request_timeout))
    }

    /// Recomputes the writable flag from the high/low water marks and
    /// publishes it if it changed.
    fn update_writable(&self) {
        let pending = self.in_flights.len();
        let currently_writable = *self.writable.borrow();
        let next = if currently_writable {
            pending < self.config.backpressure_high_water
        } else {
            pending <= self.config.backpressure_low_water
        };
        let connected = self.state == ConnectionState::Connected;
        let _ = self.writable.send_if_modified(|w| {
            let want = next && connected;
            if *w != want {
                *w = want;
                true
            } else {
                false
            }
        });
    }

    /// Dispatches a serialized request to the socket.
    fn dispatch_request(&mut self, brv: Box<RawValue>) -> TransportResult<()> {
        self.handle.to_socket.send(brv).map_err(|_| TransportErrorKind::backend_gone())
    }

    /// Services a request submission.
    fn service_request(&mut self, in_flight: InFlight) -> TransportResult<()> {
        if self.state.is_closed() {
            in_flight.fail(TransportErrorKind::closed());
            return Ok(());
        }
        let brv = in_flight.request().clone().take_request();
        self.dispatch_request(brv)?;
        self.in_flights.insert(in_flight);
        self.update_writable();
        Ok(())
    }

    /// Services a `GetSub` instruction.
    ///
    /// If the subscription exists, the waiter gets a fresh broadcast
    /// receiver; otherwise the `tx` is dropped, which the waiter observes
    /// as the subscription not existing.
    fn service_get_sub(
        &mut self,
        local_id: SubscriptionId,
        tx: oneshot::Sender<broadcast::Receiver<Box<RawValue>>>,
    ) -> TransportResult<()> {
        if let Some(rx) = self.subs.get_rx(&local_id) {
            let _ = tx.send(rx);
        }
        Ok(())
    }

    /// Services an unsubscribe instruction. Idempotent: unsubscribing
    /// twice, or from an id that never existed, is a no-op success.
    fn service_unsubscribe(&mut self, local_id: SubscriptionId) -> TransportResult<()> {
        let req = Request::new("eth_unsubscribe", Id::None, [local_id.as_str().to_owned()]);
        let brv = req.serialize().expect("no ser error").take_request();

        self.dispatch_request(brv)?;
        self.subs.remove_sub(&local_id);
        self.update_writable();
        Ok(())
    }

    /// Services an instruction from the frontend.
    fn service_ix(&mut self, ix: PubSubInstruction) -> TransportResult<()> {
        tracing::trace!(?ix, "servicing instruction");
        match ix {
            PubSubInstruction::Request(in_flight) => self.service_request(in_flight),
            PubSubInstruction::GetSub(id, tx) => self.service_get_sub(id, tx),
            PubSubInstruction::Unsubscribe(id) => self.service_unsubscribe(id),
        }
    }

    /// Handles an item read from the backend.
    fn handle_item(&mut self, item: PubSubItem) -> TransportResult<()> {
        match item {
            PubSubItem::Response(resp) => match self.in_flights.handle_response(resp) {
                Some((server_id, in_flight)) => self.handle_sub_response(in_flight, server_id),
                None => Ok(()),
            },
            PubSubItem::Notification(notification) => {
                self.subs.notify(notification);
                Ok(())
            }
        }
    }

    /// Binds a fresh `eth_subscribe` response to its server-assigned id,
    /// then lies to the client about the subscription id: it sees the
    /// stable local id, not the server's, so a reconnect's fresh server id
    /// is invisible to callers.
    fn handle_sub_response(&mut self, in_flight: InFlight, server_id: SubscriptionId) -> TransportResult<()> {
        let id = in_flight.request().id().clone();
        let request = in_flight.request().clone();

        let local_id = self.subs.upsert(request, server_id);
        let ser_alias = to_json_raw_value(&local_id.as_str())?;

        // Best-effort: the caller may have already cancelled.
        let _ = in_flight.tx.send(Ok(Response { id, payload: ResponsePayload::Success(ser_alias) }));
        self.update_writable();
        Ok(())
    }

    /// Reconnects the backend: dials a new connection, drains and replays
    /// whatever the old backend already buffered, re-issues every pending
    /// request and active subscription, then invites the recovery hook.
    async fn reconnect(&mut self) -> TransportResult<()> {
        tracing::info!("pubsub backend connection lost, reconnecting");
        self.state = ConnectionState::Reconnecting;
        self.update_writable();

        if self.config.fail_fast_on_reconnect {
            self.in_flights.fail_all(TransportErrorKind::connection_lost);
        }

        let mut attempt = 1u32;
        loop {
            match self.connector.try_reconnect().await {
                Ok(mut new_handle) => {
                    std::mem::swap(&mut self.handle, &mut new_handle);
                    let mut old_handle = new_handle;

                    while let Ok(item) = old_handle.from_socket.try_recv() {
                        let _ = self.handle_item(item);
                    }
                    old_handle.shutdown();

                    tracing::debug!(count = self.in_flights.len(), "reissuing pending requests");
                    for brv in self.in_flights.pending_requests() {
                        self.dispatch_request(brv)?;
                    }

                    tracing::debug!(count = self.subs.len(), "restarting active subscriptions");
                    self.subs.drop_server_ids();
                    let local_ids: Vec<SubscriptionId> =
                        self.subs.iter().map(|(id, _)| id.clone()).collect();
                    let sub_requests: Vec<Box<RawValue>> = self
                        .subs
                        .iter()
                        .map(|(_, sub)| sub.request().clone().take_request())
                        .collect();
                    for brv in sub_requests {
                        self.dispatch_request(brv)?;
                    }

                    self.state = ConnectionState::Connected;
                    self.update_writable();

                    if let Some(hook) = self.config.on_reconnect.clone() {
                        hook(&local_ids);
                    }

                    return Ok(());
                }
                Err(err) => {
                    if attempt >= self.config.retry.max_attempts {
                        let msg = format!("reconnect failed after {attempt} attempt(s): {err}");
                        self.state = ConnectionState::Closed;
                        self.update_writable();
                        self.in_flights.fail_all(|| TransportErrorKind::custom_str(&msg));
                        return Err(TransportErrorKind::custom_str(&msg));
                    }
                    let delay = self.config.retry.backoff_for(attempt, u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Runs the service loop: reads from the backend, services frontend
    /// instructions, and sweeps expired/cancelled requests, until the
    /// frontend is dropped or a terminal error occurs.
    pub(crate) fn spawn(mut self) {
        let fut = async move {
            let mut sweep = tokio::time::interval(self.config.sweep_interval);

            let result: Result<(), TransportError> = 'outer: loop {
                tokio::select! {
                    biased;

                    item_opt = self.handle.from_socket.recv() => {
                        match item_opt {
                            Some(item) => {
                                if let Err(e) = self.handle_item(item) {
                                    break 'outer Err(e);
                                }
                            }
                            None => {
                                if let Err(e) = self.reconnect().await {
                                    break 'outer Err(e);
                                }
                            }
                        }
                    }

                    _ = &mut self.handle.error => {
                        tracing::error!("pubsub backend reported a terminal error");
                        if let Err(e) = self.reconnect().await {
                            break 'outer Err(e);
                        }
                    }

                    _ = sweep.tick() => {
                        let expired = self.in_flights.sweep(Instant::now());
                        if expired > 0 {
                            tracing::debug!(expired, "expired pending requests past their deadline");
                        }
                        self.update_writable();
                    }

                    req_opt = self.reqs.recv() => {
                        match req_opt {
                            Some(req) => {
                                if let Err(e) = self.service_ix(req) {
                                    break 'outer Err(e);
                                }
                            }
                            None => {
                                tracing::info!("pubsub frontend dropped, shutting down");
                                break 'outer Ok(());
                            }
                        }
                    }
                }
            };

            if let Err(err) = result {
                tracing::error!(%err, "pubsub service terminated");
            }
        };
        fut.spawn_task();
    }
}
