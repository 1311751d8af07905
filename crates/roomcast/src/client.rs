//! `RoomcastClient`: session loop, state mirror, and outbound dispatch.

use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use roomcast_protocol::{
    decode_frame, encode_frame, ClientSend, InboundFrame, Operation,
    OP_CLIENT_SEND,
};
use roomcast_transport::{
    Connection, ShutdownSignal, TransportError, WsConnection,
};

use crate::bootstrap::{self, SUBPROTOCOL};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::Observers;
use crate::state::{route, Doc, GameState, Revision};

/// A client for one session against the sync service.
///
/// Generic over the two mirrored document types: `R` for the shared room
/// document and `P` for this participant's private document. Both are
/// replaced wholesale by matching server deltas; observers receive the
/// before/after pair of every replacement.
///
/// The client is a cheap handle (`Clone` shares the session). The usual
/// shape is: register observers, keep a clone for sending, then let
/// [`connect`](Self::connect) occupy a task until the session ends.
///
/// One client runs exactly one session. There is no reconnection: when the
/// connection drops, for any reason, the session is over and a new client
/// must be constructed.
pub struct RoomcastClient<R, P, C = WsConnection> {
    inner: Arc<Inner<R, P, C>>,
}

impl<R, P, C> Clone for RoomcastClient<R, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R, P, C> {
    config: ClientConfig,
    provisional_id: String,
    /// Outbound sequence counter; the first frame sent carries seq 1.
    seq: AtomicU64,
    /// Set when the single session starts; never cleared.
    started: AtomicBool,
    state: Mutex<GameState<R, P>>,
    observers: Mutex<Observers<R, P>>,
    conn: Mutex<Option<Arc<C>>>,
    shutdown: ShutdownSignal,
}

impl<R, P, C> RoomcastClient<R, P, C>
where
    R: DeserializeOwned + Default + Clone + Send + 'static,
    P: DeserializeOwned + Default + Clone + Send + 'static,
    C: Connection,
{
    /// Creates a client for the given session target.
    ///
    /// Generates the provisional participant identifier used until the
    /// welcome handshake assigns the authoritative one.
    pub fn new(config: ClientConfig) -> Self {
        let provisional_id = bootstrap::provisional_id();
        tracing::debug!(%provisional_id, room_code = %config.room_code, "client created");
        Self {
            inner: Arc::new(Inner {
                config,
                provisional_id,
                seq: AtomicU64::new(0),
                started: AtomicBool::new(false),
                state: Mutex::new(GameState::default()),
                observers: Mutex::new(Observers::default()),
                conn: Mutex::new(None),
                shutdown: ShutdownSignal::new(),
            }),
        }
    }

    /// The locally generated identifier sent in the handshake.
    pub fn provisional_id(&self) -> &str {
        &self.inner.provisional_id
    }

    /// The authoritative identifier, once the welcome has been processed.
    pub async fn player_id(&self) -> Option<String> {
        self.inner.state.lock().await.player_id.clone()
    }

    /// Snapshot of the mirrored session state.
    pub async fn state(&self) -> GameState<R, P> {
        self.inner.state.lock().await.clone()
    }

    /// Whether a session is currently open.
    pub async fn is_connected(&self) -> bool {
        self.inner.conn.lock().await.is_some()
    }

    /// Registers an observer for the welcome handshake. Receives the
    /// authoritative identifier; fires once per session.
    pub async fn on_welcome(
        &self,
        f: impl FnMut(&str) + Send + 'static,
    ) {
        self.inner.observers.lock().await.add_welcome(Box::new(f));
    }

    /// Registers an observer for room document replacements.
    ///
    /// Observers run synchronously on the inbound delivery task, in
    /// server-delivery order, after the mirror has been updated.
    pub async fn on_room_update(
        &self,
        f: impl FnMut(&Revision<R>) + Send + 'static,
    ) {
        self.inner.observers.lock().await.add_room(Box::new(f));
    }

    /// Registers an observer for private player document replacements.
    pub async fn on_self_update(
        &self,
        f: impl FnMut(&Revision<P>) + Send + 'static,
    ) {
        self.inner.observers.lock().await.add_player(Box::new(f));
    }

    /// Drives the session over an already-established connection.
    ///
    /// Resolves only when the session ends: clean remote close, transport
    /// failure, or a local [`close`](Self::close). A transport failure is
    /// surfaced the same way as a clean close — through termination —
    /// with the cause recorded in the logs.
    ///
    /// Exposed for custom transports; [`connect`](Self::connect) is this
    /// plus the dial-out.
    pub async fn run(&self, conn: C) -> Result<(), ClientError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyStarted);
        }

        let conn = Arc::new(conn);
        *self.inner.conn.lock().await = Some(Arc::clone(&conn));
        tracing::info!("session started");

        loop {
            match conn.recv().await {
                Ok(Some(frame)) => self.handle_frame(&frame).await,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "session transport failed");
                    break;
                }
            }
        }

        self.inner.conn.lock().await.take();
        if self.inner.shutdown.signal() {
            tracing::info!("session ended");
        }
        Ok(())
    }

    /// Resolves once the session has ended. Usable from any handle,
    /// including before the session starts.
    pub async fn closed(&self) {
        self.inner.shutdown.wait().await;
    }

    /// Closes the session voluntarily. A no-op once the session is over.
    pub async fn close(&self) -> Result<(), ClientError> {
        let conn = self.inner.conn.lock().await.clone();
        if let Some(conn) = conn {
            conn.close().await.map_err(wrap_send_error)?;
        }
        Ok(())
    }

    /// Sends an action frame with the next sequence number.
    ///
    /// # Errors
    /// [`ClientError::NotConnected`] when no session is open; in that case
    /// no sequence number is consumed.
    pub async fn send<T: Serialize>(
        &self,
        op_code: &str,
        params: &T,
    ) -> Result<(), ClientError> {
        let conn = self
            .inner
            .conn
            .lock()
            .await
            .clone()
            .ok_or(ClientError::NotConnected)?;
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let frame = encode_frame(seq, op_code, params)?;
        tracing::trace!(seq, op_code, "sending frame");
        conn.send(&frame).await.map_err(wrap_send_error)
    }

    /// Sends `body` as an addressed action (`client/send`) from this
    /// participant to the service.
    ///
    /// # Errors
    /// [`ClientError::IdentityUnknown`] before the welcome handshake has
    /// assigned the authoritative identifier; nothing is sent in that
    /// case, since the wrapper would carry invalid addressing.
    pub async fn send_action<T: Serialize>(
        &self,
        body: T,
    ) -> Result<(), ClientError> {
        let from = self
            .inner
            .state
            .lock()
            .await
            .player_id
            .clone()
            .ok_or(ClientError::IdentityUnknown)?;
        let action = ClientSend::new(from, body);
        self.send(OP_CLIENT_SEND, &action).await
    }

    async fn handle_frame(&self, frame: &str) {
        match decode_frame(frame) {
            Ok(InboundFrame::Welcome(welcome)) => {
                self.handle_welcome(welcome.id).await;
            }
            Ok(InboundFrame::Delta(op)) => self.apply(op).await,
            Ok(InboundFrame::Unknown(op_code)) => {
                tracing::debug!(%op_code, "ignoring unknown opcode");
            }
            // A bad frame costs itself, not the session.
            Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
        }
    }

    async fn handle_welcome(&self, id: String) {
        {
            let mut state = self.inner.state.lock().await;
            if state.player_id.is_some() {
                tracing::debug!("duplicate welcome ignored");
                return;
            }
            tracing::debug!(player_id = %id, "authoritative identity assigned");
            state.player_id = Some(id.clone());
        }
        self.inner.observers.lock().await.notify_welcome(&id);
    }

    /// Applies one normalized delta to the mirror.
    ///
    /// Exactly one document is touched per operation; the key routing
    /// keeps room and player updates disjoint. Unmatched keys are dropped
    /// silently so untracked documents stay forward-compatible.
    async fn apply(&self, op: Operation) {
        let target = {
            let state = self.inner.state.lock().await;
            route(
                &op.key,
                &self.inner.config.room_key,
                &self.inner.config.player_key_prefix,
                &self.inner.provisional_id,
                state.player_id.as_deref(),
            )
        };

        match target {
            Some(Doc::Room) => {
                let new: R = match serde_json::from_value(op.value) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(key = %op.key, error = %e, "dropping undecodable room delta");
                        return;
                    }
                };
                let revision = {
                    let mut state = self.inner.state.lock().await;
                    let old = mem::replace(&mut state.room, new.clone());
                    Revision { old, new }
                };
                self.inner.observers.lock().await.notify_room(&revision);
            }
            Some(Doc::Player) => {
                let new: P = match serde_json::from_value(op.value) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(key = %op.key, error = %e, "dropping undecodable player delta");
                        return;
                    }
                };
                let revision = {
                    let mut state = self.inner.state.lock().await;
                    let old = mem::replace(&mut state.player, new.clone());
                    Revision { old, new }
                };
                self.inner
                    .observers
                    .lock()
                    .await
                    .notify_player(&revision);
            }
            None => {
                tracing::trace!(key = %op.key, "operation key matches no tracked document");
            }
        }
    }
}

impl<R, P> RoomcastClient<R, P, WsConnection>
where
    R: DeserializeOwned + Default + Clone + Send + 'static,
    P: DeserializeOwned + Default + Clone + Send + 'static,
{
    /// Dials the sync service and drives the session until it ends.
    ///
    /// Builds the connection URL from the configured host, room code, and
    /// handshake parameters, negotiates the required subprotocol, then
    /// behaves as [`run`](Self::run).
    pub async fn connect(&self) -> Result<(), ClientError> {
        let url = bootstrap::session_url(
            &self.inner.config,
            &self.inner.provisional_id,
        )?;
        tracing::debug!(url = %url, "dialing sync service");
        let conn = WsConnection::connect(url.as_str(), SUBPROTOCOL).await?;
        self.run(conn).await
    }
}

fn wrap_send_error<E>(e: E) -> ClientError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ClientError::Transport(TransportError::SendFailed(
        std::io::Error::new(std::io::ErrorKind::BrokenPipe, e),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::future::Future;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct RoomDoc {
        state: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct PlayerDoc {
        score: i64,
    }

    type TestClient = RoomcastClient<RoomDoc, PlayerDoc, FakeConnection>;

    /// In-memory connection: frames in via an mpsc sender, frames out
    /// into a shared vec.
    struct FakeConnection {
        inbound: Mutex<mpsc::UnboundedReceiver<String>>,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    impl Connection for FakeConnection {
        type Error = TransportError;

        async fn send(&self, frame: &str) -> Result<(), Self::Error> {
            self.sent.lock().unwrap().push(frame.to_owned());
            Ok(())
        }

        async fn recv(&self) -> Result<Option<String>, Self::Error> {
            Ok(self.inbound.lock().await.recv().await)
        }

        async fn close(&self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct Harness {
        client: TestClient,
        server: mpsc::UnboundedSender<String>,
        sent: Arc<StdMutex<Vec<String>>>,
        session: tokio::task::JoinHandle<Result<(), ClientError>>,
    }

    /// Starts a session over a fake connection and waits until the loop
    /// has installed it.
    async fn start_session() -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let conn = FakeConnection {
            inbound: Mutex::new(rx),
            sent: Arc::clone(&sent),
        };
        let client: TestClient =
            RoomcastClient::new(ClientConfig::new("h", "CODE", "Bot"));
        let session = {
            let client = client.clone();
            tokio::spawn(async move { client.run(conn).await })
        };
        eventually(|| async { client.is_connected().await }).await;
        Harness {
            client,
            server: tx,
            sent,
            session,
        }
    }

    async fn eventually<F, Fut>(mut cond: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if cond().await {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not met in time");
    }

    fn object_delta(key: &str, value: serde_json::Value) -> String {
        json!({"opCode": "object", "result": {"key": key, "value": value}})
            .to_string()
    }

    fn welcome(id: &str) -> String {
        json!({"opCode": "client/welcome", "result": {"id": id}})
            .to_string()
    }

    #[tokio::test]
    async fn test_sequence_numbers_start_at_one_and_increase() {
        let h = start_session().await;
        for _ in 0..3 {
            h.client.send("game/ping", &json!({})).await.unwrap();
        }
        let seqs: Vec<u64> = h
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|frame| {
                let v: serde_json::Value =
                    serde_json::from_str(frame).unwrap();
                v["seq"].as_u64().unwrap()
            })
            .collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        drop(h.server);
        h.session.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_room_delta_updates_room_and_leaves_player_untouched() {
        let h = start_session().await;
        let revisions = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&revisions);
        h.client
            .on_room_update(move |rev| {
                sink.lock().unwrap().push(rev.clone());
            })
            .await;

        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        eventually(|| async {
            h.client.state().await.room.state == "Lobby"
        })
        .await;

        let state = h.client.state().await;
        assert_eq!(state.player, PlayerDoc::default());
        let revisions = revisions.lock().unwrap();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].old, RoomDoc::default());
        assert_eq!(revisions[0].new.state, "Lobby");
    }

    #[tokio::test]
    async fn test_revision_old_is_the_value_before_that_operation() {
        let h = start_session().await;
        let revisions = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&revisions);
        h.client
            .on_room_update(move |rev| {
                sink.lock().unwrap().push(rev.clone());
            })
            .await;

        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        h.server
            .send(object_delta("room", json!({"state": "Gameplay"})))
            .unwrap();
        eventually(|| async { revisions.lock().unwrap().len() == 2 })
            .await;

        let revisions = revisions.lock().unwrap();
        assert_eq!(revisions[1].old.state, "Lobby");
        assert_eq!(revisions[1].new.state, "Gameplay");
    }

    #[tokio::test]
    async fn test_player_deltas_route_across_the_handshake_window() {
        let h = start_session().await;
        let revisions = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&revisions);
        h.client
            .on_self_update(move |rev| {
                sink.lock().unwrap().push(rev.clone());
            })
            .await;

        // Before welcome: keyed by the provisional identifier.
        let provisional_key =
            format!("player:{}", h.client.provisional_id());
        h.server
            .send(object_delta(&provisional_key, json!({"score": 1})))
            .unwrap();
        eventually(|| async { h.client.state().await.player.score == 1 })
            .await;

        h.server.send(welcome("A1")).unwrap();
        eventually(|| async { h.client.player_id().await.is_some() })
            .await;

        // After welcome: both identifiers must still land.
        h.server
            .send(object_delta("player:A1", json!({"score": 2})))
            .unwrap();
        h.server
            .send(object_delta(&provisional_key, json!({"score": 3})))
            .unwrap();
        eventually(|| async { h.client.state().await.player.score == 3 })
            .await;

        assert_eq!(h.client.state().await.room, RoomDoc::default());
        let revisions = revisions.lock().unwrap();
        assert_eq!(revisions.len(), 3);
        assert_eq!(revisions[1].old.score, 1);
        assert_eq!(revisions[1].new.score, 2);
        assert_eq!(revisions[2].old.score, 2);
    }

    #[tokio::test]
    async fn test_unmatched_key_is_a_silent_noop() {
        let h = start_session().await;
        let room_events = Arc::new(StdMutex::new(0usize));
        let self_events = Arc::new(StdMutex::new(0usize));
        let rooms = Arc::clone(&room_events);
        let selves = Arc::clone(&self_events);
        h.client
            .on_room_update(move |_| *rooms.lock().unwrap() += 1)
            .await;
        h.client
            .on_self_update(move |_| *selves.lock().unwrap() += 1)
            .await;

        h.server
            .send(object_delta("audience", json!({"count": 10})))
            .unwrap();
        // A subsequent room delta proves the no-op frame was consumed.
        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        eventually(|| async { *room_events.lock().unwrap() == 1 }).await;

        assert_eq!(*self_events.lock().unwrap(), 0);
        assert_eq!(h.client.state().await.player, PlayerDoc::default());
    }

    #[tokio::test]
    async fn test_welcome_assigns_identity_exactly_once() {
        let h = start_session().await;
        let welcomes = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&welcomes);
        h.client
            .on_welcome(move |id| {
                sink.lock().unwrap().push(id.to_owned());
            })
            .await;

        h.server.send(welcome("A1")).unwrap();
        h.server.send(welcome("B2")).unwrap();
        // A trailing delta flushes both welcomes through the loop.
        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        eventually(|| async {
            h.client.state().await.room.state == "Lobby"
        })
        .await;

        assert_eq!(h.client.player_id().await.as_deref(), Some("A1"));
        assert_eq!(*welcomes.lock().unwrap(), vec!["A1".to_owned()]);
    }

    #[tokio::test]
    async fn test_send_action_before_welcome_fails_and_sends_nothing() {
        let h = start_session().await;
        let result = h.client.send_action(json!({"vote": 1})).await;
        assert!(matches!(result, Err(ClientError::IdentityUnknown)));
        assert!(h.sent.lock().unwrap().is_empty());

        h.server.send(welcome("A1")).unwrap();
        eventually(|| async { h.client.player_id().await.is_some() })
            .await;

        h.client.send_action(json!({"vote": 1})).await.unwrap();
        let sent = h.sent.lock().unwrap();
        let frame: serde_json::Value =
            serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(frame["seq"], 1);
        assert_eq!(frame["opCode"], "client/send");
        assert_eq!(frame["params"]["from"], "A1");
        assert_eq!(frame["params"]["to"], 1);
        assert_eq!(frame["params"]["body"]["vote"], 1);
    }

    #[tokio::test]
    async fn test_send_without_a_session_fails() {
        let client: TestClient =
            RoomcastClient::new(ClientConfig::new("h", "CODE", "Bot"));
        let result = client.send("game/ping", &json!({})).await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_malformed_frames_do_not_end_the_session() {
        let h = start_session().await;
        h.server.send("not json".to_owned()).unwrap();
        h.server
            .send(r#"{"opCode":"client/welcome","result":{"bad":1}}"#.to_owned())
            .unwrap();
        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        eventually(|| async {
            h.client.state().await.room.state == "Lobby"
        })
        .await;
        assert!(!h.session.is_finished());
    }

    #[tokio::test]
    async fn test_session_is_single_shot() {
        let h = start_session().await;
        drop(h.server);
        h.session.await.unwrap().unwrap();
        h.client.closed().await;
        assert!(!h.client.is_connected().await);

        let (_tx, rx) = mpsc::unbounded_channel();
        let conn = FakeConnection {
            inbound: Mutex::new(rx),
            sent: Arc::new(StdMutex::new(Vec::new())),
        };
        let result = h.client.run(conn).await;
        assert!(matches!(result, Err(ClientError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_unknown_opcodes_are_ignored() {
        let h = start_session().await;
        h.server
            .send(
                json!({"opCode": "room/lock", "result": {"locked": true}})
                    .to_string(),
            )
            .unwrap();
        h.server
            .send(object_delta("room", json!({"state": "Lobby"})))
            .unwrap();
        eventually(|| async {
            h.client.state().await.room.state == "Lobby"
        })
        .await;
        assert!(!h.session.is_finished());
    }
}
