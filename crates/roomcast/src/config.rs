//! Client configuration.

/// Configuration for a [`RoomcastClient`](crate::RoomcastClient) session.
///
/// `room_key` and `player_key_prefix` are the key patterns the sync
/// service uses for this application's shared and private documents. The
/// defaults match the common layout (`"room"` and `"player:"`); services
/// that namespace their keys set their own, e.g.:
///
/// ```
/// use roomcast::ClientConfig;
///
/// let mut config = ClientConfig::new("sync.example.com", "ABCD", "Alice");
/// config.room_key = "bc:room".to_owned();
/// config.player_key_prefix = "bc:customer:".to_owned();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hostname of the sync service (no scheme).
    pub host: String,
    /// The session code identifying the room to join.
    pub room_code: String,
    /// Display name sent in the handshake.
    pub name: String,
    /// Exact key of the shared room document.
    pub room_key: String,
    /// Key prefix of private player documents; the participant identifier
    /// is appended to it.
    pub player_key_prefix: String,
}

impl ClientConfig {
    /// Creates a configuration with the default key patterns.
    pub fn new(
        host: impl Into<String>,
        room_code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            room_code: room_code.into(),
            name: name.into(),
            room_key: "room".to_owned(),
            player_key_prefix: "player:".to_owned(),
        }
    }
}
