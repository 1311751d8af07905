//! Session bootstrap: provisional identity and connection URL.
//!
//! Pure aside from identity generation. The URL carries the handshake
//! query parameters the service expects; the password field is present
//! but empty (password-protected rooms are joined by other surfaces).

use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// The single WebSocket subprotocol the service requires.
pub const SUBPROTOCOL: &str = "ecast-v0";

/// Generates the locally scoped participant identifier used until the
/// welcome handshake assigns the authoritative one.
pub(crate) fn provisional_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builds the connection URL for a session.
///
/// Shape: `wss://<host>/api/v2/rooms/<roomCode>/play?<query>`, where the
/// query carries role, display name, provisional identity, payload format,
/// and the empty password placeholder.
pub(crate) fn session_url(
    config: &ClientConfig,
    provisional_id: &str,
) -> Result<Url, ClientError> {
    let base = format!(
        "wss://{}/api/v2/rooms/{}/play",
        config.host, config.room_code
    );
    let mut url = Url::parse(&base)
        .map_err(|e| ClientError::InvalidTarget(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("role", "player")
        .append_pair("name", &config.name)
        .append_pair("user-id", provisional_id)
        .append_pair("format", "json")
        .append_pair("password", "");
    Ok(url)
}
