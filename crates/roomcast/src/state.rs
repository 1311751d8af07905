//! Local mirror of the session's two documents.
//!
//! The service pushes full-replacement deltas keyed by path. `room` holds
//! the shared document every participant sees; `player` holds this
//! participant's private document. Keys matching neither pattern are
//! ignored, so applications only mirror the documents they care about.

/// Mutable mirror of the session state.
///
/// Fields start at their defaults and are replaced wholesale by matching
/// deltas — there is no field-level merging. `player_id` is assigned once,
/// on welcome, and never changes for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct GameState<R, P> {
    /// The shared room document.
    pub room: R,
    /// This participant's private document.
    pub player: P,
    /// The authoritative participant identifier, once welcomed.
    pub player_id: Option<String>,
}

/// An applied state change: the document value before and after.
///
/// Handed to observers so they can diff semantically without having kept
/// the prior value themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision<T> {
    pub old: T,
    pub new: T,
}

/// Which mirrored document an operation key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Doc {
    Room,
    Player,
}

/// Routes an operation key to a document.
///
/// The player pattern is prefix-plus-identifier, checked against both the
/// provisional and (once known) authoritative identifiers — deltas keyed
/// by either must land, particularly around the handshake window. Returns
/// `None` for keys this client does not track.
pub(crate) fn route(
    key: &str,
    room_key: &str,
    player_key_prefix: &str,
    provisional_id: &str,
    authoritative_id: Option<&str>,
) -> Option<Doc> {
    if let Some(id) = key.strip_prefix(player_key_prefix) {
        if id == provisional_id || Some(id) == authoritative_id {
            return Some(Doc::Player);
        }
    }
    if key == room_key {
        return Some(Doc::Room);
    }
    None
}
