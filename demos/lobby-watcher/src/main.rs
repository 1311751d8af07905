//! Joins a room and logs every document revision the service pushes.
//!
//! Usage: `lobby-watcher <host> <room-code> [name]`
//!
//! The document types here are deliberately loose (`serde_json::Value`
//! fields stay untyped) — this demo watches any application's room.

use serde::Deserialize;
use tracing::{error, info};

use roomcast::{ClientConfig, RoomcastClient};

#[derive(Debug, Clone, Default, Deserialize)]
struct Room {
    #[serde(default)]
    state: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Player {
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (host, room_code) = match (args.next(), args.next()) {
        (Some(h), Some(c)) => (h, c),
        _ => {
            eprintln!("usage: lobby-watcher <host> <room-code> [name]");
            std::process::exit(2);
        }
    };
    let name = args.next().unwrap_or_else(|| "lobby-watcher".to_owned());

    let client: RoomcastClient<Room, Player> =
        RoomcastClient::new(ClientConfig::new(host, room_code, name));

    client
        .on_welcome(|id| info!(player_id = id, "welcomed"))
        .await;
    client
        .on_room_update(|rev| {
            info!(
                old_state = ?rev.old.state,
                new_state = ?rev.new.state,
                fields = rev.new.rest.len(),
                "room revised"
            );
        })
        .await;
    client
        .on_self_update(|rev| {
            info!(fields = rev.new.fields.len(), "player revised");
        })
        .await;

    // Blocks until the service closes the session or the network drops.
    if let Err(e) = client.connect().await {
        error!(error = %e, "session failed");
        std::process::exit(1);
    }
}
