use std::sync::Arc;
use std::time::Duration;

use noteboard::config::{SessionConfig, env_parse, env_string};
use noteboard::{Session, SessionError, SessionHandle};
use notes::doc::{ActorId, NoteColor, Point};
use notes::gesture::NoListeners;
use notes::identity::StaticIdentity;
use replica::MemoryStore;
use tracing_subscriber::EnvFilter;

/// Two sessions against one in-process store, driven by a short script.
#[tokio::main]
async fn main() -> Result<(), SessionError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SessionConfig::from_env();
    let latency = Duration::from_millis(env_parse("NOTEBOARD_STORE_LATENCY_MS", 50));
    let store = Arc::new(MemoryStore::with_latency(latency));

    let me = env_string("NOTEBOARD_ACTOR_ID").map_or_else(|| ActorId::new(uuid::Uuid::new_v4().to_string()), ActorId::new);
    let mine = spawn(config, store.clone(), me);
    let theirs = spawn(config, store.clone(), ActorId::new(uuid::Uuid::new_v4().to_string()));

    mine.set_color(NoteColor::Pink).await?;
    let Some(id) = mine.add_note().await? else {
        tracing::warn!("no identity; nothing to do");
        return mine.shutdown().await;
    };

    mine.pointer_down_on_note(id, Point::new(0.0, 0.0)).await?;
    for step in 1..=5 {
        mine.pointer_move(Point::new(f64::from(step) * 12.0, f64::from(step) * 8.0)).await?;
    }
    mine.pointer_up().await?;

    mine.begin_edit(id).await?;
    let mut text = String::new();
    for ch in "hello board".chars() {
        text.push(ch);
        mine.type_text(text.clone()).await?;
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
    mine.end_edit().await?;

    mine.cursor_moved(Point::new(300.0, 240.0)).await?;
    tokio::time::sleep(config.presence_tick * 2 + latency * 2).await;

    // The other session sees the note but cannot move it.
    let refused = !theirs.pointer_down_on_note(id, Point::default()).await?;
    tracing::info!(refused, "foreign drag attempt");

    mine.undo().await?;
    mine.settled().await?;
    tokio::time::sleep(latency * 2).await;

    log_view("mine", &mine);
    log_view("theirs", &theirs);

    mine.shutdown().await?;
    theirs.shutdown().await?;
    tracing::info!(notes = store.note_rows().await.len(), "demo finished");
    Ok(())
}

fn spawn(config: SessionConfig, store: Arc<MemoryStore>, actor: ActorId) -> SessionHandle {
    Session::spawn(config, Arc::new(StaticIdentity::signed_in(actor)), store, Arc::new(NoListeners))
}

fn log_view(label: &str, handle: &SessionHandle) {
    match serde_json::to_string_pretty(&handle.snapshot()) {
        Ok(json) => tracing::info!(session = label, "view:\n{json}"),
        Err(e) => tracing::warn!(session = label, error = %e, "view not serializable"),
    }
}
