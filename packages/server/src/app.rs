//! Dependency wiring.
//!
//! Must be called from inside a Tokio runtime: the persistence worker is
//! spawned here.

use std::sync::Arc;

use roomhub_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::{
    config::ServerConfig,
    domain::{ChatHub, MessageStore, RepositoryError},
    infrastructure::{
        codec::WireCodec,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageStore, SqliteMessageStore},
    },
    ui::Server,
    usecase::{
        CheckNicknameUseCase, Dispatcher, GetRoomsUseCase, ManageRoomUseCase, PersistenceQueue,
        SessionCoordinator,
    },
};

/// Build a server with the system clock and the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the configured database cannot be opened.
pub fn build_server(config: &ServerConfig) -> Result<Server, RepositoryError> {
    let store = open_message_store(config)?;
    Ok(build_server_with(config, store, Arc::new(SystemClock)))
}

/// SQLite when a database path is configured, in-memory otherwise.
pub fn open_message_store(config: &ServerConfig) -> Result<Arc<dyn MessageStore>, RepositoryError> {
    match &config.database {
        Some(path) => {
            let store = SqliteMessageStore::open(path)?;
            tracing::info!("Chat history stored in {}", path.display());
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Chat history kept in memory only");
            Ok(Arc::new(InMemoryMessageStore::new()))
        }
    }
}

/// Build a server with the given store and clock.
pub fn build_server_with(
    config: &ServerConfig,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
) -> Server {
    // Initialize dependencies in order:
    // 1. Hub (directory, room registry, sessions)
    // 2. Persistence queue and MessagePusher
    // 3. UseCases
    // 4. Server
    let hub = Arc::new(Mutex::new(ChatHub::new(config.default_room.clone())));
    tracing::info!("Default room '{}' created", config.default_room);

    let (persistence, _worker) = PersistenceQueue::spawn(store);
    let codec = WireCodec::new(config.wire_format);
    let message_pusher = Arc::new(WebSocketMessagePusher::new(codec));
    let dispatcher = Arc::new(Dispatcher::new(
        message_pusher,
        persistence,
        config.history_limit,
    ));

    let session_coordinator = Arc::new(SessionCoordinator::new(
        hub.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));
    let manage_room_usecase = Arc::new(ManageRoomUseCase::new(hub.clone(), dispatcher));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(hub.clone()));
    let check_nickname_usecase = Arc::new(CheckNicknameUseCase::new(hub));

    Server::new(
        session_coordinator,
        manage_room_usecase,
        get_rooms_usecase,
        check_nickname_usecase,
        codec,
        clock,
    )
}
