//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use roomhub_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::codec::WireCodec,
    usecase::{CheckNicknameUseCase, GetRoomsUseCase, ManageRoomUseCase, SessionCoordinator},
};

use super::{
    handler::{
        check_nickname, create_room, delete_room, get_rooms, health_check, kick_member,
        set_notice, transfer_owner, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let server = roomhub_server::app::build_server(&config)?;
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        session_coordinator: Arc<SessionCoordinator>,
        manage_room_usecase: Arc<ManageRoomUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        check_nickname_usecase: Arc<CheckNicknameUseCase>,
        codec: WireCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                session_coordinator,
                manage_room_usecase,
                get_rooms_usecase,
                check_nickname_usecase,
                codec,
                clock,
            }),
        }
    }

    /// Routes of the relay.
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route(
                "/api/rooms",
                get(get_rooms).post(create_room).delete(delete_room),
            )
            .route("/api/rooms/transfer", post(transfer_owner))
            .route("/api/rooms/notice", post(set_notice))
            .route("/api/rooms/kick", post(kick_member))
            .route("/api/check-nickname", get(check_nickname))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the relay on `host:port` until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
