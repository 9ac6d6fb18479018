use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::board_dto::{
    ApiResponse, CreateRouteResult, DragEndRequest, DragEndResult, DragStartRequest,
    OpenBoardResponse, SearchRequest, SelectCollectorRequest,
};
use crate::models::{Collector, DragPayload, RoutingClient};
use crate::services::BoardView;
use crate::state::{AppState, SharedSession};
use crate::utils::errors::{AppError, AppResult};

pub struct BoardController {
    state: AppState,
}

impl BoardController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn list_collectors(&self) -> AppResult<Vec<Collector>> {
        self.state.gateway.list_collectors().await
    }

    pub async fn open(&self) -> AppResult<ApiResponse<OpenBoardResponse>> {
        let (session_id, handle) = self.state.open_board().await;
        let mut session = handle.session.lock().await;

        let collectors = match session.board.load_collectors().await {
            Ok(collectors) => collectors.to_vec(),
            Err(e) => {
                warn!("⚠️ No se pudieron cargar cobradores para {}: {}", session_id, e);
                Vec::new()
            }
        };

        Ok(ApiResponse::success_with_message(
            OpenBoardResponse {
                session_id,
                collectors,
            },
            "Tablero abierto".to_string(),
        ))
    }

    pub async fn close(&self, id: Uuid) -> AppResult<()> {
        self.state.close_board(id).await
    }

    pub async fn view(&self, id: Uuid) -> AppResult<BoardView> {
        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();
        Ok(session.board.view())
    }

    /// Los fallos de carga quedan en la vista como estado de error del tablero
    pub async fn select_collector(
        &self,
        id: Uuid,
        request: SelectCollectorRequest,
    ) -> AppResult<BoardView> {
        request.validate()?;

        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();

        board_level(session.board.select_collector(&request.collector_id).await)?;
        Ok(session.board.view())
    }

    pub async fn search(&self, id: Uuid, request: SearchRequest) -> AppResult<BoardView> {
        request.validate()?;

        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();

        session.board.set_search_filter(&request.text);
        Ok(session.board.view())
    }

    pub async fn refresh(&self, id: Uuid) -> AppResult<BoardView> {
        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();

        board_level(session.board.refresh().await)?;
        Ok(session.board.view())
    }

    pub async fn create_route(&self, id: Uuid) -> AppResult<ApiResponse<CreateRouteResult>> {
        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();

        let route_id = session.board.create_route().await?;
        Ok(ApiResponse::success_with_message(
            CreateRouteResult {
                route_id,
                board: session.board.view(),
            },
            "Ruta creada".to_string(),
        ))
    }

    /// Misma lista que `unique_clients` de la vista: respeta la búsqueda
    pub async fn unique_clients(&self, id: Uuid) -> AppResult<Vec<RoutingClient>> {
        let handle = self.state.board(id).await?;
        let mut session = handle.session.lock().await;
        session.touch();
        Ok(session.board.visible_unique_clients())
    }

    /// Espera a que terminen las lecturas en curso; solo una resolución
    /// pendiente rechaza el arrastre.
    pub async fn drag_start(&self, id: Uuid, request: DragStartRequest) -> AppResult<DragPayload> {
        request.validate()?;

        let handle = self.state.board(id).await?;
        if handle.is_resolving() {
            return Err(busy_error());
        }

        let mut session = handle.session.lock().await;
        session.touch();
        let payload = session
            .board
            .start_drag(&request.client_id, request.origin)?
            .clone();
        Ok(payload)
    }

    /// La resolución corre en su propia tarea para que una desconexión del
    /// cliente HTTP no la deje a medias.
    pub async fn drag_end(&self, id: Uuid, request: DragEndRequest) -> AppResult<DragEndResult> {
        let handle = self.state.board(id).await?;
        if !handle.begin_resolution() {
            return Err(busy_error());
        }
        let resolution = ResolutionGuard(handle);

        let task = tokio::spawn(async move {
            let mut session = resolution.0.session.lock().await;
            session.touch();
            let outcome = session.board.end_drag(request.destination).await?;
            Ok::<_, AppError>(DragEndResult {
                outcome,
                board: session.board.view(),
            })
        });

        let result = task
            .await
            .map_err(|e| AppError::Internal(format!("move resolution task failed: {}", e)))??;
        info!("🔚 Arrastre resuelto en tablero {}", id);
        Ok(result)
    }
}

/// Libera la marca de resolución aunque la tarea termine con error o pánico
struct ResolutionGuard(SharedSession);

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        self.0.finish_resolution();
    }
}

fn busy_error() -> AppError {
    AppError::Conflict("a move is still being resolved".to_string())
}

fn board_level(result: AppResult<()>) -> AppResult<()> {
    match result {
        Err(AppError::ExternalApi(e)) => {
            warn!("⚠️ Tablero en estado de error: {}", e);
            Ok(())
        }
        other => other,
    }
}
