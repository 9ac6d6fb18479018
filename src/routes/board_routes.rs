use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::board_controller::BoardController;
use crate::dto::board_dto::{
    ApiResponse, CreateRouteResult, DragEndRequest, DragEndResult, DragStartRequest,
    OpenBoardResponse, SearchRequest, SelectCollectorRequest,
};
use crate::models::{Collector, DragPayload, RoutingClient};
use crate::services::BoardView;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_board_router() -> Router<AppState> {
    Router::new()
        .route("/collectors", get(list_collectors))
        .route("/board", post(open_board))
        .route("/board/:id", get(get_board).delete(close_board))
        .route("/board/:id/collector", put(select_collector))
        .route("/board/:id/search", put(set_search))
        .route("/board/:id/refresh", post(refresh_board))
        .route("/board/:id/routes", post(create_route))
        .route("/board/:id/clients", get(unique_clients))
        .route("/board/:id/drag/start", post(drag_start))
        .route("/board/:id/drag/end", post(drag_end))
}

async fn list_collectors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Collector>>>, AppError> {
    let controller = BoardController::new(state);
    let collectors = controller.list_collectors().await?;
    Ok(Json(ApiResponse::success(collectors)))
}

async fn open_board(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OpenBoardResponse>>, AppError> {
    let controller = BoardController::new(state);
    let response = controller.open().await?;
    Ok(Json(response))
}

async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BoardView>>, AppError> {
    let controller = BoardController::new(state);
    let view = controller.view(id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn close_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = BoardController::new(state);
    controller.close(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Tablero cerrado"
    })))
}

async fn select_collector(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectCollectorRequest>,
) -> Result<Json<ApiResponse<BoardView>>, AppError> {
    let controller = BoardController::new(state);
    let view = controller.select_collector(id, request).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn set_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<BoardView>>, AppError> {
    let controller = BoardController::new(state);
    let view = controller.search(id, request).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn refresh_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BoardView>>, AppError> {
    let controller = BoardController::new(state);
    let view = controller.refresh(id).await?;
    Ok(Json(ApiResponse::success(view)))
}

async fn create_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CreateRouteResult>>, AppError> {
    let controller = BoardController::new(state);
    let response = controller.create_route(id).await?;
    Ok(Json(response))
}

async fn unique_clients(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RoutingClient>>>, AppError> {
    let controller = BoardController::new(state);
    let clients = controller.unique_clients(id).await?;
    Ok(Json(ApiResponse::success(clients)))
}

async fn drag_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragStartRequest>,
) -> Result<Json<ApiResponse<DragPayload>>, AppError> {
    let controller = BoardController::new(state);
    let payload = controller.drag_start(id, request).await?;
    Ok(Json(ApiResponse::success(payload)))
}

async fn drag_end(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DragEndRequest>,
) -> Result<Json<ApiResponse<DragEndResult>>, AppError> {
    let controller = BoardController::new(state);
    let result = controller.drag_end(id, request).await?;
    Ok(Json(ApiResponse::success(result)))
}
