use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Collector, ContainerId, RouteId};
use crate::services::{BoardView, MoveOutcome};

// Envoltorio estándar de respuestas
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

// Request para seleccionar cobrador
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectCollectorRequest {
    #[validate(length(min = 1, max = 64))]
    pub collector_id: String,
}

// Request para el filtro de búsqueda
#[derive(Debug, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 200))]
    #[serde(default)]
    pub text: String,
}

// Inicio de arrastre
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DragStartRequest {
    #[validate(length(min = 1, max = 64))]
    pub client_id: String,
    pub origin: ContainerId,
}

// Fin de arrastre; sin destino = soltado fuera de cualquier contenedor
#[derive(Debug, Default, Deserialize)]
pub struct DragEndRequest {
    #[serde(default)]
    pub destination: Option<ContainerId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenBoardResponse {
    pub session_id: Uuid,
    pub collectors: Vec<Collector>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteResult {
    pub route_id: RouteId,
    pub board: BoardView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEndResult {
    pub outcome: MoveOutcome,
    pub board: BoardView,
}
