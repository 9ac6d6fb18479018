//! Services module
//!
//! Este módulo contiene la lógica del tablero de rutas: estado, reconciliación
//! de arrastres, deduplicación y el contrato con el gateway de datos.

pub mod board_service;
pub mod dedup;
pub mod drag_service;
pub mod gateway;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use board_service::{BoardStatus, BoardView, RouteBoard};
pub use drag_service::{resolve_intent, DragPhase, MoveIntent, MoveOutcome};
pub use gateway::DataGateway;
