//! Reconciliación de arrastres
//!
//! Traduce un gesto de arrastre completado en la secuencia de mutaciones
//! correspondiente y fuerza la recarga del tablero. El estado optimista de la
//! UI nunca se toma como verdad después de un movimiento.
//!
//! Estados por gesto: `Idle -> Dragging -> Resolving -> Idle`. Un arrastre
//! sin destino válido vuelve a `Idle` sin mutar nada.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::{ClientId, ContainerId, DragPayload, RouteId};
use crate::services::board_service::{create_route_strict, BoardStatus, RouteBoard};
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DragPhase {
    Idle,
    Dragging { payload: DragPayload },
    Resolving { payload: DragPayload },
}

/// Intención derivada del par (origen, destino)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveIntent {
    NoOp,
    Unassign {
        client_id: ClientId,
    },
    Assign {
        client_id: ClientId,
        route_id: RouteId,
    },
    CreateRouteThenAssign {
        client_id: ClientId,
    },
}

/// Resultado de resolver un gesto
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum MoveOutcome {
    /// Soltado sin destino válido
    Cancelled,
    /// Par de contenedores que no produce mutación
    #[serde(rename = "noop")]
    NoOp,
    #[serde(rename_all = "camelCase")]
    Applied {
        client_id: ClientId,
        destination: ContainerId,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        client_id: ClientId,
        reason: String,
    },
}

/// Tabla de transiciones. Cualquier par no listado es un no-op.
pub fn resolve_intent(payload: &DragPayload, destination: &ContainerId) -> MoveIntent {
    use ContainerId::{Placeholder, Pool, Route};

    let client_id = payload.client.id.clone();
    match (&payload.origin, destination) {
        (origin, destination) if origin == destination => MoveIntent::NoOp,
        (Route { .. }, Pool) => MoveIntent::Unassign { client_id },
        (Pool, Route { route_id }) => MoveIntent::Assign {
            client_id,
            route_id: route_id.clone(),
        },
        (Pool, Placeholder) => MoveIntent::CreateRouteThenAssign { client_id },
        (Pool, Pool)
        | (Route { .. }, Route { .. })
        | (Route { .. }, Placeholder)
        | (Placeholder, _) => MoveIntent::NoOp,
    }
}

impl RouteBoard {
    /// Inicio de arrastre: captura el cliente desde su contenedor de origen.
    pub fn start_drag(&mut self, client_id: &str, origin: ContainerId) -> AppResult<&DragPayload> {
        self.ensure_not_resolving()?;
        if self.collector_id.is_none() {
            return Err(bad_request_error("no collector selected"));
        }
        if self.status() != BoardStatus::Ready {
            return Err(AppError::Conflict("board is not loaded".to_string()));
        }

        let client = match &origin {
            ContainerId::Pool => self
                .unassigned()
                .iter()
                .find(|c| c.id == client_id)
                .cloned(),
            ContainerId::Route { route_id } => self
                .routes
                .iter()
                .find(|r| &r.id == route_id)
                .ok_or_else(|| not_found_error("Route", route_id))?
                .find_client(client_id)
                .cloned(),
            ContainerId::Placeholder => {
                return Err(bad_request_error("cannot drag from the empty board placeholder"));
            }
        };
        let client = client.ok_or_else(|| {
            AppError::BadRequest(format!("client '{}' is not in container {}", client_id, origin))
        })?;

        if let DragPhase::Dragging { payload } = &self.phase {
            warn!("⚠️ Arrastre previo de {} descartado", payload.client.id);
        }

        debug!("🖐️ Arrastre iniciado: {} desde {}", client.id, origin);
        self.phase = DragPhase::Dragging {
            payload: DragPayload { client, origin },
        };
        match &self.phase {
            DragPhase::Dragging { payload } => Ok(payload),
            _ => Err(AppError::Internal("drag payload lost".to_string())),
        }
    }

    /// Fin de arrastre. `None` significa que no hubo destino válido.
    pub async fn end_drag(&mut self, destination: Option<ContainerId>) -> AppResult<MoveOutcome> {
        let payload = match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Dragging { payload } => payload,
            DragPhase::Idle => {
                debug!("Fin de arrastre sin arrastre activo");
                return Ok(MoveOutcome::NoOp);
            }
            resolving @ DragPhase::Resolving { .. } => {
                self.phase = resolving;
                return Err(AppError::Conflict("a move is still being resolved".to_string()));
            }
        };

        let Some(destination) = destination else {
            debug!("🚫 Arrastre de {} cancelado", payload.client.id);
            self.last_outcome = Some(MoveOutcome::Cancelled);
            return Ok(MoveOutcome::Cancelled);
        };

        let intent = resolve_intent(&payload, &destination);
        if intent == MoveIntent::NoOp {
            debug!(
                "↩️ {} -> {} no requiere cambios para {}",
                payload.origin, destination, payload.client.id
            );
            self.last_outcome = Some(MoveOutcome::NoOp);
            return Ok(MoveOutcome::NoOp);
        }

        info!(
            "🔀 Resolviendo movimiento de {}: {} -> {}",
            payload.client.id, payload.origin, destination
        );
        self.phase = DragPhase::Resolving { payload };
        let outcome = self.apply(intent, destination).await;

        self.phase = DragPhase::Idle;
        if let Err(e) = self.load(true).await {
            warn!("⚠️ Recarga posterior al movimiento falló: {}", e);
        }

        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Ejecuta las mutaciones en orden; el primer fallo detiene la secuencia.
    async fn apply(&self, intent: MoveIntent, destination: ContainerId) -> MoveOutcome {
        let Some(collector_id) = self.collector_id.clone() else {
            return MoveOutcome::Failed {
                client_id: intent_client(&intent),
                reason: "no collector selected".to_string(),
            };
        };
        let gateway = self.gateway.as_ref();

        let result: Result<ClientId, (ClientId, String)> = match intent {
            MoveIntent::NoOp => return MoveOutcome::NoOp,
            MoveIntent::Unassign { client_id } => {
                match gateway.unassign_client_from_route(&client_id).await {
                    Ok(r) if r.success => Ok(client_id),
                    Ok(r) => Err((client_id, r.message.unwrap_or_else(|| "unassign rejected".to_string()))),
                    Err(e) => Err((client_id, e.to_string())),
                }
            }
            MoveIntent::Assign { client_id, route_id } => {
                assign(gateway, client_id, &collector_id, &route_id).await
            }
            MoveIntent::CreateRouteThenAssign { client_id } => {
                match create_route_strict(gateway, &collector_id).await {
                    Ok(route_id) => {
                        info!("🆕 Ruta {} creada para {}", route_id, collector_id);
                        assign(gateway, client_id, &collector_id, &route_id).await
                    }
                    Err(e) => Err((client_id, format!("route creation failed: {}", e))),
                }
            }
        };

        match result {
            Ok(client_id) => {
                info!("✅ Cliente {} movido a {}", client_id, destination);
                MoveOutcome::Applied {
                    client_id,
                    destination,
                }
            }
            Err((client_id, reason)) => {
                error!("❌ Movimiento de {} a {} falló: {}", client_id, destination, reason);
                MoveOutcome::Failed { client_id, reason }
            }
        }
    }
}

async fn assign(
    gateway: &dyn crate::services::gateway::DataGateway,
    client_id: ClientId,
    collector_id: &str,
    route_id: &str,
) -> Result<ClientId, (ClientId, String)> {
    match gateway
        .assign_client_to_route(&client_id, collector_id, route_id)
        .await
    {
        Ok(r) if r.success => Ok(client_id),
        Ok(r) => Err((client_id, r.message.unwrap_or_else(|| "assign rejected".to_string()))),
        Err(e) => Err((client_id, e.to_string())),
    }
}

fn intent_client(intent: &MoveIntent) -> ClientId {
    match intent {
        MoveIntent::NoOp => String::new(),
        MoveIntent::Unassign { client_id }
        | MoveIntent::Assign { client_id, .. }
        | MoveIntent::CreateRouteThenAssign { client_id } => client_id.clone(),
    }
}
