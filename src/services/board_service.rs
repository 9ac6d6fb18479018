//! Estado del tablero de rutas
//!
//! `RouteBoard` guarda el cobrador activo, sus rutas y el pool global de
//! clientes sin ruta. Toda persistencia pasa por el `DataGateway`; después de
//! cualquier mutación el tablero se vuelve a cargar desde el servidor.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::{Collector, CollectorId, Route, RouteId, RoutingClient};
use crate::services::dedup::{filter_clients, normalize_search, unique_clients};
use crate::services::drag_service::{DragPhase, MoveOutcome};
use crate::services::gateway::DataGateway;
use crate::utils::errors::{bad_request_error, external_api_error, AppError, AppResult};

/// Estado de carga del tablero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoardStatus {
    /// Sin cobrador seleccionado
    Idle,
    Ready,
    /// La última carga falló; no se muestra tablero parcial
    Failed,
}

/// Modelo de render del tablero con el filtro de búsqueda aplicado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub collector_id: Option<CollectorId>,
    pub status: BoardStatus,
    pub error: Option<String>,
    pub search: String,
    pub routes: Vec<Route>,
    pub unassigned: Vec<RoutingClient>,
    pub unique_clients: Vec<RoutingClient>,
    pub phase: DragPhase,
    pub last_outcome: Option<MoveOutcome>,
}

pub struct RouteBoard {
    pub(crate) gateway: Arc<dyn DataGateway>,
    collectors: Vec<Collector>,
    pub(crate) collector_id: Option<CollectorId>,
    pub(crate) routes: Vec<Route>,
    pub(crate) unassigned: Option<Vec<RoutingClient>>,
    pub(crate) load_error: Option<String>,
    search_text: String,
    search: Option<String>,
    pub(crate) phase: DragPhase,
    pub(crate) last_outcome: Option<MoveOutcome>,
}

impl RouteBoard {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            collectors: Vec::new(),
            collector_id: None,
            routes: Vec::new(),
            unassigned: None,
            load_error: None,
            search_text: String::new(),
            search: None,
            phase: DragPhase::Idle,
            last_outcome: None,
        }
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }

    pub fn collector_id(&self) -> Option<&str> {
        self.collector_id.as_deref()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn unassigned(&self) -> &[RoutingClient] {
        self.unassigned.as_deref().unwrap_or(&[])
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    pub fn last_outcome(&self) -> Option<&MoveOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn status(&self) -> BoardStatus {
        if self.load_error.is_some() {
            BoardStatus::Failed
        } else if self.collector_id.is_none() {
            BoardStatus::Idle
        } else {
            BoardStatus::Ready
        }
    }

    /// Cargar la lista de cobradores para el selector
    pub async fn load_collectors(&mut self) -> AppResult<&[Collector]> {
        let collectors = self.gateway.list_collectors().await?;
        info!("👥 {} cobradores disponibles", collectors.len());
        self.collectors = collectors;
        Ok(&self.collectors)
    }

    /// Cambiar el cobrador activo. Descarta las rutas del cobrador anterior y
    /// carga las del nuevo; el pool solo se pide si aún no está cargado.
    pub async fn select_collector(&mut self, collector_id: &str) -> AppResult<()> {
        let collector_id = collector_id.trim();
        if collector_id.is_empty() {
            return Err(bad_request_error("collector id is required"));
        }
        self.ensure_not_resolving()?;

        if let DragPhase::Dragging { payload } = &self.phase {
            warn!("⚠️ Arrastre de {} descartado por cambio de cobrador", payload.client.id);
        }

        info!("🧭 Seleccionando cobrador {}", collector_id);
        self.collector_id = Some(collector_id.to_string());
        self.routes.clear();
        self.load_error = None;
        self.last_outcome = None;
        self.phase = DragPhase::Idle;

        let include_pool = self.unassigned.is_none();
        self.load(include_pool).await
    }

    /// Filtro de búsqueda para la vista. No modifica las listas cargadas.
    pub fn set_search_filter(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.search = normalize_search(text);
    }

    /// Reintento manual: vuelve a pedir rutas y pool
    pub async fn refresh(&mut self) -> AppResult<()> {
        if self.collector_id.is_none() {
            return Err(bad_request_error("no collector selected"));
        }
        self.ensure_not_resolving()?;
        self.load(true).await
    }

    /// Crear una ruta vacía para el cobrador activo y recargar el tablero
    pub async fn create_route(&mut self) -> AppResult<RouteId> {
        let collector_id = self
            .collector_id
            .clone()
            .ok_or_else(|| bad_request_error("no collector selected"))?;
        self.ensure_not_resolving()?;

        let created = create_route_strict(self.gateway.as_ref(), &collector_id).await;
        if let Err(e) = self.load(true).await {
            warn!("⚠️ Recarga después de crear ruta falló: {}", e);
        }

        let route_id = created?;
        info!("🆕 Ruta {} creada para cobrador {}", route_id, collector_id);
        Ok(route_id)
    }

    /// Clientes únicos de todas las rutas del cobrador activo, sin filtro
    pub fn unique_clients(&self) -> Vec<RoutingClient> {
        unique_clients(&self.routes)
    }

    /// Clientes únicos tal como se muestran: con el filtro de búsqueda
    /// aplicado y vacíos si el tablero está en error
    pub fn visible_unique_clients(&self) -> Vec<RoutingClient> {
        if self.status() == BoardStatus::Failed {
            return Vec::new();
        }
        filter_clients(&self.unique_clients(), self.search.as_deref())
    }

    pub fn view(&self) -> BoardView {
        let status = self.status();
        let needle = self.search.as_deref();

        let (routes, unassigned) = if status == BoardStatus::Failed {
            (Vec::new(), Vec::new())
        } else {
            (
                self.routes.iter().map(|r| r.filtered(needle)).collect(),
                filter_clients(self.unassigned(), needle),
            )
        };

        BoardView {
            collector_id: self.collector_id.clone(),
            status,
            error: self.load_error.clone(),
            search: self.search_text.clone(),
            routes,
            unassigned,
            unique_clients: self.visible_unique_clients(),
            phase: self.phase.clone(),
            last_outcome: self.last_outcome.clone(),
        }
    }

    pub(crate) fn ensure_not_resolving(&self) -> AppResult<()> {
        if matches!(self.phase, DragPhase::Resolving { .. }) {
            return Err(AppError::Conflict("a move is still being resolved".to_string()));
        }
        Ok(())
    }

    /// Recarga desde el servidor. Ante cualquier fallo el tablero queda en
    /// estado de error sin datos parciales.
    pub(crate) async fn load(&mut self, include_pool: bool) -> AppResult<()> {
        let Some(collector_id) = self.collector_id.clone() else {
            return Ok(());
        };

        let gateway = self.gateway.clone();
        let result = if include_pool {
            futures::try_join!(
                gateway.list_routes_for_collector(&collector_id),
                gateway.list_unassigned_clients(),
            )
            .map(|(routes, pool)| (routes, Some(pool)))
        } else {
            gateway
                .list_routes_for_collector(&collector_id)
                .await
                .map(|routes| (routes, None))
        };

        match result {
            Ok((routes, pool)) => {
                let total = routes.len();
                let routes: Vec<Route> = routes
                    .into_iter()
                    .filter(|r| r.collector_id == collector_id)
                    .collect();
                if routes.len() != total {
                    warn!(
                        "⚠️ {} rutas de otro cobrador descartadas para {}",
                        total - routes.len(),
                        collector_id
                    );
                }

                self.routes = routes;
                if let Some(pool) = pool {
                    self.unassigned = Some(pool);
                }
                self.load_error = None;
                info!(
                    "✅ Tablero de {} cargado: {} rutas, {} clientes sin ruta",
                    collector_id,
                    self.routes.len(),
                    self.unassigned().len()
                );
                Ok(())
            }
            Err(e) => {
                error!("❌ Error cargando tablero de {}: {}", collector_id, e);
                self.routes.clear();
                self.unassigned = None;
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// `crearRuta` con contrato estricto: éxito sin id de ruta es un fallo.
/// Un rechazo del servidor (`success=false`) es un conflicto con su mensaje.
pub(crate) async fn create_route_strict(
    gateway: &dyn DataGateway,
    collector_id: &str,
) -> AppResult<RouteId> {
    let response = gateway.create_route(collector_id).await.map_err(|e| {
        error!("❌ crearRuta para {} falló: {}", collector_id, e);
        e
    })?;

    if let Some(route_id) = response.created_route_id() {
        return Ok(route_id.clone());
    }

    if !response.success {
        let reason = response
            .message
            .unwrap_or_else(|| "route creation was rejected".to_string());
        warn!("⚠️ crearRuta para {} rechazada: {}", collector_id, reason);
        return Err(AppError::Conflict(reason));
    }

    error!("❌ crearRuta para {} respondió sin id de ruta", collector_id);
    Err(external_api_error("crearRuta", "route creation returned no route id"))
}
