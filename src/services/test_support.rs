//! Gateway en memoria para las pruebas de los servicios y de la API HTTP.
//! Disponible fuera del crate con la feature `test-support`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::models::{Collector, CreateRouteResponse, MutationResponse, Route, RoutingClient};
use crate::services::gateway::DataGateway;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    ListCollectors,
    ListRoutes(String),
    ListUnassigned,
    CreateRoute(String),
    Assign {
        client_id: String,
        collector_id: String,
        route_id: String,
    },
    Unassign(String),
}

impl GatewayCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GatewayCall::CreateRoute(_) | GatewayCall::Assign { .. } | GatewayCall::Unassign(_)
        )
    }
}

/// Simula el servidor: aplica las mutaciones sobre su propio estado y
/// registra cada llamada.
#[derive(Default)]
pub struct FakeGateway {
    pub collectors: Vec<Collector>,
    pub routes: Mutex<Vec<Route>>,
    pub pool: Mutex<Vec<RoutingClient>>,
    pub calls: Mutex<Vec<GatewayCall>>,
    create_route_override: Mutex<Option<CreateRouteResponse>>,
    pub fail_fetch: AtomicBool,
    pub fail_assign: AtomicBool,
    /// `crearRuta` falla a nivel de transporte
    pub fail_create: AtomicBool,
    next_route: AtomicUsize,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn client(id: &str, name: &str) -> RoutingClient {
    RoutingClient {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("Calle {}", id),
        municipality: "Guadalajara".to_string(),
    }
}

pub fn route(id: &str, collector_id: &str, clients: Vec<RoutingClient>) -> Route {
    Route {
        id: id.to_string(),
        collector_id: collector_id.to_string(),
        name: Some(format!("Ruta {}", id)),
        description: None,
        color: None,
        clients,
    }
}

impl FakeGateway {
    pub fn new(routes: Vec<Route>, pool: Vec<RoutingClient>) -> Self {
        Self {
            collectors: vec![
                Collector {
                    id: "X".to_string(),
                    name: "Ximena".to_string(),
                },
                Collector {
                    id: "Y".to_string(),
                    name: "Yahir".to_string(),
                },
            ],
            routes: Mutex::new(routes),
            pool: Mutex::new(pool),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        locked(&self.calls).clone()
    }

    pub fn set_create_route_response(&self, response: CreateRouteResponse) {
        *locked(&self.create_route_override) = Some(response);
    }

    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(GatewayCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        locked(&self.calls).clear();
    }

    fn record(&self, call: GatewayCall) {
        locked(&self.calls).push(call);
    }

    fn check_fetch(&self) -> AppResult<()> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("gateway unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataGateway for FakeGateway {
    async fn list_collectors(&self) -> AppResult<Vec<Collector>> {
        self.record(GatewayCall::ListCollectors);
        self.check_fetch()?;
        Ok(self.collectors.clone())
    }

    async fn list_routes_for_collector(&self, collector_id: &str) -> AppResult<Vec<Route>> {
        self.record(GatewayCall::ListRoutes(collector_id.to_string()));
        self.check_fetch()?;
        Ok(locked(&self.routes)
            .iter()
            .filter(|r| r.collector_id == collector_id)
            .cloned()
            .collect())
    }

    async fn list_unassigned_clients(&self) -> AppResult<Vec<RoutingClient>> {
        self.record(GatewayCall::ListUnassigned);
        self.check_fetch()?;
        Ok(locked(&self.pool).clone())
    }

    async fn create_route(&self, collector_id: &str) -> AppResult<CreateRouteResponse> {
        self.record(GatewayCall::CreateRoute(collector_id.to_string()));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("crearRuta: connection reset".to_string()));
        }
        if let Some(response) = locked(&self.create_route_override).clone() {
            return Ok(response);
        }

        let n = self.next_route.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("NEW{}", n);
        locked(&self.routes).push(route(&id, collector_id, Vec::new()));
        Ok(CreateRouteResponse {
            success: true,
            message: Some("Ruta creada".to_string()),
            route_id: Some(id),
        })
    }

    async fn assign_client_to_route(
        &self,
        client_id: &str,
        collector_id: &str,
        route_id: &str,
    ) -> AppResult<MutationResponse> {
        self.record(GatewayCall::Assign {
            client_id: client_id.to_string(),
            collector_id: collector_id.to_string(),
            route_id: route_id.to_string(),
        });
        if self.fail_assign.load(Ordering::SeqCst) {
            return Ok(MutationResponse::failed("asignación rechazada"));
        }

        let mut pool = locked(&self.pool);
        let Some(index) = pool.iter().position(|c| c.id == client_id) else {
            return Ok(MutationResponse::failed("cliente no disponible"));
        };
        let mut routes = locked(&self.routes);
        let Some(target) = routes.iter_mut().find(|r| r.id == route_id) else {
            return Ok(MutationResponse::failed("ruta inexistente"));
        };
        target.clients.push(pool.remove(index));
        Ok(MutationResponse::ok())
    }

    async fn unassign_client_from_route(&self, client_id: &str) -> AppResult<MutationResponse> {
        self.record(GatewayCall::Unassign(client_id.to_string()));

        let mut routes = locked(&self.routes);
        for route in routes.iter_mut() {
            if let Some(index) = route.clients.iter().position(|c| c.id == client_id) {
                let removed = route.clients.remove(index);
                locked(&self.pool).push(removed);
                return Ok(MutationResponse::ok());
            }
        }
        Ok(MutationResponse::failed("cliente sin ruta"))
    }
}
