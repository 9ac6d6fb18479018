//! Gateway de datos
//!
//! Operaciones lógicas que el tablero consume del API remoto. El transporte
//! concreto vive en `clients::graphql_client`.

use async_trait::async_trait;

use crate::models::{Collector, CreateRouteResponse, MutationResponse, Route, RoutingClient};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn list_collectors(&self) -> AppResult<Vec<Collector>>;

    async fn list_routes_for_collector(&self, collector_id: &str) -> AppResult<Vec<Route>>;

    async fn list_unassigned_clients(&self) -> AppResult<Vec<RoutingClient>>;

    async fn create_route(&self, collector_id: &str) -> AppResult<CreateRouteResponse>;

    async fn assign_client_to_route(
        &self,
        client_id: &str,
        collector_id: &str,
        route_id: &str,
    ) -> AppResult<MutationResponse>;

    async fn unassign_client_from_route(&self, client_id: &str) -> AppResult<MutationResponse>;
}
