//! Cliente HTTP para el API GraphQL de gestión
//!
//! Implementa `DataGateway` enviando `{query, variables}` por POST. Los
//! campos en español del esquema se renombran con alias de GraphQL para que
//! las respuestas deserialicen directo a los modelos del tablero.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::environment::EnvironmentConfig;
use crate::models::{Collector, CreateRouteResponse, MutationResponse, Route, RoutingClient};
use crate::services::gateway::DataGateway;
use crate::utils::errors::{external_api_error, AppError, AppResult};

const CLIENT_FIELDS: &str = "id name: nombre address: direccion municipality: municipio";

const COLLECTORS_QUERY: &str = "query Cobradores { collectors: cobradores { id name: nombre } }";

const UNASSIGNED_QUERY: &str = "query ClientesSinRuta { clients: clientesSinRuta { __CLIENT__ } }";

const ROUTES_QUERY: &str = "query RutasPorCobrador($cobradorId: ID!) { \
    routes: rutasPorCobrador(cobradorId: $cobradorId) { \
    id collectorId: cobradorId name: nombre description: descripcion color \
    clients: clientes { __CLIENT__ } } }";

const CREATE_ROUTE_MUTATION: &str = "mutation CrearRuta($cobradorId: ID!) { \
    result: crearRuta(cobradorId: $cobradorId) { success message routeId: rutaId } }";

const ASSIGN_MUTATION: &str = "mutation AsignarClienteARuta($clienteId: ID!, $cobradorId: ID!, $rutaId: ID!) { \
    result: asignarClienteARuta(clienteId: $clienteId, cobradorId: $cobradorId, rutaId: $rutaId) { success message } }";

const UNASSIGN_MUTATION: &str = "mutation DesasignarClienteDeRuta($clienteId: ID!) { \
    result: desasignarClienteDeRuta(clienteId: $clienteId) { success message } }";

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CollectorsData {
    collectors: Vec<Collector>,
}

#[derive(Debug, Deserialize)]
struct RoutesData {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct ClientsData {
    clients: Vec<RoutingClient>,
}

#[derive(Debug, Deserialize)]
struct ResultData<T> {
    result: T,
}

/// Gateway de datos sobre GraphQL
pub struct GraphqlGateway {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphqlGateway {
    /// Crear cliente con timeout por petición
    pub fn new(endpoint: String, token: Option<String>, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        Self::new(
            config.graphql_url.clone(),
            config.graphql_token.clone(),
            config.gateway_timeout_secs,
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> AppResult<T> {
        let query = query.replace("__CLIENT__", CLIENT_FIELDS);
        log::debug!("📡 GraphQL {} -> {}", operation, self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&GraphqlRequest {
                query: &query,
                variables,
            });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| external_api_error(operation, format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("❌ GraphQL {} respondió HTTP {}", operation, status);
            return Err(external_api_error(operation, format!("HTTP {}", status)));
        }

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| external_api_error(operation, format!("invalid response: {}", e)))?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            log::error!("❌ GraphQL {} devolvió errores: {:?}", operation, messages);
            return Err(external_api_error(operation, messages.join("; ")));
        }

        body.data
            .ok_or_else(|| external_api_error(operation, "response without data"))
    }
}

#[async_trait]
impl DataGateway for GraphqlGateway {
    async fn list_collectors(&self) -> AppResult<Vec<Collector>> {
        let data: CollectorsData = self.execute("cobradores", COLLECTORS_QUERY, json!({})).await?;
        Ok(data.collectors)
    }

    async fn list_routes_for_collector(&self, collector_id: &str) -> AppResult<Vec<Route>> {
        let data: RoutesData = self
            .execute(
                "rutasPorCobrador",
                ROUTES_QUERY,
                json!({ "cobradorId": collector_id }),
            )
            .await?;
        Ok(data.routes)
    }

    async fn list_unassigned_clients(&self) -> AppResult<Vec<RoutingClient>> {
        let data: ClientsData = self
            .execute("clientesSinRuta", UNASSIGNED_QUERY, json!({}))
            .await?;
        Ok(data.clients)
    }

    async fn create_route(&self, collector_id: &str) -> AppResult<CreateRouteResponse> {
        let data: ResultData<CreateRouteResponse> = self
            .execute(
                "crearRuta",
                CREATE_ROUTE_MUTATION,
                json!({ "cobradorId": collector_id }),
            )
            .await?;
        log::info!(
            "🆕 crearRuta({}) -> success={} routeId={:?}",
            collector_id,
            data.result.success,
            data.result.route_id
        );
        Ok(data.result)
    }

    async fn assign_client_to_route(
        &self,
        client_id: &str,
        collector_id: &str,
        route_id: &str,
    ) -> AppResult<MutationResponse> {
        let data: ResultData<MutationResponse> = self
            .execute(
                "asignarClienteARuta",
                ASSIGN_MUTATION,
                json!({
                    "clienteId": client_id,
                    "cobradorId": collector_id,
                    "rutaId": route_id,
                }),
            )
            .await?;
        Ok(data.result)
    }

    async fn unassign_client_from_route(&self, client_id: &str) -> AppResult<MutationResponse> {
        let data: ResultData<MutationResponse> = self
            .execute(
                "desasignarClienteDeRuta",
                UNASSIGN_MUTATION,
                json!({ "clienteId": client_id }),
            )
            .await?;
        Ok(data.result)
    }
}
