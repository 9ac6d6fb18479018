//! Modelo de Route
//!
//! Rutas de cobro y la vista de cliente que contienen. Los campos siguen
//! la forma que devuelve el gateway GraphQL.

use serde::{Deserialize, Serialize};

use super::collector::CollectorId;

pub type RouteId = String;
pub type ClientId = String;

/// Cliente en la vista de ruteo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingClient {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub municipality: String,
}

impl RoutingClient {
    /// Coincidencia por subcadena sobre nombre y dirección.
    /// `needle` ya debe venir en minúsculas.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.address.to_lowercase().contains(needle)
    }
}

/// Ruta de un cobrador con sus clientes en orden de visita
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub collector_id: CollectorId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub clients: Vec<RoutingClient>,
}

impl Route {
    pub fn find_client(&self, client_id: &str) -> Option<&RoutingClient> {
        self.clients.iter().find(|c| c.id == client_id)
    }

    /// Copia de la ruta con solo los clientes que pasan el filtro
    pub fn filtered(&self, needle: Option<&str>) -> Route {
        match needle {
            Some(needle) => Route {
                clients: self
                    .clients
                    .iter()
                    .filter(|c| c.matches(needle))
                    .cloned()
                    .collect(),
                ..self.clone()
            },
            None => self.clone(),
        }
    }
}

/// Respuesta de `crearRuta`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub route_id: Option<RouteId>,
}

impl CreateRouteResponse {
    /// Id de la ruta creada. Un `success` sin id cuenta como fallo.
    pub fn created_route_id(&self) -> Option<&RouteId> {
        if self.success {
            self.route_id.as_ref().filter(|id| !id.trim().is_empty())
        } else {
            None
        }
    }
}

/// Respuesta genérica de mutaciones de asignación
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
