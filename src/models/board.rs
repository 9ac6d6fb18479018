//! Contenedores del tablero y carga útil de arrastre

use serde::{Deserialize, Serialize};

use super::route::{RouteId, RoutingClient};

/// Zona donde se puede soltar una tarjeta de cliente.
///
/// `Placeholder` es el tablero vacío: nunca representa una ruta persistida,
/// solo dispara la creación de una.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContainerId {
    Pool,
    #[serde(rename_all = "camelCase")]
    Route { route_id: RouteId },
    Placeholder,
}

impl ContainerId {
    pub fn route(route_id: impl Into<RouteId>) -> Self {
        ContainerId::Route {
            route_id: route_id.into(),
        }
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerId::Pool => write!(f, "pool"),
            ContainerId::Route { route_id } => write!(f, "route:{}", route_id),
            ContainerId::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Descriptor transitorio de un arrastre en curso
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub client: RoutingClient,
    pub origin: ContainerId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_container_wire_format() {
        assert_eq!(serde_json::to_value(ContainerId::Pool).unwrap(), json!({"kind": "pool"}));
        assert_eq!(
            serde_json::to_value(ContainerId::route("R7")).unwrap(),
            json!({"kind": "route", "routeId": "R7"})
        );

        let parsed: ContainerId = serde_json::from_value(json!({"kind": "placeholder"})).unwrap();
        assert_eq!(parsed, ContainerId::Placeholder);
    }

    #[test]
    fn test_route_container_requires_id() {
        let parsed = serde_json::from_value::<ContainerId>(json!({"kind": "route"}));
        assert!(parsed.is_err());
    }
}
