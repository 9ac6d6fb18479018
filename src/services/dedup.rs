//! Deduplicación y filtrado de clientes del tablero
//!
//! La vista de "todos los clientes del cobrador" se arma concatenando las
//! rutas en su orden y conservando la primera aparición de cada id.

use std::collections::HashSet;

use crate::models::{Route, RoutingClient};

/// Clientes únicos de un conjunto de rutas, en orden de primera aparición.
pub fn unique_clients<'a, I>(routes: I) -> Vec<RoutingClient>
where
    I: IntoIterator<Item = &'a Route>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique = Vec::new();

    for route in routes {
        for client in &route.clients {
            if seen.insert(client.id.as_str()) {
                unique.push(client.clone());
            } else {
                tracing::warn!(
                    "⚠️ Cliente {} aparece en más de una ruta (ruta {})",
                    client.id,
                    route.id
                );
            }
        }
    }

    unique
}

/// Normaliza el texto de búsqueda. Texto vacío o solo espacios = sin filtro.
pub fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Aplica el filtro de búsqueda sin modificar la lista original
pub fn filter_clients(clients: &[RoutingClient], needle: Option<&str>) -> Vec<RoutingClient> {
    match needle {
        Some(needle) => clients.iter().filter(|c| c.matches(needle)).cloned().collect(),
        None => clients.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, name: &str) -> RoutingClient {
        RoutingClient {
            id: id.to_string(),
            name: name.to_string(),
            address: format!("Calle {}", id),
            municipality: "Guadalajara".to_string(),
        }
    }

    fn route(id: &str, clients: Vec<RoutingClient>) -> Route {
        Route {
            id: id.to_string(),
            collector_id: "X".to_string(),
            name: None,
            description: None,
            color: None,
            clients,
        }
    }

    #[test]
    fn test_unique_clients_first_route_wins() {
        let routes = vec![
            route("R1", vec![client("A", "Ana"), client("B", "Beto")]),
            route("R2", vec![client("B", "Beto"), client("C", "Carla")]),
        ];

        let ids: Vec<String> = unique_clients(&routes).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_unique_clients_empty() {
        let routes: Vec<Route> = Vec::new();
        assert!(unique_clients(&routes).is_empty());
        assert!(unique_clients(&[route("R1", vec![])]).is_empty());
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search("  LoPeZ "), Some("lopez".to_string()));
        assert_eq!(normalize_search("   "), None);
        assert_eq!(normalize_search(""), None);
    }

    #[test]
    fn test_filter_clients_leaves_source_untouched() {
        let pool = vec![client("C1", "Maria Lopez"), client("C2", "Juan Perez")];

        let filtered = filter_clients(&pool, Some("lopez"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Maria Lopez");
        assert_eq!(pool.len(), 2);

        assert_eq!(filter_clients(&pool, None).len(), 2);
    }
}
