//! Modelo de Collector (cobrador)

use serde::{Deserialize, Serialize};

/// Identificador de cobrador tal como lo expone el gateway
pub type CollectorId = String;

/// Cobrador al que se le asignan rutas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collector {
    pub id: CollectorId,
    pub name: String,
}
