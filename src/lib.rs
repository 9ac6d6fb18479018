//! Tablero de asignación de rutas para cobradores
//!
//! Mantiene en memoria las rutas de un cobrador y el pool de clientes sin
//! ruta, traduce los arrastres de la UI a mutaciones del API GraphQL y
//! recarga siempre desde el servidor después de cada movimiento.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
