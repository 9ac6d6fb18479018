//! Middleware del sistema
//!
//! Este módulo contiene la configuración de CORS para la UI del tablero.

pub mod cors;

pub use cors::*;
