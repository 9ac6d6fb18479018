//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del tablero de rutas
//! tal como los expone el gateway GraphQL.

pub mod board;
pub mod collector;
pub mod route;

pub use board::*;
pub use collector::*;
pub use route::*;
