//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use crate::utils::errors::{AppError, AppResult};

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    // Gateway GraphQL
    pub graphql_url: String,
    pub graphql_token: Option<String>,
    pub gateway_timeout_secs: u64,
    // Sesiones de tablero
    pub board_session_ttl_minutes: i64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            graphql_url: "http://localhost:4000/graphql".to_string(),
            graphql_token: None,
            gateway_timeout_secs: 30,
            board_session_ttl_minutes: 120,
        }
    }
}

impl EnvironmentConfig {
    /// Construir la configuración desde variables de entorno.
    /// Las variables ausentes toman el valor por defecto.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or(defaults.cors_origins),
            graphql_url: env::var("GRAPHQL_URL").unwrap_or(defaults.graphql_url),
            graphql_token: env::var("GRAPHQL_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            gateway_timeout_secs: parse_var("GATEWAY_TIMEOUT_SECS", defaults.gateway_timeout_secs)?,
            board_session_ttl_minutes: validate_session_ttl(parse_var(
                "BOARD_SESSION_TTL_MINUTES",
                defaults.board_session_ttl_minutes,
            )?)?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} must be a valid number, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

/// TTL de sesión en minutos: positivo y como máximo 30 días
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;

fn validate_session_ttl(minutes: i64) -> AppResult<i64> {
    if minutes <= 0 || minutes > MAX_SESSION_TTL_MINUTES {
        return Err(AppError::Internal(format!(
            "BOARD_SESSION_TTL_MINUTES must be between 1 and {}, got {}",
            MAX_SESSION_TTL_MINUTES, minutes
        )));
    }
    Ok(minutes)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
