use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use collector_routing::clients::GraphqlGateway;
use collector_routing::config::environment::EnvironmentConfig;
use collector_routing::routes::create_app;
use collector_routing::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🗺️ Tablero de rutas de cobradores");
    info!("================================");
    info!("📡 Gateway GraphQL: {}", config.graphql_url);

    let gateway = match GraphqlGateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("❌ Error creando cliente GraphQL: {}", e);
            return Err(anyhow::anyhow!("Error de gateway: {}", e));
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app(AppState::new(config, Arc::new(gateway)));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   GET    /api/collectors");
    info!("   POST   /api/board");
    info!("   GET    /api/board/:id");
    info!("   DELETE /api/board/:id");
    info!("   PUT    /api/board/:id/collector");
    info!("   PUT    /api/board/:id/search");
    info!("   POST   /api/board/:id/refresh");
    info!("   POST   /api/board/:id/routes");
    info!("   GET    /api/board/:id/clients");
    info!("   POST   /api/board/:id/drag/start");
    info!("   POST   /api/board/:id/drag/end");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
