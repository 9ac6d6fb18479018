use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::services::board_service::RouteBoard;
use crate::services::gateway::DataGateway;
use crate::utils::errors::{not_found_error, AppResult};

/// Sesión de tablero de un operador
pub struct BoardSession {
    pub board: RouteBoard,
    pub last_activity: DateTime<Utc>,
}

impl BoardSession {
    pub fn new(board: RouteBoard) -> Self {
        Self {
            board,
            last_activity: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// `None` como TTL, o un vencimiento fuera de rango, = nunca expira
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl.and_then(|ttl| self.last_activity.checked_add_signed(ttl)) {
            Some(deadline) => Utc::now() > deadline,
            None => false,
        }
    }
}

/// Sesión compartida más la marca de movimiento en resolución. La marca vive
/// fuera del mutex para poder rechazar arrastres sin esperar al candado.
pub struct SessionHandle {
    pub session: Mutex<BoardSession>,
    resolving: AtomicBool,
}

impl SessionHandle {
    pub fn new(board: RouteBoard) -> Self {
        Self {
            session: Mutex::new(BoardSession::new(board)),
            resolving: AtomicBool::new(false),
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving.load(Ordering::SeqCst)
    }

    /// Marca el tablero como resolviendo; `false` si ya lo estaba
    pub fn begin_resolution(&self) -> bool {
        self.resolving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn finish_resolution(&self) {
        self.resolving.store(false, Ordering::SeqCst);
    }
}

pub type SharedSession = Arc<SessionHandle>;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub gateway: Arc<dyn DataGateway>,
    pub boards: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            config,
            gateway,
            boards: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn session_ttl(&self) -> Option<Duration> {
        Duration::try_minutes(self.config.board_session_ttl_minutes)
    }

    /// Abrir una sesión de tablero nueva
    pub async fn open_board(&self) -> (Uuid, SharedSession) {
        self.cleanup_expired_sessions().await;

        let id = Uuid::new_v4();
        let session = Arc::new(SessionHandle::new(RouteBoard::new(self.gateway.clone())));

        let mut boards = self.boards.write().await;
        boards.insert(id, session.clone());
        tracing::info!("💾 Sesión de tablero {} abierta ({} activas)", id, boards.len());
        (id, session)
    }

    /// Obtener una sesión existente
    pub async fn board(&self, id: Uuid) -> AppResult<SharedSession> {
        self.boards
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error("Board session", &id.to_string()))
    }

    /// Cerrar una sesión
    pub async fn close_board(&self, id: Uuid) -> AppResult<()> {
        match self.boards.write().await.remove(&id) {
            Some(_) => {
                tracing::info!("🗑️ Sesión de tablero {} cerrada", id);
                Ok(())
            }
            None => Err(not_found_error("Board session", &id.to_string())),
        }
    }

    /// Limpiar sesiones inactivas. Las sesiones ocupadas se conservan.
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let ttl = self.session_ttl();
        let mut boards = self.boards.write().await;
        let before = boards.len();

        boards.retain(|_, handle| {
            if handle.is_resolving() {
                return true;
            }
            match handle.session.try_lock() {
                Ok(session) => !session.is_expired(ttl),
                Err(_) => true,
            }
        });

        let removed = before - boards.len();
        if removed > 0 {
            tracing::info!("🧹 {} sesiones de tablero expiradas eliminadas", removed);
        }
        removed
    }
}
