// src/session.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::{EstimateError, Result};
use crate::wizard::EstimateWizard;

pub type SharedWizard = Arc<Mutex<EstimateWizard>>;

struct SessionSlot {
    wizard: SharedWizard,
    last_seen: Instant,
}

/// One wizard per browser session, kept in memory only.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Starts a fresh wizard, dropping sessions nobody has touched within the idle timeout.
    pub async fn create(&self) -> (Uuid, SharedWizard) {
        let id = Uuid::new_v4();
        let wizard = Arc::new(Mutex::new(EstimateWizard::new()));
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, slot| slot.last_seen.elapsed() < idle_timeout);
        if sessions.len() < before {
            log::info!("🧹 Dropped {} idle session(s)", before - sessions.len());
        }

        sessions.insert(
            id,
            SessionSlot {
                wizard: wizard.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, wizard)
    }

    pub async fn get(&self, id: &Uuid) -> Result<SharedWizard> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(id)
            .ok_or_else(|| EstimateError::SessionNotFound(id.to_string()))?;
        slot.last_seen = Instant::now();
        Ok(slot.wizard.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EstimateError::SessionNotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
