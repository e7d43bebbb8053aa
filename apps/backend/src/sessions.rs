//! Live review sessions held by the service.

use std::collections::HashMap;
use std::sync::Arc;

use review_core::{AbortHandle, ReviewController};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One running session. The abort handle is kept outside the controller
/// lock so an abort never waits for an answer that is being saved.
#[derive(Clone)]
pub struct SessionSlot {
    pub controller: Arc<Mutex<ReviewController>>,
    pub abort: AbortHandle,
}

/// Sessions keyed by id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller and return its session id.
    pub async fn insert(&self, controller: ReviewController) -> Uuid {
        let id = Uuid::new_v4();
        let slot = SessionSlot {
            abort: controller.abort_handle(),
            controller: Arc::new(Mutex::new(controller)),
        };
        self.inner.write().await.insert(id, slot);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionSlot> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<SessionSlot> {
        self.inner.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
