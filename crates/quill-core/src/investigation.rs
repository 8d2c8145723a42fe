//! Shared investigation context.
//!
//! The chat panel and the suggestion list both read and change the same
//! "current investigation" state: which agent is selected, whether an
//! investigation is running, how far it got and the latest feedback messages.
//! [`InvestigationContext`] owns that state, hands out snapshots and publishes
//! every change to subscribers.
//!
//! Starting an investigation goes through a single-slot handler registry: the
//! component that knows how to run the research registers a [`StartHandler`],
//! and any other component may call [`InvestigationContext::start_investigation`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const CHANNEL_CAPACITY: usize = 64;

/// Point-in-time copy of the investigation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestigationSnapshot {
    pub selected_agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub is_investigating: bool,
    /// 0..=100
    pub progress: u8,
    pub current_phase: String,
    pub message_feedback: Option<String>,
    pub user_message_feedback: Option<String>,
}

/// Runs an investigation once the user asks for one.
#[async_trait]
pub trait StartHandler: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;
}

/// Cloneable handle to the shared investigation state.
#[derive(Clone)]
pub struct InvestigationContext {
    state: Arc<RwLock<InvestigationSnapshot>>,
    start_handler: Arc<RwLock<Option<Arc<dyn StartHandler>>>>,
    events: broadcast::Sender<InvestigationSnapshot>,
}

impl InvestigationContext {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(InvestigationSnapshot::default())),
            start_handler: Arc::new(RwLock::new(None)),
            events,
        }
    }

    pub async fn snapshot(&self) -> InvestigationSnapshot {
        self.state.read().await.clone()
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<InvestigationSnapshot> {
        self.events.subscribe()
    }

    async fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut InvestigationSnapshot),
    {
        let snapshot = {
            let mut state = self.state.write().await;
            f(&mut *state);
            state.clone()
        };
        // No subscribers is fine
        let _ = self.events.send(snapshot);
    }

    pub async fn update_selected_agent(&self, id: Option<String>, name: Option<String>) {
        self.mutate(|s| {
            s.selected_agent_id = id;
            s.agent_name = name;
        })
        .await;
    }

    /// Record progress (clamped to 100) and the current phase label.
    pub async fn update_investigation_state(&self, progress: u8, phase: impl Into<String>) {
        let phase = phase.into();
        self.mutate(|s| {
            s.progress = progress.min(100);
            s.current_phase = phase;
        })
        .await;
    }

    pub async fn set_investigating(&self, value: bool) {
        self.mutate(|s| s.is_investigating = value).await;
    }

    pub async fn set_message_feedback(&self, value: Option<String>) {
        self.mutate(|s| s.message_feedback = value).await;
    }

    pub async fn set_user_message_feedback(&self, value: Option<String>) {
        self.mutate(|s| s.user_message_feedback = value).await;
    }

    /// Install the start handler, replacing any previous one.
    pub async fn register_start_handler(&self, handler: Arc<dyn StartHandler>) {
        *self.start_handler.write().await = Some(handler);
    }

    pub async fn clear_start_handler(&self) {
        *self.start_handler.write().await = None;
    }

    /// Run the registered start handler.
    ///
    /// Returns `false` without touching state when no handler is registered.
    /// A failing handler is logged and leaves `is_investigating` reset.
    pub async fn start_investigation(&self) -> bool {
        let handler = self.start_handler.read().await.clone();
        let Some(handler) = handler else {
            tracing::warn!("start_investigation called before a start handler was registered");
            return false;
        };

        self.set_investigating(true).await;

        if let Err(e) = handler.start().await {
            tracing::error!(error = %e, "Investigation failed to start");
            self.set_investigating(false).await;
        }

        true
    }
}

impl Default for InvestigationContext {
    fn default() -> Self {
        Self::new()
    }
}
