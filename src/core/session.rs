//! Dashboard session context.
//!
//! Everything one dashboard session mutates hangs off [`DashboardSession`]:
//! the conversation, the model catalog and the handle to the configuration
//! store. Operations take `&self`; nothing lives in module-level state.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::backends::BackendKind;
use crate::core::catalog::{fetch_models, ModelCatalog};
use crate::core::chat_dispatch::{ChatDispatcher, DispatchState, Settled, SharedTimeline};
use crate::core::config::ConfigStore;
use crate::core::message::{ChatTurn, ConversationTimeline};
use crate::core::router::BackendRouter;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    TurnAppended(ChatTurn),
    DispatchSettled {
        backend: BackendKind,
        state: DispatchState,
    },
    CatalogUpdated {
        backend: BackendKind,
        models: Vec<String>,
    },
}

type EventSender = mpsc::UnboundedSender<SessionEvent>;

pub struct DashboardSession {
    client: reqwest::Client,
    config: Arc<ConfigStore>,
    dispatcher: ChatDispatcher,
    timeline: SharedTimeline,
    catalog: Mutex<ModelCatalog>,
    events: Mutex<Option<EventSender>>,
    config_view: Mutex<Option<CancellationToken>>,
}

impl DashboardSession {
    pub fn new(client: reqwest::Client, router: BackendRouter, config: Arc<ConfigStore>) -> Self {
        Self {
            dispatcher: ChatDispatcher::new(client.clone(), router),
            client,
            config,
            timeline: Arc::new(Mutex::new(ConversationTimeline::new())),
            catalog: Mutex::new(ModelCatalog::new()),
            events: Mutex::new(None),
            config_view: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    pub fn router(&self) -> &BackendRouter {
        self.dispatcher.router()
    }

    /// Copy of the conversation so far.
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.timeline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .turns()
            .to_vec()
    }

    pub fn catalog(&self) -> ModelCatalog {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receive session events from now on. A new subscriber replaces the
    /// previous one.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    fn event_sender(&self) -> Option<EventSender> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit(sender: Option<&EventSender>, event: SessionEvent) {
        if let Some(sender) = sender {
            let _ = sender.send(event);
        }
    }

    /// Send a chat message through whichever backend is active right now.
    ///
    /// The user turn is appended before this returns. The round trip runs on
    /// its own task, and its assistant turn lands whenever it settles, so
    /// replies to rapid sends can arrive out of order. `None` for blank input.
    pub fn send(&self, text: &str) -> Option<JoinHandle<Settled>> {
        let settings = self.config.snapshot();
        let in_flight = self.dispatcher.begin(&settings, &self.timeline, text)?;

        let events = self.event_sender();
        Self::emit(
            events.as_ref(),
            SessionEvent::TurnAppended(in_flight.user_turn().clone()),
        );

        let backend = in_flight.backend();
        Some(tokio::spawn(async move {
            let settled = in_flight.settle().await;
            if settled.applied {
                Self::emit(
                    events.as_ref(),
                    SessionEvent::TurnAppended(settled.turn.clone()),
                );
            }
            Self::emit(
                events.as_ref(),
                SessionEvent::DispatchSettled {
                    backend,
                    state: settled.state,
                },
            );
            settled
        }))
    }

    /// [`send`](Self::send) and wait for the reply.
    pub async fn send_and_wait(&self, text: &str) -> Option<Settled> {
        join_settled(self.send(text)?).await
    }

    /// Mark the configuration view as current. Any earlier view is closed.
    pub fn open_config_view(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .config_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    pub fn close_config_view(&self) {
        if let Some(token) = self
            .config_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }

    /// Fetch every listing backend's catalog concurrently for `view`.
    ///
    /// Results are applied only if `view` is still open when they arrive.
    /// Returns whether they were applied.
    pub async fn refresh_catalogs(&self, view: &CancellationToken) -> bool {
        let settings = self.config.snapshot();
        let router = self.dispatcher.router();
        let fetches = BackendKind::listing_kinds().map(|kind| {
            let client = &self.client;
            let backends = &settings.backends;
            async move { (kind, fetch_models(client, router, kind, backends).await) }
        });
        let results = join_all(fetches).await;

        if view.is_cancelled() {
            debug!("Configuration view closed; discarding catalog results");
            return false;
        }

        let events = self.event_sender();
        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        for (kind, models) in results {
            catalog.replace(kind, models.clone());
            Self::emit(
                events.as_ref(),
                SessionEvent::CatalogUpdated {
                    backend: kind,
                    models,
                },
            );
        }
        true
    }
}

/// Await a dispatch task. A panicked or aborted task is logged and yields `None`.
async fn join_settled(handle: JoinHandle<Settled>) -> Option<Settled> {
    match handle.await {
        Ok(settled) => Some(settled),
        Err(err) => {
            warn!(error = %err, "Chat task ended without settling");
            None
        }
    }
}
