//! Chat Dispatcher: one user send, one round trip, exactly one assistant turn.
//!
//! A dispatch runs in two steps. [`ChatDispatcher::begin`] is synchronous: it
//! rejects blank input, appends the user turn and resolves the route from the
//! settings snapshot taken at that moment. [`InFlight::settle`] performs the
//! network call and appends the assistant turn, which is either the reply or
//! [`DISPATCH_ERROR_TEXT`]. Failures never escape as errors.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{HostedChatResponse, LocalGenerateResponse, RemoteChatResponse};
use crate::core::backends::BackendKind;
use crate::core::config::data::Settings;
use crate::core::message::{ChatTurn, ConversationTimeline, DISPATCH_ERROR_TEXT, NO_RESPONSE_TEXT};
use crate::core::router::{BackendRouter, RoutedRequest, Unconfigured};
use crate::utils::auth::add_auth_headers;
use crate::utils::logging::preview;

/// Chat requests give up after this long.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

const LOG_PREVIEW_CHARS: usize = 60;

pub type SharedTimeline = Arc<Mutex<ConversationTimeline>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Sending,
    Succeeded,
    Failed,
}

/// Why a chat round trip produced no reply.
#[derive(Debug)]
pub enum DispatchFailed {
    /// A required field was blank; nothing was sent.
    Unconfigured(Unconfigured),
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
}

impl fmt::Display for DispatchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchFailed::Unconfigured(err) => write!(f, "Backend not configured: {err}"),
            DispatchFailed::Transport(err) => write!(f, "Request failed: {err}"),
            DispatchFailed::Status { status, body } => {
                write!(f, "Backend returned status {status}: {body}")
            }
            DispatchFailed::Decode(err) => write!(f, "Malformed reply body: {err}"),
        }
    }
}

impl std::error::Error for DispatchFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchFailed::Unconfigured(err) => Some(err),
            DispatchFailed::Transport(err) => Some(err),
            DispatchFailed::Status { .. } => None,
            DispatchFailed::Decode(err) => Some(err),
        }
    }
}

impl From<Unconfigured> for DispatchFailed {
    fn from(err: Unconfigured) -> Self {
        DispatchFailed::Unconfigured(err)
    }
}

impl From<reqwest::Error> for DispatchFailed {
    fn from(err: reqwest::Error) -> Self {
        DispatchFailed::Transport(err)
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone)]
pub struct Settled {
    pub state: DispatchState,
    pub turn: ChatTurn,
    /// False when the timeline was gone by the time the reply arrived.
    pub applied: bool,
}

#[derive(Clone)]
pub struct ChatDispatcher {
    client: reqwest::Client,
    router: BackendRouter,
}

impl ChatDispatcher {
    pub fn new(client: reqwest::Client, router: BackendRouter) -> Self {
        Self { client, router }
    }

    pub fn router(&self) -> &BackendRouter {
        &self.router
    }

    /// Start a dispatch. Returns `None`, touching nothing, when `text` is
    /// blank after trimming.
    pub fn begin(
        &self,
        settings: &Settings,
        timeline: &SharedTimeline,
        text: &str,
    ) -> Option<InFlight> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank chat input");
            return None;
        }

        let kind = settings.active_backend;
        let route = self
            .router
            .route_chat(kind, &settings.backends, text)
            .map_err(DispatchFailed::from);

        let user_turn = ChatTurn::user(text);
        let index = timeline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(user_turn.clone());

        match &route {
            Ok(request) => info!(backend = %kind, url = %request.url, turn = index, "Dispatching chat"),
            Err(err) => debug!(backend = %kind, error = %err, "Dispatch cannot be routed"),
        }

        Some(InFlight {
            client: self.client.clone(),
            kind,
            user_turn,
            route,
            timeline: Arc::downgrade(timeline),
        })
    }

    /// `begin` and `settle` in one call. Blank input reports `Idle`.
    pub async fn dispatch(
        &self,
        settings: &Settings,
        timeline: &SharedTimeline,
        text: &str,
    ) -> DispatchState {
        match self.begin(settings, timeline, text) {
            Some(in_flight) => in_flight.settle().await.state,
            None => DispatchState::Idle,
        }
    }
}

/// A dispatch in the `Sending` state.
pub struct InFlight {
    client: reqwest::Client,
    kind: BackendKind,
    user_turn: ChatTurn,
    route: Result<RoutedRequest, DispatchFailed>,
    timeline: Weak<Mutex<ConversationTimeline>>,
}

impl InFlight {
    pub fn state(&self) -> DispatchState {
        DispatchState::Sending
    }

    pub fn backend(&self) -> BackendKind {
        self.kind
    }

    pub fn user_turn(&self) -> &ChatTurn {
        &self.user_turn
    }

    /// The URL this dispatch targets, if it could be routed.
    pub fn target(&self) -> Option<&str> {
        self.route.as_ref().ok().map(|request| request.url.as_str())
    }

    /// Finish the round trip and append the assistant turn.
    pub async fn settle(self) -> Settled {
        let kind = self.kind;
        let outcome = match self.route {
            Ok(request) => round_trip(&self.client, request).await,
            Err(err) => Err(err),
        };

        let (state, turn) = match outcome {
            Ok(reply) => {
                debug!(backend = %kind, reply = %preview(&reply, LOG_PREVIEW_CHARS), "Chat reply received");
                (DispatchState::Succeeded, ChatTurn::assistant(reply))
            }
            Err(err) => {
                warn!(backend = %kind, error = %err, "Chat dispatch failed");
                (DispatchState::Failed, ChatTurn::assistant(DISPATCH_ERROR_TEXT))
            }
        };

        let applied = match self.timeline.upgrade() {
            Some(timeline) => {
                timeline
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .append(turn.clone());
                true
            }
            None => {
                debug!(backend = %kind, "Session gone; discarding chat result");
                false
            }
        };

        Settled {
            state,
            turn,
            applied,
        }
    }
}

async fn round_trip(
    client: &reqwest::Client,
    request: RoutedRequest,
) -> Result<String, DispatchFailed> {
    let mut http_request = client
        .post(&request.url)
        .timeout(CHAT_TIMEOUT)
        .header("Content-Type", "application/json")
        .json(&request.payload);
    if let Some(api_key) = request.api_key.as_deref() {
        http_request = add_auth_headers(http_request, request.kind, api_key);
    }

    let response = http_request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(DispatchFailed::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await?;
    let reply = decode_reply(request.kind, &body)?;
    Ok(reply
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()))
}

/// Pull the reply text out of a success body. `Ok(None)` means the body was
/// valid JSON without a reply.
pub fn decode_reply(kind: BackendKind, body: &[u8]) -> Result<Option<String>, DispatchFailed> {
    let reply = match kind {
        BackendKind::HostedApi => serde_json::from_slice::<HostedChatResponse>(body)
            .map(HostedChatResponse::reply),
        BackendKind::LocalServer => {
            serde_json::from_slice::<LocalGenerateResponse>(body).map(|parsed| parsed.response)
        }
        BackendKind::RemoteEndpoint => {
            serde_json::from_slice::<RemoteChatResponse>(body).map(|parsed| parsed.reply)
        }
    };
    reply.map_err(DispatchFailed::Decode)
}
