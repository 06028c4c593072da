//! Pending request responders.
//!
//! Consumable requests that need an answer (load requests, permission requests,
//! prompts) are stored in the state tree as plain data. The engine side of the
//! handshake, a `oneshot` sender, lives here keyed by [`RequestId`]. Every removal is
//! take-once: whoever takes a responder first owns the answer, everyone else sees it
//! gone. Dropping a responder without sending is observed by the engine as a rejection.
//!
//! The registry mirrors the request slots of the state: [`RequestRegistry::settle`] runs
//! for every applied action and takes out the responders whose request the action
//! removes from the state.

use crate::action::{Action, ContentAction, SessionListAction};
use crate::errors::StoreError;
use crate::state::{ConsumableKind, LoadDecision, PermissionDecision, PromptResponse, RequestId, SessionId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Engine side of a pending request.
pub enum Responder {
    Load(oneshot::Sender<LoadDecision>),
    Permission(oneshot::Sender<PermissionDecision>),
    Prompt(oneshot::Sender<PromptResponse>),
}

impl Responder {
    fn kind_name(&self) -> &'static str {
        match self {
            Responder::Load(_) => "load",
            Responder::Permission(_) => "permission",
            Responder::Prompt(_) => "prompt",
        }
    }

    fn accepts(&self, response: &RequestResponse) -> bool {
        matches!(
            (self, response),
            (Responder::Load(_), RequestResponse::Load(_))
                | (Responder::Permission(_), RequestResponse::Permission(_))
                | (Responder::Prompt(_), RequestResponse::Prompt(_))
        )
    }

    /// Sends the response. Returns `false` when the kinds don't match or the engine
    /// stopped waiting.
    pub fn respond(self, response: RequestResponse) -> bool {
        match (self, response) {
            (Responder::Load(tx), RequestResponse::Load(decision)) => tx.send(decision).is_ok(),
            (Responder::Permission(tx), RequestResponse::Permission(decision)) => tx.send(decision).is_ok(),
            (Responder::Prompt(tx), RequestResponse::Prompt(response)) => tx.send(response).is_ok(),
            _ => false,
        }
    }

    /// Explicitly rejects the request: deny for loads, reject for permissions and
    /// dismiss for prompts.
    pub fn reject(self) -> bool {
        match self {
            Responder::Load(tx) => tx.send(LoadDecision::Deny).is_ok(),
            Responder::Permission(tx) => tx.send(PermissionDecision::Reject).is_ok(),
            Responder::Prompt(tx) => tx.send(PromptResponse::Dismiss).is_ok(),
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Responder::{}", self.kind_name())
    }
}

/// Answer from the UI for a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResponse {
    Load(LoadDecision),
    Permission(PermissionDecision),
    Prompt(PromptResponse),
}

impl RequestResponse {
    fn kind_name(&self) -> &'static str {
        match self {
            RequestResponse::Load(_) => "load",
            RequestResponse::Permission(_) => "permission",
            RequestResponse::Prompt(_) => "prompt",
        }
    }
}

#[derive(Debug)]
pub struct PendingRequest {
    pub request_id: RequestId,
    pub session_id: SessionId,
    pub kind: ConsumableKind,
    pub responder: Responder,
}

#[derive(Debug, Default, Clone)]
pub struct RequestRegistry {
    pending: Arc<Mutex<HashMap<RequestId, PendingRequest>>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a responder. Returns the responder previously registered under the
    /// same id, if any.
    pub fn register(
        &self,
        request_id: RequestId,
        session_id: SessionId,
        kind: ConsumableKind,
        responder: Responder,
    ) -> Option<Responder> {
        let pending = PendingRequest { request_id, session_id, kind, responder };
        self.lock().insert(request_id, pending).map(|p| p.responder)
    }

    pub fn take(&self, request_id: RequestId) -> Option<PendingRequest> {
        self.lock().remove(&request_id)
    }

    /// Takes the responder for `request_id` only when it belongs to `session_id` and
    /// accepts `response`. A mismatched response leaves it registered.
    pub fn take_matching(
        &self,
        session_id: SessionId,
        request_id: RequestId,
        response: &RequestResponse,
    ) -> Result<PendingRequest, StoreError> {
        let mut pending = self.lock();
        let entry = pending
            .get(&request_id)
            .filter(|p| p.session_id == session_id)
            .ok_or(StoreError::RequestNotFound(request_id))?;
        if !entry.responder.accepts(response) {
            return Err(StoreError::ResponseMismatch {
                request_id,
                expected: entry.responder.kind_name(),
                got: response.kind_name(),
            });
        }
        pending.remove(&request_id).ok_or(StoreError::RequestNotFound(request_id))
    }

    /// Takes every responder registered for the given session and slot.
    pub fn take_for(&self, session_id: SessionId, kind: ConsumableKind) -> Vec<PendingRequest> {
        self.take_where(|p| p.session_id == session_id && p.kind == kind)
    }

    /// Drops every responder registered for the session. Returns how many were dropped.
    pub fn drop_session(&self, session_id: SessionId) -> usize {
        self.take_where(|p| p.session_id == session_id).len()
    }

    pub fn clear(&self) -> usize {
        self.take_where(|_| true).len()
    }

    /// Takes out the responders whose request leaves the state when `action` is applied.
    ///
    /// Removed sessions lose all their responders, a navigation rejects the pending
    /// content permission request and a consume drops the responder of the consumed
    /// request.
    pub(crate) fn settle(&self, action: &Action) {
        match action {
            Action::SessionList(SessionListAction::RemoveSession { session_id }) => {
                let dropped = self.drop_session(*session_id);
                if dropped > 0 {
                    log::debug!("dropped {dropped} pending request(s) of removed session {session_id}");
                }
            }
            Action::SessionList(SessionListAction::RemoveAllSessions) => {
                let dropped = self.clear();
                if dropped > 0 {
                    log::debug!("dropped {dropped} pending request(s), all sessions removed");
                }
            }
            Action::Content(ContentAction::UpdateUrl { session_id, .. }) => {
                for pending in self.take_for(*session_id, ConsumableKind::ContentPermissionRequest) {
                    log::debug!("session {session_id}: rejecting permission request {} on navigation", pending.request_id);
                    pending.responder.reject();
                }
            }
            Action::Content(ContentAction::Consume { session_id, kind, request_id }) => {
                let taken = self.take_where(|p| {
                    p.session_id == *session_id && p.kind == *kind && request_id.map_or(true, |id| id == p.request_id)
                });
                for pending in taken {
                    log::debug!("session {session_id}: {kind:?} {} consumed unanswered", pending.request_id);
                }
            }
            _ => {}
        }
    }

    fn take_where(&self, predicate: impl Fn(&PendingRequest) -> bool) -> Vec<PendingRequest> {
        let mut pending = self.lock();
        let ids: Vec<RequestId> = pending.values().filter(|p| predicate(p)).map(|p| p.request_id).collect();
        ids.into_iter().filter_map(|id| pending.remove(&id)).collect()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.lock().contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Permission;
    use tokio::sync::oneshot::error::TryRecvError;

    #[test]
    fn take_is_once() {
        let registry = RequestRegistry::new();
        let (tx, mut rx) = oneshot::channel();
        let id = RequestId::new();
        registry.register(id, SessionId::new(), ConsumableKind::LoadRequest, Responder::Load(tx));

        let pending = registry.take(id).unwrap();
        assert!(registry.take(id).is_none());
        assert!(pending.responder.respond(RequestResponse::Load(LoadDecision::Allow)));
        assert_eq!(rx.try_recv(), Ok(LoadDecision::Allow));
    }

    #[test]
    fn mismatched_response_keeps_responder() {
        let registry = RequestRegistry::new();
        let (tx, _rx) = oneshot::channel();
        let id = RequestId::new();
        let session = SessionId::new();
        registry.register(id, session, ConsumableKind::PromptRequest, Responder::Prompt(tx));

        let err = registry
            .take_matching(session, id, &RequestResponse::Load(LoadDecision::Allow))
            .unwrap_err();
        assert!(matches!(err, StoreError::ResponseMismatch { expected: "prompt", got: "load", .. }));
        assert!(registry.contains(id));

        let pending = registry
            .take_matching(session, id, &RequestResponse::Prompt(PromptResponse::Dismiss))
            .unwrap();
        assert_eq!(pending.kind, ConsumableKind::PromptRequest);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let registry = RequestRegistry::new();
        let id = RequestId::new();
        let err = registry
            .take_matching(SessionId::new(), id, &RequestResponse::Permission(PermissionDecision::Reject))
            .unwrap_err();
        assert!(matches!(err, StoreError::RequestNotFound(missing) if missing == id));
    }

    #[test]
    fn request_of_other_session_is_not_found() {
        let registry = RequestRegistry::new();
        let (tx, _rx) = oneshot::channel();
        let id = RequestId::new();
        registry.register(id, SessionId::new(), ConsumableKind::LoadRequest, Responder::Load(tx));

        let err = registry
            .take_matching(SessionId::new(), id, &RequestResponse::Load(LoadDecision::Allow))
            .unwrap_err();
        assert!(matches!(err, StoreError::RequestNotFound(_)));
        assert!(registry.contains(id));
    }

    #[test]
    fn drop_session_rejects_by_dropping() {
        let registry = RequestRegistry::new();
        let session = SessionId::new();
        let other = SessionId::new();
        let (tx_a, mut rx_a) = oneshot::channel::<PermissionDecision>();
        let (tx_b, mut rx_b) = oneshot::channel::<PromptResponse>();
        let (tx_c, mut rx_c) = oneshot::channel::<LoadDecision>();

        registry.register(RequestId::new(), session, ConsumableKind::ContentPermissionRequest, Responder::Permission(tx_a));
        registry.register(RequestId::new(), session, ConsumableKind::PromptRequest, Responder::Prompt(tx_b));
        registry.register(RequestId::new(), other, ConsumableKind::LoadRequest, Responder::Load(tx_c));

        assert_eq!(registry.drop_session(session), 2);
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Closed));
        assert_eq!(rx_b.try_recv(), Err(TryRecvError::Closed));
        assert_eq!(rx_c.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn take_for_filters_on_session_and_kind() {
        let registry = RequestRegistry::new();
        let session = SessionId::new();
        let (tx_a, mut rx_a) = oneshot::channel();
        let (tx_b, _rx_b) = oneshot::channel();

        registry.register(RequestId::new(), session, ConsumableKind::ContentPermissionRequest, Responder::Permission(tx_a));
        registry.register(RequestId::new(), session, ConsumableKind::AppPermissionRequest, Responder::Permission(tx_b));

        let taken = registry.take_for(session, ConsumableKind::ContentPermissionRequest);
        assert_eq!(taken.len(), 1);
        for pending in taken {
            assert!(pending.responder.reject());
        }
        assert_eq!(rx_a.try_recv(), Ok(PermissionDecision::Reject));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn navigation_rejects_only_the_content_permission_request() {
        let registry = RequestRegistry::new();
        let session = SessionId::new();
        let (perm_tx, mut perm_rx) = oneshot::channel();
        let (load_tx, mut load_rx) = oneshot::channel();
        registry.register(RequestId::new(), session, ConsumableKind::ContentPermissionRequest, Responder::Permission(perm_tx));
        registry.register(RequestId::new(), session, ConsumableKind::LoadRequest, Responder::Load(load_tx));

        registry.settle(&ContentAction::UpdateUrl { session_id: session, url: "https://b.example".into() }.into());

        assert_eq!(perm_rx.try_recv(), Ok(PermissionDecision::Reject));
        assert_eq!(load_rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn consume_drops_the_consumed_responder() {
        let registry = RequestRegistry::new();
        let session = SessionId::new();
        let stale = RequestId::new();
        let current = RequestId::new();
        let (tx, mut rx) = oneshot::channel::<PromptResponse>();
        registry.register(current, session, ConsumableKind::PromptRequest, Responder::Prompt(tx));

        let consume = |request_id| -> Action {
            ContentAction::Consume { session_id: session, kind: ConsumableKind::PromptRequest, request_id }.into()
        };
        registry.settle(&consume(Some(stale)));
        assert!(registry.contains(current));

        registry.settle(&consume(None));
        assert!(registry.is_empty());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
    }

    #[test]
    fn removing_all_sessions_clears_everything() {
        let registry = RequestRegistry::new();
        let (tx_a, mut rx_a) = oneshot::channel::<LoadDecision>();
        let (tx_b, mut rx_b) = oneshot::channel::<LoadDecision>();
        registry.register(RequestId::new(), SessionId::new(), ConsumableKind::LoadRequest, Responder::Load(tx_a));
        registry.register(RequestId::new(), SessionId::new(), ConsumableKind::LoadRequest, Responder::Load(tx_b));

        registry.settle(&SessionListAction::RemoveAllSessions.into());

        assert!(registry.is_empty());
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Closed));
        assert_eq!(rx_b.try_recv(), Err(TryRecvError::Closed));
    }

    #[test]
    fn respond_fails_once_engine_stopped_waiting() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let responder = Responder::Permission(tx);
        assert!(!responder.respond(RequestResponse::Permission(PermissionDecision::Grant(vec![Permission::Camera]))));
    }
}
