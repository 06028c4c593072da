//! Browser state tree.
//!
//! This module defines the immutable snapshot of everything the browser core knows
//! about its sessions. A [`BrowserState`] is produced by the reducers in
//! [`crate::reducer`] and owned by a [`Store`](crate::store::Store); it is never
//! mutated in place. Every committed version is a fresh value that observers can keep
//! around for as long as they like. Sessions are held behind an `Arc`, so versions share
//! every session an action did not touch.
//!
//! # Layout
//!
//! - [`BrowserState`]: the root, an ordered list of sessions plus the selected one.
//! - [`SessionState`]: one browsing context (tab), identified by a [`SessionId`].
//! - [`ContentState`]: what the page shows: url, title, icon, progress, security,
//!   find results, recording devices and the one-shot consumable requests.
//! - [`TrackingProtectionState`]: tracker blocking settings and the trackers seen
//!   since the last load started.
//! - [`MediaElement`]: active media handles reported by the engine.
//!
//! # Consumables
//!
//! Some fields model a request/response handshake with the UI (permission prompts,
//! load requests, long-press hit results, ...). They hold at most one request,
//! each carrying a [`RequestId`]. The request is "consumed" by dispatching a
//! [`ContentAction::Consume`](crate::action::ContentAction::Consume), after which the
//! slot reads empty until the engine produces a new request.

pub mod content;
pub mod media;
pub mod request;
pub mod session;
pub mod tracking;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use content::{
    ContentState, FindResult, Icon, RecordingDevice, RecordingDeviceKind, RecordingStatus, SecurityInfo,
    Thumbnail, WebAppManifest,
};
pub use media::{MediaElement, MediaId, MediaPlaybackState};
pub use request::{
    AppPermissionRequest, ConsumableKind, Download, HitResult, HitResultKind, LoadDecision, LoadRequest,
    LoadRequestFlags, Permission, PermissionDecision, PermissionRequest, PromptKind, PromptRequest,
    PromptResponse, RequestId, WindowRequest, WindowRequestKind,
};
pub use session::{SessionId, SessionState};
pub use tracking::{Tracker, TrackingCategory, TrackingProtectionState};

/// Root of the state tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserState {
    /// All open sessions, in tab order
    pub sessions: Vec<Arc<SessionState>>,
    /// Currently selected session (if any)
    pub selected_session_id: Option<SessionId>,
}

impl BrowserState {
    pub fn new(sessions: Vec<SessionState>, selected_session_id: Option<SessionId>) -> Self {
        Self {
            sessions: sessions.into_iter().map(Arc::new).collect(),
            selected_session_id,
        }
    }

    /// Find a session by id.
    pub fn find_session(&self, session_id: SessionId) -> Option<&SessionState> {
        self.sessions.iter().find(|s| s.id == session_id).map(|s| s.as_ref())
    }

    /// Returns the currently selected session, if any.
    pub fn selected_session(&self) -> Option<&SessionState> {
        self.selected_session_id.and_then(|id| self.find_session(id))
    }

    /// Equality that only compares sessions by value when they are not shared.
    pub fn same_as(&self, other: &BrowserState) -> bool {
        self.selected_session_id == other.selected_session_id
            && self.sessions.len() == other.sessions.len()
            && self
                .sessions
                .iter()
                .zip(&other.sessions)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }

    pub(crate) fn session_index(&self, session_id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_and_selected_session() {
        let a = SessionState::new("https://a.example");
        let b = SessionState::new("https://b.example");
        let state = BrowserState::new(vec![a.clone(), b.clone()], Some(b.id));

        assert_eq!(state.find_session(a.id).map(|s| s.content.url.as_str()), Some("https://a.example"));
        assert_eq!(state.selected_session().map(|s| s.id), Some(b.id));
        assert!(state.find_session(SessionId::new()).is_none());
    }

    #[test]
    fn same_as_matches_equality() {
        let a = SessionState::new("https://a.example");
        let state = BrowserState::new(vec![a.clone()], Some(a.id));

        let mut copy = state.clone();
        assert!(state.same_as(&copy));

        Arc::make_mut(&mut copy.sessions[0]).content.title = "A".into();
        assert!(!state.same_as(&copy));

        // Equal but not shared
        let rebuilt = BrowserState::new(vec![a.clone()], Some(a.id));
        assert!(state.same_as(&rebuilt));
        assert!(!state.same_as(&BrowserState::new(vec![a], None)));
    }

    #[test]
    fn selected_session_dangling_id_is_none() {
        let state = BrowserState::new(vec![], Some(SessionId::new()));
        assert!(state.selected_session().is_none());
    }
}
