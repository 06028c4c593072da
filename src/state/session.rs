use crate::state::content::ContentState;
use crate::state::media::MediaElement;
use crate::state::tracking::TrackingProtectionState;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// A unique identifier for a browser session (tab).
///
/// Internally a `SessionId` wraps a [`Uuid`]. It is `Copy`, hashable and ordered so it
/// can be used freely as a map key. Treat it as an opaque handle: the representation
/// may change without notice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique `SessionId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a single session. The `id` never changes for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// ID of the session
    pub id: SessionId,
    /// Page content, navigation, security and pending requests
    pub content: ContentState,
    /// Tracking protection settings and observed trackers
    pub tracking_protection: TrackingProtectionState,
    /// Active media elements, in insertion order
    pub media: Vec<MediaElement>,
    /// Private sessions are never persisted by collaborators
    pub private: bool,
}

impl SessionState {
    /// Creates a new session with a fresh id pointing at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_id(SessionId::new(), url)
    }

    pub fn with_id(id: SessionId, url: impl Into<String>) -> Self {
        Self {
            id,
            content: ContentState::new(url),
            tracking_protection: TrackingProtectionState::default(),
            media: Vec::new(),
            private: false,
        }
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_and_display_as_uuid() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a.to_string()).is_ok());
    }

    #[test]
    fn new_session_starts_clean() {
        let session = SessionState::new("https://gosub.io").private(true);
        assert_eq!(session.content.url, "https://gosub.io");
        assert!(session.content.title.is_empty());
        assert!(!session.content.loading);
        assert!(session.media.is_empty());
        assert!(session.private);
    }
}
