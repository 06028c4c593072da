//! Actions: the closed set of state mutations.
//!
//! Actions are plain data. They carry no behaviour, so a sequence of actions can be
//! replayed against a state and will always produce the same result. Apart from the
//! [`SessionListAction`]s, every action is scoped to a [`SessionId`]; actions for a
//! session that no longer exists are silently ignored by the reducers.
//!
//! # Main Types
//!
//! - [`Action`]: root enum handed to [`Store::dispatch`](crate::store::Store::dispatch).
//! - [`SessionListAction`]: add, remove and select sessions.
//! - [`ContentAction`]: url, title, loading, security and consumable requests.
//! - [`TrackingProtectionAction`]: tracker bookkeeping and exclusion list.
//! - [`MediaAction`]: media elements appearing, disappearing and changing state.

use crate::state::{
    AppPermissionRequest, ConsumableKind, Download, FindResult, HitResult, Icon, LoadRequest, MediaElement,
    MediaId, MediaPlaybackState, PermissionRequest, PromptRequest, RecordingDevice, RequestId, SecurityInfo,
    SessionId, SessionState, Thumbnail, Tracker, WebAppManifest, WindowRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SessionList(SessionListAction),
    Content(ContentAction),
    TrackingProtection(TrackingProtectionAction),
    Media(MediaAction),
}

impl Action {
    /// The session this action is scoped to, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Action::SessionList(SessionListAction::AddSession { session, .. }) => Some(session.id),
            Action::SessionList(SessionListAction::RemoveSession { session_id })
            | Action::SessionList(SessionListAction::SelectSession { session_id }) => Some(*session_id),
            Action::SessionList(SessionListAction::RemoveAllSessions) => None,
            Action::Content(action) => Some(action.session_id()),
            Action::TrackingProtection(action) => Some(action.session_id()),
            Action::Media(action) => Some(action.session_id()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionListAction {
    /// Append a session. Selects it when `select` is set or nothing is selected yet.
    AddSession { session: SessionState, select: bool },
    /// Remove a session; the selection moves to a neighbour
    RemoveSession { session_id: SessionId },
    /// Select an existing session
    SelectSession { session_id: SessionId },
    /// Remove every session
    RemoveAllSessions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentAction {
    // ****************************************
    // ** Navigation
    /// Location changed. Clears the title when the url differs, and the icon when the
    /// scheme or host differs. Recording devices, the content permission request and the
    /// web app manifest are always cleared.
    UpdateUrl { session_id: SessionId, url: String },
    /// Loading started or stopped. Starting a load flushes find results and trackers.
    UpdateLoadingState { session_id: SessionId, loading: bool },
    /// Progress of the current load (clamped to 100)
    UpdateProgress { session_id: SessionId, progress: u8 },
    /// Back/forward availability. `None` leaves the previous value alone.
    UpdateNavigationState {
        session_id: SessionId,
        can_go_back: Option<bool>,
        can_go_forward: Option<bool>,
    },
    UpdateSearchTerms { session_id: SessionId, search_terms: String },

    // ****************************************
    // ** Page properties
    UpdateTitle { session_id: SessionId, title: String },
    UpdateIcon { session_id: SessionId, icon: Icon },
    RemoveIcon { session_id: SessionId },
    UpdateThumbnail { session_id: SessionId, thumbnail: Thumbnail },
    RemoveThumbnail { session_id: SessionId },
    UpdateSecurityInfo { session_id: SessionId, security_info: SecurityInfo },
    UpdateWebAppManifest { session_id: SessionId, manifest: WebAppManifest },
    RemoveWebAppManifest { session_id: SessionId },

    // ****************************************
    // ** Modes and flags
    UpdateDesktopMode { session_id: SessionId, enabled: bool },
    UpdateFullScreen { session_id: SessionId, enabled: bool },
    /// The engine session crashed (or was restored when `crashed` is false)
    UpdateCrashState { session_id: SessionId, crashed: bool },
    /// Replaces the list of capture devices in use
    UpdateRecordingDevices {
        session_id: SessionId,
        devices: Vec<RecordingDevice>,
    },

    // ****************************************
    // ** Find in page
    AddFindResult { session_id: SessionId, result: FindResult },
    ClearFindResults { session_id: SessionId },

    // ****************************************
    // ** Consumables
    UpdateLoadRequest { session_id: SessionId, request: LoadRequest },
    UpdateHitResult { session_id: SessionId, hit_result: HitResult },
    UpdateDownload { session_id: SessionId, download: Download },
    UpdatePermissionsRequest {
        session_id: SessionId,
        request: PermissionRequest,
    },
    UpdateAppPermissionsRequest {
        session_id: SessionId,
        request: AppPermissionRequest,
    },
    UpdatePromptRequest { session_id: SessionId, request: PromptRequest },
    UpdateWindowRequest { session_id: SessionId, request: WindowRequest },
    /// Clears a consumable slot. With a `request_id`, only a matching request is
    /// cleared so a stale consume cannot remove a newer request.
    Consume {
        session_id: SessionId,
        kind: ConsumableKind,
        request_id: Option<RequestId>,
    },
}

impl ContentAction {
    pub fn session_id(&self) -> SessionId {
        use ContentAction::*;

        match self {
            UpdateUrl { session_id, .. }
            | UpdateLoadingState { session_id, .. }
            | UpdateProgress { session_id, .. }
            | UpdateNavigationState { session_id, .. }
            | UpdateSearchTerms { session_id, .. }
            | UpdateTitle { session_id, .. }
            | UpdateIcon { session_id, .. }
            | RemoveIcon { session_id }
            | UpdateThumbnail { session_id, .. }
            | RemoveThumbnail { session_id }
            | UpdateSecurityInfo { session_id, .. }
            | UpdateWebAppManifest { session_id, .. }
            | RemoveWebAppManifest { session_id }
            | UpdateDesktopMode { session_id, .. }
            | UpdateFullScreen { session_id, .. }
            | UpdateCrashState { session_id, .. }
            | UpdateRecordingDevices { session_id, .. }
            | AddFindResult { session_id, .. }
            | ClearFindResults { session_id }
            | UpdateLoadRequest { session_id, .. }
            | UpdateHitResult { session_id, .. }
            | UpdateDownload { session_id, .. }
            | UpdatePermissionsRequest { session_id, .. }
            | UpdateAppPermissionsRequest { session_id, .. }
            | UpdatePromptRequest { session_id, .. }
            | UpdateWindowRequest { session_id, .. }
            | Consume { session_id, .. } => *session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingProtectionAction {
    ToggleTrackingProtection { session_id: SessionId, enabled: bool },
    TrackerBlocked { session_id: SessionId, tracker: Tracker },
    TrackerLoaded { session_id: SessionId, tracker: Tracker },
    /// Adds or removes the session's site from the exclusion list
    ToggleExclusionList { session_id: SessionId, excluded: bool },
    ClearTrackers { session_id: SessionId },
}

impl TrackingProtectionAction {
    pub fn session_id(&self) -> SessionId {
        use TrackingProtectionAction::*;

        match self {
            ToggleTrackingProtection { session_id, .. }
            | TrackerBlocked { session_id, .. }
            | TrackerLoaded { session_id, .. }
            | ToggleExclusionList { session_id, .. }
            | ClearTrackers { session_id } => *session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaAction {
    AddMedia { session_id: SessionId, media: MediaElement },
    RemoveMedia { session_id: SessionId, media_id: MediaId },
    UpdateMediaState {
        session_id: SessionId,
        media_id: MediaId,
        state: MediaPlaybackState,
    },
}

impl MediaAction {
    pub fn session_id(&self) -> SessionId {
        match self {
            MediaAction::AddMedia { session_id, .. }
            | MediaAction::RemoveMedia { session_id, .. }
            | MediaAction::UpdateMediaState { session_id, .. } => *session_id,
        }
    }
}

impl From<SessionListAction> for Action {
    fn from(action: SessionListAction) -> Self {
        Action::SessionList(action)
    }
}

impl From<ContentAction> for Action {
    fn from(action: ContentAction) -> Self {
        Action::Content(action)
    }
}

impl From<TrackingProtectionAction> for Action {
    fn from(action: TrackingProtectionAction) -> Self {
        Action::TrackingProtection(action)
    }
}

impl From<MediaAction> for Action {
    fn from(action: MediaAction) -> Self {
        Action::Media(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_extracted_from_every_slice() {
        let id = SessionId::new();

        let content: Action = ContentAction::UpdateTitle {
            session_id: id,
            title: "Gosub".into(),
        }
        .into();
        let tracking: Action = TrackingProtectionAction::ClearTrackers { session_id: id }.into();
        let media: Action = MediaAction::RemoveMedia {
            session_id: id,
            media_id: MediaId::new(),
        }
        .into();
        let select: Action = SessionListAction::SelectSession { session_id: id }.into();

        for action in [content, tracking, media, select] {
            assert_eq!(action.session_id(), Some(id));
        }

        assert_eq!(Action::SessionList(SessionListAction::RemoveAllSessions).session_id(), None);
    }

    #[test]
    fn actions_are_comparable_data() {
        let id = SessionId::new();
        let a = ContentAction::UpdateProgress {
            session_id: id,
            progress: 42,
        };
        let b = a.clone();
        assert_eq!(a, b);
        assert!(format!("{a:?}").contains("UpdateProgress"));
    }
}
