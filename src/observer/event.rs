//! Events a browser engine reports for one session.
//!
//! [`EngineEvent`] is the closed set of notifications a
//! [`SessionObserver`](crate::observer::SessionObserver) translates into store actions.
//! Events that expect an answer carry a `oneshot` responder; dropping it unanswered
//! is how a request is rejected.

use crate::observer::media::MediaHandle;
use crate::state::{
    AppPermissionRequest, Download, FindResult, HitResult, Icon, LoadDecision, LoadRequestFlags,
    PermissionDecision, PermissionRequest, PromptRequest, PromptResponse, RecordingDevice, RequestId,
    Thumbnail, Tracker, WebAppManifest, WindowRequest,
};
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum EngineEvent {
    // ****************************************
    // ** Navigation / loading
    /// The session committed a new location
    LocationChange { url: String },
    /// The engine asks whether it may load `url`
    LoadRequest {
        url: String,
        flags: LoadRequestFlags,
        responder: oneshot::Sender<LoadDecision>,
    },
    /// Document title changed
    TitleChange { title: String },
    /// Load progress in percent
    ProgressChange { progress: u8 },
    /// Loading started (`true`) or stopped (`false`)
    LoadingStateChange { loading: bool },
    /// History navigation availability changed. `None` leaves the value untouched
    NavigationStateChange {
        can_go_back: Option<bool>,
        can_go_forward: Option<bool>,
    },
    /// Connection security changed
    SecurityChange {
        secure: bool,
        host: Option<String>,
        issuer: Option<String>,
    },

    // ****************************************
    // ** Tracking protection
    /// A tracker was blocked
    TrackerBlocked(Tracker),
    /// A tracker was loaded
    TrackerLoaded(Tracker),
    /// Tracker blocking was switched on or off for the session
    TrackerBlockingEnabledChange { enabled: bool },
    /// The session's site was added to or removed from the exclusion list
    ExcludedOnTrackingProtectionChange { excluded: bool },

    // ****************************************
    // ** Page content
    /// The user long-pressed an element
    LongPress(HitResult),
    /// A new find-in-page search was started
    Find { text: String },
    /// Find-in-page produced a result
    FindResult(FindResult),
    /// The page wants to download a resource
    ExternalResource(Download),
    /// Desktop mode switched
    DesktopModeChange { enabled: bool },
    /// Full screen switched
    FullScreenChange { enabled: bool },
    /// New page thumbnail, or `None` when it is no longer valid
    ThumbnailChange(Option<Thumbnail>),
    /// Page icon loaded
    IconChange(Icon),
    /// The page's web app manifest was parsed
    WebAppManifestLoaded(WebAppManifest),
    /// The content process crashed
    Crash,
    /// Camera/microphone usage changed
    RecordingDevicesChange(Vec<RecordingDevice>),

    // ****************************************
    // ** Requests
    /// Page asks for content permissions (camera, location, ...)
    ContentPermissionRequest {
        request: PermissionRequest,
        responder: oneshot::Sender<PermissionDecision>,
    },
    /// The page withdrew a content permission request
    ContentPermissionRequestCancelled { request_id: RequestId },
    /// Engine asks for app level permissions
    AppPermissionRequest {
        request: AppPermissionRequest,
        responder: oneshot::Sender<PermissionDecision>,
    },
    /// Page shows a prompt (alert, confirm, text input, popup)
    PromptRequest {
        request: PromptRequest,
        responder: oneshot::Sender<PromptResponse>,
    },
    /// Page wants to open or close a window
    WindowRequest(WindowRequest),

    // ****************************************
    // ** Media
    /// A media element appeared
    MediaAdded(Arc<dyn MediaHandle>),
    /// A media element went away
    MediaRemoved(Arc<dyn MediaHandle>),
}

impl EngineEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::LocationChange { .. } => "LocationChange",
            EngineEvent::LoadRequest { .. } => "LoadRequest",
            EngineEvent::TitleChange { .. } => "TitleChange",
            EngineEvent::ProgressChange { .. } => "ProgressChange",
            EngineEvent::LoadingStateChange { .. } => "LoadingStateChange",
            EngineEvent::NavigationStateChange { .. } => "NavigationStateChange",
            EngineEvent::SecurityChange { .. } => "SecurityChange",
            EngineEvent::TrackerBlocked(_) => "TrackerBlocked",
            EngineEvent::TrackerLoaded(_) => "TrackerLoaded",
            EngineEvent::TrackerBlockingEnabledChange { .. } => "TrackerBlockingEnabledChange",
            EngineEvent::ExcludedOnTrackingProtectionChange { .. } => "ExcludedOnTrackingProtectionChange",
            EngineEvent::LongPress(_) => "LongPress",
            EngineEvent::Find { .. } => "Find",
            EngineEvent::FindResult(_) => "FindResult",
            EngineEvent::ExternalResource(_) => "ExternalResource",
            EngineEvent::DesktopModeChange { .. } => "DesktopModeChange",
            EngineEvent::FullScreenChange { .. } => "FullScreenChange",
            EngineEvent::ThumbnailChange(_) => "ThumbnailChange",
            EngineEvent::IconChange(_) => "IconChange",
            EngineEvent::WebAppManifestLoaded(_) => "WebAppManifestLoaded",
            EngineEvent::Crash => "Crash",
            EngineEvent::RecordingDevicesChange(_) => "RecordingDevicesChange",
            EngineEvent::ContentPermissionRequest { .. } => "ContentPermissionRequest",
            EngineEvent::ContentPermissionRequestCancelled { .. } => "ContentPermissionRequestCancelled",
            EngineEvent::AppPermissionRequest { .. } => "AppPermissionRequest",
            EngineEvent::PromptRequest { .. } => "PromptRequest",
            EngineEvent::WindowRequest(_) => "WindowRequest",
            EngineEvent::MediaAdded(_) => "MediaAdded",
            EngineEvent::MediaRemoved(_) => "MediaRemoved",
        }
    }

    /// Whether the event carries a responder the engine is waiting on.
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            EngineEvent::LoadRequest { .. }
                | EngineEvent::ContentPermissionRequest { .. }
                | EngineEvent::AppPermissionRequest { .. }
                | EngineEvent::PromptRequest { .. }
        )
    }
}
