//! One-shot requests that the engine hands to the UI.
//!
//! Every request carries a [`RequestId`] which correlates the value stored in the state
//! tree with the responder kept by the store's
//! [`RequestRegistry`](crate::store::RequestRegistry). The state only ever holds plain
//! data; answering a request goes through [`Store::resolve`](crate::store::Store::resolve).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Correlation id for a consumable request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names one of the consumable slots in [`ContentState`](crate::state::ContentState).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumableKind {
    LoadRequest,
    HitResult,
    Download,
    ContentPermissionRequest,
    AppPermissionRequest,
    PromptRequest,
    WindowRequest,
}

bitflags! {
    /// What triggered a load request.
    #[derive(Default, Serialize, Deserialize)]
    pub struct LoadRequestFlags: u8 {
        /// Load was triggered by an HTTP or meta refresh redirect
        const REDIRECT    = 0b0001;
        /// Load was triggered by page content (link click, script)
        const WEB_CONTENT = 0b0010;
    }
}

/// A pending navigation the UI may intercept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub id: RequestId,
    pub url: String,
    pub flags: LoadRequestFlags,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>, flags: LoadRequestFlags) -> Self {
        Self {
            id: RequestId::new(),
            url: url.into(),
            flags,
        }
    }

    /// Whether the navigation was not typed by the user.
    pub fn is_content_or_redirect(&self) -> bool {
        self.flags.intersects(LoadRequestFlags::REDIRECT | LoadRequestFlags::WEB_CONTENT)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDecision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitResultKind {
    Unknown,
    Image,
    ImageLink { href: String },
    Link { href: String },
    Video,
    Audio,
    Phone,
    Email,
    Geo,
}

/// Result of a long press on page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    pub id: RequestId,
    pub kind: HitResultKind,
    /// The pressed resource (image src, link target, phone number, ...)
    pub src: String,
}

impl HitResult {
    pub fn new(kind: HitResultKind, src: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            kind,
            src: src.into(),
        }
    }
}

/// An external resource the engine wants to hand over to a download manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    pub id: RequestId,
    pub url: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub user_agent: Option<String>,
}

impl Download {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            url: url.into(),
            file_name: None,
            content_type: None,
            content_length: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Camera,
    Microphone,
    Location,
    Notification,
    AutoplayAudible,
    AutoplayInaudible,
    PersistentStorage,
    MediaKeySystemAccess,
    Other(String),
}

/// A web content permission request (camera, location, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub id: RequestId,
    /// Origin asking for the permissions
    pub uri: String,
    pub permissions: Vec<Permission>,
}

impl PermissionRequest {
    pub fn new(uri: impl Into<String>, permissions: Vec<Permission>) -> Self {
        Self {
            id: RequestId::new(),
            uri: uri.into(),
            permissions,
        }
    }
}

/// The engine itself needs operating system permissions (e.g. before it can open the
/// camera on behalf of a page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermissionRequest {
    pub id: RequestId,
    pub permissions: Vec<String>,
}

impl AppPermissionRequest {
    pub fn new(permissions: Vec<String>) -> Self {
        Self {
            id: RequestId::new(),
            permissions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionDecision {
    Grant(Vec<Permission>),
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptKind {
    Alert { title: String, message: String },
    Confirm { title: String, message: String },
    Text { title: String, message: String, default_value: String },
    Popup { target_uri: String },
}

/// A dialog the page wants to show (alert, confirm, prompt, popup blocker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub id: RequestId,
    pub kind: PromptKind,
}

impl PromptRequest {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            id: RequestId::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptResponse {
    /// Confirmed, with the entered text for text prompts
    Confirm(Option<String>),
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowRequestKind {
    Open { url: String },
    Close,
}

/// The page asked to open or close a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRequest {
    pub id: RequestId,
    pub kind: WindowRequestKind,
}

impl WindowRequest {
    pub fn new(kind: WindowRequestKind) -> Self {
        Self {
            id: RequestId::new(),
            kind,
        }
    }
}
