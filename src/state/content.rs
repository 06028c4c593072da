use crate::state::request::{
    AppPermissionRequest, Download, HitResult, LoadRequest, PermissionRequest, PromptRequest, WindowRequest,
};
use serde::{Deserialize, Serialize};

/// Image reference for a session icon (favicon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Where the icon was loaded from, if known
    pub source: Option<String>,
    /// Encoded image bytes (png, ico, ...). Decoding is up to the UI.
    pub data: Vec<u8>,
}

/// Snapshot of the page, rendered by the engine for tab switchers and the like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels
    pub data: Vec<u8>,
}

/// Security information for the currently loaded page. Replaced as a whole on every
/// security change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub secure: bool,
    pub host: String,
    pub issuer: String,
}

impl SecurityInfo {
    /// Builds security info from engine values. Missing host or issuer become "".
    pub fn new(secure: bool, host: Option<String>, issuer: Option<String>) -> Self {
        Self {
            secure,
            host: host.unwrap_or_default(),
            issuer: issuer.unwrap_or_default(),
        }
    }
}

/// One find-in-page result as reported by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResult {
    pub active_match_ordinal: u32,
    pub number_of_matches: u32,
    pub is_done_counting: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingDeviceKind {
    Camera,
    Microphone,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordingStatus {
    Recording,
    Inactive,
}

/// A capture device (camera, microphone) in use by the page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingDevice {
    pub kind: RecordingDeviceKind,
    pub status: RecordingStatus,
}

/// Subset of a web app manifest that the browser chrome cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppManifest {
    pub name: String,
    pub start_url: String,
    pub short_name: Option<String>,
    pub scope: Option<String>,
    pub theme_color: Option<String>,
}

/// Everything about the content currently shown in a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentState {
    pub url: String,
    pub title: String,
    pub search_terms: String,
    pub icon: Option<Icon>,
    pub thumbnail: Option<Thumbnail>,

    pub loading: bool,
    /// Load progress, 0..=100
    pub progress: u8,
    pub can_go_back: bool,
    pub can_go_forward: bool,

    pub security_info: SecurityInfo,
    pub desktop_mode: bool,
    pub full_screen: bool,
    pub crashed: bool,

    pub recording_devices: Vec<RecordingDevice>,
    pub find_results: Vec<FindResult>,
    pub web_app_manifest: Option<WebAppManifest>,

    // Consumables. Each holds at most one pending request.
    pub load_request: Option<LoadRequest>,
    pub hit_result: Option<HitResult>,
    pub download: Option<Download>,
    pub content_permission_request: Option<PermissionRequest>,
    pub app_permission_request: Option<AppPermissionRequest>,
    pub prompt_request: Option<PromptRequest>,
    pub window_request: Option<WindowRequest>,
}

impl ContentState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_info_normalizes_missing_fields() {
        let info = SecurityInfo::new(true, None, Some("Let's Encrypt".into()));
        assert!(info.secure);
        assert_eq!(info.host, "");
        assert_eq!(info.issuer, "Let's Encrypt");
    }

    #[test]
    fn content_state_serializes_to_json() {
        let content = ContentState::new("https://gosub.io");
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["url"], "https://gosub.io");
        assert_eq!(json["progress"], 0);
        assert!(json["content_permission_request"].is_null());
    }
}
