use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingCategory {
    Ad,
    Analytic,
    Social,
    Content,
    Cryptomining,
    Fingerprinting,
}

/// A tracker the engine blocked or let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub url: String,
    pub categories: Vec<TrackingCategory>,
}

impl Tracker {
    pub fn new(url: impl Into<String>, categories: Vec<TrackingCategory>) -> Self {
        Self {
            url: url.into(),
            categories,
        }
    }
}

/// Tracking protection slice of a session.
///
/// `blocked_trackers` and `loaded_trackers` only grow while a page is loaded; they are
/// reset as soon as the next load starts. The same tracker may appear multiple times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingProtectionState {
    pub enabled: bool,
    pub blocked_trackers: Vec<Tracker>,
    pub loaded_trackers: Vec<Tracker>,
    /// The session's site is on the exclusion list
    pub ignored_on_tracking_protection: bool,
}
