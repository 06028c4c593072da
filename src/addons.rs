//! Add-on metadata and the provider seam the listing loads it through.

pub mod listing;

pub use listing::{AddonListing, ListingConfig, ListingEvent};

use crate::state::Icon;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub enabled: bool,
}

impl Addon {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: None,
            icon_url: None,
            enabled: true,
        }
    }
}

/// Source of add-on metadata, typically an add-on collection service.
#[async_trait]
pub trait AddonProvider: Send + Sync {
    /// Fetch every available add-on.
    async fn available_addons(&self) -> anyhow::Result<Vec<Addon>>;

    /// Fetch the icon of one add-on. `Ok(None)` when it has none.
    async fn addon_icon(&self, addon: &Addon) -> anyhow::Result<Option<Icon>>;
}
