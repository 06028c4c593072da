//! Add-on listing loader.
//!
//! Loading a listing is one bulk metadata fetch followed by one icon fetch per add-on.
//! Icon fetches run concurrently and independently: a failing icon only means that
//! add-on has no icon. The consumer receives [`ListingEvent`]s over an `mpsc` channel:
//!
//! 1. `Addons` once, as soon as the metadata is in,
//! 2. one `Icon` per add-on, in completion order,
//! 3. `Done`.
//!
//! If the metadata fetch fails, `Failed` is sent instead and nothing else follows.
//! Cancelling the token (or dropping the receiver) ends the load without further
//! events.

use crate::addons::{Addon, AddonProvider};
use crate::state::Icon;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_ICON_FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    /// Maximum icon fetches in flight. Values below 1 are treated as 1.
    pub icon_fetch_concurrency: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            icon_fetch_concurrency: DEFAULT_ICON_FETCH_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListingEvent {
    /// Metadata for every available add-on
    Addons(Vec<Addon>),
    /// Icon fetch finished for one add-on. `None` if it has no icon or the fetch failed
    Icon { addon_id: String, icon: Option<Icon> },
    /// Every icon fetch finished
    Done,
    /// Metadata could not be fetched
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct AddonListing {
    config: ListingConfig,
}

impl AddonListing {
    pub fn new(config: ListingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// Load the listing from `provider`, reporting progress on `tx`.
    pub async fn load(
        &self,
        provider: Arc<dyn AddonProvider>,
        cancel: CancellationToken,
        tx: mpsc::Sender<ListingEvent>,
    ) {
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = provider.available_addons() => result,
        };

        let addons = match result {
            Ok(addons) => addons,
            Err(e) => {
                log::warn!("fetching add-ons failed: {e:#}");
                let _ = tx.send(ListingEvent::Failed(format!("{e:#}"))).await;
                return;
            }
        };

        let count = addons.len();
        if tx.send(ListingEvent::Addons(addons.clone())).await.is_err() {
            return;
        }

        let mut icons = stream::iter(addons)
            .map(|addon| {
                let provider = provider.clone();
                async move {
                    let icon = match provider.addon_icon(&addon).await {
                        Ok(icon) => icon,
                        Err(e) => {
                            log::warn!("fetching icon for add-on {} failed: {e:#}", addon.id);
                            None
                        }
                    };
                    (addon.id, icon)
                }
            })
            .buffer_unordered(self.config.icon_fetch_concurrency.max(1));

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return,
                next = icons.next() => next,
            };

            let Some((addon_id, icon)) = next else {
                break;
            };
            if tx.send(ListingEvent::Icon { addon_id, icon }).await.is_err() {
                return;
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        let _ = tx.send(ListingEvent::Done).await;
        log::info!("add-on listing complete ({count} add-ons)");
    }

    /// Run [`AddonListing::load`] as a tokio task.
    pub fn spawn(
        &self,
        provider: Arc<dyn AddonProvider>,
        cancel: CancellationToken,
        tx: mpsc::Sender<ListingEvent>,
    ) -> JoinHandle<()> {
        let listing = self.clone();
        tokio::spawn(async move { listing.load(provider, cancel, tx).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeProvider {
        addons: anyhow::Result<Vec<Addon>>,
        broken_icons: Vec<&'static str>,
    }

    impl FakeProvider {
        fn with(ids: &[&str]) -> Self {
            Self {
                addons: Ok(ids.iter().map(|id| Addon::new(*id, id.to_uppercase(), "1.0")).collect()),
                broken_icons: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl AddonProvider for FakeProvider {
        async fn available_addons(&self) -> anyhow::Result<Vec<Addon>> {
            match &self.addons {
                Ok(addons) => Ok(addons.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }

        async fn addon_icon(&self, addon: &Addon) -> anyhow::Result<Option<Icon>> {
            if self.broken_icons.contains(&addon.id.as_str()) {
                anyhow::bail!("icon server unavailable");
            }
            Ok(Some(Icon { source: None, data: addon.id.as_bytes().to_vec() }))
        }
    }

    struct StalledProvider;

    #[async_trait]
    impl AddonProvider for StalledProvider {
        async fn available_addons(&self) -> anyhow::Result<Vec<Addon>> {
            futures::future::pending().await
        }

        async fn addon_icon(&self, _addon: &Addon) -> anyhow::Result<Option<Icon>> {
            Ok(None)
        }
    }

    async fn collect(provider: Arc<dyn AddonProvider>, cancel: CancellationToken) -> Vec<ListingEvent> {
        let (tx, mut rx) = mpsc::channel(16);
        let task = AddonListing::default().spawn(provider, cancel, tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        task.await.unwrap();
        events
    }

    #[tokio::test]
    async fn addons_then_icons_then_done() {
        let events = collect(Arc::new(FakeProvider::with(&["a", "b", "c"])), CancellationToken::new()).await;

        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], ListingEvent::Addons(addons) if addons.len() == 3));
        assert_eq!(events[4], ListingEvent::Done);

        let icons: HashMap<String, Option<Icon>> = events[1..4]
            .iter()
            .map(|e| match e {
                ListingEvent::Icon { addon_id, icon } => (addon_id.clone(), icon.clone()),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(icons.len(), 3);
        assert_eq!(icons["b"].as_ref().unwrap().data, b"b".to_vec());
    }

    #[tokio::test]
    async fn failed_icon_does_not_fail_siblings() {
        let provider = FakeProvider {
            broken_icons: vec!["b"],
            ..FakeProvider::with(&["a", "b"])
        };
        let events = collect(Arc::new(provider), CancellationToken::new()).await;

        assert!(events.contains(&ListingEvent::Icon { addon_id: "b".into(), icon: None }));
        assert!(events.iter().any(|e| matches!(e, ListingEvent::Icon { addon_id, icon: Some(_) } if addon_id == "a")));
        assert_eq!(events.last(), Some(&ListingEvent::Done));
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let provider = FakeProvider {
            addons: Err(anyhow::anyhow!("collection unavailable")),
            broken_icons: Vec::new(),
        };
        let events = collect(Arc::new(provider), CancellationToken::new()).await;

        assert_eq!(events, vec![ListingEvent::Failed("collection unavailable".into())]);
    }

    #[tokio::test]
    async fn empty_listing_completes() {
        let events = collect(Arc::new(FakeProvider::with(&[])), CancellationToken::new()).await;
        assert_eq!(events, vec![ListingEvent::Addons(Vec::new()), ListingEvent::Done]);
    }

    #[tokio::test]
    async fn cancelled_listing_is_silent() {
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(4);
        let task = AddonListing::default().spawn(Arc::new(StalledProvider), cancel.clone(), tx);

        cancel.cancel();
        task.await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_receiver_ends_load() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        AddonListing::default()
            .load(Arc::new(FakeProvider::with(&["a", "b"])), CancellationToken::new(), tx)
            .await;
    }
}
