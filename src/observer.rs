//! Engine event adapter.
//!
//! A [`SessionObserver`] is bound to one session and, optionally, one [`Store`]. It
//! receives the [`EngineEvent`]s the engine reports for that session and turns each
//! into zero or more actions. Responders carried by request events are parked in the
//! store's [`RequestRegistry`](crate::store::RequestRegistry) so the UI can answer
//! them later through [`Store::resolve`].
//!
//! Events for one session must be handled in the order the engine produced them.
//! `handle` takes `&mut self`, so an adapter has a single writer; [`SessionObserver::spawn`]
//! runs it as its own tokio task fed by an `mpsc` channel.

pub mod event;
pub mod media;

pub use event::EngineEvent;
pub use media::{LocalMediaHandle, MediaHandle, ObserverToken, PlaybackCallback};

use crate::action::{Action, ContentAction, MediaAction, TrackingProtectionAction};
use crate::state::{ConsumableKind, LoadRequest, MediaElement, MediaId, RequestId, SecurityInfo, SessionId};
use crate::store::{Responder, Store};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct SessionObserver {
    session_id: SessionId,
    store: Option<Store>,
    /// Media handles we registered a playback observer on
    media: HashMap<MediaId, Arc<dyn MediaHandle>>,
    token: ObserverToken,
}

impl fmt::Debug for SessionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionObserver")
            .field("session_id", &self.session_id)
            .field("bound", &self.store.is_some())
            .field("media", &self.media.len())
            .finish()
    }
}

impl SessionObserver {
    pub fn new(session_id: SessionId, store: Option<Store>) -> Self {
        Self {
            session_id,
            store,
            media: HashMap::new(),
            token: ObserverToken::new(),
        }
    }

    /// Adapter dispatching into `store`.
    pub fn bound(session_id: SessionId, store: Store) -> Self {
        Self::new(session_id, Some(store))
    }

    /// Adapter without a store. Events are dropped; pending requests are rejected.
    pub fn unbound(session_id: SessionId) -> Self {
        Self::new(session_id, None)
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_bound(&self) -> bool {
        self.store.is_some()
    }

    /// Number of media handles currently observed.
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    fn dispatch(&self, action: impl Into<Action>) {
        if let Some(store) = &self.store {
            store.dispatch(action);
        }
    }

    /// Translate one engine event.
    pub fn handle(&mut self, event: EngineEvent) {
        log::trace!("session {}: {}", self.session_id, event.name());

        if self.store.is_none() {
            if event.expects_response() {
                log::warn!(
                    "session {}: {} received by unbound adapter, rejecting",
                    self.session_id,
                    event.name()
                );
            }
            if let EngineEvent::MediaRemoved(handle) = &event {
                handle.unregister_observer(self.token);
                self.media.remove(&handle.id());
            }
            return;
        }

        let session_id = self.session_id;
        match event {
            // One action, so subscribers never see the new url next to the old page's state
            EngineEvent::LocationChange { url } => self.dispatch(ContentAction::UpdateUrl { session_id, url }),
            EngineEvent::LoadRequest { url, flags, responder } => {
                let request = LoadRequest::new(url, flags);
                if request.is_content_or_redirect() {
                    self.dispatch(ContentAction::UpdateSearchTerms { session_id, search_terms: String::new() });
                }
                self.park(request.id, ConsumableKind::LoadRequest, Responder::Load(responder));
                self.dispatch(ContentAction::UpdateLoadRequest { session_id, request });
            }
            EngineEvent::TitleChange { title } => self.dispatch(ContentAction::UpdateTitle { session_id, title }),
            EngineEvent::ProgressChange { progress } => {
                self.dispatch(ContentAction::UpdateProgress { session_id, progress })
            }
            EngineEvent::LoadingStateChange { loading } => {
                self.dispatch(ContentAction::UpdateLoadingState { session_id, loading })
            }
            EngineEvent::NavigationStateChange { can_go_back, can_go_forward } => {
                self.dispatch(ContentAction::UpdateNavigationState { session_id, can_go_back, can_go_forward })
            }
            EngineEvent::SecurityChange { secure, host, issuer } => self.dispatch(ContentAction::UpdateSecurityInfo {
                session_id,
                security_info: SecurityInfo::new(secure, host, issuer),
            }),

            EngineEvent::TrackerBlocked(tracker) => {
                self.dispatch(TrackingProtectionAction::TrackerBlocked { session_id, tracker })
            }
            EngineEvent::TrackerLoaded(tracker) => {
                self.dispatch(TrackingProtectionAction::TrackerLoaded { session_id, tracker })
            }
            EngineEvent::TrackerBlockingEnabledChange { enabled } => {
                self.dispatch(TrackingProtectionAction::ToggleTrackingProtection { session_id, enabled })
            }
            EngineEvent::ExcludedOnTrackingProtectionChange { excluded } => {
                self.dispatch(TrackingProtectionAction::ToggleExclusionList { session_id, excluded })
            }

            EngineEvent::LongPress(hit_result) => self.dispatch(ContentAction::UpdateHitResult { session_id, hit_result }),
            EngineEvent::Find { .. } => self.dispatch(ContentAction::ClearFindResults { session_id }),
            EngineEvent::FindResult(result) => self.dispatch(ContentAction::AddFindResult { session_id, result }),
            EngineEvent::ExternalResource(download) => {
                self.dispatch(ContentAction::UpdateDownload { session_id, download })
            }
            EngineEvent::DesktopModeChange { enabled } => {
                self.dispatch(ContentAction::UpdateDesktopMode { session_id, enabled })
            }
            EngineEvent::FullScreenChange { enabled } => self.dispatch(ContentAction::UpdateFullScreen { session_id, enabled }),
            EngineEvent::ThumbnailChange(Some(thumbnail)) => {
                self.dispatch(ContentAction::UpdateThumbnail { session_id, thumbnail })
            }
            EngineEvent::ThumbnailChange(None) => self.dispatch(ContentAction::RemoveThumbnail { session_id }),
            EngineEvent::IconChange(icon) => self.dispatch(ContentAction::UpdateIcon { session_id, icon }),
            EngineEvent::WebAppManifestLoaded(manifest) => {
                self.dispatch(ContentAction::UpdateWebAppManifest { session_id, manifest })
            }
            EngineEvent::Crash => self.dispatch(ContentAction::UpdateCrashState { session_id, crashed: true }),
            EngineEvent::RecordingDevicesChange(devices) => {
                self.dispatch(ContentAction::UpdateRecordingDevices { session_id, devices })
            }

            EngineEvent::ContentPermissionRequest { request, responder } => {
                self.park(request.id, ConsumableKind::ContentPermissionRequest, Responder::Permission(responder));
                self.dispatch(ContentAction::UpdatePermissionsRequest { session_id, request });
            }
            EngineEvent::ContentPermissionRequestCancelled { request_id } => {
                // Consuming also drops the responder nobody is waiting on anymore
                self.dispatch(ContentAction::Consume {
                    session_id,
                    kind: ConsumableKind::ContentPermissionRequest,
                    request_id: Some(request_id),
                });
            }
            EngineEvent::AppPermissionRequest { request, responder } => {
                self.park(request.id, ConsumableKind::AppPermissionRequest, Responder::Permission(responder));
                self.dispatch(ContentAction::UpdateAppPermissionsRequest { session_id, request });
            }
            EngineEvent::PromptRequest { request, responder } => {
                self.park(request.id, ConsumableKind::PromptRequest, Responder::Prompt(responder));
                self.dispatch(ContentAction::UpdatePromptRequest { session_id, request });
            }
            EngineEvent::WindowRequest(request) => self.dispatch(ContentAction::UpdateWindowRequest { session_id, request }),

            EngineEvent::MediaAdded(handle) => self.on_media_added(handle),
            EngineEvent::MediaRemoved(handle) => self.on_media_removed(handle),
        }
    }

    /// Parks the responder in the store. Dropped right away if the session is gone.
    fn park(&self, request_id: RequestId, kind: ConsumableKind, responder: Responder) {
        if let Some(store) = &self.store {
            if !store.park(self.session_id, request_id, kind, responder) {
                log::warn!("session {}: request {request_id} arrived after the session was removed", self.session_id);
            }
        }
    }

    fn on_media_added(&mut self, handle: Arc<dyn MediaHandle>) {
        let session_id = self.session_id;
        let media_id = handle.id();

        let store = self.store.clone();
        handle.register_observer(
            self.token,
            Box::new(move |state| {
                if let Some(store) = &store {
                    store.dispatch(MediaAction::UpdateMediaState { session_id, media_id, state });
                }
            }),
        );

        self.media.insert(media_id, handle);
        self.dispatch(MediaAction::AddMedia { session_id, media: MediaElement::new(media_id) });
    }

    fn on_media_removed(&mut self, handle: Arc<dyn MediaHandle>) {
        let media_id = handle.id();
        handle.unregister_observer(self.token);
        self.media.remove(&media_id);
        self.dispatch(MediaAction::RemoveMedia { session_id: self.session_id, media_id });
    }

    /// Release the playback observer of every media handle still tracked.
    pub fn release_media(&mut self) {
        for (_, handle) in self.media.drain() {
            handle.unregister_observer(self.token);
        }
    }

    /// Handle events from `rx` until the channel closes or `cancel` fires.
    pub async fn run(mut self, mut rx: mpsc::Receiver<EngineEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("session {}: adapter cancelled", self.session_id);
                    break;
                }
                event = rx.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
    }

    /// Run the adapter as a tokio task.
    pub fn spawn(self, rx: mpsc::Receiver<EngineEvent>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(rx, cancel))
    }
}

impl Drop for SessionObserver {
    fn drop(&mut self) {
        self.release_media();
    }
}
