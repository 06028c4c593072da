//! Media handles reported by the engine.
//!
//! The engine hands out one [`MediaHandle`] per media element. A session adapter
//! registers a playback observer on every handle it is told about and must release
//! that registration when the engine reports the handle gone; registrations are keyed
//! by an [`ObserverToken`] so release never needs the callback back.

use crate::state::{MediaId, MediaPlaybackState};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Identifies one observer registration on a media handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObserverToken(Uuid);

impl ObserverToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverToken {
    fn default() -> Self {
        Self::new()
    }
}

pub type PlaybackCallback = Box<dyn Fn(MediaPlaybackState) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(MediaPlaybackState) + Send + Sync>;

/// Engine side media element.
pub trait MediaHandle: fmt::Debug + Send + Sync {
    fn id(&self) -> MediaId;

    /// Register `callback` for playback state changes under `token`. Registering the
    /// same token again replaces the callback.
    fn register_observer(&self, token: ObserverToken, callback: PlaybackCallback);

    /// Remove the registration for `token`. Unknown tokens are ignored.
    fn unregister_observer(&self, token: ObserverToken);
}

/// In-process [`MediaHandle`] for embedders that drive playback state themselves.
pub struct LocalMediaHandle {
    id: MediaId,
    state: Mutex<MediaPlaybackState>,
    observers: Mutex<HashMap<ObserverToken, SharedCallback>>,
}

impl fmt::Debug for LocalMediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMediaHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl Default for LocalMediaHandle {
    fn default() -> Self {
        Self::new(MediaId::new())
    }
}

impl LocalMediaHandle {
    pub fn new(id: MediaId) -> Self {
        Self {
            id,
            state: Mutex::new(MediaPlaybackState::Unknown),
            observers: Mutex::new(HashMap::new()),
        }
    }

    fn lock_observers(&self) -> MutexGuard<'_, HashMap<ObserverToken, SharedCallback>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> MediaPlaybackState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the playback state and notify every registered observer.
    pub fn set_state(&self, state: MediaPlaybackState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        // Callbacks run unlocked so they may unregister themselves
        let callbacks: Vec<SharedCallback> = self.lock_observers().values().cloned().collect();
        for callback in callbacks {
            callback(state);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.lock_observers().len()
    }
}

impl MediaHandle for LocalMediaHandle {
    fn id(&self) -> MediaId {
        self.id
    }

    fn register_observer(&self, token: ObserverToken, callback: PlaybackCallback) {
        self.lock_observers().insert(token, Arc::from(callback));
    }

    fn unregister_observer(&self, token: ObserverToken) {
        self.lock_observers().remove(&token);
    }
}
