//! Browser state synchronization core.
//!
//! Engine callbacks for a session are translated by a [`SessionObserver`] into
//! [`Action`]s, which a [`Store`] applies through pure reducers to an immutable
//! [`BrowserState`]. UI code subscribes to the store and answers pending requests
//! (permissions, prompts, load requests) through [`Store::resolve`].

pub mod action;
pub mod addons;
pub mod errors;
pub mod observer;
pub mod origin;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::Action;
pub use errors::StoreError;
pub use observer::{EngineEvent, SessionObserver};
pub use state::{BrowserState, SessionId, SessionState};
pub use store::{Dispatcher, StateSnapshot, Store, StoreConfig, Subscription};
