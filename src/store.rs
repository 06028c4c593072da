//! The store: owner of the current [`BrowserState`].
//!
//! A [`Store`] serializes every state transition. [`Store::dispatch`] enqueues the action
//! and, when no other caller is currently applying actions, drains the queue itself:
//! each action runs through the middleware chain and the root reducer, and every
//! resulting state that differs from the previous one is committed as a new
//! [`StateSnapshot`] with a bumped version. Subscribers are notified once per commit,
//! in version order, with no store lock held. That makes it safe for a callback to
//! read the state, dispatch further actions (queued behind the current one) or
//! unsubscribe any subscription.
//!
//! Pending responders live in a [`RequestRegistry`]. It is settled against every applied
//! action while the commit holds the core lock, and [`Store::park`] takes the same lock,
//! so a responder is never parked for a session whose removal is already committed.
//!
//! Besides callbacks, snapshots are published on a `tokio::sync::broadcast` channel
//! ([`Store::subscribe_states`]) and an async [`Dispatcher`] can feed the store from
//! tokio tasks ([`Store::spawn_dispatch_loop`]).

pub mod config;
pub mod handle;
pub mod middleware;
pub mod registry;

pub use config::{StoreConfig, StoreConfigBuilder, StoreConfigError, DEFAULT_CHANNEL_CAPACITY};
pub use handle::Dispatcher;
pub use middleware::{LoggingMiddleware, Middleware};
pub use registry::{PendingRequest, RequestRegistry, RequestResponse, Responder};

use crate::action::{Action, ContentAction};
use crate::errors::StoreError;
use crate::reducer;
use crate::state::{BrowserState, ConsumableKind, RequestId, SessionId};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// A committed state together with its version.
///
/// Versions start at 0 for the initial state and grow by one for every commit.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub version: u64,
    pub state: Arc<BrowserState>,
}

impl StateSnapshot {
    /// Render the snapshot as pretty printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let state = serde_json::to_value(&*self.state)?;
        serde_json::to_string_pretty(&serde_json::json!({
            "version": self.version,
            "state": state,
        }))
    }
}

type Callback = Box<dyn Fn(&StateSnapshot) + Send + Sync>;

struct Subscriber {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

/// Handle to a callback subscription.
///
/// Dropping the handle keeps the subscription alive; call [`Subscription::unsubscribe`]
/// to stop delivery.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop delivery. Idempotent. When called during a notification cycle, the
    /// callback is not invoked for the rest of that cycle.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            inner.remove_subscriber(self.id);
        }
    }
}

struct Core {
    snapshot: StateSnapshot,
    queue: VecDeque<Action>,
    draining: bool,
}

struct StoreInner {
    config: StoreConfig,
    core: Mutex<Core>,
    middleware: Mutex<Vec<Box<dyn Middleware>>>,
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
    next_subscriber_id: AtomicU64,
    state_tx: broadcast::Sender<StateSnapshot>,
    requests: RequestRegistry,
    loop_running: AtomicBool,
}

impl StoreInner {
    fn lock_core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Arc<Subscriber>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove_subscriber(&self, id: u64) {
        let mut subscribers = self.lock_subscribers();
        if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
            let subscriber = subscribers.remove(pos);
            subscriber.active.store(false, Ordering::SeqCst);
            log::debug!("subscriber {id} removed");
        }
    }
}

/// Resets the draining flag if a middleware or subscriber panics mid-drain, so later
/// dispatches are not queued forever.
struct DrainGuard<'a> {
    inner: &'a StoreInner,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.inner.lock_core().draining = false;
        }
    }
}

/// Shared handle to the browser state. Cloning is cheap; all clones see the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("version", &self.version())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(BrowserState::default())
    }
}

impl Store {
    /// Create a store with the default configuration.
    pub fn new(initial: BrowserState) -> Self {
        Self::build(initial, StoreConfig::default())
    }

    /// Create a store with a custom configuration.
    pub fn with_config(initial: BrowserState, config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self::build(initial, config))
    }

    fn build(initial: BrowserState, config: StoreConfig) -> Self {
        let (state_tx, _first_rx) = broadcast::channel(config.state_channel_capacity);

        let mut middleware: Vec<Box<dyn Middleware>> = Vec::new();
        if config.log_actions {
            middleware.push(Box::new(LoggingMiddleware::new()));
        }

        Self {
            inner: Arc::new(StoreInner {
                config,
                core: Mutex::new(Core {
                    snapshot: StateSnapshot {
                        version: 0,
                        state: Arc::new(initial),
                    },
                    queue: VecDeque::new(),
                    draining: false,
                }),
                middleware: Mutex::new(middleware),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
                state_tx,
                requests: RequestRegistry::new(),
                loop_running: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Append a middleware to the chain. Must not be called from within a middleware.
    pub fn add_middleware(&self, middleware: Box<dyn Middleware>) {
        self.inner
            .middleware
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(middleware);
    }

    /// Current state.
    pub fn state(&self) -> Arc<BrowserState> {
        self.inner.lock_core().snapshot.state.clone()
    }

    /// Current state and its version.
    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.lock_core().snapshot.clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.lock_core().snapshot.version
    }

    /// Park the responder of a request the engine is waiting on.
    ///
    /// A previous responder of the session for the same slot is dropped. When the
    /// session is not in the committed state the responder is dropped as well and
    /// `false` is returned: nothing would ever answer or clean it up.
    pub fn park(&self, session_id: SessionId, request_id: RequestId, kind: ConsumableKind, responder: Responder) -> bool {
        let core = self.inner.lock_core();
        if core.snapshot.state.find_session(session_id).is_none() {
            log::debug!("session {session_id} is gone, dropping {kind:?} {request_id}");
            return false;
        }

        let replaced = self.inner.requests.take_for(session_id, kind);
        if !replaced.is_empty() {
            log::debug!("session {session_id}: {} pending {kind:?} request(s) replaced", replaced.len());
        }
        self.inner.requests.register(request_id, session_id, kind, responder);
        true
    }

    /// Pending responders for the consumable requests in the state.
    pub fn requests(&self) -> &RequestRegistry {
        &self.inner.requests
    }

    /// Apply an action.
    ///
    /// If no other caller is applying actions, this call applies the action (and
    /// anything queued meanwhile) before returning. Otherwise the action is queued and
    /// applied by the caller already draining.
    pub fn dispatch(&self, action: impl Into<Action>) {
        {
            let mut core = self.inner.lock_core();
            core.queue.push_back(action.into());
            if core.draining {
                return;
            }
            core.draining = true;
        }

        let _guard = DrainGuard { inner: &self.inner };
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (action, current) = {
                let mut core = self.inner.lock_core();
                match core.queue.pop_front() {
                    Some(action) => (action, core.snapshot.state.clone()),
                    None => {
                        core.draining = false;
                        return;
                    }
                }
            };

            if !self.run_middleware(&action, &current) {
                log::trace!("action swallowed by middleware");
                continue;
            }

            // Only touched sessions are copied, the rest stay shared with `current`
            let next = reducer::reduce((*current).clone(), &action);

            let committed = {
                let mut core = self.inner.lock_core();
                // Under the core lock, so `park` never interleaves with a commit
                self.inner.requests.settle(&action);
                if next.same_as(&current) {
                    None
                } else {
                    core.snapshot = StateSnapshot {
                        version: core.snapshot.version + 1,
                        state: Arc::new(next),
                    };
                    Some(core.snapshot.clone())
                }
            };
            if let Some(snapshot) = committed {
                self.notify(&snapshot);
            }
        }
    }

    fn run_middleware(&self, action: &Action, state: &BrowserState) -> bool {
        let mut chain = self.inner.middleware.lock().unwrap_or_else(PoisonError::into_inner);
        chain.iter_mut().all(|m| m.handle(action, state, self))
    }

    fn notify(&self, snapshot: &StateSnapshot) {
        let subscribers: Vec<Arc<Subscriber>> = self.inner.lock_subscribers().clone();
        for subscriber in subscribers {
            if subscriber.active.load(Ordering::SeqCst) {
                (subscriber.callback)(snapshot);
            }
        }

        // broadcast::Sender::send() fails only when there are 0 receivers.
        let _ = self.inner.state_tx.send(snapshot.clone());
    }

    /// Register a callback receiving every state committed after this call.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.inner.lock_subscribers().push(Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        }));
        log::debug!("subscriber {id} added");

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Stream of committed snapshots. A receiver that falls more than
    /// `state_channel_capacity` snapshots behind gets `RecvError::Lagged`.
    pub fn subscribe_states(&self) -> broadcast::Receiver<StateSnapshot> {
        self.inner.state_tx.subscribe()
    }

    /// Answer a pending request.
    ///
    /// Takes the responder from the registry, sends the response to the engine and
    /// consumes the request from the session's state.
    pub fn resolve(
        &self,
        session_id: SessionId,
        request_id: RequestId,
        response: RequestResponse,
    ) -> Result<(), StoreError> {
        let pending = self
            .inner
            .requests
            .take_matching(session_id, request_id, &response)
            .inspect_err(|e| log::warn!("cannot resolve request {request_id}: {e}"))?;
        if !pending.responder.respond(response) {
            log::warn!("engine stopped waiting for request {request_id}");
        }

        self.dispatch(ContentAction::Consume {
            session_id,
            kind: pending.kind,
            request_id: Some(request_id),
        });
        Ok(())
    }

    /// Start a tokio task applying actions sent through the returned [`Dispatcher`].
    ///
    /// The task ends once every dispatcher clone is dropped, after which a new loop may
    /// be started. Must be called within a tokio runtime.
    pub fn spawn_dispatch_loop(&self) -> Result<(Dispatcher, JoinHandle<()>), StoreError> {
        if self.inner.loop_running.swap(true, Ordering::SeqCst) {
            return Err(StoreError::AlreadyRunning);
        }

        let (tx, mut rx) = mpsc::channel::<Action>(self.inner.config.action_channel_capacity);
        let store = self.clone();
        let join_handle = tokio::spawn(async move {
            log::info!("dispatch loop started");
            while let Some(action) = rx.recv().await {
                store.dispatch(action);
            }
            store.inner.loop_running.store(false, Ordering::SeqCst);
            log::info!("dispatch loop stopped");
        });

        Ok((Dispatcher::new(tx), join_handle))
    }
}
