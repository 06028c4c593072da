use crate::action::Action;
use crate::state::BrowserState;
use crate::store::Store;

/// Hook run for every action before it reaches the reducer.
///
/// Middleware sees the state the action will be applied to. Returning `false`
/// swallows the action. Actions dispatched from within a middleware are queued
/// behind the current one.
pub trait Middleware: Send {
    fn handle(&mut self, action: &Action, state: &BrowserState, store: &Store) -> bool;
}

/// Logs every action passing through.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn handle(&mut self, action: &Action, _state: &BrowserState, _store: &Store) -> bool {
        match action.session_id() {
            Some(session_id) => log::debug!("Action [{session_id}]: {:?}", action),
            None => log::debug!("Action: {:?}", action),
        }
        true
    }
}
