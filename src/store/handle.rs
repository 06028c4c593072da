use crate::action::Action;
use crate::errors::StoreError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Cloneable, async handle feeding a store's dispatch loop.
///
/// Obtained from [`Store::spawn_dispatch_loop`](crate::store::Store::spawn_dispatch_loop).
/// Actions sent through one `Dispatcher` are applied in the order they were sent. The
/// loop stops once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Action>,
}

impl Dispatcher {
    pub(crate) fn new(tx: mpsc::Sender<Action>) -> Self {
        Self { tx }
    }

    /// Queue an action, waiting for room in the channel.
    pub async fn dispatch(&self, action: impl Into<Action>) -> Result<(), StoreError> {
        self.tx
            .send(action.into())
            .await
            .map_err(|_| StoreError::ChannelClosed)
    }

    /// Queue an action without waiting. Usable from synchronous engine callbacks.
    pub fn try_dispatch(&self, action: impl Into<Action>) -> Result<(), StoreError> {
        self.tx.try_send(action.into()).map_err(|e| match e {
            TrySendError::Full(_) => StoreError::ChannelFull,
            TrySendError::Closed(_) => StoreError::ChannelClosed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
