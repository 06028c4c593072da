use crate::state::RequestId;
use crate::store::StoreConfigError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Dispatcher channel closed")]
    ChannelClosed,

    #[error("Dispatcher channel full")]
    ChannelFull,

    #[error("Dispatch loop already running")]
    AlreadyRunning,

    #[error("No pending request with id {0}")]
    RequestNotFound(RequestId),

    #[error("Request {request_id} expects a {expected} response, got {got}")]
    ResponseMismatch {
        request_id: RequestId,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Invalid store configuration: {0}")]
    Config(#[from] StoreConfigError),
}
