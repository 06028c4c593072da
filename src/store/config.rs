//! Store configuration.
//!
//! `StoreConfig` sizes the channels a [`Store`](crate::store::Store) creates and
//! toggles the built-in action logging. Defaults come from [`Default`]; the fluent
//! [`StoreConfig::builder()`] validates custom values.
//!
//! ```rust
//! use gosub_state::store::StoreConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = StoreConfig::builder()
//!     .action_channel_capacity(256)
//!     .log_actions(true)
//!     .build()?; // returns Result<StoreConfig, StoreConfigError>
//! assert_eq!(cfg.state_channel_capacity, 128);
//! # Ok(()) }
//! ```
//!
//! # Fields
//! - `action_channel_capacity`: bound of the async dispatcher queue (default: 128).
//! - `state_channel_capacity`: number of snapshots a lagging stream subscriber may fall
//!   behind before it starts missing versions (default: 128).
//! - `log_actions`: log every dispatched action at `debug` level (default: false).

pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub action_channel_capacity: usize,
    pub state_channel_capacity: usize,
    pub log_actions: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            action_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            state_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_actions: false,
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), StoreConfigError> {
        if self.action_channel_capacity == 0 {
            return Err(StoreConfigError::ZeroCapacity("action_channel_capacity"));
        }
        if self.state_channel_capacity == 0 {
            return Err(StoreConfigError::ZeroCapacity("state_channel_capacity"));
        }
        Ok(())
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct StoreConfigBuilder {
    inner: StoreConfig,
}

impl StoreConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut StoreConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn action_channel_capacity(self, n: usize) -> Self { self.map(|c| c.action_channel_capacity = n) }
    pub fn state_channel_capacity(self, n: usize) -> Self { self.map(|c| c.state_channel_capacity = n) }
    pub fn log_actions(self, on: bool) -> Self { self.map(|c| c.log_actions = on) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<StoreConfig, StoreConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreConfigError {
    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),
}
