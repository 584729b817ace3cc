//! One-way `Uninitialized -> Ready` lifecycle of the plugin.

use std::sync::{Arc, OnceLock};

use crate::error::PluginError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
}

/// Holds the value requests are served with once the host has attached us.
///
/// The transition to `Ready` happens at most once; nothing is served before it.
pub struct Lifecycle<T> {
    ready: OnceLock<Arc<T>>,
}

impl<T> Lifecycle<T> {
    pub fn new() -> Self {
        Self {
            ready: OnceLock::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.ready.get().is_some() {
            LifecycleState::Ready
        } else {
            LifecycleState::Uninitialized
        }
    }

    /// Move to `Ready`, serving requests with `value` from now on.
    pub fn attach(&self, value: T) -> Result<Arc<T>, PluginError> {
        let value = Arc::new(value);
        self.ready
            .set(Arc::clone(&value))
            .map_err(|_| PluginError::AlreadyInitialized)?;
        Ok(value)
    }

    pub fn get(&self) -> Result<Arc<T>, PluginError> {
        self.ready.get().cloned().ok_or(PluginError::NotInitialized)
    }
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}
