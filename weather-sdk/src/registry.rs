//! Tracks which API keys currently have a live [`WeatherClient`](crate::WeatherClient).
//!
//! A [`Registry`] is a cheap handle; clones share the same set. Clients built
//! with [`WeatherClient::new`](crate::WeatherClient::new) use
//! [`Registry::global`], tests usually build their own with [`Registry::new`].

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, WeatherError};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Claim `credential`, failing with [`WeatherError::AlreadyActive`] if
    /// another live client holds it.
    pub fn register(&self, credential: &str) -> Result<()> {
        let mut active = self.active.lock();
        if !active.insert(credential.to_owned()) {
            return Err(WeatherError::AlreadyActive);
        }
        debug!(active = active.len(), "credential registered");
        Ok(())
    }

    /// Release `credential`. Releasing an unknown credential is a no-op.
    pub fn unregister(&self, credential: &str) {
        let mut active = self.active.lock();
        if active.remove(credential) {
            debug!(active = active.len(), "credential released");
        }
    }

    pub fn is_active(&self, credential: &str) -> bool {
        self.active.lock().contains(credential)
    }

    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}
