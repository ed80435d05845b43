// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use braid_types::GlobalLockConfig;
use parking_lot::Mutex;
use std::sync::Arc;

/// The lock-retry configuration slot for one logical call chain.
///
/// At most one configuration is effective at a time. A nested unit of
/// work swaps its own configuration in with
/// [`set_and_return_previous`](Self::set_and_return_previous) and must
/// put the returned value back on exit (or call [`remove`](Self::remove)
/// when there was nothing to restore); the returned value is the caller's
/// only restore handle. Configurations travel as
/// `Arc<GlobalLockConfig>` so restore can be checked by pointer identity
/// rather than by value.
#[derive(Clone, Debug, Default)]
pub struct LockConfigScope {
    slot: Arc<Mutex<Option<Arc<GlobalLockConfig>>>>,
}

impl LockConfigScope {
    /// Makes `config` the effective configuration and returns whatever
    /// was effective before, if anything.
    pub fn set_and_return_previous(
        &self,
        config: Arc<GlobalLockConfig>,
    ) -> Option<Arc<GlobalLockConfig>> {
        self.slot.lock().replace(config)
    }

    /// Clears the slot entirely. Used on exit when
    /// [`set_and_return_previous`](Self::set_and_return_previous) returned
    /// `None`, i.e. there is no enclosing configuration to restore.
    pub fn remove(&self) {
        self.slot.lock().take();
    }

    /// Returns the currently effective configuration, if any. The
    /// surrounding lock-retry machinery reads this while acquiring row
    /// locks for the unit of work.
    pub fn current(&self) -> Option<Arc<GlobalLockConfig>> {
        self.slot.lock().clone()
    }
}
