// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attachment slot carrying the global transaction id. Write-protected:
/// the generic setter rejects it so application code cannot impersonate
/// a transaction by forging the slot directly.
pub const XID_KEY: &str = "TX_XID";

/// Attachment slot carrying the branch type. Write-protected like
/// [`XID_KEY`].
pub const BRANCH_TYPE_KEY: &str = "TX_BRANCH_TYPE";

/// Internal slot the propagation filters actually use for the xid. The
/// underscore prefix marks it as framework-internal; it is distinct from
/// [`XID_KEY`] precisely so application code cannot impersonate the
/// filters by writing the public key name.
pub const INTERNAL_XID_KEY: &str = "_TX_XID";

/// Internal slot the propagation filters use for the branch type.
pub const INTERNAL_BRANCH_TYPE_KEY: &str = "_TX_BRANCH_TYPE";

const RESERVED_KEYS: [&str; 2] = [XID_KEY, BRANCH_TYPE_KEY];

/// The ordered string attachment map carried beside an RPC payload.
///
/// Keys are partitioned into *reserved* keys (the transactional identity
/// slots) and application keys. [`set`](Self::set) is the generic,
/// guarded entry point for application code;
/// [`set_internal`](Self::set_internal) is the privileged back-channel
/// for the propagation filters. Reads and removals are unrestricted so
/// the slots stay observable.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attachments {
    entries: BTreeMap<String, String>,
}

impl Attachments {
    /// Returns true iff `key` is one of the write-protected transactional
    /// identity slots.
    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    /// Sets an application attachment. Rejects reserved keys immediately,
    /// before any network I/O happens for the call.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), RpcError> {
        let key = key.into();
        if Self::is_reserved(&key) {
            return Err(RpcError::ReservedAttachmentKey(key));
        }
        self.entries.insert(key, value.into());
        Ok(())
    }

    /// Privileged setter used by the propagation filters. Bypasses the
    /// reserved-key guard.
    pub fn set_internal(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
