// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use braid_types::BranchType;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// The transaction state owned by one logical call chain.
///
/// A `CallContext` is a cheap-to-clone handle: clones share the same
/// underlying scope, so the propagation filters and the lock coordinator
/// all observe and mutate the state of the call they were invoked for.
/// A fresh handle (`CallContext::default()`) starts with nothing bound.
///
/// The state never outlives the call that created it: whoever binds a
/// value is responsible for unbinding it before the call returns, and
/// `unbind` hands back the removed value so the caller can verify it is
/// removing exactly what it set.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    inner: Arc<Mutex<TransactionScope>>,
}

#[derive(Debug, Default)]
struct TransactionScope {
    xid: Option<String>,
    branch_type: Option<BranchType>,
    global_lock: bool,
}

impl CallContext {
    /// Binds the global transaction id for this call chain. The last bind
    /// wins; rebinding over an existing xid is legal and logged.
    pub fn bind(&self, xid: impl Into<String>) {
        let xid = xid.into();
        let mut scope = self.inner.lock();
        if let Some(previous) = &scope.xid {
            debug!(%previous, %xid, "Rebinding xid in the current call scope");
        } else {
            debug!(%xid, "Binding xid");
        }
        scope.xid = Some(xid);
    }

    /// Removes and returns the bound xid, or `None` if nothing was bound.
    pub fn unbind(&self) -> Option<String> {
        let xid = self.inner.lock().xid.take();
        if let Some(xid) = &xid {
            debug!(%xid, "Unbinding xid");
        }
        xid
    }

    /// Returns the bound xid without removing it.
    pub fn xid(&self) -> Option<String> {
        self.inner.lock().xid.clone()
    }

    /// Returns true iff an xid is bound, i.e. this call chain participates
    /// in a global transaction.
    pub fn in_global_transaction(&self) -> bool {
        self.inner.lock().xid.is_some()
    }

    /// Binds the branch mode this call chain participates under. Only
    /// meaningful while an xid is bound.
    pub fn bind_branch_type(&self, branch_type: BranchType) {
        debug!(%branch_type, "Binding branch type");
        self.inner.lock().branch_type = Some(branch_type);
    }

    /// Removes and returns the bound branch type, or `None`.
    pub fn unbind_branch_type(&self) -> Option<BranchType> {
        self.inner.lock().branch_type.take()
    }

    /// Returns the bound branch type without removing it.
    pub fn branch_type(&self) -> Option<BranchType> {
        self.inner.lock().branch_type
    }

    /// Returns true iff this call chain already carries the global-lock
    /// obligation. Read-only: never mutates the flag.
    pub fn require_global_lock(&self) -> bool {
        self.inner.lock().global_lock
    }

    /// Marks this call chain as holding the global-lock obligation.
    ///
    /// The matching [`unbind_global_lock_flag`](Self::unbind_global_lock_flag)
    /// must only be called by whoever performed the bind; the coordinator
    /// in [`crate::global_lock`] enforces that pairing.
    pub fn bind_global_lock_flag(&self) {
        self.inner.lock().global_lock = true;
    }

    /// Clears the global-lock obligation marker.
    pub fn unbind_global_lock_flag(&self) {
        self.inner.lock().global_lock = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_none, assert_some_eq};

    #[test]
    fn test_fresh_context_is_empty() {
        let context = CallContext::default();
        assert_none!(context.xid());
        assert_none!(context.branch_type());
        assert!(!context.in_global_transaction());
        assert!(!context.require_global_lock());
    }

    #[test]
    fn test_unbind_returns_most_recent_bind() {
        let context = CallContext::default();
        context.bind("tx-1");
        context.bind("tx-2");
        assert_some_eq!(context.unbind(), "tx-2");
        assert_none!(context.unbind());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let context = CallContext::default();
        context.bind("tx-1");
        assert_some_eq!(context.xid(), "tx-1");
        assert_some_eq!(context.xid(), "tx-1");
        assert!(context.in_global_transaction());
        assert_some_eq!(context.unbind(), "tx-1");
        assert!(!context.in_global_transaction());
    }

    #[test]
    fn test_branch_type_binds_symmetrically() {
        let context = CallContext::default();
        context.bind_branch_type(BranchType::Tcc);
        assert_some_eq!(context.branch_type(), BranchType::Tcc);
        assert_some_eq!(context.unbind_branch_type(), BranchType::Tcc);
        assert_none!(context.unbind_branch_type());
    }

    #[test]
    fn test_global_lock_flag_round_trip() {
        let context = CallContext::default();
        assert!(!context.require_global_lock());
        context.bind_global_lock_flag();
        assert!(context.require_global_lock());
        context.unbind_global_lock_flag();
        assert!(!context.require_global_lock());
    }

    #[test]
    fn test_clones_share_one_scope() {
        let context = CallContext::default();
        let alias = context.clone();
        context.bind("tx-1");
        assert_some_eq!(alias.xid(), "tx-1");
        assert_some_eq!(alias.unbind(), "tx-1");
        assert_none!(context.xid());
    }

    #[test]
    fn test_independent_contexts_do_not_observe_each_other() {
        let first = CallContext::default();
        let second = CallContext::default();
        first.bind("tx-1");
        first.bind_global_lock_flag();
        assert_none!(second.xid());
        assert!(!second.require_global_lock());
    }
}
