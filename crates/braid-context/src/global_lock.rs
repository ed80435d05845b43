// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{context::CallContext, lock_config::LockConfigScope};
use braid_types::GlobalLockConfig;
use std::sync::Arc;

/// A unit of business logic that must run under the global-lock
/// discipline: while it executes, the call chain is marked as holding the
/// global-lock obligation and the executor's own lock-retry configuration
/// is the effective one.
pub trait GlobalLockExecutor {
    type Output;
    type Error;

    /// The lock-retry configuration to make effective while this unit of
    /// work runs.
    fn global_lock_config(&self) -> Arc<GlobalLockConfig>;

    /// Runs the unit of work. The coordinator propagates the result or
    /// failure unchanged.
    fn execute(self) -> Result<Self::Output, Self::Error>;
}

/// Brackets units of work with the global-lock acquire/release protocol.
///
/// Safe under nesting: a unit of work may itself run further units through
/// the same coordinator (or another coordinator over the same scopes).
/// Only the outermost call, the one that actually set the flag, clears it
/// on exit; an inner call clearing a flag it did not set would strip the
/// outer caller's lock obligation mid-flight. The lock-config slot is
/// restored to the exact enclosing value, not a default.
#[derive(Clone, Debug)]
pub struct GlobalLockCoordinator {
    context: CallContext,
    lock_configs: LockConfigScope,
}

impl GlobalLockCoordinator {
    pub fn new(context: CallContext, lock_configs: LockConfigScope) -> Self {
        Self {
            context,
            lock_configs,
        }
    }

    /// Runs `executor` under the global-lock discipline.
    ///
    /// The flag unbind and config restore run on every exit path: normal
    /// return, executor failure, and executor panic. The executor's
    /// failure is returned verbatim; no error translation happens here.
    pub fn execute<E: GlobalLockExecutor>(&self, executor: E) -> Result<E::Output, E::Error> {
        let already_held = self.context.require_global_lock();
        if !already_held {
            self.context.bind_global_lock_flag();
        }

        let previous = self
            .lock_configs
            .set_and_return_previous(executor.global_lock_config());

        let context = self.context.clone();
        let lock_configs = self.lock_configs.clone();
        let _restore = scopeguard::guard((), move |()| {
            // Unbind only if this call performed the bind above.
            if !already_held {
                context.unbind_global_lock_flag();
            }
            match previous {
                Some(config) => {
                    lock_configs.set_and_return_previous(config);
                }
                None => lock_configs.remove(),
            }
        });

        executor.execute()
    }

    /// Convenience wrapper: runs a closure under `config` through the same
    /// protocol as [`execute`](Self::execute).
    pub fn execute_with<T, E>(
        &self,
        config: Arc<GlobalLockConfig>,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.execute(ClosureExecutor { config, work })
    }
}

struct ClosureExecutor<F> {
    config: Arc<GlobalLockConfig>,
    work: F,
}

impl<T, E, F> GlobalLockExecutor for ClosureExecutor<F>
where
    F: FnOnce() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn global_lock_config(&self) -> Arc<GlobalLockConfig> {
        self.config.clone()
    }

    fn execute(self) -> Result<T, E> {
        (self.work)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err_eq, assert_none, assert_ok_eq, assert_some};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn coordinator() -> GlobalLockCoordinator {
        GlobalLockCoordinator::new(CallContext::default(), LockConfigScope::default())
    }

    fn config() -> Arc<GlobalLockConfig> {
        Arc::new(GlobalLockConfig::default())
    }

    #[test]
    fn test_flag_is_held_during_execution_and_cleared_after() {
        let coordinator = coordinator();
        let context = coordinator.context.clone();

        let result = coordinator.execute_with(config(), || {
            assert!(context.require_global_lock());
            Ok::<_, ()>(42)
        });
        assert_ok_eq!(result, 42);
        assert!(!coordinator.context.require_global_lock());
        assert_none!(coordinator.lock_configs.current());
    }

    #[test]
    fn test_nested_execution_only_outermost_clears_the_flag() {
        let coordinator = coordinator();
        let nested = coordinator.clone();
        let context = coordinator.context.clone();

        let result = coordinator.execute_with(config(), || {
            // The inner unit observes the flag already held; its own
            // bracket must leave the outer flag alone.
            assert!(context.require_global_lock());
            let inner = nested.execute_with(config(), || Ok::<_, ()>("inner"));
            assert_ok_eq!(inner, "inner");
            assert!(context.require_global_lock());
            Ok::<_, ()>("outer")
        });
        assert_ok_eq!(result, "outer");
        assert!(!coordinator.context.require_global_lock());
    }

    #[test]
    fn test_nested_execution_restores_the_exact_previous_config() {
        let coordinator = coordinator();
        let nested = coordinator.clone();
        let lock_configs = coordinator.lock_configs.clone();
        let outer_config = config();

        let outer_handle = outer_config.clone();
        let result = coordinator.execute_with(outer_config, move || {
            nested.execute_with(config(), || Ok::<_, ()>(()))?;
            // Back in the outer unit: the restored value must be the
            // outer config itself, by identity.
            let current = assert_some!(lock_configs.current());
            assert!(Arc::ptr_eq(&current, &outer_handle));
            Ok::<_, ()>(())
        });
        assert_ok_eq!(result, ());
        assert_none!(coordinator.lock_configs.current());
    }

    #[test]
    fn test_failure_propagates_after_cleanup() {
        let coordinator = coordinator();

        let result: Result<(), &str> = coordinator.execute_with(config(), || Err("row conflict"));
        assert_err_eq!(result, "row conflict");
        assert!(!coordinator.context.require_global_lock());
        assert_none!(coordinator.lock_configs.current());
    }

    #[test]
    fn test_panic_still_runs_cleanup() {
        let coordinator = coordinator();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            coordinator.execute_with(config(), || -> Result<(), ()> {
                panic!("executor blew up");
            })
        }));
        assert!(outcome.is_err());
        assert!(!coordinator.context.require_global_lock());
        assert_none!(coordinator.lock_configs.current());
    }

    #[test]
    fn test_executor_trait_drives_the_same_protocol() {
        struct CountingExecutor {
            config: Arc<GlobalLockConfig>,
            context: CallContext,
        }

        impl GlobalLockExecutor for CountingExecutor {
            type Output = bool;
            type Error = ();

            fn global_lock_config(&self) -> Arc<GlobalLockConfig> {
                self.config.clone()
            }

            fn execute(self) -> Result<bool, ()> {
                Ok(self.context.require_global_lock())
            }
        }

        let coordinator = coordinator();
        let executor = CountingExecutor {
            config: config(),
            context: coordinator.context.clone(),
        };
        assert_ok_eq!(coordinator.execute(executor), true);
        assert!(!coordinator.context.require_global_lock());
    }
}
