// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Shared vocabulary for the braid transaction framework: the branch mode
//! a participant enlists under, and the lock-retry policy in effect while
//! a unit of work runs under the global-lock discipline.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;

/// The mode a branch participates in a global transaction with.
///
/// The string form is the wire form carried in RPC attachments.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BranchType {
    /// Automatic (two-phase) branch driven by undo logs.
    At,
    /// Try-Confirm-Cancel branch.
    Tcc,
    /// Long-running saga branch.
    Saga,
    /// XA protocol branch.
    Xa,
}

impl BranchType {
    /// The canonical wire name of this branch type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::At => "AT",
            BranchType::Tcc => "TCC",
            BranchType::Saga => "SAGA",
            BranchType::Xa => "XA",
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("Unknown branch type: {0}")]
pub struct UnknownBranchType(pub String);

impl FromStr for BranchType {
    type Err = UnknownBranchType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "AT" => Ok(BranchType::At),
            "TCC" => Ok(BranchType::Tcc),
            "SAGA" => Ok(BranchType::Saga),
            "XA" => Ok(BranchType::Xa),
            other => Err(UnknownBranchType(other.to_string())),
        }
    }
}

/// Retry policy applied while acquiring the global lock for a unit of work.
///
/// Carried as `Arc<GlobalLockConfig>` by the lock-config scope so that
/// restore-on-exit can be verified by pointer identity: the value that was
/// effective before a nested unit of work ran is the exact value put back
/// afterwards, not an equal-looking copy.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GlobalLockConfig {
    /// Pause between two lock acquisition attempts.
    pub lock_retry_interval: Duration,
    /// Number of acquisition attempts before giving up.
    pub lock_retry_times: u32,
}

impl GlobalLockConfig {
    pub fn new(lock_retry_interval: Duration, lock_retry_times: u32) -> Self {
        Self {
            lock_retry_interval,
            lock_retry_times,
        }
    }
}

impl Default for GlobalLockConfig {
    fn default() -> Self {
        Self {
            lock_retry_interval: Duration::from_millis(10),
            lock_retry_times: 30,
        }
    }
}
