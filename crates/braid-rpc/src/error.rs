// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failures surfaced by the RPC layer.
///
/// The propagation filters never translate errors: a failing business
/// handler or transport surfaces here exactly as it failed, after the
/// context cleanup has run. Retry policy lives upstream in the
/// global-lock configuration, not at this layer.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Application code attempted to write a reserved attachment slot
    /// through the generic setter. Raised before any network I/O.
    #[error("Attachment key is reserved for transaction context propagation: {0}")]
    ReservedAttachmentKey(String),

    /// The underlying transport failed to carry the call.
    #[error("Transport error: {0:?}")]
    TransportError(#[from] anyhow::Error),

    /// The remote business handler failed.
    #[error("Error in application layer handling rpc request: {0:?}")]
    ApplicationError(anyhow::Error),

    /// The remote call did not complete in time.
    #[error("Rpc timed out")]
    TimedOut,
}
