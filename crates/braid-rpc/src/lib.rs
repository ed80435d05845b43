// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Carries the call-scoped transaction context across RPC process
//! boundaries.
//!
//! Requests carry an ordered attachment map beside the business payload.
//! The transactional identity lives in *reserved* slots of that map:
//! application code cannot write them through the generic setter (the
//! guard in [`attachment`] rejects the attempt), so the only way a callee
//! ever observes an xid is through the propagation filter pair in
//! [`propagation`]: [`OutboundContextFilter`] mirrors the caller's
//! context into the internal attachment slots, and
//! [`InboundContextFilter`] rebuilds the callee-side context from them
//! and tears it down again once the call completes, on every exit path.
//!
//! The transport itself stays a black box behind the [`filter`] contracts:
//! an ordered [`FilterChain`] composed at startup, ending in whatever
//! terminal [`RpcHandler`] actually moves bytes.

pub mod attachment;
pub mod error;
pub mod filter;
pub mod message;
pub mod propagation;

pub use attachment::Attachments;
pub use error::RpcError;
pub use filter::{FilterChain, RpcFilter, RpcHandler};
pub use message::{RpcRequest, RpcResponse};
pub use propagation::{InboundContextFilter, OutboundContextFilter};
