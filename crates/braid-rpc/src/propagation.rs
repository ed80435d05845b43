// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    attachment::{INTERNAL_BRANCH_TYPE_KEY, INTERNAL_XID_KEY},
    error::RpcError,
    filter::{RpcFilter, RpcHandler},
    message::{RpcRequest, RpcResponse},
};
use async_trait::async_trait;
use braid_context::CallContext;
use braid_types::BranchType;
use tracing::{debug, warn};

/// Client-side half of context propagation: mirrors the caller's
/// transaction context into the internal attachment slots of the outgoing
/// request. Read-only with respect to the caller's own context; the
/// caller keeps its bindings until it chooses to unbind them.
///
/// A call with no bound xid is forwarded untouched, so non-transactional
/// traffic stays non-transactional downstream.
#[derive(Debug, Default)]
pub struct OutboundContextFilter;

#[async_trait]
impl RpcFilter for OutboundContextFilter {
    async fn invoke(
        &self,
        context: &CallContext,
        mut request: RpcRequest,
        next: &dyn RpcHandler,
    ) -> Result<RpcResponse, RpcError> {
        if let Some(xid) = context.xid() {
            debug!(%xid, service = %request.service, "Propagating transaction context outbound");
            request.attachments.set_internal(INTERNAL_XID_KEY, xid);
            if let Some(branch_type) = context.branch_type() {
                request
                    .attachments
                    .set_internal(INTERNAL_BRANCH_TYPE_KEY, branch_type.as_str());
            }
        }
        next.handle(context, request).await
    }
}

/// Server-side half of context propagation: rebuilds the callee-side
/// transaction context from the internal attachment slots before the
/// business handler runs, and unbinds exactly what it bound once the call
/// completes: on success, business failure, transport failure, and
/// dropped (cancelled) dispatch alike.
///
/// A request without transactional attachments passes through with the
/// context untouched.
#[derive(Debug, Default)]
pub struct InboundContextFilter;

#[async_trait]
impl RpcFilter for InboundContextFilter {
    async fn invoke(
        &self,
        context: &CallContext,
        request: RpcRequest,
        next: &dyn RpcHandler,
    ) -> Result<RpcResponse, RpcError> {
        let Some(xid) = request.attachments.get(INTERNAL_XID_KEY).map(str::to_owned) else {
            return next.handle(context, request).await;
        };

        let branch_type = request
            .attachments
            .get(INTERNAL_BRANCH_TYPE_KEY)
            .and_then(|raw| match raw.parse::<BranchType>() {
                Ok(branch_type) => Some(branch_type),
                Err(error) => {
                    // Propagation stays additive: a garbled optional
                    // attachment must not fail the business call.
                    warn!(%error, %xid, "Ignoring unparseable branch type attachment");
                    None
                }
            });

        debug!(%xid, service = %request.service, "Binding propagated transaction context inbound");
        context.bind(xid);
        if let Some(branch_type) = branch_type {
            context.bind_branch_type(branch_type);
        }

        let bound = context.clone();
        let bound_branch_type = branch_type.is_some();
        let _cleanup = scopeguard::guard((), move |()| {
            bound.unbind();
            if bound_branch_type {
                bound.unbind_branch_type();
            }
        });

        next.handle(context, request).await
    }
}
