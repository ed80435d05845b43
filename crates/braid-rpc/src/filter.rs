// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{error::RpcError, message::{RpcRequest, RpcResponse}};
use async_trait::async_trait;
use braid_context::CallContext;
use std::sync::Arc;

/// Anything that can complete an RPC call: the terminal transport on the
/// outbound side, the business service on the inbound side, or a whole
/// [`FilterChain`] (chains nest).
///
/// `context` is the call scope of the chain this handler runs inside; the
/// handler must not retain it beyond the call.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn handle(
        &self,
        context: &CallContext,
        request: RpcRequest,
    ) -> Result<RpcResponse, RpcError>;
}

/// One stage of the pipeline around a call. A filter may inspect or
/// rewrite the request, decide not to forward it, and observe the
/// outcome; it forwards by invoking `next`.
#[async_trait]
pub trait RpcFilter: Send + Sync {
    async fn invoke(
        &self,
        context: &CallContext,
        request: RpcRequest,
        next: &dyn RpcHandler,
    ) -> Result<RpcResponse, RpcError>;
}

struct FilterStep {
    filter: Arc<dyn RpcFilter>,
    next: Arc<dyn RpcHandler>,
}

#[async_trait]
impl RpcHandler for FilterStep {
    async fn handle(
        &self,
        context: &CallContext,
        request: RpcRequest,
    ) -> Result<RpcResponse, RpcError> {
        self.filter.invoke(context, request, self.next.as_ref()).await
    }
}

/// An ordered pipeline of filters ending in a terminal handler, composed
/// once at startup. Filters run in the order given; the terminal handler
/// runs last.
#[derive(Clone)]
pub struct FilterChain {
    head: Arc<dyn RpcHandler>,
}

impl FilterChain {
    pub fn new(filters: Vec<Arc<dyn RpcFilter>>, terminal: Arc<dyn RpcHandler>) -> Self {
        let head = filters
            .into_iter()
            .rev()
            .fold(terminal, |next, filter| {
                Arc::new(FilterStep { filter, next }) as Arc<dyn RpcHandler>
            });
        Self { head }
    }
}

#[async_trait]
impl RpcHandler for FilterChain {
    async fn handle(
        &self,
        context: &CallContext,
        request: RpcRequest,
    ) -> Result<RpcResponse, RpcError> {
        self.head.handle(context, request).await
    }
}
