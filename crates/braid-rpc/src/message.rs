// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::attachment::Attachments;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An outbound call: the target service, an opaque business payload, and
/// the attachment map carried beside it. The payload encoding is the
/// business protocol's concern; this layer only ever touches the
/// attachments.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RpcRequest {
    pub service: String,
    pub payload: Bytes,
    pub attachments: Attachments,
}

impl RpcRequest {
    pub fn new(service: impl Into<String>, payload: Bytes) -> Self {
        Self {
            service: service.into(),
            payload,
            attachments: Attachments::default(),
        }
    }
}

/// The reply to an [`RpcRequest`]. Context propagation is
/// request-directional, so replies carry the payload alone.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RpcResponse {
    pub payload: Bytes,
}

impl RpcResponse {
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }
}
