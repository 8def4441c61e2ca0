//! Port for the external push-delivery transport.
//!
//! Delivery is best-effort: the dispatcher treats a whole-batch failure as
//! "nothing delivered" and never retries. Correctness of shift visibility
//! does not depend on push.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::shift::ShiftId;

/// Errors raised by push transport adapters. Any error means the whole
/// batch must be treated as undelivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushTransportError {
    /// The transport endpoint could not be reached.
    #[error("push transport unreachable: {message}")]
    Transport { message: String },

    /// The transport answered with an error or an undecodable body.
    #[error("push transport rejected the batch: {message}")]
    Rejected { message: String },
}

impl PushTransportError {
    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// One push message addressed to a device token.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    /// Opaque device token from the worker's profile.
    pub target: String,
    pub title: String,
    pub body: String,
    /// Structured payload the mobile client uses for deep linking.
    pub data: Value,
}

impl PushMessage {
    /// Build the standard new-shift alert for a device.
    #[must_use]
    pub fn new_shift_alert(target: String, shift_id: ShiftId, label: &str) -> Self {
        Self {
            target,
            title: "There's a new shift in your area!".to_owned(),
            body: label.to_owned(),
            data: serde_json::json!({ "shiftId": shift_id, "screen": "Home" }),
        }
    }
}

/// Per-message delivery verdict reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Rejected,
}

/// Port delivering a batch of push messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver the batch, returning one outcome per message in order.
    async fn send(
        &self,
        batch: Vec<PushMessage>,
    ) -> Result<Vec<PushOutcome>, PushTransportError>;
}

/// Transport used when no push endpoint is configured: logs the batch and
/// reports every message accepted so receipt dedup still applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyPushTransport;

#[async_trait]
impl PushTransport for LogOnlyPushTransport {
    async fn send(
        &self,
        batch: Vec<PushMessage>,
    ) -> Result<Vec<PushOutcome>, PushTransportError> {
        info!(messages = batch.len(), "push transport disabled; batch logged only");
        Ok(vec![PushOutcome::Accepted; batch.len()])
    }
}
