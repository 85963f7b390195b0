// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail transport trait for the host's outbound mail path.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::types::OutboundEmail;

/// Outbound mail delivery with send-now semantics.
///
/// Implementations hand the finished email to the host's mail machinery
/// (SMTP account, mail queue). Delivery is at-least-once; idempotency is
/// the operator's concern.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Sends one email. Returns only after the transport accepted it.
    async fn send(&self, email: &OutboundEmail) -> Result<(), LeadflowError>;
}
