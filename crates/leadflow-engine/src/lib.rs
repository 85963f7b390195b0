// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration core of the Leadflow outreach engine.
//!
//! [`Engine`] owns the wired pipeline: prompt assembly, completion client,
//! delivery adapter, and the four host collaborators. The modules layer the
//! flow the way it runs in production: one lead ([`send_one`]), many leads
//! ([`bulk`]), observation ([`status`]), and the envelope-returning public
//! surface ([`ops`]).

pub mod bulk;
pub mod ops;
pub mod send_one;
pub mod status;

use std::sync::Arc;

use leadflow_completion::CompletionClient;
use leadflow_config::model::LeadflowConfig;
use leadflow_core::types::{doctype, LeadRecord};
use leadflow_core::{DocumentStore, JobRunner, KvCache, LeadflowError, MailTransport};
use leadflow_mailer::{DeliveryAdapter, ResendClient};
use leadflow_prompt::PromptAssembler;
use serde_json::Value;

pub use bulk::BulkRequest;
pub use send_one::{LeadSendOutcome, LeadSendRequest};
pub use status::{migrate_legacy_job_keys, JobDebugInfo};

/// The wired outreach pipeline.
///
/// Constructed once at startup from the process configuration; every
/// public operation hangs off it. No component self-initializes lazily.
pub struct Engine {
    config: LeadflowConfig,
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn KvCache>,
    runner: Arc<dyn JobRunner>,
    delivery: DeliveryAdapter,
    completion: Option<CompletionClient>,
    assembler: PromptAssembler,
}

impl Engine {
    /// Wires the engine from configuration and host collaborators.
    ///
    /// The completion client and the direct mail transport are optional:
    /// each is built only when its API key is configured, and operations
    /// that need a missing one fail with a configuration error at call
    /// time.
    pub fn new(
        config: LeadflowConfig,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn KvCache>,
        runner: Arc<dyn JobRunner>,
        host_mail: Arc<dyn MailTransport>,
    ) -> Result<Self, LeadflowError> {
        let completion = match config.completion.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(CompletionClient::new(key, &config.completion)?),
            None => None,
        };

        let resend = if config.resend.is_configured() {
            // is_configured guarantees both values are present.
            let key = config.resend.api_key.as_deref().unwrap_or_default();
            let from = config.resend.from_address.as_deref().unwrap_or_default();
            Some(ResendClient::new(key, from, &config.resend.base_url)?)
        } else {
            None
        };

        let assembler = PromptAssembler::new(Arc::clone(&store));
        let delivery = DeliveryAdapter::new(Arc::clone(&store), resend, host_mail);

        Ok(Self {
            config,
            store,
            cache,
            runner,
            delivery,
            completion,
            assembler,
        })
    }

    pub fn config(&self) -> &LeadflowConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn delivery(&self) -> &DeliveryAdapter {
        &self.delivery
    }

    /// Fetches a lead as a field mapping.
    pub(crate) async fn fetch_lead(&self, id: &str) -> Result<LeadRecord, LeadflowError> {
        let doc = self.store.fetch(doctype::LEAD, id).await?;
        match doc {
            Value::Object(fields) => Ok(LeadRecord::from_fields(fields)),
            _ => Err(LeadflowError::Internal(format!(
                "lead '{id}' is not an object document"
            ))),
        }
    }

    /// Resolves the acting user into a `(sender_email, display_name)` pair,
    /// falling back to the configured sender name when the user record has
    /// no full name (or does not exist at all).
    pub(crate) async fn sender_identity(&self, acting_user: &str) -> (String, String) {
        match self.store.fetch(doctype::USER, acting_user).await {
            Ok(doc) => {
                let email = doc
                    .get("email")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(acting_user)
                    .to_string();
                let name = doc
                    .get("full_name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(&self.config.engine.sender_name)
                    .to_string();
                (email, name)
            }
            Err(_) => (
                acting_user.to_string(),
                self.config.engine.sender_name.clone(),
            ),
        }
    }

    /// The address test-mode sends get redirected to: the acting user's
    /// email, else the configured fallback.
    pub(crate) async fn test_recipient(
        &self,
        acting_user: &str,
    ) -> Result<String, LeadflowError> {
        if let Ok(doc) = self.store.fetch(doctype::USER, acting_user).await {
            if let Some(email) = doc
                .get("email")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            {
                return Ok(email.to_string());
            }
        }
        self.config
            .engine
            .test_recipient
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                LeadflowError::Config(
                    "test mode is active, but no test recipient is configured".into(),
                )
            })
    }
}
