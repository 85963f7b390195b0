// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a complete engine with mock collaborators.
//!
//! Builds an [`Engine`] over the in-memory store, a write-logging cache,
//! the inline job runner, and the recording mail transport. Completion and
//! direct-provider HTTP traffic is pointed at caller-supplied base URLs
//! (wiremock servers in practice).

use std::sync::Arc;

use leadflow_config::model::LeadflowConfig;
use leadflow_core::{DocumentStore, JobRunner, KvCache, LeadflowError, MailTransport};
use leadflow_core::types::doctype;
use leadflow_engine::Engine;
use leadflow_host::MemoryStore;
use leadflow_mailer::EmailPreference;
use serde_json::Value;

use crate::inline_runner::InlineRunner;
use crate::mock_transport::RecordingTransport;
use crate::spy_cache::SpyCache;

/// Builder for creating test environments with configurable fixtures.
pub struct TestHarnessBuilder {
    config: LeadflowConfig,
    documents: Vec<(String, String, Value)>,
    preference: Option<EmailPreference>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = LeadflowConfig::default();
        // Tests should not sit in the inter-item throttle.
        config.jobs.send_delay_ms = 0;
        Self {
            config,
            documents: Vec::new(),
            preference: None,
        }
    }

    /// Enables the AI path against a fake completion endpoint.
    pub fn with_completion(mut self, base_url: &str) -> Self {
        self.config.completion.api_key = Some("sk-test".into());
        self.config.completion.base_url = base_url.to_string();
        self
    }

    /// Enables the direct transport against a fake provider endpoint.
    pub fn with_resend(mut self, base_url: &str) -> Self {
        self.config.resend.api_key = Some("re_test".into());
        self.config.resend.from_address = Some("hello@acme.test".into());
        self.config.resend.base_url = base_url.to_string();
        self
    }

    /// Sets the site-level test-mode fallback recipient.
    pub fn with_test_recipient(mut self, recipient: &str) -> Self {
        self.config.engine.test_recipient = Some(recipient.to_string());
        self
    }

    /// Sets the site label used for compound job-id encodings.
    pub fn with_site(mut self, site: &str) -> Self {
        self.config.engine.site = Some(site.to_string());
        self
    }

    /// Arbitrary config adjustments.
    pub fn configure(mut self, f: impl FnOnce(&mut LeadflowConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Seeds a document under an explicit id.
    pub fn with_document(mut self, doctype: &str, id: &str, doc: Value) -> Self {
        self.documents
            .push((doctype.to_string(), id.to_string(), doc));
        self
    }

    /// Seeds a lead.
    pub fn with_lead(self, id: &str, doc: Value) -> Self {
        self.with_document(doctype::LEAD, id, doc)
    }

    /// Seeds the default prompt template.
    pub fn with_default_prompt(self, content: &str, model_identifier: &str) -> Self {
        self.with_document(
            doctype::PROMPT_TEMPLATE,
            "Default Outreach",
            crate::fixtures::prompt_template_doc(content, model_identifier, true),
        )
    }

    /// Seeds a stored email template.
    pub fn with_email_template(self, name: &str, subject: &str, body: &str) -> Self {
        self.with_document(
            doctype::EMAIL_TEMPLATE,
            name,
            crate::fixtures::email_template_doc(subject, body),
        )
    }

    /// Seeds a user record.
    pub fn with_user(self, id: &str, email: &str, full_name: &str) -> Self {
        self.with_document(doctype::USER, id, crate::fixtures::user_doc(email, full_name))
    }

    /// Persists a transport preference before any operation runs.
    pub fn with_preference(mut self, preference: EmailPreference) -> Self {
        self.preference = Some(preference);
        self
    }

    /// Builds the harness, seeding all fixtures.
    pub async fn build(self) -> Result<TestHarness, LeadflowError> {
        let store = Arc::new(MemoryStore::new());
        for (doctype, id, doc) in &self.documents {
            store.insert_with_id(doctype, id, doc.clone()).await;
        }

        let cache = Arc::new(SpyCache::new());
        let runner = Arc::new(InlineRunner::new());
        let transport = Arc::new(RecordingTransport::new());

        let engine = Engine::new(
            self.config.clone(),
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::clone(&cache) as Arc<dyn KvCache>,
            Arc::clone(&runner) as Arc<dyn JobRunner>,
            Arc::clone(&transport) as Arc<dyn MailTransport>,
        )?;
        let engine = Arc::new(engine);

        if let Some(pref) = self.preference {
            engine.delivery().set_preference(pref).await?;
        }

        Ok(TestHarness {
            engine,
            store,
            cache,
            runner,
            transport,
            config: self.config,
        })
    }
}

/// A complete test environment with mock collaborators.
pub struct TestHarness {
    /// The wired engine under test.
    pub engine: Arc<Engine>,
    /// The in-memory document store, for direct assertions.
    pub store: Arc<MemoryStore>,
    /// Write-logging cache, for asserting on snapshot sequences.
    pub cache: Arc<SpyCache>,
    /// Inline runner; jobs are complete when submission returns.
    pub runner: Arc<InlineRunner>,
    /// Recording mail transport (the host path).
    pub transport: Arc<RecordingTransport>,
    /// The configuration the engine was built with.
    pub config: LeadflowConfig,
}

impl TestHarness {
    /// Creates a new builder.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
