// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Thin adapters: deserialize the body, call the engine operation, return
//! its envelope as JSON. All business decisions live in the engine.

use axum::{
    extract::{Path, State},
    Json,
};
use leadflow_core::types::TestMode;
use leadflow_engine::ops::{
    AckResponse, ApiStatusResponse, BulkSubmitResponse, DraftResponse, JobDebugResponse,
    JobListResponse, JobStatusResponse, LeadStructureResponse, PreferenceResponse,
    SendEmailRequest, SendEmailResponse, DEFAULT_ACTING_USER,
};
use leadflow_engine::BulkRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Request body for POST /v1/emails/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub lead: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub additional_context: String,
    #[serde(default)]
    pub acting_user: Option<String>,
}

fn default_tone() -> String {
    "professional".to_string()
}

/// Request body for POST /v1/emails/test.
#[derive(Debug, Deserialize)]
pub struct TestEmailBody {
    pub lead: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub acting_user: Option<String>,
}

/// Request body for POST /v1/bulk-jobs.
#[derive(Debug, Deserialize)]
pub struct BulkBody {
    #[serde(default)]
    pub lead_ids: Option<Vec<String>>,
    #[serde(default)]
    pub filter: Option<Map<String, Value>>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub test_mode: TestMode,
    #[serde(default)]
    pub acting_user: Option<String>,
}

/// Request body for PUT /v1/settings/email-preference.
#[derive(Debug, Deserialize)]
pub struct PreferenceBody {
    pub preference: String,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/emails/generate
pub async fn post_generate(
    State(state): State<GatewayState>,
    Json(body): Json<GenerateBody>,
) -> Json<DraftResponse> {
    let acting_user = body.acting_user.as_deref().unwrap_or(DEFAULT_ACTING_USER);
    Json(
        state
            .engine
            .generate_email_content(&body.lead, &body.tone, &body.additional_context, acting_user)
            .await,
    )
}

/// POST /v1/emails/test
pub async fn post_test_email(
    State(state): State<GatewayState>,
    Json(body): Json<TestEmailBody>,
) -> Json<AckResponse> {
    let acting_user = body.acting_user.as_deref().unwrap_or(DEFAULT_ACTING_USER);
    Json(
        state
            .engine
            .send_test_email(
                &body.lead,
                &body.subject,
                &body.content,
                body.recipient.as_deref(),
                acting_user,
            )
            .await,
    )
}

/// POST /v1/emails/send
pub async fn post_send(
    State(state): State<GatewayState>,
    Json(body): Json<SendEmailRequest>,
) -> Json<SendEmailResponse> {
    Json(state.engine.send_ai_email(body).await)
}

/// POST /v1/bulk-jobs
pub async fn post_bulk_jobs(
    State(state): State<GatewayState>,
    Json(body): Json<BulkBody>,
) -> Json<BulkSubmitResponse> {
    let request = BulkRequest {
        lead_ids: body.lead_ids,
        filter: body.filter,
        template_name: body.template_name,
        test_mode: body.test_mode,
        submitted_by: body
            .acting_user
            .unwrap_or_else(|| DEFAULT_ACTING_USER.to_string()),
    };
    Json(state.engine.generate_bulk_emails(request).await)
}

/// GET /v1/bulk-jobs
pub async fn get_bulk_jobs(State(state): State<GatewayState>) -> Json<JobListResponse> {
    Json(state.engine.list_bulk_email_jobs().await)
}

/// GET /v1/bulk-jobs/{job_id}
pub async fn get_bulk_job_status(
    State(state): State<GatewayState>,
    Path(job_id): Path<String>,
) -> Json<JobStatusResponse> {
    Json(state.engine.get_bulk_email_job_status(&job_id).await)
}

/// GET /v1/bulk-jobs/{job_id}/debug
pub async fn get_bulk_job_debug(
    State(state): State<GatewayState>,
    Path(job_id): Path<String>,
) -> Json<JobDebugResponse> {
    Json(state.engine.debug_failed_job(&job_id).await)
}

/// GET /v1/settings/email-preference
pub async fn get_email_preference(
    State(state): State<GatewayState>,
) -> Json<PreferenceResponse> {
    Json(state.engine.get_email_preference().await)
}

/// PUT /v1/settings/email-preference
pub async fn put_email_preference(
    State(state): State<GatewayState>,
    Json(body): Json<PreferenceBody>,
) -> Json<AckResponse> {
    Json(state.engine.set_email_preference(&body.preference).await)
}

/// GET /v1/status
pub async fn get_api_status(State(state): State<GatewayState>) -> Json<ApiStatusResponse> {
    Json(state.engine.get_api_status().await)
}

/// GET /v1/leads/{lead_id}/structure
pub async fn get_lead_structure(
    State(state): State<GatewayState>,
    Path(lead_id): Path<String>,
) -> Json<LeadStructureResponse> {
    Json(state.engine.get_lead_structure(&lead_id).await)
}

/// POST /v1/templates/{template_id}/default
pub async fn post_default_template(
    State(state): State<GatewayState>,
    Path(template_id): Path<String>,
) -> Json<AckResponse> {
    Json(state.engine.set_default_template(&template_id).await)
}
