// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document fixtures for leads, templates, and users.

use serde_json::{json, Value};

/// A minimal lead with just an email address.
pub fn lead_doc(email: Option<&str>) -> Value {
    match email {
        Some(email) => json!({"email": email}),
        None => json!({}),
    }
}

/// A lead with the usual firmographic fields filled in.
pub fn lead_doc_full(
    first_name: &str,
    email: &str,
    organization: &str,
    job_title: &str,
    industry: &str,
) -> Value {
    json!({
        "first_name": first_name,
        "email": email,
        "organization": organization,
        "job_title": job_title,
        "industry": industry,
    })
}

/// A master prompt template document.
pub fn prompt_template_doc(content: &str, model_identifier: &str, is_default: bool) -> Value {
    json!({
        "content": content,
        "model_identifier": model_identifier,
        "is_default": is_default,
    })
}

/// A stored email template document.
pub fn email_template_doc(subject: &str, body: &str) -> Value {
    json!({
        "subject": subject,
        "body": body,
    })
}

/// A user document with email and display name.
pub fn user_doc(email: &str, full_name: &str) -> Value {
    json!({
        "email": email,
        "full_name": full_name,
    })
}

/// The JSON body a completion API returns when the model answers with
/// `content`.
pub fn completion_reply(content: &str) -> Value {
    json!({
        "id": "gen-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}
