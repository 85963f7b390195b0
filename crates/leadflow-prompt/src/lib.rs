// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for the Leadflow outreach engine.
//!
//! Turns a stored master template, a lead record, and operator preferences
//! (tone, extra instructions) into the final prompt string sent to the
//! completion API.

pub mod assembler;
pub mod fields;

pub use assembler::{build_prompt, AssembledPrompt, PromptAssembler, OUTPUT_DIRECTIVE};
pub use fields::{is_internal_field, lead_json, relevant_fields};
