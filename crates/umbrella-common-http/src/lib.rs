// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Umbrella.
//!
//! This crate provides:
//! - A pre-configured HTTP client carrying the Umbrella User-Agent
//! - Retry with exponential backoff for transient failures
//! - Extraction of readable messages from failed responses

mod client;
mod message;
mod retry;

pub use client::{builder, platform, user_agent};
pub use message::error_message;
pub use retry::{is_retryable_status, retry, RetryConfig, RetryableError};
