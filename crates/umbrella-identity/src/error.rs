// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;
use umbrella_common_http::{is_retryable_status, RetryableError};

#[derive(Debug, Error)]
pub enum IdentityError {
	#[error("session request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("session endpoint returned {status}: {message}")]
	Server { status: u16, message: String },

	#[error("invalid session payload: {field}: {message}")]
	InvalidPayload {
		field: &'static str,
		message: String,
	},

	#[error("invalid identity configuration: {0}")]
	InvalidConfig(String),
}

impl IdentityError {
	pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
		IdentityError::InvalidPayload {
			field,
			message: message.into(),
		}
	}
}

impl RetryableError for IdentityError {
	fn is_retryable(&self) -> bool {
		match self {
			IdentityError::Request(e) => e.is_retryable(),
			IdentityError::Server { status, .. } => reqwest::StatusCode::from_u16(*status)
				.map(is_retryable_status)
				.unwrap_or(false),
			IdentityError::InvalidPayload { .. } | IdentityError::InvalidConfig(_) => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, IdentityError>;
