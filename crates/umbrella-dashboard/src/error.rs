// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;
use umbrella_access::AccessError;
use umbrella_common_http::{is_retryable_status, RetryableError};

/// Failure talking to the resource API.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("not authenticated")]
	Unauthorized,

	#[error("forbidden: {0}")]
	Forbidden(String),

	#[error("request failed with status {status}: {message}")]
	Status { status: u16, message: String },

	#[error("request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("invalid response body: {0}")]
	Decode(#[from] serde_json::Error),

	#[error("invalid base url: {0}")]
	InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
	pub fn status(&self) -> Option<u16> {
		match self {
			ApiError::Unauthorized => Some(401),
			ApiError::Forbidden(_) => Some(403),
			ApiError::Status { status, .. } => Some(*status),
			ApiError::Request(e) => e.status().map(|s| s.as_u16()),
			ApiError::Decode(_) | ApiError::InvalidUrl(_) => None,
		}
	}
}

impl RetryableError for ApiError {
	fn is_retryable(&self) -> bool {
		match self {
			ApiError::Request(e) => e.is_retryable(),
			ApiError::Status { status, .. } => reqwest::StatusCode::from_u16(*status)
				.map(is_retryable_status)
				.unwrap_or(false),
			_ => false,
		}
	}
}

#[derive(Debug, Error)]
pub enum DashboardError {
	#[error(transparent)]
	Api(#[from] ApiError),

	#[error(transparent)]
	Access(#[from] AccessError),

	#[error("query parameter `{0}` is reserved")]
	ReservedParameter(String),

	#[error("invalid record id: {0:?}")]
	InvalidId(String),

	#[error("unknown {what}: {value}")]
	UnknownName { what: &'static str, value: String },

	#[error("request cancelled")]
	Cancelled,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
