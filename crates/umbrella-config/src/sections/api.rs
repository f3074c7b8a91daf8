// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backend API connection settings.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backend API configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
	/// Base URL without a trailing slash.
	pub base_url: String,
	pub timeout: Duration,
	/// Extra attempts for idempotent requests.
	pub max_retries: u32,
}

impl Default for ApiConfig {
	fn default() -> Self {
		ApiConfigLayer::default().finalize()
	}
}

impl ApiConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
			return Err(ConfigError::invalid(
				"api.base_url",
				format!("'{}' must start with http:// or https://", self.base_url),
			));
		}
		if self.timeout.is_zero() {
			return Err(ConfigError::invalid("api.timeout_secs", "must be greater than zero"));
		}
		Ok(())
	}
}

/// API configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ApiConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub max_retries: Option<u32>,
}

impl ApiConfigLayer {
	pub fn merge(&mut self, other: ApiConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.max_retries.is_some() {
			self.max_retries = other.max_retries;
		}
	}

	pub fn finalize(self) -> ApiConfig {
		let base_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
		ApiConfig {
			base_url: base_url.trim_end_matches('/').to_string(),
			timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
			max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
		}
	}
}
