// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Auth/session endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error, instrument};

use umbrella_access::Principal;
use umbrella_common_http::{error_message, is_retryable_status, retry, RetryConfig};
use umbrella_config::{ApiConfig, AuthConfig, Secret, DEFAULT_LOGOUT_PATH, DEFAULT_SESSION_PATH};

use crate::error::{IdentityError, Result};
use crate::payload::parse_session;

/// Source of the current session.
#[async_trait]
pub trait AuthEndpoint: Send + Sync {
	/// `Ok(None)` when there is no active session.
	async fn fetch_session(&self) -> Result<Option<Principal>>;

	async fn logout(&self) -> Result<()>;
}

pub struct HttpAuthEndpointBuilder {
	base_url: Option<String>,
	session_path: String,
	logout_path: String,
	token: Option<Secret<String>>,
	timeout: Duration,
	retry_config: RetryConfig,
}

impl HttpAuthEndpointBuilder {
	pub fn new() -> Self {
		Self {
			base_url: None,
			session_path: DEFAULT_SESSION_PATH.to_string(),
			logout_path: DEFAULT_LOGOUT_PATH.to_string(),
			token: None,
			timeout: Duration::from_secs(30),
			retry_config: RetryConfig::default(),
		}
	}

	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	pub fn session_path(mut self, path: impl Into<String>) -> Self {
		self.session_path = path.into();
		self
	}

	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();
		self
	}

	/// Bearer token presented to the backend.
	pub fn token(mut self, token: Secret<String>) -> Self {
		self.token = Some(token);
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn build(self) -> Result<HttpAuthEndpoint> {
		let base_url = self
			.base_url
			.ok_or_else(|| IdentityError::InvalidConfig("base URL is required".to_string()))?;
		let base_url = base_url.trim_end_matches('/');

		let client = umbrella_common_http::builder()
			.timeout(self.timeout)
			.build()?;

		Ok(HttpAuthEndpoint {
			client,
			session_url: format!("{base_url}{}", self.session_path),
			logout_url: format!("{base_url}{}", self.logout_path),
			token: self.token,
			retry_config: self.retry_config,
		})
	}
}

impl Default for HttpAuthEndpointBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// [`AuthEndpoint`] backed by the REST session routes.
///
/// 401 and 403 responses mean "no session". Transient failures on the session
/// lookup are retried; logout is attempted once.
pub struct HttpAuthEndpoint {
	client: Client,
	session_url: String,
	logout_url: String,
	token: Option<Secret<String>>,
	retry_config: RetryConfig,
}

impl HttpAuthEndpoint {
	pub fn builder() -> HttpAuthEndpointBuilder {
		HttpAuthEndpointBuilder::new()
	}

	pub fn from_config(api: &ApiConfig, auth: &AuthConfig) -> Result<Self> {
		let mut builder = Self::builder()
			.base_url(&api.base_url)
			.session_path(&auth.session_path)
			.logout_path(&auth.logout_path)
			.timeout(api.timeout)
			.retry_config(RetryConfig::with_retries(api.max_retries));
		if let Some(token) = &auth.session_token {
			builder = builder.token(token.clone());
		}
		builder.build()
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.token {
			Some(token) => request.bearer_auth(token.expose()),
			None => request,
		}
	}
}

#[async_trait]
impl AuthEndpoint for HttpAuthEndpoint {
	#[instrument(skip(self), fields(url = %self.session_url))]
	async fn fetch_session(&self) -> Result<Option<Principal>> {
		let response = retry(&self.retry_config, || async move {
			let response = self.authorize(self.client.get(&self.session_url)).send().await?;
			let status = response.status();
			if is_retryable_status(status) {
				let body = response.text().await.unwrap_or_default();
				return Err(IdentityError::Server {
					status: status.as_u16(),
					message: error_message(status, &body),
				});
			}
			Ok::<_, IdentityError>(response)
		})
		.await?;

		let status = response.status();
		if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
			debug!(status = status.as_u16(), "no active session");
			return Ok(None);
		}

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			let message = error_message(status, &body);
			error!(status = status.as_u16(), message = %message, "session lookup failed");
			return Err(IdentityError::Server {
				status: status.as_u16(),
				message,
			});
		}

		let body = response.text().await?;
		if body.trim().is_empty() {
			return Ok(None);
		}
		let value: Value = serde_json::from_str(&body)
			.map_err(|e| IdentityError::invalid("body", e.to_string()))?;
		parse_session(value)
	}

	#[instrument(skip(self), fields(url = %self.logout_url))]
	async fn logout(&self) -> Result<()> {
		let response = self
			.authorize(self.client.post(&self.logout_url))
			.send()
			.await?;
		let status = response.status();

		// An already-expired session is logged out by definition.
		if status.is_success() || status == StatusCode::UNAUTHORIZED {
			return Ok(());
		}

		let body = response.text().await.unwrap_or_default();
		Err(IdentityError::Server {
			status: status.as_u16(),
			message: error_message(status, &body),
		})
	}
}
