// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic request function for the resource API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use umbrella_common_http::{error_message, is_retryable_status, retry, RetryConfig};
use umbrella_config::{ApiConfig, AuthConfig, Secret};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
	#[default]
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
	pub method: Method,
	pub body: Option<Value>,
}

impl RequestOptions {
	pub fn get() -> Self {
		Self::default()
	}

	pub fn post(body: Value) -> Self {
		Self {
			method: Method::Post,
			body: Some(body),
		}
	}

	pub fn put(body: Value) -> Self {
		Self {
			method: Method::Put,
			body: Some(body),
		}
	}

	pub fn patch(body: Value) -> Self {
		Self {
			method: Method::Patch,
			body: Some(body),
		}
	}

	pub fn delete() -> Self {
		Self {
			method: Method::Delete,
			body: None,
		}
	}
}

/// Sends a request to the resource API and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError>;
}

pub struct ApiClientBuilder {
	base_url: Option<String>,
	token: Option<Secret<String>>,
	timeout: Duration,
	retry_config: RetryConfig,
}

impl ApiClientBuilder {
	pub fn new() -> Self {
		Self {
			base_url: None,
			token: None,
			timeout: Duration::from_secs(30),
			retry_config: RetryConfig::default(),
		}
	}

	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	pub fn token(mut self, token: Secret<String>) -> Self {
		self.token = Some(token);
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Applies to GET requests only.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn build(self) -> Result<ApiClient, ApiError> {
		let base_url = self.base_url.unwrap_or_default();
		let parsed = Url::parse(&base_url)?;

		let client = umbrella_common_http::builder()
			.timeout(self.timeout)
			.build()?;

		Ok(ApiClient {
			client,
			base_url: parsed.as_str().trim_end_matches('/').to_string(),
			token: self.token,
			retry_config: self.retry_config,
		})
	}
}

impl Default for ApiClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// [`Transport`] over HTTP.
///
/// GET requests are retried on transient failures; mutations are sent once.
/// 401 and 403 map to [`ApiError::Unauthorized`] and [`ApiError::Forbidden`],
/// and a `204` yields `null`.
pub struct ApiClient {
	client: Client,
	base_url: String,
	token: Option<Secret<String>>,
	retry_config: RetryConfig,
}

impl ApiClient {
	pub fn builder() -> ApiClientBuilder {
		ApiClientBuilder::new()
	}

	pub fn from_config(api: &ApiConfig, auth: &AuthConfig) -> Result<Self, ApiError> {
		let mut builder = Self::builder()
			.base_url(&api.base_url)
			.timeout(api.timeout)
			.retry_config(RetryConfig::with_retries(api.max_retries));
		if let Some(token) = &auth.session_token {
			builder = builder.token(token.clone());
		}
		builder.build()
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	async fn send(&self, url: &str, options: &RequestOptions) -> Result<Response, ApiError> {
		let mut request = self.client.request(options.method.into(), url);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token.expose());
		}
		if let Some(body) = &options.body {
			request = request.json(body);
		}

		let response = request.send().await?;
		let status = response.status();
		if is_retryable_status(status) {
			let body = response.text().await.unwrap_or_default();
			return Err(ApiError::Status {
				status: status.as_u16(),
				message: error_message(status, &body),
			});
		}
		Ok(response)
	}
}

#[async_trait]
impl Transport for ApiClient {
	#[instrument(skip(self, options), fields(method = ?options.method))]
	async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
		let url = format!("{}{}", self.base_url, path);
		let url = url.as_str();
		let options = &options;

		let result = if options.method == Method::Get {
			retry(&self.retry_config, || self.send(url, options)).await
		} else {
			self.send(url, options).await
		};

		let response = match result {
			Ok(response) => response,
			Err(e) => {
				error!(error = %e, "request failed");
				return Err(e);
			}
		};

		decode(response).await
	}
}

async fn decode(response: Response) -> Result<Value, ApiError> {
	let status = response.status();
	match status {
		StatusCode::NO_CONTENT => return Ok(Value::Null),
		StatusCode::UNAUTHORIZED => {
			debug!("request rejected as unauthenticated");
			return Err(ApiError::Unauthorized);
		}
		StatusCode::FORBIDDEN => {
			let body = response.text().await.unwrap_or_default();
			return Err(ApiError::Forbidden(error_message(status, &body)));
		}
		_ => {}
	}

	let body = response.text().await?;
	if !status.is_success() {
		let message = error_message(status, &body);
		error!(status = status.as_u16(), message = %message, "request returned error status");
		return Err(ApiError::Status {
			status: status.as_u16(),
			message,
		});
	}

	if body.trim().is_empty() {
		return Ok(Value::Null);
	}
	Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use wiremock::matchers::{body_json, header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn fast_retry() -> RetryConfig {
		RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(5),
			backoff_factor: 2.0,
			jitter: false,
		}
	}

	fn client(server: &MockServer) -> ApiClient {
		ApiClient::builder()
			.base_url(server.uri())
			.token(Secret::new("tok-123".to_string()))
			.retry_config(fast_retry())
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn get_sends_bearer_and_decodes_json() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/agents"))
			.and(query_param("organizationId", "7"))
			.and(header("authorization", "Bearer tok-123"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
			.expect(1)
			.mount(&server)
			.await;

		let value = client(&server)
			.request("/api/agents?organizationId=7", RequestOptions::get())
			.await
			.unwrap();
		assert_eq!(value, json!([{"id": 1}]));
	}

	#[tokio::test]
	async fn get_retries_transient_failures() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/policies"))
			.respond_with(ResponseTemplate::new(503))
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/api/policies"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
			.expect(1)
			.mount(&server)
			.await;

		let value = client(&server)
			.request("/api/policies", RequestOptions::get())
			.await
			.unwrap();
		assert_eq!(value, json!([]));
	}

	#[tokio::test]
	async fn mutations_are_not_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/points"))
			.and(body_json(json!({"points": 10})))
			.respond_with(
				ResponseTemplate::new(503).set_body_json(json!({"error": "ledger offline"})),
			)
			.expect(1)
			.mount(&server)
			.await;

		let err = client(&server)
			.request("/api/points", RequestOptions::post(json!({"points": 10})))
			.await
			.unwrap_err();
		match err {
			ApiError::Status { status, message } => {
				assert_eq!(status, 503);
				assert_eq!(message, "ledger offline");
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn no_content_is_null() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path("/api/dependents/4"))
			.respond_with(ResponseTemplate::new(204))
			.mount(&server)
			.await;

		let value = client(&server)
			.request("/api/dependents/4", RequestOptions::delete())
			.await
			.unwrap();
		assert_eq!(value, Value::Null);
	}

	#[tokio::test]
	async fn auth_statuses_map_to_variants() {
		let server = MockServer::start().await;
		Mock::given(path("/api/analytics"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;
		Mock::given(path("/api/commissions"))
			.respond_with(
				ResponseTemplate::new(403).set_body_json(json!({"message": "agents only"})),
			)
			.mount(&server)
			.await;

		let api = client(&server);
		assert!(matches!(
			api.request("/api/analytics", RequestOptions::get()).await,
			Err(ApiError::Unauthorized)
		));
		match api.request("/api/commissions", RequestOptions::get()).await {
			Err(ApiError::Forbidden(message)) => assert_eq!(message, "agents only"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[tokio::test]
	async fn client_errors_surface_status() {
		let server = MockServer::start().await;
		Mock::given(path("/api/referrals"))
			.respond_with(ResponseTemplate::new(422).set_body_string("bad referral code"))
			.expect(1)
			.mount(&server)
			.await;

		let err = client(&server)
			.request("/api/referrals", RequestOptions::post(json!({})))
			.await
			.unwrap_err();
		assert_eq!(err.status(), Some(422));
		assert!(err.to_string().contains("bad referral code"));
	}

	#[test]
	fn builder_rejects_bad_base_url() {
		assert!(matches!(
			ApiClient::builder().base_url("not a url").build(),
			Err(ApiError::InvalidUrl(_))
		));
		assert!(ApiClient::builder().build().is_err());
	}

	#[test]
	fn trailing_slash_is_trimmed() {
		let api = ApiClient::builder()
			.base_url("http://localhost:3000/")
			.build()
			.unwrap();
		assert_eq!(api.base_url(), "http://localhost:3000");
	}
}
