// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use serde_json::{json, Value};
use umbrella_access::{OrganizationId, Principal, PrincipalId, PrivilegeLevel};
use umbrella_common_http::RetryConfig;
use umbrella_identity::{HttpAuthEndpoint, IdentityResolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::ApiClient;

pub(crate) fn principal(level: u8, org: i64) -> Principal {
	Principal::new(
		PrincipalId::new(21),
		"broker@umbrella.example",
		OrganizationId::new(org),
		PrivilegeLevel::new(level),
	)
}

pub(crate) fn session_body(level: u8, org: i64) -> Value {
	json!({
		"id": 21,
		"email": "broker@umbrella.example",
		"organizationId": org,
		"privilegeLevel": level,
	})
}

/// Session endpoint answering as `level`/`org`, or 401 for `None`.
pub(crate) async fn mount_session(server: &MockServer, who: Option<(u8, i64)>) {
	let response = match who {
		Some((level, org)) => ResponseTemplate::new(200).set_body_json(session_body(level, org)),
		None => ResponseTemplate::new(401),
	};
	Mock::given(method("GET"))
		.and(path("/api/auth/session"))
		.respond_with(response)
		.mount(server)
		.await;
}

pub(crate) fn resolver(server: &MockServer) -> Arc<IdentityResolver> {
	let endpoint = HttpAuthEndpoint::builder()
		.base_url(server.uri())
		.retry_config(RetryConfig::no_retry())
		.build()
		.unwrap();
	Arc::new(IdentityResolver::new(Arc::new(endpoint)))
}

pub(crate) fn api(server: &MockServer) -> Arc<ApiClient> {
	Arc::new(
		ApiClient::builder()
			.base_url(server.uri())
			.retry_config(RetryConfig::no_retry())
			.build()
			.unwrap(),
	)
}
