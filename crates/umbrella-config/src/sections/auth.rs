// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session endpoint settings.

use std::time::Duration;

use serde::Deserialize;

use crate::secret::Secret;

pub const DEFAULT_SESSION_PATH: &str = "/api/auth/session";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 300;

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub session_path: String,
	pub logout_path: String,
	/// How long a resolved principal is trusted before it is fetched again.
	pub session_ttl: Duration,
	/// Bearer token sent to the backend. Only ever read from the environment.
	pub session_token: Option<Secret<String>>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize(None)
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub session_path: Option<String>,
	#[serde(default)]
	pub logout_path: Option<String>,
	#[serde(default)]
	pub session_ttl_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.session_path.is_some() {
			self.session_path = other.session_path;
		}
		if other.logout_path.is_some() {
			self.logout_path = other.logout_path;
		}
		if other.session_ttl_secs.is_some() {
			self.session_ttl_secs = other.session_ttl_secs;
		}
	}

	pub fn finalize(self, session_token: Option<Secret<String>>) -> AuthConfig {
		AuthConfig {
			session_path: normalize_path(
				self.session_path
					.unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string()),
			),
			logout_path: normalize_path(
				self.logout_path
					.unwrap_or_else(|| DEFAULT_LOGOUT_PATH.to_string()),
			),
			session_ttl: Duration::from_secs(
				self.session_ttl_secs.unwrap_or(DEFAULT_SESSION_TTL_SECS),
			),
			session_token,
		}
	}
}

fn normalize_path(path: String) -> String {
	if path.starts_with('/') {
		path
	} else {
		format!("/{path}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = AuthConfig::default();
		assert_eq!(config.session_path, "/api/auth/session");
		assert_eq!(config.logout_path, "/api/auth/logout");
		assert_eq!(config.session_ttl, Duration::from_secs(300));
		assert!(config.session_token.is_none());
	}

	#[test]
	fn test_paths_gain_leading_slash() {
		let config = AuthConfigLayer {
			session_path: Some("api/me".to_string()),
			..Default::default()
		}
		.finalize(None);
		assert_eq!(config.session_path, "/api/me");
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = AuthConfigLayer {
			session_ttl_secs: Some(60),
			..Default::default()
		};
		base.merge(AuthConfigLayer {
			session_path: Some("/api/session".to_string()),
			..Default::default()
		});
		assert_eq!(base.session_ttl_secs, Some(60));
		assert_eq!(base.session_path.as_deref(), Some("/api/session"));
	}

	#[test]
	fn test_token_is_never_printed() {
		let config =
			AuthConfigLayer::default().finalize(Some(Secret::new("sess_live_42".to_string())));
		let printed = format!("{config:?}");
		assert!(!printed.contains("sess_live_42"));
		assert!(printed.contains(crate::secret::REDACTED));
	}
}
