// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::StatusCode;

const MAX_MESSAGE_LEN: usize = 200;

/// Human-readable message for a failed response.
///
/// Prefers a JSON `error` or `message` string field, then the raw body, then
/// the status reason phrase. Long bodies are truncated.
pub fn error_message(status: StatusCode, body: &str) -> String {
	if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
		for key in ["error", "message"] {
			if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
				return text.to_string();
			}
		}
	}

	let trimmed = body.trim();
	if trimmed.is_empty() {
		return status
			.canonical_reason()
			.unwrap_or("request failed")
			.to_string();
	}

	match trimmed.char_indices().nth(MAX_MESSAGE_LEN) {
		Some((cut, _)) => format!("{}…", &trimmed[..cut]),
		None => trimmed.to_string(),
	}
}
