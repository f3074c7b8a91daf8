// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction with a consistent User-Agent header.

use reqwest::{Client, ClientBuilder};

/// Creates a new HTTP client builder with the standard User-Agent header.
///
/// Use this when the client needs further customization.
///
/// # Example
/// ```ignore
/// let client = umbrella_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns `{os}-{arch}` for the running binary.
pub fn platform() -> String {
	format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Returns the standard User-Agent string.
///
/// Format: `umbrella/{platform}/{version}`
/// Example: `umbrella/linux-x86_64/0.1.0`
pub fn user_agent() -> String {
	format!("umbrella/{}/{}", platform(), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 3);
		assert_eq!(parts[0], "umbrella");
		assert_eq!(parts[1], platform());
		assert_eq!(parts[2], env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn builder_accepts_timeout() {
		assert!(builder()
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.is_ok());
	}
}
