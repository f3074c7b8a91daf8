// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn format_version_info() -> String {
	format!(
		"umbrella {VERSION}\nplatform: {}\nuser-agent: {}",
		umbrella_common_http::platform(),
		umbrella_common_http::user_agent()
	)
}
