// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod access;
mod api;
mod auth;
mod logging;

pub use access::{AccessConfig, AccessConfigLayer};
pub use api::{
	ApiConfig, ApiConfigLayer, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
pub use auth::{
	AuthConfig, AuthConfigLayer, DEFAULT_LOGOUT_PATH, DEFAULT_SESSION_PATH,
	DEFAULT_SESSION_TTL_SECS,
};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
