// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Raised while loading umbrella settings from any source.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// A single setting could not be parsed.
	#[error("invalid {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("{path} is not valid TOML: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("cannot read {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Settings parse individually but contradict each other.
	#[error("inconsistent configuration: {0}")]
	Validation(String),

	#[error("session token unavailable: {0}")]
	Secret(String),
}

impl ConfigError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		ConfigError::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_value_names_the_key() {
		let err = ConfigError::invalid("api.timeout_secs", "must be greater than zero");
		assert_eq!(
			err.to_string(),
			"invalid api.timeout_secs: must be greater than zero"
		);
	}
}
