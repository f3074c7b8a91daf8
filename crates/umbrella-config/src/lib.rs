// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Umbrella dashboard client.
//!
//! Configuration is layered from several sources, merged by precedence:
//!
//! 1. CLI flags
//! 2. Environment variables (`UMBRELLA_*`)
//! 3. Config file (`--config` or `~/.config/umbrella/config.toml`)
//! 4. Built-in defaults
//!
//! The session token is read only from `UMBRELLA_SESSION_TOKEN` or
//! `UMBRELLA_SESSION_TOKEN_FILE`, never from a config file.
//!
//! # Usage
//!
//! ```ignore
//! use umbrella_config::{load_config, CliOverrides};
//!
//! let config = load_config(None, CliOverrides::default())?;
//! println!("talking to {}", config.api.base_url);
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::UmbrellaConfigLayer;
pub use secret::{load_secret_env, Secret, REDACTED};
pub use sections::*;
pub use sources::{
	CliOverrides, CliSource, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource,
};

use std::path::PathBuf;

use tracing::{debug, info};

pub const SESSION_TOKEN_ENV: &str = "UMBRELLA_SESSION_TOKEN";

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct UmbrellaConfig {
	pub api: ApiConfig,
	pub auth: AuthConfig,
	pub access: AccessConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from every source with standard precedence.
///
/// `config_file` replaces the user config path when given.
pub fn load_config(
	config_file: Option<PathBuf>,
	overrides: CliOverrides,
) -> Result<UmbrellaConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(DefaultsSource), Box::new(EnvSource)];

	match config_file {
		Some(path) => sources.push(Box::new(TomlSource::new(path))),
		None => {
			if let Some(user) = TomlSource::user() {
				sources.push(Box::new(user));
			}
		}
	}
	sources.push(Box::new(CliSource::new(overrides)));

	load_from_sources(sources)
}

/// Merge the given sources by precedence and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<UmbrellaConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = UmbrellaConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: UmbrellaConfigLayer) -> Result<UmbrellaConfig, ConfigError> {
	let api = layer.api.unwrap_or_default().finalize();
	let session_token = load_secret_env(SESSION_TOKEN_ENV)?;
	let auth = layer.auth.unwrap_or_default().finalize(session_token);
	let access = layer.access.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	api.validate()?;
	access.validate()?;

	info!(
		base_url = %api.base_url,
		timeout_secs = api.timeout.as_secs(),
		session_token_configured = auth.session_token.is_some(),
		log_format = %logging.format,
		"configuration loaded"
	);

	Ok(UmbrellaConfig {
		api,
		auth,
		access,
		logging,
	})
}
