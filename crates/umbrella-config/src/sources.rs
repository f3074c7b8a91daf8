// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, environment and CLI flags.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::UmbrellaConfigLayer;
use crate::sections::{
	AccessConfigLayer, ApiConfigLayer, AuthConfigLayer, LogFormat, LoggingConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	Cli = 60,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<UmbrellaConfigLayer, ConfigError>;
}

/// Built-in defaults. Values are applied during finalization.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<UmbrellaConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(UmbrellaConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `$XDG_CONFIG_HOME/umbrella/config.toml` (or the platform equivalent).
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| Self::new(dir.join("umbrella").join("config.toml")))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<UmbrellaConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(UmbrellaConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content =
			std::fs::read_to_string(&self.path).map_err(|source| ConfigError::FileRead {
				path: self.path.clone(),
				source,
			})?;

		let layer = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
			path: self.path.clone(),
			source,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `UMBRELLA_<SECTION>_<FIELD>`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<UmbrellaConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(UmbrellaConfigLayer {
			api: Some(ApiConfigLayer {
				base_url: env_var("UMBRELLA_API_URL"),
				timeout_secs: env_parse("UMBRELLA_API_TIMEOUT_SECS")?,
				max_retries: env_parse("UMBRELLA_API_MAX_RETRIES")?,
			}),
			auth: Some(AuthConfigLayer {
				session_path: env_var("UMBRELLA_AUTH_SESSION_PATH"),
				logout_path: env_var("UMBRELLA_AUTH_LOGOUT_PATH"),
				session_ttl_secs: env_parse("UMBRELLA_SESSION_TTL_SECS")?,
			}),
			access: Some(AccessConfigLayer {
				read_level: env_parse("UMBRELLA_ACCESS_READ_LEVEL")?,
				write_level: env_parse("UMBRELLA_ACCESS_WRITE_LEVEL")?,
				delete_level: env_parse("UMBRELLA_ACCESS_DELETE_LEVEL")?,
				manage_system_level: env_parse("UMBRELLA_ACCESS_MANAGE_SYSTEM_LEVEL")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("UMBRELLA_LOG_LEVEL"),
				format: env_var("UMBRELLA_LOG_FORMAT")
					.map(|v| v.parse::<LogFormat>())
					.transpose()?,
			}),
		})
	}
}

/// Overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub api_url: Option<String>,
	pub log_level: Option<String>,
	pub log_format: Option<LogFormat>,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<UmbrellaConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let overrides = self.overrides.clone();
		Ok(UmbrellaConfigLayer {
			api: overrides.api_url.map(|url| ApiConfigLayer {
				base_url: Some(url),
				..Default::default()
			}),
			logging: Some(LoggingConfigLayer {
				level: overrides.log_level,
				format: overrides.log_format,
			}),
			..Default::default()
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
	T: std::str::FromStr,
{
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| {
			ConfigError::invalid(name, format!("'{v}' is not a valid {}", std::any::type_name::<T>()))
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ENV_MUTEX;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, UmbrellaConfigLayer::default());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/umbrella.toml").load().unwrap();
		assert!(layer.api.is_none());
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[api\nbase_url = 1").unwrap();

		let result = TomlSource::new(&path).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_source_reads_umbrella_variables() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		std::env::set_var("UMBRELLA_API_URL", "https://broker.example.com");
		std::env::set_var("UMBRELLA_ACCESS_WRITE_LEVEL", "1");
		std::env::set_var("UMBRELLA_LOG_FORMAT", "json");
		std::env::set_var("UMBRELLA_SESSION_TTL_SECS", "");

		let layer = EnvSource.load();

		std::env::remove_var("UMBRELLA_API_URL");
		std::env::remove_var("UMBRELLA_ACCESS_WRITE_LEVEL");
		std::env::remove_var("UMBRELLA_LOG_FORMAT");
		std::env::remove_var("UMBRELLA_SESSION_TTL_SECS");

		let layer = layer.unwrap();
		assert_eq!(
			layer.api.unwrap().base_url.as_deref(),
			Some("https://broker.example.com")
		);
		assert_eq!(layer.access.unwrap().write_level, Some(1));
		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
		assert_eq!(layer.auth.unwrap().session_ttl_secs, None);
	}

	#[test]
	fn test_env_source_rejects_out_of_range_level() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		std::env::set_var("UMBRELLA_ACCESS_DELETE_LEVEL", "256");
		let result = EnvSource.load();
		std::env::remove_var("UMBRELLA_ACCESS_DELETE_LEVEL");

		assert!(matches!(
			result,
			Err(ConfigError::InvalidValue { key, .. }) if key == "UMBRELLA_ACCESS_DELETE_LEVEL"
		));
	}

	#[test]
	fn test_cli_source_only_sets_given_flags() {
		let layer = CliSource::new(CliOverrides {
			log_level: Some("debug".to_string()),
			..Default::default()
		})
		.load()
		.unwrap();
		assert!(layer.api.is_none());
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
	}
}
