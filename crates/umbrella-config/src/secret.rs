// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacted wrapper for credentials read from the environment.
//!
//! [`Secret<T>`] never prints its contents through `Debug` or `Display` and
//! zeroizes the wrapped value on drop. Callers opt in to the raw value with
//! [`Secret::expose`].

use std::fmt;
use std::path::PathBuf;

use zeroize::Zeroize;

use crate::error::ConfigError;

/// Placeholder printed instead of the wrapped value.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

/// Loads a secret from `VAR_FILE` (path to a file holding the value) or `VAR`.
///
/// The file variant wins when both are set. A single trailing newline is
/// stripped from file contents. Empty values count as unset.
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = std::env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::Secret(format!("{file_var} is set but empty")));
		}

		let path = PathBuf::from(&path_str);
		let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::FileRead {
			path: path.clone(),
			source,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
		if value.is_empty() {
			return Ok(None);
		}
		return Ok(Some(Secret::new(value)));
	}

	Ok(std::env::var(var)
		.ok()
		.filter(|v| !v.is_empty())
		.map(Secret::new))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ENV_MUTEX;
	use std::io::Write;

	#[test]
	fn debug_and_display_are_redacted() {
		let token = Secret::new("sess_abc123".to_string());
		assert_eq!(format!("{token}"), REDACTED);
		assert!(!format!("{token:?}").contains("sess_abc123"));
		assert_eq!(token.expose(), "sess_abc123");
	}

	#[test]
	fn loads_from_file_and_strips_newline() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		std::env::set_var("UMBRELLA_TEST_SECRET_FILE", file.path());
		std::env::set_var("UMBRELLA_TEST_SECRET", "from-env");
		let loaded = load_secret_env("UMBRELLA_TEST_SECRET").unwrap();
		std::env::remove_var("UMBRELLA_TEST_SECRET_FILE");
		std::env::remove_var("UMBRELLA_TEST_SECRET");

		assert_eq!(loaded.unwrap().expose(), "from-file");
	}

	#[test]
	fn empty_env_value_is_unset() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		std::env::set_var("UMBRELLA_TEST_EMPTY_SECRET", "");
		let loaded = load_secret_env("UMBRELLA_TEST_EMPTY_SECRET").unwrap();
		std::env::remove_var("UMBRELLA_TEST_EMPTY_SECRET");

		assert!(loaded.is_none());
	}

	#[test]
	fn empty_file_var_is_an_error() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		std::env::set_var("UMBRELLA_TEST_BAD_SECRET_FILE", "");
		let result = load_secret_env("UMBRELLA_TEST_BAD_SECRET");
		std::env::remove_var("UMBRELLA_TEST_BAD_SECRET_FILE");

		assert!(matches!(result, Err(ConfigError::Secret(_))));
	}
}
