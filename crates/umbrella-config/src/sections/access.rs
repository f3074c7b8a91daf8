// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capability thresholds.
//!
//! Each value is the highest (least privileged) level that still holds the
//! capability. Lower levels carry more authority.

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessConfig {
	pub read_level: u8,
	pub write_level: u8,
	pub delete_level: u8,
	pub manage_system_level: u8,
}

impl Default for AccessConfig {
	fn default() -> Self {
		Self {
			read_level: u8::MAX,
			write_level: 2,
			delete_level: 1,
			manage_system_level: 0,
		}
	}
}

impl AccessConfig {
	/// Higher-authority capabilities must never be easier to obtain.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let ordered = self.manage_system_level <= self.delete_level
			&& self.delete_level <= self.write_level
			&& self.write_level <= self.read_level;
		if ordered {
			Ok(())
		} else {
			Err(ConfigError::Validation(format!(
				"access thresholds must satisfy manage_system <= delete <= write <= read \
				 (got {}, {}, {}, {})",
				self.manage_system_level, self.delete_level, self.write_level, self.read_level
			)))
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AccessConfigLayer {
	#[serde(default)]
	pub read_level: Option<u8>,
	#[serde(default)]
	pub write_level: Option<u8>,
	#[serde(default)]
	pub delete_level: Option<u8>,
	#[serde(default)]
	pub manage_system_level: Option<u8>,
}

impl AccessConfigLayer {
	pub fn merge(&mut self, other: AccessConfigLayer) {
		if other.read_level.is_some() {
			self.read_level = other.read_level;
		}
		if other.write_level.is_some() {
			self.write_level = other.write_level;
		}
		if other.delete_level.is_some() {
			self.delete_level = other.delete_level;
		}
		if other.manage_system_level.is_some() {
			self.manage_system_level = other.manage_system_level;
		}
	}

	pub fn finalize(self) -> AccessConfig {
		let defaults = AccessConfig::default();
		AccessConfig {
			read_level: self.read_level.unwrap_or(defaults.read_level),
			write_level: self.write_level.unwrap_or(defaults.write_level),
			delete_level: self.delete_level.unwrap_or(defaults.delete_level),
			manage_system_level: self
				.manage_system_level
				.unwrap_or(defaults.manage_system_level),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_defaults_are_valid() {
		let config = AccessConfig::default();
		assert_eq!(config.write_level, 2);
		assert_eq!(config.delete_level, 1);
		assert_eq!(config.manage_system_level, 0);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_delete_looser_than_write_is_rejected() {
		let config = AccessConfigLayer {
			delete_level: Some(3),
			..Default::default()
		}
		.finalize();
		assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_deserialize_layer() {
		let layer: AccessConfigLayer = toml::from_str("write_level = 1\ndelete_level = 0").unwrap();
		let config = layer.finalize();
		assert_eq!(config.write_level, 1);
		assert_eq!(config.delete_level, 0);
		assert!(config.validate().is_ok());
	}

	proptest! {
		#[test]
		fn validate_accepts_exactly_the_ordered_tables(
			manage in any::<u8>(),
			delete in any::<u8>(),
			write in any::<u8>(),
			read in any::<u8>(),
		) {
			let config = AccessConfig {
				read_level: read,
				write_level: write,
				delete_level: delete,
				manage_system_level: manage,
			};
			let ordered = manage <= delete && delete <= write && write <= read;
			prop_assert_eq!(config.validate().is_ok(), ordered);
		}
	}
}
