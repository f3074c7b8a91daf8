// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Capability gate.
//!
//! Capabilities are granted from a threshold table over the privilege level.
//! A table is only accepted when it is monotonic, so any principal holding a
//! capability also holds every capability with a looser threshold:
//!
//! ```text
//! manage_system (0) <= delete (1) <= write (2) <= read (255)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use crate::classifier::Classification;
use crate::error::{AccessError, Result};
use crate::state::IdentityState;
use crate::types::PrivilegeLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	Read,
	Write,
	Delete,
	ManageSystem,
}

impl Capability {
	pub fn all() -> &'static [Capability] {
		&[
			Capability::Read,
			Capability::Write,
			Capability::Delete,
			Capability::ManageSystem,
		]
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Capability::Read => write!(f, "read"),
			Capability::Write => write!(f, "write"),
			Capability::Delete => write!(f, "delete"),
			Capability::ManageSystem => write!(f, "manage_system"),
		}
	}
}

/// Threshold table: the least privileged level that still holds each capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityPolicy {
	read: PrivilegeLevel,
	write: PrivilegeLevel,
	delete: PrivilegeLevel,
	manage_system: PrivilegeLevel,
}

impl Default for CapabilityPolicy {
	fn default() -> Self {
		Self {
			read: PrivilegeLevel::LOWEST,
			write: PrivilegeLevel::AGENT,
			delete: PrivilegeLevel::TENANT_ADMIN,
			manage_system: PrivilegeLevel::SUPER_ADMIN,
		}
	}
}

impl CapabilityPolicy {
	pub fn new(
		read: PrivilegeLevel,
		write: PrivilegeLevel,
		delete: PrivilegeLevel,
		manage_system: PrivilegeLevel,
	) -> Result<Self> {
		if !(manage_system <= delete && delete <= write && write <= read) {
			return Err(AccessError::InvalidPolicy(format!(
				"thresholds must satisfy manage_system <= delete <= write <= read \
				 (got {manage_system}, {delete}, {write}, {read})"
			)));
		}
		Ok(Self {
			read,
			write,
			delete,
			manage_system,
		})
	}

	pub fn threshold(&self, capability: Capability) -> PrivilegeLevel {
		match capability {
			Capability::Read => self.read,
			Capability::Write => self.write,
			Capability::Delete => self.delete,
			Capability::ManageSystem => self.manage_system,
		}
	}

	pub fn allows(&self, classification: &Classification, capability: Capability) -> bool {
		classification.has_minimum_privilege_level(self.threshold(capability))
	}
}

/// Answers `has_permission` for the current identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityGate {
	policy: CapabilityPolicy,
}

impl CapabilityGate {
	pub fn new(policy: CapabilityPolicy) -> Self {
		Self { policy }
	}

	pub fn policy(&self) -> &CapabilityPolicy {
		&self.policy
	}

	/// Loading and unauthenticated identities hold no capability.
	#[instrument(level = "debug", skip(self, state), fields(capability = %capability))]
	pub fn has_permission(&self, state: &IdentityState, capability: Capability) -> bool {
		let Some(classification) = state.classification() else {
			debug!("no authenticated principal");
			return false;
		};

		let allowed = self.policy.allows(&classification, capability);
		debug!(
			principal_id = %classification.principal_id,
			level = %classification.privilege_level,
			allowed,
			"capability evaluated"
		);
		allowed
	}

	/// Like [`has_permission`](Self::has_permission), but explains a refusal.
	pub fn require(&self, state: &IdentityState, capability: Capability) -> Result<()> {
		match state.classification() {
			None => Err(AccessError::Unauthenticated),
			Some(c) if self.policy.allows(&c, capability) => Ok(()),
			Some(_) => Err(AccessError::MissingCapability(capability)),
		}
	}

	/// Every capability held by `classification`, most basic first.
	pub fn granted(&self, classification: &Classification) -> Vec<Capability> {
		Capability::all()
			.iter()
			.copied()
			.filter(|cap| self.policy.allows(classification, *cap))
			.collect()
	}
}
