// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for access decisions.
//!
//! - **ID newtypes**: [`PrincipalId`] and [`OrganizationId`] wrap the backend's
//!   integer keys so the two can never be swapped by accident
//! - **[`PrivilegeLevel`]**: the canonical, totally ordered authority ranking
//!   (lower value = more authority)
//! - **[`RoleLabel`]**: a display label derived from the privilege level
//! - **[`Principal`]**: the validated, authenticated actor

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AccessError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			pub const fn new(id: i64) -> Self {
				Self(id)
			}

			pub const fn get(self) -> i64 {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl FromStr for $name {
			type Err = std::num::ParseIntError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.trim().parse().map(Self)
			}
		}
	};
}

define_id_type!(PrincipalId, "Unique identifier for an authenticated principal.");
define_id_type!(OrganizationId, "Unique identifier for a tenant organization.");

// =============================================================================
// Privilege Levels
// =============================================================================

/// Integer authority ranking. `0` is the highest authority.
///
/// The derived `Ord` follows the numeric value, so `a < b` means `a` carries
/// more authority than `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeLevel(u8);

impl PrivilegeLevel {
	pub const SUPER_ADMIN: Self = Self(0);
	pub const TENANT_ADMIN: Self = Self(1);
	pub const AGENT: Self = Self(2);
	pub const MEMBER: Self = Self(3);
	/// Least authority representable.
	pub const LOWEST: Self = Self(u8::MAX);

	pub const fn new(level: u8) -> Self {
		Self(level)
	}

	pub const fn get(self) -> u8 {
		self.0
	}

	pub const fn is_super_admin(self) -> bool {
		self.0 == 0
	}

	/// True when this level carries at least the authority of `threshold`.
	pub const fn satisfies(self, threshold: PrivilegeLevel) -> bool {
		self.0 <= threshold.0
	}
}

impl fmt::Display for PrivilegeLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u8> for PrivilegeLevel {
	fn from(level: u8) -> Self {
		Self(level)
	}
}

impl TryFrom<i64> for PrivilegeLevel {
	type Error = AccessError;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		u8::try_from(value)
			.map(Self)
			.map_err(|_| AccessError::InvalidPrivilegeLevel(value))
	}
}

// =============================================================================
// Role Labels
// =============================================================================

/// Coarse display classification derived from a [`PrivilegeLevel`].
///
/// Variants are declared from most to least privileged, so the derived `Ord`
/// sorts the most privileged label first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLabel {
	SuperAdmin,
	#[serde(alias = "admin")]
	TenantAdmin,
	Agent,
	Member,
}

impl RoleLabel {
	pub fn all() -> &'static [RoleLabel] {
		&[
			RoleLabel::SuperAdmin,
			RoleLabel::TenantAdmin,
			RoleLabel::Agent,
			RoleLabel::Member,
		]
	}

	/// The most privileged label applicable to `level`.
	pub const fn for_level(level: PrivilegeLevel) -> Self {
		match level.get() {
			0 => RoleLabel::SuperAdmin,
			1 => RoleLabel::TenantAdmin,
			2 => RoleLabel::Agent,
			_ => RoleLabel::Member,
		}
	}

	/// The numeric level a principal carrying this label is assigned by default.
	pub const fn canonical_level(self) -> PrivilegeLevel {
		match self {
			RoleLabel::SuperAdmin => PrivilegeLevel::SUPER_ADMIN,
			RoleLabel::TenantAdmin => PrivilegeLevel::TENANT_ADMIN,
			RoleLabel::Agent => PrivilegeLevel::AGENT,
			RoleLabel::Member => PrivilegeLevel::MEMBER,
		}
	}
}

impl fmt::Display for RoleLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleLabel::SuperAdmin => write!(f, "super_admin"),
			RoleLabel::TenantAdmin => write!(f, "tenant_admin"),
			RoleLabel::Agent => write!(f, "agent"),
			RoleLabel::Member => write!(f, "member"),
		}
	}
}

/// Accepts `SuperAdmin`, `super_admin`, `super-admin` and so on. The legacy
/// label `Admin` maps to [`RoleLabel::TenantAdmin`].
impl FromStr for RoleLabel {
	type Err = AccessError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let folded: String = s
			.chars()
			.filter(|c| !matches!(c, '_' | '-' | ' '))
			.map(|c| c.to_ascii_lowercase())
			.collect();

		match folded.as_str() {
			"superadmin" => Ok(RoleLabel::SuperAdmin),
			"tenantadmin" | "admin" => Ok(RoleLabel::TenantAdmin),
			"agent" => Ok(RoleLabel::Agent),
			"member" => Ok(RoleLabel::Member),
			_ => Err(AccessError::InvalidRole(s.to_string())),
		}
	}
}

/// Ordered set of role labels attached to a requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<RoleLabel>);

impl RoleSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn of(labels: impl IntoIterator<Item = RoleLabel>) -> Self {
		labels.into_iter().collect()
	}

	/// Parses labels such as `["Admin", "Agent"]`.
	pub fn parse<I, S>(labels: I) -> Result<Self, AccessError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		labels.into_iter().map(|l| l.as_ref().parse()).collect()
	}

	pub fn contains(&self, label: RoleLabel) -> bool {
		self.0.contains(&label)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = RoleLabel> + '_ {
		self.0.iter().copied()
	}
}

impl FromIterator<RoleLabel> for RoleSet {
	fn from_iter<T: IntoIterator<Item = RoleLabel>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl fmt::Display for RoleSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let labels: Vec<String> = self.iter().map(|l| l.to_string()).collect();
		write!(f, "[{}]", labels.join(", "))
	}
}

// =============================================================================
// Principal
// =============================================================================

/// An authenticated actor as validated at the identity boundary.
///
/// Every field is required; `role_label` is derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	pub id: PrincipalId,
	pub email: String,
	pub organization_id: OrganizationId,
	pub privilege_level: PrivilegeLevel,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
}

impl Principal {
	pub fn new(
		id: PrincipalId,
		email: impl Into<String>,
		organization_id: OrganizationId,
		privilege_level: PrivilegeLevel,
	) -> Self {
		Self {
			id,
			email: email.into(),
			organization_id,
			privilege_level,
			display_name: None,
		}
	}

	pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
		self.display_name = Some(name.into());
		self
	}

	pub fn role_label(&self) -> RoleLabel {
		RoleLabel::for_level(self.privilege_level)
	}

	pub fn is_super_admin(&self) -> bool {
		self.privilege_level.is_super_admin()
	}
}
