// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::classifier::Classification;
use crate::types::{PrivilegeLevel, RoleSet};

/// Declarative precondition attached to a page, navigation entry or section.
///
/// Both parts are optional. An empty requirement only asks for an
/// authenticated principal. When both parts are set both must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleRequirement {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub roles: Option<RoleSet>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_level: Option<PrivilegeLevel>,
}

impl RoleRequirement {
	pub fn authenticated() -> Self {
		Self::default()
	}

	pub fn roles(roles: RoleSet) -> Self {
		Self {
			roles: Some(roles),
			min_level: None,
		}
	}

	pub fn min_level(level: PrivilegeLevel) -> Self {
		Self {
			roles: None,
			min_level: Some(level),
		}
	}

	pub fn and_min_level(mut self, level: PrivilegeLevel) -> Self {
		self.min_level = Some(level);
		self
	}

	pub fn is_satisfied_by(&self, classification: &Classification) -> bool {
		let roles_ok = self
			.roles
			.as_ref()
			.map_or(true, |roles| classification.has_any_role(roles));
		let level_ok = self
			.min_level
			.map_or(true, |level| classification.has_minimum_privilege_level(level));
		roles_ok && level_ok
	}
}
