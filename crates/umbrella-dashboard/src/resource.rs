// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource families exposed by the brokerage API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Whether rows of a resource belong to an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoping {
	/// Every request carries the caller's organization unless the caller is a super admin.
	Organization,
	/// Shared catalog, identical for every organization.
	Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
	Policies,
	Applications,
	Dependents,
	Rewards,
	Points,
	Referrals,
	Achievements,
	Agents,
	ClientAssignments,
	AccessRequests,
	Commissions,
	Analytics,
}

impl ResourceKind {
	pub fn all() -> &'static [ResourceKind] {
		&[
			ResourceKind::Policies,
			ResourceKind::Applications,
			ResourceKind::Dependents,
			ResourceKind::Rewards,
			ResourceKind::Points,
			ResourceKind::Referrals,
			ResourceKind::Achievements,
			ResourceKind::Agents,
			ResourceKind::ClientAssignments,
			ResourceKind::AccessRequests,
			ResourceKind::Commissions,
			ResourceKind::Analytics,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceKind::Policies => "policies",
			ResourceKind::Applications => "applications",
			ResourceKind::Dependents => "dependents",
			ResourceKind::Rewards => "rewards",
			ResourceKind::Points => "points",
			ResourceKind::Referrals => "referrals",
			ResourceKind::Achievements => "achievements",
			ResourceKind::Agents => "agents",
			ResourceKind::ClientAssignments => "client-assignments",
			ResourceKind::AccessRequests => "access-requests",
			ResourceKind::Commissions => "commissions",
			ResourceKind::Analytics => "analytics",
		}
	}

	/// Collection route, e.g. `/api/client-assignments`.
	pub fn path(&self) -> String {
		format!("/api/{}", self.as_str())
	}

	pub fn scoping(&self) -> Scoping {
		match self {
			ResourceKind::Rewards | ResourceKind::Achievements => Scoping::Global,
			_ => Scoping::Organization,
		}
	}

	pub fn is_scoped(&self) -> bool {
		self.scoping() == Scoping::Organization
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceKind {
	type Err = DashboardError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
		ResourceKind::all()
			.iter()
			.copied()
			.find(|kind| kind.as_str() == normalized)
			.ok_or_else(|| DashboardError::UnknownName {
				what: "resource",
				value: s.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn catalogs_are_global() {
		let global: Vec<_> = ResourceKind::all()
			.iter()
			.filter(|k| !k.is_scoped())
			.collect();
		assert_eq!(global, [&ResourceKind::Rewards, &ResourceKind::Achievements]);
	}

	#[test]
	fn paths_use_kebab_case() {
		assert_eq!(ResourceKind::ClientAssignments.path(), "/api/client-assignments");
		assert_eq!(ResourceKind::Agents.path(), "/api/agents");
	}

	#[test]
	fn parses_names_and_serde_agrees() {
		for kind in ResourceKind::all() {
			assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), *kind);
			assert_eq!(
				serde_json::to_value(kind).unwrap(),
				serde_json::Value::String(kind.as_str().to_string())
			);
		}
		assert_eq!(
			"access_requests".parse::<ResourceKind>().unwrap(),
			ResourceKind::AccessRequests
		);
		assert!("invoices".parse::<ResourceKind>().is_err());
	}
}
