// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dashboard pages: their access requirement, the queries they issue and the
//! guarded sections they contain.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use umbrella_access::{
	Capability, CapabilityGate, CapabilityGuard, Guard, GuardExt, IdentityState, PrivilegeGuard,
	PrivilegeLevel, RoleGuard, RoleLabel, RoleSet,
};

use crate::error::{DashboardError, Result};
use crate::query::QueryKey;
use crate::resource::ResourceKind;
use crate::scope::OrganizationScope;
use crate::shell::DashboardLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
	Overview,
	Policies,
	Applications,
	Dependents,
	Rewards,
	Referrals,
	Achievements,
	Agents,
	ClientAssignments,
	AccessRequests,
	Commissions,
	Analytics,
}

impl Page {
	pub fn all() -> &'static [Page] {
		&[
			Page::Overview,
			Page::Policies,
			Page::Applications,
			Page::Dependents,
			Page::Rewards,
			Page::Referrals,
			Page::Achievements,
			Page::Agents,
			Page::ClientAssignments,
			Page::AccessRequests,
			Page::Commissions,
			Page::Analytics,
		]
	}

	pub fn slug(&self) -> &'static str {
		match self {
			Page::Overview => "overview",
			Page::Policies => "policies",
			Page::Applications => "applications",
			Page::Dependents => "dependents",
			Page::Rewards => "rewards",
			Page::Referrals => "referrals",
			Page::Achievements => "achievements",
			Page::Agents => "agents",
			Page::ClientAssignments => "client-assignments",
			Page::AccessRequests => "access-requests",
			Page::Commissions => "commissions",
			Page::Analytics => "analytics",
		}
	}

	pub fn title(&self) -> &'static str {
		match self {
			Page::Overview => "Overview",
			Page::Policies => "Policies",
			Page::Applications => "Applications",
			Page::Dependents => "Dependents",
			Page::Rewards => "Rewards",
			Page::Referrals => "Referrals",
			Page::Achievements => "Achievements",
			Page::Agents => "Agents",
			Page::ClientAssignments => "Client Assignments",
			Page::AccessRequests => "Access Requests",
			Page::Commissions => "Commissions",
			Page::Analytics => "Analytics",
		}
	}

	pub fn route(&self) -> String {
		match self {
			Page::Overview => "/dashboard".to_string(),
			page => format!("/dashboard/{}", page.slug()),
		}
	}

	/// `None` means any authenticated principal.
	pub fn required_roles(&self) -> Option<RoleSet> {
		use RoleLabel::{Agent, TenantAdmin};
		match self {
			Page::Agents | Page::ClientAssignments | Page::Commissions => {
				Some(RoleSet::of([TenantAdmin, Agent]))
			}
			Page::AccessRequests | Page::Analytics => Some(RoleSet::of([TenantAdmin])),
			_ => None,
		}
	}

	pub fn layout(&self) -> DashboardLayout {
		let layout = DashboardLayout::new(self.title());
		match self.required_roles() {
			Some(roles) => layout.require_roles(roles),
			None => layout,
		}
	}

	/// Queries issued in parallel when the page loads.
	pub fn queries(&self, scope: OrganizationScope) -> Result<Vec<QueryKey>> {
		use ResourceKind as R;
		let list = |kind| QueryKey::list_in(kind, scope);
		let keys = match self {
			Page::Overview => vec![
				list(R::Policies).with_param("status", "active")?,
				list(R::Applications).with_param("status", "pending")?,
				list(R::Points),
				list(R::Achievements),
			],
			Page::Policies => vec![
				list(R::Policies),
				list(R::Policies).with_param("status", "active")?,
			],
			Page::Applications => vec![
				list(R::Applications),
				list(R::Applications).with_param("status", "pending")?,
			],
			Page::Dependents => vec![list(R::Dependents)],
			Page::Rewards => vec![list(R::Rewards), list(R::Points)],
			Page::Referrals => vec![list(R::Referrals), list(R::Points)],
			Page::Achievements => vec![list(R::Achievements), list(R::Points)],
			Page::Agents => vec![list(R::Agents), list(R::ClientAssignments)],
			Page::ClientAssignments => vec![list(R::ClientAssignments), list(R::Agents)],
			Page::AccessRequests => vec![
				list(R::AccessRequests).with_param("status", "pending")?,
				list(R::AccessRequests),
			],
			Page::Commissions => vec![list(R::Commissions), list(R::Policies)],
			Page::Analytics => vec![list(R::Analytics), list(R::Commissions)],
		};
		Ok(keys)
	}

	pub fn sections(&self) -> &'static [Section] {
		use Section::*;
		match self {
			Page::Overview => &[OrganizationFilter],
			Page::Policies => &[EditRecords, DeleteRecords, OrganizationFilter],
			Page::Applications => &[EditRecords, OrganizationFilter],
			Page::Dependents => &[EditRecords, DeleteRecords],
			Page::Rewards => &[AwardPoints, EditRecords],
			Page::Referrals => &[AwardPoints],
			Page::Achievements => &[EditRecords],
			Page::Agents => &[AwardPoints, EditRecords, DeleteRecords, OrganizationFilter],
			Page::ClientAssignments => &[EditRecords, DeleteRecords],
			Page::AccessRequests => &[EditRecords, SystemSettings],
			Page::Commissions => &[OrganizationFilter],
			Page::Analytics => &[OrganizationFilter, SystemSettings],
		}
	}
}

impl fmt::Display for Page {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.slug())
	}
}

impl FromStr for Page {
	type Err = DashboardError;

	fn from_str(s: &str) -> Result<Self> {
		let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
		Page::all()
			.iter()
			.copied()
			.find(|page| page.slug() == normalized)
			.ok_or_else(|| DashboardError::UnknownName {
				what: "page",
				value: s.to_string(),
			})
	}
}

/// Guarded region inside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
	AwardPoints,
	EditRecords,
	DeleteRecords,
	/// Organization picker for cross-tenant views.
	OrganizationFilter,
	SystemSettings,
}

impl Section {
	pub fn is_visible(&self, state: &IdentityState, gate: CapabilityGate) -> bool {
		match self {
			Section::AwardPoints => CapabilityGuard::new(gate, Capability::Write)
				.and(RoleGuard::new(RoleSet::of([RoleLabel::TenantAdmin, RoleLabel::Agent])))
				.evaluate(state),
			Section::EditRecords => CapabilityGuard::new(gate, Capability::Write).evaluate(state),
			Section::DeleteRecords => CapabilityGuard::new(gate, Capability::Delete).evaluate(state),
			Section::OrganizationFilter => {
				PrivilegeGuard::new(PrivilegeLevel::SUPER_ADMIN).evaluate(state)
			}
			Section::SystemSettings => {
				CapabilityGuard::new(gate, Capability::ManageSystem).evaluate(state)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::principal;

	fn visible(page: Page, level: u8) -> Vec<Section> {
		let state = IdentityState::Authenticated(principal(level, 7));
		page.sections()
			.iter()
			.copied()
			.filter(|s| s.is_visible(&state, CapabilityGate::default()))
			.collect()
	}

	#[test]
	fn sections_follow_capabilities() {
		assert_eq!(
			visible(Page::Agents, 0),
			[
				Section::AwardPoints,
				Section::EditRecords,
				Section::DeleteRecords,
				Section::OrganizationFilter
			]
		);
		assert_eq!(
			visible(Page::Agents, 1),
			[Section::AwardPoints, Section::EditRecords, Section::DeleteRecords]
		);
		assert_eq!(visible(Page::Policies, 2), [Section::EditRecords]);
		assert!(visible(Page::Policies, 3).is_empty());
		assert_eq!(visible(Page::Analytics, 0).len(), 2);
	}

	#[test]
	fn no_section_renders_without_identity() {
		for page in Page::all() {
			for section in page.sections() {
				assert!(!section.is_visible(&IdentityState::Loading, CapabilityGate::default()));
				assert!(!section.is_visible(
					&IdentityState::Unauthenticated,
					CapabilityGate::default()
				));
			}
		}
	}

	#[test]
	fn queries_are_derived_from_scope() {
		let scope = OrganizationScope::for_principal(&principal(1, 7));
		let keys = Page::Agents.queries(scope).unwrap();
		let paths: Vec<_> = keys.iter().map(QueryKey::path).collect();
		assert_eq!(
			paths,
			[
				"/api/agents?organizationId=7",
				"/api/client-assignments?organizationId=7"
			]
		);

		let keys = Page::Rewards.queries(scope).unwrap();
		assert_eq!(keys[0].path(), "/api/rewards");
	}

	#[test]
	fn every_page_builds_its_queries() {
		let scope = OrganizationScope::for_principal(&principal(0, 1));
		for page in Page::all() {
			assert!(!page.queries(scope).unwrap().is_empty(), "{page}");
		}
	}

	#[test]
	fn slugs_round_trip_through_from_str() {
		for page in Page::all() {
			assert_eq!(page.slug().parse::<Page>().unwrap(), *page);
		}
		assert!("billing".parse::<Page>().is_err());
		assert_eq!(Page::Overview.route(), "/dashboard");
		assert_eq!(Page::AccessRequests.route(), "/dashboard/access-requests");
	}
}
