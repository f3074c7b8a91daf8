// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role classification.
//!
//! The privilege level is canonical. The role label is derived from it and
//! kept alongside for display and role-set checks. The SuperAdmin bypass lives
//! here and nowhere else: every role and level check made through a
//! [`Classification`] succeeds for level `0`.

use serde::Serialize;
use tracing::instrument;

use crate::types::{OrganizationId, Principal, PrincipalId, PrivilegeLevel, RoleLabel, RoleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
	pub principal_id: PrincipalId,
	pub organization_id: OrganizationId,
	pub role_label: RoleLabel,
	pub privilege_level: PrivilegeLevel,
}

/// Derive the role label and privilege level of `principal`.
pub fn classify(principal: &Principal) -> Classification {
	Classification {
		principal_id: principal.id,
		organization_id: principal.organization_id,
		role_label: principal.role_label(),
		privilege_level: principal.privilege_level,
	}
}

impl Classification {
	pub fn is_super_admin(&self) -> bool {
		self.privilege_level.is_super_admin()
	}

	/// True iff the role label is in `roles`, or the principal is SuperAdmin.
	#[instrument(
		level = "debug",
		skip(self, roles),
		fields(principal_id = %self.principal_id, role = %self.role_label, required = %roles),
		ret
	)]
	pub fn has_any_role(&self, roles: &RoleSet) -> bool {
		self.is_super_admin() || roles.contains(self.role_label)
	}

	/// True iff `privilege_level <= min_level`.
	#[instrument(
		level = "debug",
		skip(self),
		fields(principal_id = %self.principal_id, level = %self.privilege_level),
		ret
	)]
	pub fn has_minimum_privilege_level(&self, min_level: PrivilegeLevel) -> bool {
		self.privilege_level.satisfies(min_level)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn principal(level: u8) -> Principal {
		Principal::new(
			PrincipalId::new(1),
			"user@example.com",
			OrganizationId::new(7),
			PrivilegeLevel::new(level),
		)
	}

	fn role_label_strategy() -> impl Strategy<Value = RoleLabel> {
		prop_oneof![
			Just(RoleLabel::SuperAdmin),
			Just(RoleLabel::TenantAdmin),
			Just(RoleLabel::Agent),
			Just(RoleLabel::Member),
		]
	}

	fn role_set_strategy() -> impl Strategy<Value = RoleSet> {
		proptest::collection::vec(role_label_strategy(), 0..4).prop_map(RoleSet::of)
	}

	#[test]
	fn classify_copies_identity_and_derives_label() {
		let c = classify(&principal(2));
		assert_eq!(c.principal_id, PrincipalId::new(1));
		assert_eq!(c.organization_id, OrganizationId::new(7));
		assert_eq!(c.role_label, RoleLabel::Agent);
		assert_eq!(c.privilege_level, PrivilegeLevel::AGENT);
	}

	#[test]
	fn member_does_not_hold_admin_or_agent() {
		let c = classify(&principal(3));
		let required = RoleSet::parse(["Admin", "Agent"]).unwrap();
		assert!(!c.has_any_role(&required));
	}

	#[test]
	fn tenant_admin_matches_legacy_admin_label() {
		let c = classify(&principal(1));
		assert!(c.has_any_role(&RoleSet::parse(["Admin"]).unwrap()));
	}

	#[test]
	fn super_admin_satisfies_empty_role_set() {
		assert!(classify(&principal(0)).has_any_role(&RoleSet::new()));
		assert!(!classify(&principal(1)).has_any_role(&RoleSet::new()));
	}

	proptest! {
		#[test]
		fn super_admin_holds_every_role_set(roles in role_set_strategy()) {
			prop_assert!(classify(&principal(0)).has_any_role(&roles));
		}

		#[test]
		fn super_admin_meets_every_level(n in any::<u8>()) {
			prop_assert!(classify(&principal(0)).has_minimum_privilege_level(PrivilegeLevel::new(n)));
		}

		#[test]
		fn minimum_level_is_numeric_comparison(level in any::<u8>(), n in any::<u8>()) {
			let c = classify(&principal(level));
			prop_assert_eq!(c.has_minimum_privilege_level(PrivilegeLevel::new(n)), level <= n);
		}

		#[test]
		fn minimum_level_is_monotonic(level in any::<u8>(), n in any::<u8>(), step in any::<u8>()) {
			let c = classify(&principal(level));
			let looser = n.saturating_add(step);
			if c.has_minimum_privilege_level(PrivilegeLevel::new(n)) {
				prop_assert!(c.has_minimum_privilege_level(PrivilegeLevel::new(looser)));
			}
		}

		#[test]
		fn non_super_admin_needs_own_label(level in 1u8..=u8::MAX, roles in role_set_strategy()) {
			let c = classify(&principal(level));
			prop_assert_eq!(c.has_any_role(&roles), roles.contains(c.role_label));
		}
	}
}
