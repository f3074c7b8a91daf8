// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conditional render guards.
//!
//! A guard is a pure decision over the current [`IdentityState`]. Rendering
//! takes the children as a closure so privileged content is only built once
//! the decision is positive. Every guard renders its fallback while identity
//! is still loading and for unauthenticated visitors.

use crate::capability::{Capability, CapabilityGate};
use crate::requirement::RoleRequirement;
use crate::state::IdentityState;
use crate::types::{PrivilegeLevel, RoleSet};

pub trait Guard: Send + Sync {
	/// True when the guarded children may be rendered.
	fn evaluate(&self, state: &IdentityState) -> bool;

	/// Render `children` or nothing.
	fn render<T, F>(&self, state: &IdentityState, children: F) -> Option<T>
	where
		F: FnOnce() -> T,
		Self: Sized,
	{
		self.evaluate(state).then(children)
	}

	/// Render `children` or `fallback`.
	fn render_or<T, F, G>(&self, state: &IdentityState, children: F, fallback: G) -> T
	where
		F: FnOnce() -> T,
		G: FnOnce() -> T,
		Self: Sized,
	{
		if self.evaluate(state) {
			children()
		} else {
			fallback()
		}
	}
}

/// Renders iff the principal holds any of the listed roles.
#[derive(Debug, Clone)]
pub struct RoleGuard {
	roles: RoleSet,
}

impl RoleGuard {
	pub fn new(roles: RoleSet) -> Self {
		Self { roles }
	}
}

impl Guard for RoleGuard {
	fn evaluate(&self, state: &IdentityState) -> bool {
		state
			.classification()
			.is_some_and(|c| c.has_any_role(&self.roles))
	}
}

/// Renders iff the principal's level is at or above `min_level` in authority.
#[derive(Debug, Clone, Copy)]
pub struct PrivilegeGuard {
	min_level: PrivilegeLevel,
}

impl PrivilegeGuard {
	pub fn new(min_level: PrivilegeLevel) -> Self {
		Self { min_level }
	}
}

impl Guard for PrivilegeGuard {
	fn evaluate(&self, state: &IdentityState) -> bool {
		state
			.classification()
			.is_some_and(|c| c.has_minimum_privilege_level(self.min_level))
	}
}

/// Generic boolean gate without role semantics, for ownership checks and
/// feature switches. It still waits for an authenticated identity.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalRender {
	condition: bool,
}

impl ConditionalRender {
	pub fn new(condition: bool) -> Self {
		Self { condition }
	}
}

impl Guard for ConditionalRender {
	fn evaluate(&self, state: &IdentityState) -> bool {
		self.condition && state.principal().is_some()
	}
}

/// Renders iff the gate grants `capability`.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityGuard {
	gate: CapabilityGate,
	capability: Capability,
}

impl CapabilityGuard {
	pub fn new(gate: CapabilityGate, capability: Capability) -> Self {
		Self { gate, capability }
	}
}

impl Guard for CapabilityGuard {
	fn evaluate(&self, state: &IdentityState) -> bool {
		self.gate.has_permission(state, self.capability)
	}
}

/// Renders iff a declarative [`RoleRequirement`] holds.
impl Guard for RoleRequirement {
	fn evaluate(&self, state: &IdentityState) -> bool {
		state
			.classification()
			.is_some_and(|c| self.is_satisfied_by(&c))
	}
}

/// Composition of guards.
pub trait GuardExt: Guard + Sized {
	fn and<G: Guard>(self, other: G) -> And<Self, G> {
		And(self, other)
	}

	fn or<G: Guard>(self, other: G) -> Or<Self, G> {
		Or(self, other)
	}
}

impl<T: Guard> GuardExt for T {}

#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<A: Guard, B: Guard> Guard for And<A, B> {
	fn evaluate(&self, state: &IdentityState) -> bool {
		self.0.evaluate(state) && self.1.evaluate(state)
	}
}

#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

impl<A: Guard, B: Guard> Guard for Or<A, B> {
	fn evaluate(&self, state: &IdentityState) -> bool {
		self.0.evaluate(state) || self.1.evaluate(state)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{OrganizationId, Principal, PrincipalId, RoleLabel};
	use proptest::prelude::*;
	use std::cell::Cell;

	fn authenticated(level: u8) -> IdentityState {
		IdentityState::Authenticated(Principal::new(
			PrincipalId::new(9),
			"p@example.com",
			OrganizationId::new(7),
			PrivilegeLevel::new(level),
		))
	}

	fn state_strategy() -> impl Strategy<Value = IdentityState> {
		prop_oneof![
			Just(IdentityState::Loading),
			Just(IdentityState::Unauthenticated),
			any::<u8>().prop_map(authenticated),
		]
	}

	#[test]
	fn role_guard_renders_children_for_matching_role() {
		let guard = RoleGuard::new(RoleSet::of([RoleLabel::Agent]));
		assert_eq!(guard.render(&authenticated(2), || "commission table"), Some("commission table"));
		assert_eq!(guard.render(&authenticated(3), || "commission table"), None);
	}

	#[test]
	fn privilege_guard_uses_threshold() {
		let guard = PrivilegeGuard::new(PrivilegeLevel::TENANT_ADMIN);
		assert!(guard.evaluate(&authenticated(0)));
		assert!(guard.evaluate(&authenticated(1)));
		assert!(!guard.evaluate(&authenticated(2)));
	}

	#[test]
	fn render_or_uses_fallback() {
		let guard = PrivilegeGuard::new(PrivilegeLevel::SUPER_ADMIN);
		let rendered = guard.render_or(&authenticated(1), || "all orgs", || "own org");
		assert_eq!(rendered, "own org");
	}

	#[test]
	fn children_are_not_built_when_denied() {
		let built = Cell::new(false);
		let guard = RoleGuard::new(RoleSet::of([RoleLabel::TenantAdmin]));
		let out = guard.render(&authenticated(3), || built.set(true));
		assert!(out.is_none());
		assert!(!built.get());
	}

	#[test]
	fn every_guard_falls_back_without_a_principal() {
		let gate = CapabilityGate::default();
		for state in [IdentityState::Loading, IdentityState::Unauthenticated] {
			assert!(RoleGuard::new(RoleSet::of(RoleLabel::all().iter().copied()))
				.render(&state, || ())
				.is_none());
			assert!(PrivilegeGuard::new(PrivilegeLevel::LOWEST).render(&state, || ()).is_none());
			assert!(ConditionalRender::new(true).render(&state, || ()).is_none());
			assert!(CapabilityGuard::new(gate, Capability::Read).render(&state, || ()).is_none());
			assert!(RoleRequirement::authenticated().render(&state, || ()).is_none());
		}
	}

	#[test]
	fn conditional_render_ignores_role() {
		assert!(ConditionalRender::new(true).evaluate(&authenticated(200)));
		assert!(!ConditionalRender::new(false).evaluate(&authenticated(0)));
	}

	#[test]
	fn capability_guard_follows_gate() {
		let guard = CapabilityGuard::new(CapabilityGate::default(), Capability::Delete);
		assert!(guard.evaluate(&authenticated(1)));
		assert!(!guard.evaluate(&authenticated(2)));
	}

	#[test]
	fn combinators() {
		let is_owner = ConditionalRender::new(true);
		let admin = PrivilegeGuard::new(PrivilegeLevel::TENANT_ADMIN);
		let agent_owner = RoleGuard::new(RoleSet::of([RoleLabel::Agent])).and(is_owner);
		assert!(agent_owner.evaluate(&authenticated(2)));
		assert!(!agent_owner.evaluate(&authenticated(3)));

		let admin_or_not_owner = admin.or(ConditionalRender::new(false));
		assert!(admin_or_not_owner.evaluate(&authenticated(1)));
		assert!(!admin_or_not_owner.evaluate(&authenticated(2)));
	}

	proptest! {
		#[test]
		fn guard_decisions_are_idempotent(state in state_strategy(), n in any::<u8>(), flag in any::<bool>()) {
			let role = RoleGuard::new(RoleSet::of([RoleLabel::TenantAdmin]));
			let level = PrivilegeGuard::new(PrivilegeLevel::new(n));
			let cond = ConditionalRender::new(flag);

			prop_assert_eq!(role.evaluate(&state), role.evaluate(&state));
			prop_assert_eq!(level.evaluate(&state), level.evaluate(&state));
			prop_assert_eq!(cond.evaluate(&state), cond.evaluate(&state));
			prop_assert_eq!(role.render(&state, || 1), role.render(&state, || 1));
		}

		#[test]
		fn super_admin_passes_every_role_guard(labels in proptest::collection::vec(0usize..4, 0..4)) {
			let roles = RoleSet::of(labels.into_iter().map(|i| RoleLabel::all()[i]));
			prop_assert!(RoleGuard::new(roles).evaluate(&authenticated(0)));
		}
	}
}
