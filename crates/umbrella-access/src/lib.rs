// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role and access composition for the Umbrella dashboard.
//!
//! Decisions flow from the resolved identity outwards:
//!
//! ```text
//! IdentityState ──► classify() ──► Classification
//!                                    │
//!                 ┌──────────────────┼───────────────────┐
//!                 ▼                  ▼                   ▼
//!          has_any_role()   has_minimum_privilege   CapabilityGate
//!                 │              _level()                │
//!                 └────────► Guard::evaluate() ◄─────────┘
//! ```
//!
//! The numeric [`PrivilegeLevel`] is canonical (`0` is SuperAdmin, the
//! highest authority). [`RoleLabel`]s are derived from it:
//!
//! | level | label        |
//! |-------|--------------|
//! | 0     | SuperAdmin   |
//! | 1     | TenantAdmin  |
//! | 2     | Agent        |
//! | 3+    | Member       |
//!
//! SuperAdmin satisfies every role and level check. That rule is applied in
//! [`Classification`] only; guards and the capability gate inherit it.

pub mod capability;
pub mod classifier;
pub mod error;
pub mod guard;
pub mod requirement;
pub mod state;
pub mod types;

pub use capability::{Capability, CapabilityGate, CapabilityPolicy};
pub use classifier::{classify, Classification};
pub use error::{AccessError, Result};
pub use guard::{
	And, CapabilityGuard, ConditionalRender, Guard, GuardExt, Or, PrivilegeGuard, RoleGuard,
};
pub use requirement::RoleRequirement;
pub use state::IdentityState;
pub use types::{OrganizationId, Principal, PrincipalId, PrivilegeLevel, RoleLabel, RoleSet};
