// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization scoping for data fetches.
//!
//! An [`OrganizationScope`] can only be derived from a resolved [`Principal`].
//! There is no constructor that takes a bare organization id, so query
//! parameters, form fields or other client-editable input cannot widen or move
//! the scope of a fetch.

use std::fmt;

use tracing::{debug, warn};
use umbrella_access::{OrganizationId, Principal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrganizationScope(Inner);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Inner {
	All,
	Organization(OrganizationId),
}

impl OrganizationScope {
	/// Own organization for everyone below super admin; all organizations otherwise.
	pub fn for_principal(principal: &Principal) -> Self {
		if principal.is_super_admin() {
			Self(Inner::All)
		} else {
			Self(Inner::Organization(principal.organization_id))
		}
	}

	/// Like [`for_principal`](Self::for_principal), but a super admin may narrow
	/// the scope to a single organization. The filter is ignored for anyone else.
	pub fn for_principal_filtered(principal: &Principal, filter: Option<OrganizationId>) -> Self {
		match filter {
			Some(organization_id) if principal.is_super_admin() => {
				debug!(%organization_id, "super admin narrowed scope");
				Self(Inner::Organization(organization_id))
			}
			Some(requested) => {
				if requested != principal.organization_id {
					warn!(
						principal_id = %principal.id,
						organization_id = %principal.organization_id,
						requested = %requested,
						"ignoring organization filter from non super admin"
					);
				}
				Self::for_principal(principal)
			}
			None => Self::for_principal(principal),
		}
	}

	/// `None` in all-organizations mode.
	pub fn organization_id(&self) -> Option<OrganizationId> {
		match self.0 {
			Inner::All => None,
			Inner::Organization(id) => Some(id),
		}
	}

	pub fn is_all(&self) -> bool {
		matches!(self.0, Inner::All)
	}
}

impl fmt::Display for OrganizationScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Inner::All => f.write_str("all"),
			Inner::Organization(id) => write!(f, "organizationId={id}"),
		}
	}
}
