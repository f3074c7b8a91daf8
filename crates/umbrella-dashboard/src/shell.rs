// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dashboard shell.
//!
//! Enforces a page-wide role precondition and supplies the chrome (title,
//! header, navigation). The shell moves through three states:
//!
//! ```text
//!   Loading ──identity resolved──► Authorized  (chrome + body)
//!                      └─────────► Denied      (fixed message, no retry)
//! ```

use serde::Serialize;
use tracing::debug;
use umbrella_access::{
	Guard, IdentityState, OrganizationId, Principal, PrivilegeLevel, RoleLabel, RoleRequirement,
	RoleSet,
};

use crate::navigation::{NavLink, Navigation};

pub const ACCESS_RESTRICTED_TITLE: &str = "Access restricted";
pub const ACCESS_RESTRICTED_MESSAGE: &str = "You do not have permission to view this page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellState {
	Loading,
	Denied,
	Authorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
	title: String,
	required_roles: Option<RoleSet>,
}

impl DashboardLayout {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			required_roles: None,
		}
	}

	/// Without this, the page only requires an authenticated principal.
	pub fn require_roles(mut self, roles: RoleSet) -> Self {
		self.required_roles = Some(roles);
		self
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn required_roles(&self) -> Option<&RoleSet> {
		self.required_roles.as_ref()
	}

	pub fn requirement(&self) -> RoleRequirement {
		match &self.required_roles {
			Some(roles) => RoleRequirement::roles(roles.clone()),
			None => RoleRequirement::authenticated(),
		}
	}

	pub fn state(&self, identity: &IdentityState) -> ShellState {
		if identity.is_loading() {
			return ShellState::Loading;
		}
		if self.requirement().evaluate(identity) {
			ShellState::Authorized
		} else {
			debug!(
				page = %self.title,
				required = ?self.required_roles,
				authenticated = identity.principal().is_some(),
				"page denied"
			);
			ShellState::Denied
		}
	}

	/// `body` is only invoked for an authorized principal.
	pub fn render<T, F>(&self, identity: &IdentityState, navigation: &Navigation, body: F) -> ShellView<T>
	where
		F: FnOnce() -> T,
	{
		match (self.state(identity), identity.principal()) {
			(ShellState::Authorized, Some(principal)) => ShellView::Authorized {
				chrome: Chrome {
					title: self.title.clone(),
					header: Header::for_principal(principal),
					navigation: navigation.visible(identity),
				},
				body: body(),
			},
			(ShellState::Loading, _) => ShellView::Loading {
				title: self.title.clone(),
			},
			_ => ShellView::denied(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ShellView<T> {
	/// Skeleton placeholder.
	Loading { title: String },
	Denied {
		title: &'static str,
		message: &'static str,
	},
	Authorized { chrome: Chrome, body: T },
}

impl<T> ShellView<T> {
	fn denied() -> Self {
		ShellView::Denied {
			title: ACCESS_RESTRICTED_TITLE,
			message: ACCESS_RESTRICTED_MESSAGE,
		}
	}

	pub fn state(&self) -> ShellState {
		match self {
			ShellView::Loading { .. } => ShellState::Loading,
			ShellView::Denied { .. } => ShellState::Denied,
			ShellView::Authorized { .. } => ShellState::Authorized,
		}
	}

	pub fn body(&self) -> Option<&T> {
		match self {
			ShellView::Authorized { body, .. } => Some(body),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chrome {
	pub title: String,
	pub header: Header,
	pub navigation: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
	pub email: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	pub role: RoleLabel,
	pub privilege_level: PrivilegeLevel,
	pub organization_id: OrganizationId,
}

impl Header {
	fn for_principal(principal: &Principal) -> Self {
		Self {
			email: principal.email.clone(),
			display_name: principal.display_name.clone(),
			role: principal.role_label(),
			privilege_level: principal.privilege_level,
			organization_id: principal.organization_id,
		}
	}
}
