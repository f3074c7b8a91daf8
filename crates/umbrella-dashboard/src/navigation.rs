// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use umbrella_access::{Guard, IdentityState, RoleRequirement};

use crate::pages::Page;

#[derive(Debug, Clone)]
pub struct NavItem {
	pub label: String,
	pub route: String,
	pub requirement: RoleRequirement,
}

impl NavItem {
	pub fn new(label: impl Into<String>, route: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			route: route.into(),
			requirement: RoleRequirement::authenticated(),
		}
	}

	pub fn requires(mut self, requirement: RoleRequirement) -> Self {
		self.requirement = requirement;
		self
	}

	pub fn for_page(page: Page) -> Self {
		let item = Self::new(page.title(), page.route());
		match page.required_roles() {
			Some(roles) => item.requires(RoleRequirement::roles(roles)),
			None => item,
		}
	}
}

/// A navigation entry the current principal may follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
	pub label: String,
	pub route: String,
}

#[derive(Debug, Clone, Default)]
pub struct Navigation {
	items: Vec<NavItem>,
}

impl Navigation {
	pub fn new() -> Self {
		Self::default()
	}

	/// One entry per dashboard page, gated like the page itself.
	pub fn standard() -> Self {
		Page::all()
			.iter()
			.fold(Self::new(), |nav, page| nav.with_item(NavItem::for_page(*page)))
	}

	pub fn with_item(mut self, item: NavItem) -> Self {
		self.items.push(item);
		self
	}

	pub fn items(&self) -> &[NavItem] {
		&self.items
	}

	pub fn visible(&self, state: &IdentityState) -> Vec<NavLink> {
		self.items
			.iter()
			.filter(|item| item.requirement.evaluate(state))
			.map(|item| NavLink {
				label: item.label.clone(),
				route: item.route.clone(),
			})
			.collect()
	}
}
