// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query keys for scoped data fetches.
//!
//! A [`QueryKey`] yields both the request path and the cache key, so the two
//! can never disagree about scope. For organization-scoped resources:
//!
//! | caller        | path                          | cache key                  |
//! |---------------|-------------------------------|----------------------------|
//! | level > 0     | `/api/agents?organizationId=7`| `agents\|organizationId=7` |
//! | level 0       | `/api/agents`                 | `agents\|all`              |
//!
//! Global catalogs carry no organization and use the `global` marker.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;
use umbrella_access::Principal;

use crate::error::{DashboardError, Result};
use crate::resource::ResourceKind;
use crate::scope::OrganizationScope;

/// Query parameter carrying the organization restriction.
pub const ORGANIZATION_PARAM: &str = "organizationId";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
	kind: ResourceKind,
	id: Option<String>,
	scope: Option<OrganizationScope>,
	params: BTreeMap<String, String>,
}

impl QueryKey {
	/// Collection query scoped to what `principal` may see.
	pub fn list(kind: ResourceKind, principal: &Principal) -> Self {
		Self::list_in(kind, OrganizationScope::for_principal(principal))
	}

	/// Single-row query scoped to what `principal` may see.
	pub fn item(kind: ResourceKind, id: impl fmt::Display, principal: &Principal) -> Result<Self> {
		Self::item_in(kind, id, OrganizationScope::for_principal(principal))
	}

	/// Single-row query under an already derived scope. The id must be a
	/// single path segment.
	pub fn item_in(kind: ResourceKind, id: impl fmt::Display, scope: OrganizationScope) -> Result<Self> {
		let id = id.to_string();
		if id.trim().is_empty() || id.contains(['/', '?', '#']) {
			return Err(DashboardError::InvalidId(id));
		}
		let mut key = Self::list_in(kind, scope);
		key.id = Some(id);
		Ok(key)
	}

	/// Collection query under an already derived scope.
	pub fn list_in(kind: ResourceKind, scope: OrganizationScope) -> Self {
		Self {
			kind,
			id: None,
			scope: kind.is_scoped().then_some(scope),
			params: BTreeMap::new(),
		}
	}

	/// Add a filter parameter. The organization parameter is reserved.
	pub fn with_param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Result<Self> {
		let name = name.into();
		if name.eq_ignore_ascii_case(ORGANIZATION_PARAM) {
			return Err(DashboardError::ReservedParameter(name));
		}
		self.params.insert(name, value.to_string());
		Ok(self)
	}

	pub fn kind(&self) -> ResourceKind {
		self.kind
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	/// `None` for global resources.
	pub fn scope(&self) -> Option<OrganizationScope> {
		self.scope
	}

	/// Request path relative to the API base URL.
	pub fn path(&self) -> String {
		let mut path = self.kind.path();
		if let Some(id) = &self.id {
			path.push('/');
			path.push_str(&urlencoding::encode(id));
		}

		let mut query = form_urlencoded::Serializer::new(String::new());
		let mut any = false;
		if let Some(org) = self.scope.and_then(|s| s.organization_id()) {
			query.append_pair(ORGANIZATION_PARAM, &org.to_string());
			any = true;
		}
		for (name, value) in &self.params {
			query.append_pair(name, value);
			any = true;
		}
		if any {
			path.push('?');
			path.push_str(&query.finish());
		}
		path
	}

	/// Stable cache key, e.g. `agents|organizationId=7` or `agents/42|all|status=active`.
	pub fn cache_key(&self) -> String {
		let mut key = self.kind.as_str().to_string();
		if let Some(id) = &self.id {
			key.push('/');
			key.push_str(id);
		}
		key.push('|');
		match &self.scope {
			Some(scope) => key.push_str(&scope.to_string()),
			None => key.push_str("global"),
		}
		for (name, value) in &self.params {
			key.push('|');
			key.push_str(name);
			key.push('=');
			key.push_str(value);
		}
		key
	}
}

impl fmt::Display for QueryKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.cache_key())
	}
}
