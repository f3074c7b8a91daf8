// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Page loading.
//!
//! A page load resolves identity, runs the shell precondition and, only when
//! authorized, issues the page's queries in parallel. Each query resolves or
//! fails on its own. Cancelling the load abandons whatever is in flight and
//! leaves the cache untouched. The cache follows the resolved principal: a
//! different principal starts from an empty cache, and a missing session or a
//! 401 clears it.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use umbrella_access::{CapabilityGate, IdentityState, OrganizationId, Principal};
use umbrella_identity::IdentityResolver;

use crate::cache::QueryCache;
use crate::client::{RequestOptions, Transport};
use crate::error::{ApiError, DashboardError, Result};
use crate::navigation::Navigation;
use crate::pages::{Page, Section};
use crate::query::QueryKey;
use crate::scope::OrganizationScope;
use crate::shell::{ShellState, ShellView};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBody {
	pub page: Page,
	pub scope: String,
	pub sections: Vec<Section>,
	pub queries: Vec<QueryOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
	pub key: String,
	pub path: String,
	#[serde(flatten)]
	pub result: QueryResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
	Ok { data: Value, cached: bool },
	Failed { error: String },
}

impl QueryResult {
	pub fn data(&self) -> Option<&Value> {
		match self {
			QueryResult::Ok { data, .. } => Some(data),
			QueryResult::Failed { .. } => None,
		}
	}
}

enum Fetched {
	Cached(Value),
	Fresh(Value),
}

pub struct PageLoader {
	resolver: Arc<IdentityResolver>,
	transport: Arc<dyn Transport>,
	cache: Arc<QueryCache>,
	gate: CapabilityGate,
	navigation: Navigation,
}

impl PageLoader {
	pub fn new(
		resolver: Arc<IdentityResolver>,
		transport: Arc<dyn Transport>,
		cache: Arc<QueryCache>,
		gate: CapabilityGate,
	) -> Self {
		Self {
			resolver,
			transport,
			cache,
			gate,
			navigation: Navigation::standard(),
		}
	}

	pub fn with_navigation(mut self, navigation: Navigation) -> Self {
		self.navigation = navigation;
		self
	}

	pub fn navigation(&self) -> &Navigation {
		&self.navigation
	}

	/// Load `page`. `organization` narrows a super admin's view and is ignored
	/// for everyone else.
	#[instrument(skip(self, cancel), fields(page = %page))]
	pub async fn load(
		&self,
		page: Page,
		organization: Option<OrganizationId>,
		cancel: &CancellationToken,
	) -> Result<ShellView<PageBody>> {
		let principal = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(DashboardError::Cancelled),
			principal = self.resolver.current_principal() => principal,
		};
		match &principal {
			Some(principal) => {
				self.cache.bind(principal);
			}
			None => self.cache.clear(),
		}
		let state = IdentityState::from(principal);
		let layout = page.layout();

		let principal = match (layout.state(&state), state.principal()) {
			(ShellState::Authorized, Some(principal)) => principal,
			(shell, _) => {
				debug!(?shell, "page not authorized, skipping queries");
				return Ok(layout.render(&state, &self.navigation, || PageBody::empty(page)));
			}
		};

		let scope = OrganizationScope::for_principal_filtered(principal, organization);
		let keys = page.queries(scope)?;

		let results = tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!("page load cancelled");
				return Err(DashboardError::Cancelled);
			}
			results = join_all(keys.iter().map(|key| self.fetch(principal, key))) => results,
		};

		let mut unauthorized = false;
		let queries = keys
			.into_iter()
			.zip(results)
			.map(|(key, result)| {
				let result = match result {
					Ok(Fetched::Cached(data)) => QueryResult::Ok { data, cached: true },
					Ok(Fetched::Fresh(data)) => {
						self.cache.insert(principal, key.clone(), data.clone());
						QueryResult::Ok {
							data,
							cached: false,
						}
					}
					Err(e) => {
						unauthorized |= matches!(e, ApiError::Unauthorized);
						warn!(query = %key, error = %e, "query failed");
						QueryResult::Failed {
							error: e.to_string(),
						}
					}
				};
				QueryOutcome {
					key: key.cache_key(),
					path: key.path(),
					result,
				}
			})
			.collect();

		if unauthorized {
			self.cache.clear();
			self.resolver.invalidate();
		}

		let sections = page
			.sections()
			.iter()
			.copied()
			.filter(|section| section.is_visible(&state, self.gate))
			.collect();

		Ok(layout.render(&state, &self.navigation, || PageBody {
			page,
			scope: scope.to_string(),
			sections,
			queries,
		}))
	}

	async fn fetch(
		&self,
		principal: &Principal,
		key: &QueryKey,
	) -> std::result::Result<Fetched, ApiError> {
		if let Some(data) = self.cache.get(principal, key) {
			return Ok(Fetched::Cached(data));
		}
		self.transport
			.request(&key.path(), RequestOptions::get())
			.await
			.map(Fetched::Fresh)
	}
}

impl PageBody {
	fn empty(page: Page) -> Self {
		Self {
			page,
			scope: String::new(),
			sections: Vec::new(),
			queries: Vec::new(),
		}
	}
}
