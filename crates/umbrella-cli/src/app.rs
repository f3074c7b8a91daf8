// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wiring between configuration, the identity resolver and the dashboard.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use umbrella_access::{
	Capability, CapabilityGate, CapabilityPolicy, IdentityState, OrganizationId, Principal,
	PrivilegeLevel, RoleLabel,
};
use umbrella_config::{AccessConfig, UmbrellaConfig};
use umbrella_dashboard::notify::{self, drain};
use umbrella_dashboard::{
	ApiClient, Mutation, MutationRunner, NavLink, Notification, Page, PageBody, PageLoader,
	QueryCache, ShellView,
};
use umbrella_identity::{HttpAuthEndpoint, IdentityResolver};

pub struct App {
	resolver: Arc<IdentityResolver>,
	cache: Arc<QueryCache>,
	gate: CapabilityGate,
	loader: PageLoader,
	mutations: MutationRunner,
	notifications: UnboundedReceiver<Notification>,
}

/// Output of `whoami`.
#[derive(Debug, Serialize)]
pub struct WhoAmI {
	pub state: IdentityState,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<RoleLabel>,
	pub capabilities: Vec<Capability>,
}

impl App {
	pub fn from_config(config: &UmbrellaConfig) -> Result<Self> {
		let gate = capability_gate(&config.access)?;

		let endpoint = HttpAuthEndpoint::from_config(&config.api, &config.auth)
			.context("failed to create session client")?;
		let resolver = Arc::new(
			IdentityResolver::new(Arc::new(endpoint)).with_session_ttl(config.auth.session_ttl),
		);

		let client = Arc::new(
			ApiClient::from_config(&config.api, &config.auth)
				.context("failed to create API client")?,
		);
		let cache = Arc::new(QueryCache::new());
		let (notifier, notifications) = notify::channel();

		Ok(Self {
			loader: PageLoader::new(resolver.clone(), client.clone(), cache.clone(), gate),
			mutations: MutationRunner::new(client, cache.clone(), resolver.clone(), gate, notifier),
			resolver,
			cache,
			gate,
			notifications,
		})
	}

	pub async fn whoami(&self) -> WhoAmI {
		let state = IdentityState::from(self.resolver.current_principal().await);
		let classification = state.classification();
		WhoAmI {
			role: state.principal().map(Principal::role_label),
			capabilities: classification
				.map(|c| self.gate.granted(&c))
				.unwrap_or_default(),
			state,
		}
	}

	pub async fn navigation(&self) -> Vec<NavLink> {
		let state = IdentityState::from(self.resolver.current_principal().await);
		self.loader.navigation().visible(&state)
	}

	pub async fn page(
		&self,
		page: Page,
		organization: Option<OrganizationId>,
		cancel: &CancellationToken,
	) -> Result<ShellView<PageBody>> {
		self.loader
			.load(page, organization, cancel)
			.await
			.with_context(|| format!("failed to load page '{page}'"))
	}

	pub async fn mutate(&self, mutation: Mutation) -> Result<Value> {
		Ok(self.mutations.run(mutation).await?)
	}

	pub async fn logout(&self) -> Result<()> {
		let result = self.resolver.logout().await;
		self.cache.clear();
		result.context("logout request failed")
	}

	pub fn notifications(&mut self) -> Vec<Notification> {
		drain(&mut self.notifications)
	}
}

fn capability_gate(access: &AccessConfig) -> Result<CapabilityGate> {
	let policy = CapabilityPolicy::new(
		PrivilegeLevel::new(access.read_level),
		PrivilegeLevel::new(access.write_level),
		PrivilegeLevel::new(access.delete_level),
		PrivilegeLevel::new(access.manage_system_level),
	)
	.context("invalid [access] thresholds")?;
	Ok(CapabilityGate::new(policy))
}
