// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Create, update and delete against the resource API.
//!
//! Every mutation is checked against the capability gate before a request is
//! made. On success the cached read queries of the affected resource are
//! dropped before [`MutationRunner::run`] returns. On failure the cache is left
//! untouched and exactly one error notification is emitted.
//!
//! Row paths are built from the same [`QueryKey`] as reads, so updates and
//! deletes on organization-scoped resources carry the caller's organization.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use umbrella_access::{
	AccessError, Capability, CapabilityGate, IdentityState, Principal, PrincipalId,
};
use umbrella_identity::IdentityResolver;

use crate::cache::QueryCache;
use crate::client::{RequestOptions, Transport};
use crate::error::{ApiError, Result};
use crate::notify::{Notification, Notifier};
use crate::query::{QueryKey, ORGANIZATION_PARAM};
use crate::resource::ResourceKind;
use crate::scope::OrganizationScope;

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
	Create { kind: ResourceKind, body: Value },
	Update {
		kind: ResourceKind,
		id: String,
		body: Value,
	},
	Delete { kind: ResourceKind, id: String },
}

impl Mutation {
	pub fn create(kind: ResourceKind, body: Value) -> Self {
		Mutation::Create { kind, body }
	}

	pub fn update(kind: ResourceKind, id: impl ToString, body: Value) -> Self {
		Mutation::Update {
			kind,
			id: id.to_string(),
			body,
		}
	}

	pub fn delete(kind: ResourceKind, id: impl ToString) -> Self {
		Mutation::Delete {
			kind,
			id: id.to_string(),
		}
	}

	/// Credit loyalty points to a principal.
	pub fn award_points(recipient: PrincipalId, points: i64, reason: impl Into<String>) -> Self {
		Mutation::Create {
			kind: ResourceKind::Points,
			body: json!({
				"userId": recipient,
				"points": points,
				"reason": reason.into(),
			}),
		}
	}

	pub fn kind(&self) -> ResourceKind {
		match self {
			Mutation::Create { kind, .. }
			| Mutation::Update { kind, .. }
			| Mutation::Delete { kind, .. } => *kind,
		}
	}

	pub fn capability(&self) -> Capability {
		match self {
			Mutation::Create { .. } | Mutation::Update { .. } => Capability::Write,
			Mutation::Delete { .. } => Capability::Delete,
		}
	}

	fn verb(&self) -> &'static str {
		match self {
			Mutation::Create { .. } => "create",
			Mutation::Update { .. } => "update",
			Mutation::Delete { .. } => "delete",
		}
	}

	/// Path and options for the request. Organization-scoped bodies and row
	/// paths carry the caller's own organization unless the caller is a super
	/// admin.
	fn request(&self, scope: OrganizationScope) -> Result<(String, RequestOptions)> {
		let kind = self.kind();
		let item_path = |id: &str| QueryKey::item_in(kind, id, scope).map(|key| key.path());
		let scoped_body = |body: &Value| {
			let mut body = body.clone();
			if let (true, Some(org), Some(fields)) =
				(kind.is_scoped(), scope.organization_id(), body.as_object_mut())
			{
				fields.insert(ORGANIZATION_PARAM.to_string(), json!(org));
			}
			body
		};

		let request = match self {
			Mutation::Create { body, .. } => (kind.path(), RequestOptions::post(scoped_body(body))),
			Mutation::Update { id, body, .. } => {
				(item_path(id)?, RequestOptions::patch(scoped_body(body)))
			}
			Mutation::Delete { id, .. } => (item_path(id)?, RequestOptions::delete()),
		};
		Ok(request)
	}
}

pub struct MutationRunner {
	transport: Arc<dyn Transport>,
	cache: Arc<QueryCache>,
	resolver: Arc<IdentityResolver>,
	gate: CapabilityGate,
	notifier: Notifier,
}

impl MutationRunner {
	pub fn new(
		transport: Arc<dyn Transport>,
		cache: Arc<QueryCache>,
		resolver: Arc<IdentityResolver>,
		gate: CapabilityGate,
		notifier: Notifier,
	) -> Self {
		Self {
			transport,
			cache,
			resolver,
			gate,
			notifier,
		}
	}

	#[instrument(skip(self, mutation), fields(resource = %mutation.kind(), verb = mutation.verb()))]
	pub async fn run(&self, mutation: Mutation) -> Result<Value> {
		let title = format!("Could not {} {}", mutation.verb(), mutation.kind());

		let (path, options) = match self.prepare(&mutation).await {
			Ok(request) => request,
			Err(e) => {
				warn!(error = %e, "mutation refused");
				self.notifier.notify(Notification::error(&title, e.to_string()));
				return Err(e);
			}
		};

		match self.transport.request(&path, options).await {
			Ok(value) => {
				self.cache.invalidate_resource(mutation.kind());
				info!(path = %path, "mutation applied");
				self.notifier.notify(Notification::success(
					format!("{} {}d", capitalize(mutation.kind().as_str()), mutation.verb()),
					path,
				));
				Ok(value)
			}
			Err(e) => {
				if matches!(e, ApiError::Unauthorized) {
					self.cache.clear();
					self.resolver.invalidate();
				}
				self.notifier.notify(Notification::error(&title, e.to_string()));
				Err(e.into())
			}
		}
	}

	async fn prepare(&self, mutation: &Mutation) -> Result<(String, RequestOptions)> {
		let principal = self.authorize(mutation).await?;
		self.cache.bind(&principal);
		mutation.request(OrganizationScope::for_principal(&principal))
	}

	async fn authorize(&self, mutation: &Mutation) -> Result<Principal> {
		let Some(principal) = self.resolver.current_principal().await else {
			return Err(AccessError::Unauthenticated.into());
		};
		let state = IdentityState::Authenticated(principal.clone());
		self.gate.require(&state, mutation.capability())?;
		Ok(principal)
	}
}

fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DashboardError;
	use crate::notify::{self, drain};
	use crate::test_support::{api, mount_session, principal, resolver};
	use wiremock::matchers::{body_partial_json, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	struct Harness {
		runner: MutationRunner,
		cache: Arc<QueryCache>,
		resolver: Arc<IdentityResolver>,
		rx: tokio::sync::mpsc::UnboundedReceiver<Notification>,
	}

	async fn harness(server: &MockServer, who: Option<(u8, i64)>) -> Harness {
		mount_session(server, who).await;
		let cache = Arc::new(QueryCache::new());
		let resolver = resolver(server);
		let (notifier, rx) = notify::channel();
		let runner = MutationRunner::new(
			api(server),
			cache.clone(),
			resolver.clone(),
			CapabilityGate::default(),
			notifier,
		);
		Harness {
			runner,
			cache,
			resolver,
			rx,
		}
	}

	fn errors(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Notification>) -> usize {
		drain(rx).iter().filter(|n| n.is_error()).count()
	}

	#[test]
	fn scoped_bodies_get_own_organization() {
		let tenant = OrganizationScope::for_principal(&principal(2, 7));
		let (path, options) = Mutation::create(
			ResourceKind::Dependents,
			json!({"name": "Ada", "organizationId": 99}),
		)
		.request(tenant)
		.unwrap();
		assert_eq!(path, "/api/dependents");
		assert_eq!(options.body.unwrap()["organizationId"], json!(7));

		let (path, options) = Mutation::update(ResourceKind::Rewards, 3, json!({"name": "Mug"}))
			.request(tenant)
			.unwrap();
		assert_eq!(path, "/api/rewards/3");
		assert!(options.body.unwrap().get("organizationId").is_none());
	}

	#[test]
	fn row_paths_carry_scope() {
		let tenant = OrganizationScope::for_principal(&principal(1, 7));
		let (path, _) = Mutation::delete(ResourceKind::Policies, 13)
			.request(tenant)
			.unwrap();
		assert_eq!(path, "/api/policies/13?organizationId=7");

		let root = OrganizationScope::for_principal(&principal(0, 7));
		let (path, _) = Mutation::delete(ResourceKind::Policies, 13)
			.request(root)
			.unwrap();
		assert_eq!(path, "/api/policies/13");
	}

	#[test]
	fn capabilities_follow_verb() {
		assert_eq!(
			Mutation::award_points(PrincipalId::new(4), 50, "referral").capability(),
			Capability::Write
		);
		assert_eq!(
			Mutation::delete(ResourceKind::Policies, 1).capability(),
			Capability::Delete
		);
	}

	#[tokio::test]
	async fn success_invalidates_reads_before_returning() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((2, 7))).await;
		Mock::given(method("POST"))
			.and(path("/api/points"))
			.and(body_partial_json(json!({"points": 25, "organizationId": 7})))
			.respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 90})))
			.expect(1)
			.mount(&server)
			.await;

		let p = principal(2, 7);
		h.cache.bind(&p);
		h.cache.insert(&p, QueryKey::list(ResourceKind::Points, &p), json!([]));
		h.cache.insert(&p, QueryKey::list(ResourceKind::Policies, &p), json!([]));

		let value = h
			.runner
			.run(Mutation::award_points(PrincipalId::new(4), 25, "quote accepted"))
			.await
			.unwrap();

		assert_eq!(value, json!({"id": 90}));
		assert_eq!(h.cache.keys(), vec!["policies|organizationId=7".to_string()]);
		assert_eq!(errors(&mut h.rx), 0);
	}

	#[tokio::test]
	async fn failure_leaves_cache_and_notifies_once() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((1, 7))).await;
		Mock::given(method("DELETE"))
			.and(path("/api/policies/12"))
			.respond_with(
				ResponseTemplate::new(500).set_body_json(json!({"error": "policy is locked"})),
			)
			.expect(1)
			.mount(&server)
			.await;

		let p = principal(1, 7);
		let key = QueryKey::list(ResourceKind::Policies, &p);
		h.cache.bind(&p);
		h.cache.insert(&p, key.clone(), json!([{"id": 12}]));

		let err = h
			.runner
			.run(Mutation::delete(ResourceKind::Policies, 12))
			.await
			.unwrap_err();

		assert!(err.to_string().contains("policy is locked"));
		assert_eq!(h.cache.get(&p, &key), Some(json!([{"id": 12}])));
		assert_eq!(errors(&mut h.rx), 1);
	}

	#[tokio::test]
	async fn missing_capability_sends_nothing() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((2, 7))).await;
		Mock::given(method("DELETE"))
			.respond_with(ResponseTemplate::new(204))
			.expect(0)
			.mount(&server)
			.await;

		let err = h
			.runner
			.run(Mutation::delete(ResourceKind::Agents, 3))
			.await
			.unwrap_err();

		assert!(matches!(
			err,
			DashboardError::Access(AccessError::MissingCapability(
				Capability::Delete
			))
		));
		assert_eq!(errors(&mut h.rx), 1);
	}

	#[tokio::test]
	async fn unauthenticated_mutation_is_refused() {
		let server = MockServer::start().await;
		let mut h = harness(&server, None).await;
		Mock::given(method("POST"))
			.and(path("/api/points"))
			.respond_with(ResponseTemplate::new(201))
			.expect(0)
			.mount(&server)
			.await;

		let result = h
			.runner
			.run(Mutation::award_points(PrincipalId::new(4), 5, "x"))
			.await;

		assert!(matches!(
			result,
			Err(DashboardError::Access(AccessError::Unauthenticated))
		));
		assert_eq!(errors(&mut h.rx), 1);
	}

	#[tokio::test]
	async fn unauthorized_response_invalidates_identity() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((1, 7))).await;
		Mock::given(method("PATCH"))
			.and(path("/api/agents/8"))
			.respond_with(ResponseTemplate::new(401))
			.expect(1)
			.mount(&server)
			.await;

		let result = h
			.runner
			.run(Mutation::update(ResourceKind::Agents, 8, json!({"active": false})))
			.await;

		assert!(matches!(
			result,
			Err(DashboardError::Api(ApiError::Unauthorized))
		));
		assert!(h.resolver.state().is_loading());
		assert!(h.cache.is_empty());
		assert_eq!(errors(&mut h.rx), 1);
	}

	#[tokio::test]
	async fn tenant_admin_row_mutations_stay_in_own_org() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((1, 7))).await;
		Mock::given(method("DELETE"))
			.and(path("/api/policies/13"))
			.and(query_param("organizationId", "7"))
			.respond_with(ResponseTemplate::new(204))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("PATCH"))
			.and(path("/api/dependents/4"))
			.and(query_param("organizationId", "7"))
			.and(body_partial_json(json!({"organizationId": 7})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
			.expect(1)
			.mount(&server)
			.await;

		h.runner
			.run(Mutation::delete(ResourceKind::Policies, 13))
			.await
			.unwrap();
		h.runner
			.run(Mutation::update(
				ResourceKind::Dependents,
				4,
				json!({"name": "Ada", "organizationId": 9}),
			))
			.await
			.unwrap();

		let requests = server.received_requests().await.unwrap();
		for request in requests.iter().filter(|r| r.method.as_str() != "GET") {
			assert_eq!(request.url.query(), Some("organizationId=7"), "{}", request.url);
		}
		assert_eq!(errors(&mut h.rx), 0);
	}

	#[tokio::test]
	async fn injected_id_is_refused_before_sending() {
		let server = MockServer::start().await;
		let mut h = harness(&server, Some((1, 7))).await;
		Mock::given(method("DELETE"))
			.respond_with(ResponseTemplate::new(204))
			.expect(0)
			.mount(&server)
			.await;

		let err = h
			.runner
			.run(Mutation::delete(ResourceKind::Policies, "12?organizationId=9"))
			.await
			.unwrap_err();

		assert!(matches!(err, DashboardError::InvalidId(_)));
		assert_eq!(errors(&mut h.rx), 1);
	}
}
