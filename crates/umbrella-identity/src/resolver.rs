// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Single-writer identity cache.
//!
//! [`IdentityResolver`] owns the only write side of the identity state.
//! Everything else observes it through an [`IdentityHandle`].
//!
//! Lifecycle:
//!
//! ```text
//!   Loading ──first lookup──► Authenticated(p) | Unauthenticated
//!      ▲                              │
//!      └──── invalidate() (401) ──────┤
//!                                     └── logout() ──► Unauthenticated
//! ```
//!
//! A lookup that races with `invalidate()` is discarded and retried once under
//! the new epoch. One that races with `logout()` is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use umbrella_access::{IdentityState, Principal};

use crate::endpoint::AuthEndpoint;
use crate::error::Result;

const LOOKUP_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Default)]
struct Snapshot {
	state: IdentityState,
	resolved_at: Option<Instant>,
}

pub struct IdentityResolver {
	endpoint: Arc<dyn AuthEndpoint>,
	tx: watch::Sender<Snapshot>,
	/// Serializes lookups so concurrent callers share one request.
	lookup: Mutex<()>,
	/// Bumped by every invalidation; lookups started under an older epoch are dropped.
	epoch: AtomicU64,
	/// Number of completed lookups.
	lookups: AtomicU64,
	ttl: Option<Duration>,
}

impl IdentityResolver {
	pub fn new(endpoint: Arc<dyn AuthEndpoint>) -> Self {
		let (tx, _rx) = watch::channel(Snapshot::default());
		Self {
			endpoint,
			tx,
			lookup: Mutex::new(()),
			epoch: AtomicU64::new(0),
			lookups: AtomicU64::new(0),
			ttl: None,
		}
	}

	/// Re-fetch an authenticated principal once it is older than `ttl`.
	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);
		self
	}

	/// Read-only view of the identity state.
	pub fn handle(&self) -> IdentityHandle {
		IdentityHandle {
			rx: self.tx.subscribe(),
		}
	}

	pub fn state(&self) -> IdentityState {
		self.tx.borrow().state.clone()
	}

	/// The current principal, fetching it if the cache is empty or stale.
	///
	/// Endpoint failures resolve to unauthenticated.
	pub async fn current_principal(&self) -> Option<Principal> {
		if let Some(principal) = self.cached() {
			return Some(principal);
		}

		let seen = self.lookups.load(Ordering::SeqCst);
		let _guard = self.lookup.lock().await;

		if self.lookups.load(Ordering::SeqCst) != seen {
			// Another caller finished a lookup while this one waited.
			let snapshot = self.tx.borrow().clone();
			if snapshot.state.is_resolved() && !self.is_stale(&snapshot) {
				return snapshot.state.principal().cloned();
			}
		}

		self.lookup_locked().await
	}

	/// Force a new lookup regardless of the cache.
	pub async fn refresh(&self) -> Option<Principal> {
		let _guard = self.lookup.lock().await;
		self.lookup_locked().await
	}

	/// Drop the cached identity. The next [`current_principal`](Self::current_principal)
	/// call fetches it again. Used when any request comes back 401.
	#[instrument(skip(self))]
	pub fn invalidate(&self) {
		self.epoch.fetch_add(1, Ordering::SeqCst);
		self.tx.send_replace(Snapshot::default());
		debug!("identity invalidated");
	}

	/// End the session. The local state becomes unauthenticated even when the
	/// logout request fails; that failure is still returned.
	#[instrument(skip(self))]
	pub async fn logout(&self) -> Result<()> {
		self.epoch.fetch_add(1, Ordering::SeqCst);
		self.publish_unauthenticated();
		let result = self.endpoint.logout().await;
		self.epoch.fetch_add(1, Ordering::SeqCst);
		self.publish_unauthenticated();
		info!(remote_ok = result.is_ok(), "logged out");
		result
	}

	fn publish_unauthenticated(&self) {
		self.tx.send_replace(Snapshot {
			state: IdentityState::Unauthenticated,
			resolved_at: Some(Instant::now()),
		});
	}

	fn cached(&self) -> Option<Principal> {
		let snapshot = self.tx.borrow();
		if self.is_stale(&snapshot) {
			return None;
		}
		snapshot.state.principal().cloned()
	}

	fn is_stale(&self, snapshot: &Snapshot) -> bool {
		match (self.ttl, snapshot.resolved_at) {
			(Some(ttl), Some(at)) => at.elapsed() >= ttl,
			_ => false,
		}
	}

	async fn lookup_locked(&self) -> Option<Principal> {
		for attempt in 1..=LOOKUP_ATTEMPTS {
			let epoch = self.epoch.load(Ordering::SeqCst);
			let principal = self.fetch().await;
			self.lookups.fetch_add(1, Ordering::SeqCst);

			if self.epoch.load(Ordering::SeqCst) == epoch {
				return self.publish(principal);
			}

			// Logged out while the request was in flight.
			let current = self.state();
			if current.is_resolved() {
				debug!("identity settled during lookup, discarding result");
				return current.principal().cloned();
			}
			debug!(attempt, "identity invalidated during lookup, discarding result");
		}
		None
	}

	async fn fetch(&self) -> Option<Principal> {
		match self.endpoint.fetch_session().await {
			Ok(principal) => principal,
			Err(e) => {
				warn!(error = %e, "session lookup failed, treating as unauthenticated");
				None
			}
		}
	}

	fn publish(&self, principal: Option<Principal>) -> Option<Principal> {
		match &principal {
			Some(p) => debug!(
				principal_id = %p.id,
				organization_id = %p.organization_id,
				level = %p.privilege_level,
				"identity resolved"
			),
			None => debug!("no authenticated principal"),
		}

		self.tx.send_replace(Snapshot {
			state: IdentityState::from(principal.clone()),
			resolved_at: Some(Instant::now()),
		});
		principal
	}
}

/// Read-only observer of the identity state.
#[derive(Clone)]
pub struct IdentityHandle {
	rx: watch::Receiver<Snapshot>,
}

impl IdentityHandle {
	pub fn current(&self) -> IdentityState {
		self.rx.borrow().state.clone()
	}

	/// Wait for the next state change. Returns `false` once the resolver is gone.
	pub async fn changed(&mut self) -> bool {
		self.rx.changed().await.is_ok()
	}

	/// Wait until identity is no longer loading.
	pub async fn wait_resolved(&mut self) -> IdentityState {
		match self.rx.wait_for(|s| s.state.is_resolved()).await {
			Ok(snapshot) => snapshot.state.clone(),
			Err(_) => IdentityState::Unauthenticated,
		}
	}
}

impl std::fmt::Debug for IdentityHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IdentityHandle")
			.field("state", &self.current())
			.finish()
	}
}
