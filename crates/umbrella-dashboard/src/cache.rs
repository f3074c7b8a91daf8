// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use umbrella_access::Principal;

use crate::query::QueryKey;
use crate::resource::ResourceKind;

#[derive(Debug, Clone)]
struct Entry {
	value: Value,
	fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Entries {
	owner: Option<Principal>,
	map: HashMap<QueryKey, Entry>,
}

/// Read-query cache shared by page loads and mutations.
///
/// Entries belong to the principal they were fetched for. Binding a different
/// principal drops everything, and reads or writes on behalf of anyone but the
/// bound principal are refused.
#[derive(Debug, Default)]
pub struct QueryCache {
	entries: RwLock<Entries>,
}

impl QueryCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make `principal` the owner of the cache. Returns true when the owner
	/// changed.
	pub fn bind(&self, principal: &Principal) -> bool {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		if entries.owner.as_ref() == Some(principal) {
			return false;
		}
		let dropped = entries.map.len();
		entries.map.clear();
		entries.owner = Some(principal.clone());
		debug!(principal_id = %principal.id, dropped, "cache bound to principal");
		true
	}

	pub fn get(&self, owner: &Principal, key: &QueryKey) -> Option<Value> {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		if entries.owner.as_ref() != Some(owner) {
			return None;
		}
		entries.map.get(key).map(|entry| entry.value.clone())
	}

	pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		entries.map.get(key).map(|entry| entry.fetched_at)
	}

	/// Store `value` for `owner`. Ignored when the cache has since been bound
	/// to someone else.
	pub fn insert(&self, owner: &Principal, key: QueryKey, value: Value) -> bool {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		if entries.owner.as_ref() != Some(owner) {
			debug!(query = %key, "discarding result fetched for a previous principal");
			return false;
		}
		entries.map.insert(
			key,
			Entry {
				value,
				fetched_at: Utc::now(),
			},
		);
		true
	}

	pub fn invalidate(&self, key: &QueryKey) -> bool {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		entries.map.remove(key).is_some()
	}

	/// Drop every cached query of `kind`, whatever its scope or filters.
	pub fn invalidate_resource(&self, kind: ResourceKind) -> usize {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		let before = entries.map.len();
		entries.map.retain(|key, _| key.kind() != kind);
		let removed = before - entries.map.len();
		debug!(resource = %kind, removed, "invalidated cached queries");
		removed
	}

	/// Drop every entry and the owner. Used when the session ends.
	pub fn clear(&self) {
		let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
		entries.map.clear();
		entries.owner = None;
	}

	pub fn len(&self) -> usize {
		self.entries
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.map
			.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Sorted cache keys.
	pub fn keys(&self) -> Vec<String> {
		let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
		let mut keys: Vec<_> = entries.map.keys().map(QueryKey::cache_key).collect();
		keys.sort();
		keys
	}
}
