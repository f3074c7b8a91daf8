// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::classifier::{classify, Classification};
use crate::types::Principal;

/// What the rest of the dashboard knows about the current identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "principal", rename_all = "snake_case")]
pub enum IdentityState {
	/// Not resolved yet, or invalidated and awaiting a lazy refetch.
	#[default]
	Loading,
	Unauthenticated,
	Authenticated(Principal),
}

impl IdentityState {
	pub fn is_loading(&self) -> bool {
		matches!(self, IdentityState::Loading)
	}

	pub fn is_resolved(&self) -> bool {
		!self.is_loading()
	}

	pub fn principal(&self) -> Option<&Principal> {
		match self {
			IdentityState::Authenticated(principal) => Some(principal),
			_ => None,
		}
	}

	/// `None` unless an authenticated principal has resolved.
	pub fn classification(&self) -> Option<Classification> {
		self.principal().map(classify)
	}
}

impl From<Option<Principal>> for IdentityState {
	fn from(principal: Option<Principal>) -> Self {
		match principal {
			Some(p) => IdentityState::Authenticated(p),
			None => IdentityState::Unauthenticated,
		}
	}
}
