// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for access decisions.
//!
//! Guards and the dashboard shell never surface these as failures: a denied
//! check renders a fallback. The errors exist for callers that need to refuse
//! an operation outright (for example a mutation issued without the matching
//! capability) and for invalid policy or label input.

use thiserror::Error;

use crate::capability::Capability;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
	// =========================================================================
	// Decision errors
	// =========================================================================
	#[error("authentication required")]
	Unauthenticated,

	#[error("access denied: requires the {0} capability")]
	MissingCapability(Capability),

	// =========================================================================
	// Input errors
	// =========================================================================
	#[error("unknown role label: {0}")]
	InvalidRole(String),

	#[error("privilege level out of range: {0}")]
	InvalidPrivilegeLevel(i64),

	#[error("invalid capability policy: {0}")]
	InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, AccessError>;
