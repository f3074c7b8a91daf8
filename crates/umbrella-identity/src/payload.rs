// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session payload validation.
//!
//! The session endpoint answers with loosely typed JSON. It is checked here
//! once and turned into a [`Principal`]; nothing downstream re-checks shape.
//!
//! Accepted bodies:
//!
//! ```text
//! null | {}                                  -> no session
//! { "user": { ...principal } }               -> principal
//! { ...principal }                           -> principal
//! ```
//!
//! where a principal is
//! `{ "id", "email", "organizationId", "privilegeLevel", "displayName"? }`.
//! Integer fields may also arrive as numeric strings.

use serde::Deserialize;
use serde_json::Value;

use umbrella_access::{OrganizationId, Principal, PrincipalId, PrivilegeLevel};

use crate::error::{IdentityError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
	#[serde(default)]
	pub id: Option<Value>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub organization_id: Option<Value>,
	#[serde(default)]
	pub privilege_level: Option<Value>,
	#[serde(default, alias = "name")]
	pub display_name: Option<String>,
}

impl TryFrom<SessionPayload> for Principal {
	type Error = IdentityError;

	fn try_from(payload: SessionPayload) -> Result<Self> {
		let id = PrincipalId::new(integer_field("id", payload.id)?);

		let email = payload
			.email
			.map(|e| e.trim().to_string())
			.filter(|e| !e.is_empty())
			.ok_or_else(|| IdentityError::invalid("email", "missing"))?;
		if !email.contains('@') {
			return Err(IdentityError::invalid("email", format!("'{email}' is not an address")));
		}

		let organization_id =
			OrganizationId::new(integer_field("organizationId", payload.organization_id)?);

		let level = integer_field("privilegeLevel", payload.privilege_level)?;
		let privilege_level = PrivilegeLevel::try_from(level)
			.map_err(|e| IdentityError::invalid("privilegeLevel", e.to_string()))?;

		let mut principal = Principal::new(id, email, organization_id, privilege_level);
		if let Some(name) = payload.display_name.filter(|n| !n.trim().is_empty()) {
			principal = principal.with_display_name(name);
		}
		Ok(principal)
	}
}

/// Parse a session response body. `Ok(None)` means no active session.
pub fn parse_session(body: Value) -> Result<Option<Principal>> {
	let body = match body {
		Value::Null => return Ok(None),
		Value::Object(mut map) => match map.remove("user") {
			Some(Value::Null) => return Ok(None),
			Some(user) => user,
			None if map.is_empty() => return Ok(None),
			None => Value::Object(map),
		},
		other => {
			return Err(IdentityError::invalid(
				"body",
				format!("expected an object, got {}", kind(&other)),
			))
		}
	};

	let payload: SessionPayload = serde_json::from_value(body)
		.map_err(|e| IdentityError::invalid("body", e.to_string()))?;
	Principal::try_from(payload).map(Some)
}

fn integer_field(field: &'static str, value: Option<Value>) -> Result<i64> {
	match value {
		None | Some(Value::Null) => Err(IdentityError::invalid(field, "missing")),
		Some(Value::Number(n)) => n
			.as_i64()
			.ok_or_else(|| IdentityError::invalid(field, format!("{n} is not an integer"))),
		Some(Value::String(s)) => s
			.trim()
			.parse()
			.map_err(|_| IdentityError::invalid(field, format!("'{s}' is not an integer"))),
		Some(other) => Err(IdentityError::invalid(
			field,
			format!("expected an integer, got {}", kind(&other)),
		)),
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
