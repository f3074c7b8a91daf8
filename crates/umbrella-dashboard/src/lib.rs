// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dashboard composition for Umbrella.
//!
//! - [`shell`]: page-wide role precondition and chrome
//! - [`navigation`]: role-filtered navigation entries
//! - [`pages`]: the dashboard pages, their queries and guarded sections
//! - [`scope`], [`query`], [`resource`]: organization-scoped fetch parameters
//! - [`cache`], [`client`], [`session`]: fetching and caching read queries
//! - [`mutation`], [`notify`]: writes with cache invalidation and toasts
//!
//! Fetch parameters are always derived from the resolved principal:
//!
//! ```ignore
//! let key = QueryKey::list(ResourceKind::Agents, &principal);
//! // level 1 in org 7: "/api/agents?organizationId=7"
//! // level 0:          "/api/agents"
//! let agents = client.request(&key.path(), RequestOptions::get()).await?;
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod mutation;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod query;
pub mod resource;
pub mod scope;
pub mod session;
pub mod shell;

#[cfg(test)]
mod test_support;

pub use cache::QueryCache;
pub use client::{ApiClient, ApiClientBuilder, Method, RequestOptions, Transport};
pub use error::{ApiError, DashboardError, Result};
pub use mutation::{Mutation, MutationRunner};
pub use navigation::{NavItem, NavLink, Navigation};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use pages::{Page, Section};
pub use query::{QueryKey, ORGANIZATION_PARAM};
pub use resource::{ResourceKind, Scoping};
pub use scope::OrganizationScope;
pub use session::{PageBody, PageLoader, QueryOutcome, QueryResult};
pub use shell::{
	Chrome, DashboardLayout, Header, ShellState, ShellView, ACCESS_RESTRICTED_MESSAGE,
	ACCESS_RESTRICTED_TITLE,
};
