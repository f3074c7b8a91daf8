// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity resolution for the Umbrella dashboard.
//!
//! The [`IdentityResolver`] asks an [`AuthEndpoint`] who the current principal is,
//! caches the answer and publishes it as an [`IdentityState`]. It is the only
//! writer of that state; guards and data fetchers read it through an
//! [`IdentityHandle`].
//!
//! ```ignore
//! let endpoint = HttpAuthEndpoint::from_config(&config.api, &config.auth)?;
//! let resolver = IdentityResolver::new(Arc::new(endpoint));
//! if let Some(principal) = resolver.current_principal().await {
//!     println!("{} at level {}", principal.email, principal.privilege_level);
//! }
//! ```

pub mod endpoint;
pub mod error;
pub mod payload;
pub mod resolver;

pub use endpoint::{AuthEndpoint, HttpAuthEndpoint, HttpAuthEndpointBuilder};
pub use error::{IdentityError, Result};
pub use payload::{parse_session, SessionPayload};
pub use resolver::{IdentityHandle, IdentityResolver};

pub use umbrella_access::IdentityState;
