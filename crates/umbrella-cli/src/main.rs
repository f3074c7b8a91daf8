// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Umbrella CLI
//!
//! Renders the role-gated brokerage dashboard to the terminal. Views are
//! printed to stdout as JSON; logs and notifications go to stderr.

mod app;
mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use umbrella_access::{OrganizationId, PrincipalId};
use umbrella_config::{load_config, CliOverrides, LogFormat, LoggingConfig};
use umbrella_dashboard::{Mutation, Notification, NotificationLevel, Page, ResourceKind};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "umbrella", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// API base URL (overrides config)
	#[arg(long)]
	api_url: Option<String>,

	/// Log filter directive (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Log output format: pretty, compact or json (overrides config)
	#[arg(long)]
	log_format: Option<LogFormat>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show the current principal and its capabilities
	Whoami,
	/// List the navigation entries visible to the current principal
	Nav,
	/// Load a dashboard page
	Page {
		page: Page,
		/// Narrow a super admin's view to one organization
		#[arg(long)]
		org: Option<OrganizationId>,
	},
	/// Credit loyalty points to a principal
	AwardPoints {
		#[arg(long)]
		to: PrincipalId,
		#[arg(long)]
		points: i64,
		#[arg(long, default_value = "manual award")]
		reason: String,
	},
	/// Delete a record
	Delete { resource: ResourceKind, id: String },
	/// End the current session
	Logout,
	/// Print version information
	Version,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		CliOverrides {
			api_url: args.api_url.clone(),
			log_level: args.log_level.clone(),
			log_format: args.log_format,
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
	println!("{out}");
	Ok(())
}

fn print_notifications(notifications: Vec<Notification>) {
	for n in notifications {
		let level = match n.level {
			NotificationLevel::Success => "ok",
			NotificationLevel::Error => "error",
		};
		eprintln!("[{level}] {}: {}", n.title, n.message);
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	if let Err(e) = dotenvy::dotenv() {
		if !e.not_found() {
			return Err(e).context("failed to read .env file");
		}
	}

	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = load_config(args.config.clone(), CliOverrides::from(&args))
		.context("failed to load configuration")?;
	init_tracing(&config.logging);
	debug!(base_url = %config.api.base_url, "starting umbrella");

	let mut app = App::from_config(&config)?;

	match args.command {
		Command::Whoami => print_json(&app.whoami().await),
		Command::Nav => print_json(&app.navigation().await),
		Command::Page { page, org } => {
			let cancel = CancellationToken::new();
			let on_interrupt = cancel.clone();
			tokio::spawn(async move {
				if tokio::signal::ctrl_c().await.is_ok() {
					warn!("interrupted, abandoning page load");
					on_interrupt.cancel();
				}
			});
			let view = app.page(page, org, &cancel).await?;
			print_json(&view)
		}
		Command::AwardPoints { to, points, reason } => {
			let result = app.mutate(Mutation::award_points(to, points, reason)).await;
			print_notifications(app.notifications());
			print_json(&result?)
		}
		Command::Delete { resource, id } => {
			let result = app.mutate(Mutation::delete(resource, id)).await;
			print_notifications(app.notifications());
			result.map(|_| ())
		}
		Command::Logout => {
			app.logout().await?;
			info!("logged out");
			Ok(())
		}
		Command::Version => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_page_with_org_filter() {
		let args = Args::try_parse_from(["umbrella", "page", "client-assignments", "--org", "9"])
			.unwrap();
		match args.command {
			Command::Page { page, org } => {
				assert_eq!(page, Page::ClientAssignments);
				assert_eq!(org, Some(OrganizationId::new(9)));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn rejects_unknown_page() {
		assert!(Args::try_parse_from(["umbrella", "page", "billing"]).is_err());
	}

	#[test]
	fn global_flags_become_overrides() {
		let args = Args::try_parse_from([
			"umbrella",
			"--api-url",
			"https://api.umbrella.example",
			"--log-format",
			"json",
			"delete",
			"policies",
			"12",
		])
		.unwrap();
		let overrides = CliOverrides::from(&args);
		assert_eq!(overrides.api_url.as_deref(), Some("https://api.umbrella.example"));
		assert_eq!(overrides.log_format, Some(LogFormat::Json));
		assert!(matches!(
			args.command,
			Command::Delete {
				resource: ResourceKind::Policies,
				..
			}
		));
	}

	#[test]
	fn award_points_has_default_reason() {
		let args =
			Args::try_parse_from(["umbrella", "award-points", "--to", "4", "--points", "50"]).unwrap();
		match args.command {
			Command::AwardPoints { to, points, reason } => {
				assert_eq!(to, PrincipalId::new(4));
				assert_eq!(points, 50);
				assert_eq!(reason, "manual award");
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
