// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Non-blocking toast notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
	Success,
	Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
	pub level: NotificationLevel,
	pub title: String,
	pub message: String,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(NotificationLevel::Success, title, message)
	}

	pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(NotificationLevel::Error, title, message)
	}

	fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			level,
			title: title.into(),
			message: message.into(),
			created_at: Utc::now(),
		}
	}

	pub fn is_error(&self) -> bool {
		self.level == NotificationLevel::Error
	}
}

/// Sending half of the notification channel. Sending never blocks and never fails.
#[derive(Debug, Clone)]
pub struct Notifier {
	tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
	pub fn notify(&self, notification: Notification) {
		if self.tx.send(notification).is_err() {
			debug!("notification dropped, no receiver");
		}
	}
}

pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
	let (tx, rx) = mpsc::unbounded_channel();
	(Notifier { tx }, rx)
}

/// Drain whatever is queued without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
	let mut out = Vec::new();
	while let Ok(notification) = rx.try_recv() {
		out.push(notification);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dropped_receiver_is_harmless() {
		let (notifier, rx) = channel();
		drop(rx);
		notifier.notify(Notification::error("Save failed", "boom"));
	}

	#[test]
	fn drain_collects_in_order() {
		let (notifier, mut rx) = channel();
		notifier.notify(Notification::success("Saved", "ok"));
		notifier.notify(Notification::error("Oops", "no"));
		let drained = drain(&mut rx);
		assert_eq!(drained.len(), 2);
		assert!(!drained[0].is_error());
		assert!(drained[1].is_error());
		assert!(drain(&mut rx).is_empty());
	}
}
