// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

/// Outbound notification seam. Commands talk to beneficiaries and
/// administrators only through this trait; tests substitute a recorder.
pub trait Notifier {
    fn funds_allocated(&self, email: &str, name: &str, amount: &str) -> Result<()>;
    fn funds_disbursed(&self, email: &str, name: &str, amount: &str) -> Result<()>;
    fn request_submitted(&self, student: &str, total: &str) -> Result<()>;
    fn request_decision(&self, email: &str, name: &str, decision: &str, amount: &str)
        -> Result<()>;
}

/// Posts notification events as JSON to the configured webhook URL
/// (`notify set-webhook`). Unconfigured instances stay silent.
pub struct WebhookNotifier {
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn from_settings(conn: &Connection) -> Result<Self> {
        Ok(WebhookNotifier {
            url: crate::utils::get_notify_webhook(conn)?,
        })
    }

    fn post(&self, event: &str, payload: serde_json::Value) -> Result<()> {
        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };
        let client = crate::utils::http_client()?;
        let resp = client
            .post(url)
            .json(&json!({ "event": event, "payload": payload }))
            .send()?;
        if !resp.status().is_success() {
            // The financial write has already committed; a failed delivery
            // is reported, not rolled back.
            eprintln!("warning: webhook returned {} for '{}'", resp.status(), event);
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn funds_allocated(&self, email: &str, name: &str, amount: &str) -> Result<()> {
        self.post(
            "funds_allocated",
            json!({ "email": email, "name": name, "amount": amount }),
        )
    }

    fn funds_disbursed(&self, email: &str, name: &str, amount: &str) -> Result<()> {
        self.post(
            "funds_disbursed",
            json!({ "email": email, "name": name, "amount": amount }),
        )
    }

    fn request_submitted(&self, student: &str, total: &str) -> Result<()> {
        self.post(
            "request_submitted",
            json!({ "student": student, "total": total }),
        )
    }

    fn request_decision(
        &self,
        email: &str,
        name: &str,
        decision: &str,
        amount: &str,
    ) -> Result<()> {
        self.post(
            "request_decision",
            json!({ "email": email, "name": name, "decision": decision, "amount": amount }),
        )
    }
}
