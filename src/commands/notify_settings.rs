// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_notify_webhook, set_notify_webhook};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-webhook", sub)) => {
            let url = sub.get_one::<String>("url").unwrap().trim();
            set_notify_webhook(conn, url)?;
            println!("Notification webhook set to {}", url);
        }
        Some(("show", _)) => match get_notify_webhook(conn)? {
            Some(url) => println!("Notification webhook: {}", url),
            None => println!("Notification webhook not configured"),
        },
        _ => {}
    }
    Ok(())
}
