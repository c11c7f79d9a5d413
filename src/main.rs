// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use fundbook::notify::WebhookNotifier;
use fundbook::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let notifier = WebhookNotifier::from_settings(&conn)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("school", sub)) => commands::schools::handle(&conn, sub)?,
        Some(("student", sub)) => commands::students::handle(&conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &notifier, sub)?,
        Some(("request", sub)) => commands::requests::handle(&conn, &notifier, sub)?,
        Some(("disbursement", sub)) => commands::disbursements::handle(&conn, &notifier, sub)?,
        Some(("fund", sub)) => commands::funds::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("notify", sub)) => commands::notify_settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
