// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report;
use crate::store::{self, Filter};
use crate::utils::{parse_period, parse_year};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => export_ledger(conn, sub),
        _ => Ok(()),
    }
}

fn export_ledger(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let filter = Filter {
        period: sub
            .get_one::<String>("period")
            .map(|p| parse_period(p))
            .transpose()?,
        year: sub
            .get_one::<String>("year")
            .map(|y| parse_year(y))
            .transpose()?,
    };

    let budgets = store::fetch_budgets(conn, &filter)?;
    let disbursements = store::fetch_disbursements(conn, &filter)?;
    let funds = store::fetch_funds(conn, &filter)?;
    let (rows, running_total) = report::build_ledger(&budgets, &disbursements, &funds);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "type",
                "description",
                "amount",
                "running_total",
                "period",
                "year",
            ])?;
            for row in &rows {
                wtr.write_record([
                    row.date.to_string(),
                    row.kind.as_str().to_string(),
                    row.description.clone(),
                    row.amount.to_string(),
                    row.running_total.to_string(),
                    row.period.clone(),
                    row.year.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let doc = json!({ "accounting": rows, "runningTotal": running_total });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} ledger rows to {}", rows.len(), out);
    Ok(())
}
