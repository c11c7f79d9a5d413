// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let location = sub.get_one::<String>("location").map(|s| s.trim());
            let phone = sub.get_one::<String>("phone").map(|s| s.trim());
            conn.execute(
                "INSERT INTO schools(name, location, phone) VALUES (?1, ?2, ?3)",
                params![name, location, phone],
            )?;
            println!("Added school '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn
                .prepare("SELECT name, location, phone, created_at FROM schools ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, l, p, cr) = row?;
                data.push(vec![n, l.unwrap_or_default(), p.unwrap_or_default(), cr]);
            }
            println!(
                "{}",
                pretty_table(&["Name", "Location", "Phone", "Created"], data)
            );
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM schools WHERE name=?1", params![name])?;
            println!("Removed school '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
