// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::id_for_school;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{Connection, params};
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("students", sub)) => import_students(conn, sub),
        _ => Ok(()),
    }
}

/// CSV columns: name, parent, level, school, phone, email. The whole file
/// imports in one transaction; the first bad row rolls everything back.
fn import_students(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut school_cache: HashMap<String, i64> = HashMap::new();
    let mut count = 0usize;

    for result in rdr.records() {
        let rec = result?;
        let name = rec.get(0).context("name missing")?.trim().to_string();
        let parent = rec.get(1).context("parent missing")?.trim().to_string();
        let level = rec.get(2).context("level missing")?.trim().to_string();
        let school = rec.get(3).context("school missing")?.trim().to_string();
        let phone = rec
            .get(4)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let email = rec
            .get(5)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        if name.is_empty() {
            return Err(anyhow::anyhow!("Row {} has an empty name", count + 1));
        }

        let school_id = match school_cache.entry(school.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let fetched = id_for_school(&tx, &school)?;
                *entry.insert(fetched)
            }
        };

        tx.execute(
            "INSERT INTO students(name, parent, phone, email, level, school_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, parent, phone, email, level, school_id],
        )
        .with_context(|| format!("Import student '{}'", name))?;
        count += 1;
    }
    tx.commit()?;
    println!("Imported {} students from {}", count, path);
    Ok(())
}
