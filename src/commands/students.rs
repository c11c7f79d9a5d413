// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{PAGE_SIZE, Paginated};
use crate::utils::{id_for_school, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("deactivate", sub)) => deactivate(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let parent = sub.get_one::<String>("parent").unwrap().trim();
    let level = sub.get_one::<String>("level").unwrap().trim();
    let school = sub.get_one::<String>("school").unwrap().trim();
    let phone = sub.get_one::<String>("phone").map(|s| s.trim());
    let email = sub.get_one::<String>("email").map(|s| s.trim());

    let school_id = id_for_school(conn, school)?;
    conn.execute(
        "INSERT INTO students(name, parent, phone, email, level, school_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![name, parent, phone, email, level, school_id],
    )?;
    println!("Added student '{}' ({}, {})", name, level, school);
    Ok(())
}

#[derive(Serialize)]
pub struct StudentRow {
    pub name: String,
    pub parent: String,
    pub level: String,
    pub school: String,
    pub status: String,
    pub email: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page: usize = *sub.get_one::<usize>("page").unwrap_or(&1);
    let page = page.max(1);

    let mut predicate = String::new();
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(search) = sub.get_one::<String>("search") {
        predicate.push_str(" AND (LOWER(s.name) LIKE ? OR LOWER(sch.name) LIKE ?)");
        let term = format!("%{}%", search.to_lowercase());
        params_vec.push(term.clone());
        params_vec.push(term);
    }
    if let Some(status) = sub.get_one::<String>("status") {
        predicate.push_str(" AND LOWER(s.status)=LOWER(?)");
        params_vec.push(status.clone());
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM students s INNER JOIN schools sch ON s.school_id=sch.id WHERE 1=1{}",
        predicate
    );
    let total: i64 = conn.query_row(
        &count_sql,
        rusqlite::params_from_iter(params_vec.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT s.name, s.parent, s.level, sch.name, s.status, COALESCE(s.email,'')
         FROM students s INNER JOIN schools sch ON s.school_id=sch.id WHERE 1=1{}
         ORDER BY s.name LIMIT {} OFFSET {}",
        predicate,
        PAGE_SIZE,
        (page - 1) * PAGE_SIZE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items = Vec::new();
    while let Some(r) = rows.next()? {
        items.push(StudentRow {
            name: r.get(0)?,
            parent: r.get(1)?,
            level: r.get(2)?,
            school: r.get(3)?,
            status: r.get(4)?,
            email: r.get(5)?,
        });
    }
    let data = Paginated::new(total as usize, page, items);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.parent.clone(),
                    s.level.clone(),
                    s.school.clone(),
                    s.status.clone(),
                    s.email.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Parent", "Level", "School", "Status", "Email"],
                rows,
            )
        );
        println!(
            "Page {}/{} ({} students)",
            data.current_page, data.total_pages, data.total
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    // Make sure the student exists before patching individual columns.
    crate::store::get_student_by_name(conn, name)?;

    if let Some(parent) = sub.get_one::<String>("parent") {
        conn.execute(
            "UPDATE students SET parent=?1 WHERE name=?2",
            params![parent.trim(), name],
        )?;
    }
    if let Some(level) = sub.get_one::<String>("level") {
        conn.execute(
            "UPDATE students SET level=?1 WHERE name=?2",
            params![level.trim(), name],
        )?;
    }
    if let Some(school) = sub.get_one::<String>("school") {
        let school_id = id_for_school(conn, school.trim())?;
        conn.execute(
            "UPDATE students SET school_id=?1 WHERE name=?2",
            params![school_id, name],
        )?;
    }
    if let Some(phone) = sub.get_one::<String>("phone") {
        conn.execute(
            "UPDATE students SET phone=?1 WHERE name=?2",
            params![phone.trim(), name],
        )?;
    }
    if let Some(email) = sub.get_one::<String>("email") {
        conn.execute(
            "UPDATE students SET email=?1 WHERE name=?2",
            params![email.trim(), name],
        )?;
    }
    println!("Updated student '{}'", name);
    Ok(())
}

fn deactivate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let changed = conn.execute(
        "UPDATE students SET status='inactive', deactivated_at=datetime('now') WHERE name=?1",
        params![name],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Student '{}' not found", name));
    }
    println!("Deactivated student '{}'", name);
    Ok(())
}
