// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Disbursement, PAGE_SIZE, Paginated};
use crate::notify::Notifier;
use crate::store;
use crate::utils::{
    decimal_or_zero, maybe_print_json, parse_decimal, parse_period, parse_year, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

const STATUSES: [&str; 3] = ["pending", "approved", "declined"];

pub fn handle(conn: &Connection, notifier: &dyn Notifier, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, notifier, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

fn parse_status(s: &str) -> Result<String> {
    let status = s.trim().to_lowercase();
    if STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(anyhow::anyhow!(
            "Invalid status '{}', expected one of {}",
            s,
            STATUSES.join("|")
        ))
    }
}

fn add(conn: &Connection, notifier: &dyn Notifier, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;
    let status = parse_status(sub.get_one::<String>("status").unwrap())?;

    match sub.get_one::<String>("student") {
        Some(student_name) => {
            let student = store::get_student_by_name(conn, student_name.trim())?;
            if student.status != "active" {
                return Err(anyhow::anyhow!(
                    "Student '{}' has been deactivated",
                    student.name
                ));
            }
            conn.execute(
                "INSERT INTO disbursements(student_id, amount, period, year, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![student.id, amount.to_string(), period, year, status],
            )?;
            if let Some(ref email) = student.email {
                notifier.funds_disbursed(email, &student.name, &format!("{:.2}", amount))?;
            }
            println!(
                "Disbursed {:.2} to '{}' ({} {})",
                amount, student.name, period, year
            );
        }
        None => {
            let title = sub
                .get_one::<String>("title")
                .context("Either --student or --title is required")?
                .trim();
            conn.execute(
                "INSERT INTO disbursements(title, amount, period, year, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, amount.to_string(), period, year, status],
            )?;
            println!("Disbursed {:.2} for '{}' ({} {})", amount, title, period, year);
        }
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);

    let mut predicate = String::new();
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(search) = sub.get_one::<String>("search") {
        // Match the recipient name, or the title when there is no recipient.
        predicate.push_str(
            " AND (LOWER(s.name) LIKE ? OR (s.id IS NULL AND LOWER(d.title) LIKE ?))",
        );
        let term = format!("%{}%", search.to_lowercase());
        params_vec.push(term.clone());
        params_vec.push(term);
    }
    if let Some(period) = sub.get_one::<String>("period") {
        predicate.push_str(" AND d.period=?");
        params_vec.push(parse_period(period)?);
    }
    if let Some(year) = sub.get_one::<String>("year") {
        predicate.push_str(" AND d.year=?");
        params_vec.push(parse_year(year)?.to_string());
    }

    let total: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM disbursements d LEFT JOIN students s ON d.student_id=s.id
             WHERE 1=1{}",
            predicate
        ),
        rusqlite::params_from_iter(params_vec.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT d.id, s.name, d.title, d.amount, d.period, d.year, d.status, d.created_at
         FROM disbursements d LEFT JOIN students s ON d.student_id=s.id WHERE 1=1{}
         ORDER BY d.created_at DESC, d.id DESC LIMIT {} OFFSET {}",
        predicate,
        PAGE_SIZE,
        (page - 1) * PAGE_SIZE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items: Vec<Disbursement> = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(3)?;
        items.push(Disbursement {
            id: r.get(0)?,
            student: r.get(1)?,
            title: r.get(2)?,
            amount: decimal_or_zero(&amount),
            period: r.get(4)?,
            year: r.get(5)?,
            status: r.get(6)?,
            created_at: r.get(7)?,
        });
    }
    let data = Paginated::new(total as usize, page, items);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.student
                        .clone()
                        .or_else(|| d.title.clone())
                        .unwrap_or_default(),
                    format!("{:.2}", d.amount),
                    d.period.clone(),
                    d.year.to_string(),
                    d.status.clone(),
                    d.created_at.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Recipient", "Amount", "Period", "Year", "Status", "Created"],
                rows,
            )
        );
        println!(
            "Page {}/{} ({} disbursements)",
            data.current_page, data.total_pages, data.total
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    store::get_disbursement(conn, id)?;

    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;

    // Recipient and title are exclusive: setting one clears the other.
    match sub.get_one::<String>("student") {
        Some(student_name) => {
            let student = store::get_student_by_name(conn, student_name.trim())?;
            conn.execute(
                "UPDATE disbursements SET student_id=?1, title=NULL, amount=?2, period=?3, year=?4
                 WHERE id=?5",
                params![student.id, amount.to_string(), period, year, id],
            )?;
        }
        None => {
            let title = sub
                .get_one::<String>("title")
                .context("Either --student or --title is required")?
                .trim();
            conn.execute(
                "UPDATE disbursements SET student_id=NULL, title=?1, amount=?2, period=?3, year=?4
                 WHERE id=?5",
                params![title, amount.to_string(), period, year, id],
            )?;
        }
    }
    if let Some(status) = sub.get_one::<String>("status") {
        conn.execute(
            "UPDATE disbursements SET status=?1 WHERE id=?2",
            params![parse_status(status)?, id],
        )?;
    }
    println!("Updated disbursement {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    store::get_disbursement(conn, id)?;
    conn.execute("DELETE FROM disbursements WHERE id=?1", params![id])?;
    println!("Deleted disbursement {}", id);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let id = parse_id(sub)?;
    let d = store::get_disbursement(conn, id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &d)? {
        let recipient = d.student.clone().or_else(|| d.title.clone()).unwrap_or_default();
        println!(
            "{}",
            pretty_table(
                &["ID", "Recipient", "Amount", "Period", "Year", "Status", "Created"],
                vec![vec![
                    d.id.to_string(),
                    recipient,
                    format!("{:.2}", d.amount),
                    d.period.clone(),
                    d.year.to_string(),
                    d.status.clone(),
                    d.created_at.to_string(),
                ]],
            )
        );
    }
    Ok(())
}
