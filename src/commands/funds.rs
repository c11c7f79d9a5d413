// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Fund, PAGE_SIZE, Paginated};
use crate::store;
use crate::utils::{
    decimal_or_zero, maybe_print_json, parse_decimal, parse_period, parse_year, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
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

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub.get_one::<String>("title").unwrap().trim();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;
    let comment = sub.get_one::<String>("comment").map(|s| s.trim());

    conn.execute(
        "INSERT INTO funds(title, amount, period, year, comments) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![title, amount.to_string(), period, year, comment],
    )?;
    println!("Added fund '{}' ({:.2}, {} {})", title, amount, period, year);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);

    let mut predicate = String::new();
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(period) = sub.get_one::<String>("period") {
        predicate.push_str(" AND period=?");
        params_vec.push(parse_period(period)?);
    }
    if let Some(year) = sub.get_one::<String>("year") {
        predicate.push_str(" AND year=?");
        params_vec.push(parse_year(year)?.to_string());
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM funds WHERE 1=1{}", predicate),
        rusqlite::params_from_iter(params_vec.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT id, title, amount, period, year, comments, created_at FROM funds WHERE 1=1{}
         ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
        predicate,
        PAGE_SIZE,
        (page - 1) * PAGE_SIZE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items: Vec<Fund> = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(2)?;
        items.push(Fund {
            id: r.get(0)?,
            title: r.get(1)?,
            amount: decimal_or_zero(&amount),
            period: r.get(3)?,
            year: r.get(4)?,
            comments: r.get(5)?,
            created_at: r.get(6)?,
        });
    }
    let data = Paginated::new(total as usize, page, items);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|f| {
                vec![
                    f.id.to_string(),
                    f.title.clone(),
                    format!("{:.2}", f.amount),
                    f.period.clone(),
                    f.year.to_string(),
                    f.comments.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Title", "Amount", "Period", "Year", "Comments"],
                rows,
            )
        );
        println!(
            "Page {}/{} ({} funds)",
            data.current_page, data.total_pages, data.total
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    store::get_fund(conn, id)?;

    let title = sub.get_one::<String>("title").unwrap().trim();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;
    let comment = sub.get_one::<String>("comment").map(|s| s.trim());

    conn.execute(
        "UPDATE funds SET title=?1, amount=?2, period=?3, year=?4, comments=?5 WHERE id=?6",
        params![title, amount.to_string(), period, year, comment, id],
    )?;
    println!("Updated fund {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let fund = store::get_fund(conn, id)?;
    conn.execute("DELETE FROM funds WHERE id=?1", params![id])?;
    println!("Deleted fund {} ('{}')", id, fund.title);
    Ok(())
}
