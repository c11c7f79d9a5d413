// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{PAGE_SIZE, Paginated, Request};
use crate::notify::Notifier;
use crate::store;
use crate::utils::{id_for_student, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, notifier: &dyn Notifier, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("submit", sub)) => submit(conn, notifier, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("approve", sub)) => decide(conn, notifier, sub, true)?,
        Some(("decline", sub)) => decide(conn, notifier, sub, false)?,
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

fn submit(conn: &Connection, notifier: &dyn Notifier, sub: &clap::ArgMatches) -> Result<()> {
    let student_name = sub.get_one::<String>("student").unwrap().trim();
    let budget_id: i64 = sub
        .get_one::<String>("budget")
        .unwrap()
        .trim()
        .parse()
        .context("Invalid budget id")?;
    let school = sub.get_one::<String>("school").unwrap().trim();
    let class = sub.get_one::<String>("class").unwrap().trim();
    let allocation = super::allocation_from_args(sub)?;

    store::get_budget(conn, budget_id)?;
    let student = store::get_student_by_name(conn, student_name)?;
    if student.status != "active" {
        return Err(anyhow::anyhow!(
            "Student '{}' has been deactivated",
            student.name
        ));
    }

    conn.execute(
        "INSERT INTO requests(
            student_id, budget_id, school, class,
            tuition, text_books, extra_classes, exam_fee, home_care, uniform_bag,
            excursion, transportation, wears, school_feeding, stationery, provision)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        params![
            student.id,
            budget_id,
            school,
            class,
            allocation.tuition.to_string(),
            allocation.text_books.to_string(),
            allocation.extra_classes.to_string(),
            allocation.exam_fee.to_string(),
            allocation.home_care.to_string(),
            allocation.uniform_bag.to_string(),
            allocation.excursion.to_string(),
            allocation.transportation.to_string(),
            allocation.wears.to_string(),
            allocation.school_feeding.to_string(),
            allocation.stationery.to_string(),
            allocation.provision.to_string(),
        ],
    )?;

    let total = allocation.total();
    notifier.request_submitted(&student.name, &format!("{:.2}", total))?;
    println!(
        "Submitted request of {:.2} for '{}' against budget {}",
        total, student.name, budget_id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);

    let mut predicate = String::new();
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(student) = sub.get_one::<String>("student") {
        predicate.push_str(" AND rq.student_id=?");
        params_vec.push(id_for_student(conn, student.trim())?.to_string());
    }
    if let Some(status) = sub.get_one::<String>("status") {
        predicate.push_str(" AND rq.status=?");
        params_vec.push(status.trim().to_lowercase());
    }

    let total: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM requests rq WHERE 1=1{}",
            predicate
        ),
        rusqlite::params_from_iter(params_vec.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT rq.id, s.name, rq.budget_id, rq.school, rq.class,
                rq.tuition, rq.text_books, rq.extra_classes, rq.exam_fee, rq.home_care,
                rq.uniform_bag, rq.excursion, rq.transportation, rq.wears, rq.school_feeding,
                rq.stationery, rq.provision, rq.status, rq.created_at
         FROM requests rq INNER JOIN students s ON rq.student_id=s.id WHERE 1=1{}
         ORDER BY rq.created_at DESC, rq.id DESC LIMIT {} OFFSET {}",
        predicate,
        PAGE_SIZE,
        (page - 1) * PAGE_SIZE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items: Vec<Request> = Vec::new();
    while let Some(r) = rows.next()? {
        items.push(Request {
            id: r.get(0)?,
            student: r.get(1)?,
            budget_id: r.get(2)?,
            school: r.get(3)?,
            class: r.get(4)?,
            allocation: store::read_allocation_row(r, 5)?,
            status: r.get(17)?,
            created_at: r.get(18)?,
        });
    }
    let data = Paginated::new(total as usize, page, items);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|rq| {
                vec![
                    rq.id.to_string(),
                    rq.student.clone(),
                    rq.budget_id.to_string(),
                    rq.class.clone(),
                    format!("{:.2}", rq.allocation.total()),
                    rq.status.clone(),
                    rq.created_at.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Student", "Budget", "Class", "Total", "Status", "Created"],
                rows,
            )
        );
        println!(
            "Page {}/{} ({} requests)",
            data.current_page, data.total_pages, data.total
        );
    }
    Ok(())
}

fn decide(
    conn: &Connection,
    notifier: &dyn Notifier,
    sub: &clap::ArgMatches,
    approve: bool,
) -> Result<()> {
    let id = parse_id(sub)?;
    let request = store::get_request(conn, id)?;
    if request.status != "pending" {
        return Err(anyhow::anyhow!(
            "Request {} has already been {}",
            id,
            request.status
        ));
    }
    let student = store::get_student_by_name(conn, &request.student)?;
    let total = request.allocation.total();

    let decision = if approve { "approved" } else { "declined" };
    if approve {
        // Approval materializes the request as a budget distribution line
        // and rolls its total into the budget.
        let budget = store::get_budget(conn, request.budget_id)?;
        conn.execute(
            "INSERT INTO budget_distributions(
                budget_id, student_id, school, class,
                tuition, text_books, extra_classes, exam_fee, home_care, uniform_bag,
                excursion, transportation, wears, school_feeding, stationery, provision)
             SELECT budget_id, student_id, school, class,
                tuition, text_books, extra_classes, exam_fee, home_care, uniform_bag,
                excursion, transportation, wears, school_feeding, stationery, provision
             FROM requests WHERE id=?1",
            params![id],
        )?;
        conn.execute(
            "UPDATE budgets SET total=?1 WHERE id=?2",
            params![(budget.total + total).to_string(), request.budget_id],
        )?;
    }
    conn.execute(
        "UPDATE requests SET status=?1 WHERE id=?2",
        params![decision, id],
    )?;

    if let Some(ref email) = student.email {
        notifier.request_decision(email, &student.name, decision, &format!("{:.2}", total))?;
    }
    println!("Request {} {}", id, decision);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let request = store::get_request(conn, id)?;
    if request.status != "pending" {
        return Err(anyhow::anyhow!(
            "Only pending requests can be removed; request {} is {}",
            id,
            request.status
        ));
    }
    conn.execute("DELETE FROM requests WHERE id=?1", params![id])?;
    println!("Removed request {}", id);
    Ok(())
}
