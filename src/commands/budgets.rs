// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Budget, BudgetDistribution, OtherDistribution, PAGE_SIZE, Paginated};
use crate::notify::Notifier;
use crate::report::{self, Chart};
use crate::store;
use crate::utils::{maybe_print_json, parse_decimal, parse_period, parse_year, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, notifier: &dyn Notifier, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("distribute", sub)) => distribute(conn, notifier, sub)?,
        Some(("add-other", sub)) => add_other(conn, sub)?,
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

fn create(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE period=?1 AND year=?2",
            params![period, year],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(anyhow::anyhow!(
            "Budget within same period already exists ({} {})",
            period,
            year
        ));
    }
    conn.execute(
        "INSERT INTO budgets(period, year) VALUES (?1, ?2)",
        params![period, year],
    )?;
    println!("Created budget for {} {}", period, year);
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
        &format!("SELECT COUNT(*) FROM budgets WHERE 1=1{}", predicate),
        rusqlite::params_from_iter(params_vec.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT id, period, year, total, created_at FROM budgets WHERE 1=1{}
         ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
        predicate,
        PAGE_SIZE,
        (page - 1) * PAGE_SIZE
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut items: Vec<Budget> = Vec::new();
    while let Some(r) = rows.next()? {
        let total_s: String = r.get(3)?;
        items.push(Budget {
            id: r.get(0)?,
            period: r.get(1)?,
            year: r.get(2)?,
            total: crate::utils::decimal_or_zero(&total_s),
            created_at: r.get(4)?,
        });
    }
    let data = Paginated::new(total as usize, page, items);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.period.clone(),
                    b.year.to_string(),
                    format!("{:.2}", b.total),
                    b.created_at.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Period", "Year", "Total", "Created"], rows)
        );
        println!(
            "Page {}/{} ({} budgets)",
            data.current_page, data.total_pages, data.total
        );
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetDetails {
    budget: Budget,
    budget_distribution: Vec<BudgetDistribution>,
    other_budget_distribution: Vec<OtherDistribution>,
    split_details: Chart,
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let id = parse_id(sub)?;
    let search = sub.get_one::<String>("search").map(|s| s.trim());

    let budget = store::get_budget(conn, id)?;
    let distributions = store::fetch_budget_distributions(conn, id, search)?;
    let others = store::fetch_other_distributions(conn, id)?;
    let allocations: Vec<_> = distributions.iter().map(|d| d.allocation.clone()).collect();
    let details = BudgetDetails {
        budget,
        split_details: report::category_split(&allocations),
        budget_distribution: distributions,
        other_budget_distribution: others,
    };

    if !maybe_print_json(json_flag, jsonl_flag, &details)? {
        println!(
            "Budget {}: {} {} (total {:.2})",
            details.budget.id, details.budget.period, details.budget.year, details.budget.total
        );
        let rows: Vec<Vec<String>> = details
            .budget_distribution
            .iter()
            .map(|d| {
                vec![
                    d.student.clone(),
                    d.school.clone(),
                    d.class.clone(),
                    format!("{:.2}", d.allocation.total()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Student", "School", "Class", "Total"], rows)
        );
        if !details.other_budget_distribution.is_empty() {
            let rows: Vec<Vec<String>> = details
                .other_budget_distribution
                .iter()
                .map(|o| {
                    vec![
                        o.title.clone(),
                        format!("{:.2}", o.amount),
                        o.comment.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Other", "Amount", "Comment"], rows));
        }
        let rows: Vec<Vec<String>> = details
            .split_details
            .labels
            .iter()
            .zip(&details.split_details.values)
            .map(|(l, v)| vec![l.clone(), format!("{:.2}", v)])
            .collect();
        println!("{}", pretty_table(&["Category", "Allocated"], rows));
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let period = parse_period(sub.get_one::<String>("period").unwrap())?;
    store::get_budget(conn, id)?;
    conn.execute(
        "UPDATE budgets SET period=?1 WHERE id=?2",
        params![period, id],
    )?;
    println!("Budget {} moved to period '{}'", id, period);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let budget = store::get_budget(conn, id)?;
    conn.execute("DELETE FROM budgets WHERE id=?1", params![id])?;
    println!("Deleted budget {} ({} {})", id, budget.period, budget.year);
    Ok(())
}

fn distribute(conn: &Connection, notifier: &dyn Notifier, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let student_name = sub.get_one::<String>("student").unwrap().trim();
    let school = sub.get_one::<String>("school").unwrap().trim();
    let class = sub.get_one::<String>("class").unwrap().trim();
    let allocation = super::allocation_from_args(sub)?;

    let budget = store::get_budget(conn, id)?;
    let student = store::get_student_by_name(conn, student_name)?;
    if student.status != "active" {
        return Err(anyhow::anyhow!(
            "Student '{}' has been deactivated",
            student.name
        ));
    }

    let total = allocation.total();
    conn.execute(
        "INSERT INTO budget_distributions(
            budget_id, student_id, school, class,
            tuition, text_books, extra_classes, exam_fee, home_care, uniform_bag,
            excursion, transportation, wears, school_feeding, stationery, provision)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        params![
            id,
            student.id,
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
    conn.execute(
        "UPDATE budgets SET total=?1 WHERE id=?2",
        params![(budget.total + total).to_string(), id],
    )?;

    if let Some(ref email) = student.email {
        notifier.funds_allocated(email, &student.name, &format!("{:.2}", total))?;
    }
    println!(
        "Allocated {:.2} to '{}' from budget {} ({} {})",
        total, student.name, id, budget.period, budget.year
    );
    Ok(())
}

fn add_other(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let title = sub.get_one::<String>("title").unwrap().trim();
    let amount: Decimal = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let comment = sub.get_one::<String>("comment").map(|s| s.trim());

    let budget = store::get_budget(conn, id)?;
    conn.execute(
        "INSERT INTO other_distributions(budget_id, title, amount, comment)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, title, amount.to_string(), comment],
    )?;
    conn.execute(
        "UPDATE budgets SET total=?1 WHERE id=?2",
        params![(budget.total + amount).to_string(), id],
    )?;
    println!("Added '{}' ({:.2}) to budget {}", title, amount, id);
    Ok(())
}
