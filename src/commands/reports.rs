// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::{self, Chart, RankFilter};
use crate::store::{self, Filter, SplitFilter};
use crate::utils::{maybe_print_json, parse_period, parse_year, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("finance", sub)) => finance(conn, sub)?,
        Some(("overview", sub)) => overview(conn, sub)?,
        Some(("beneficiary", sub)) => beneficiary(conn, sub)?,
        Some(("performance", sub)) => performance(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn filter_from_args(sub: &clap::ArgMatches) -> Result<Filter> {
    Ok(Filter {
        period: sub
            .get_one::<String>("period")
            .map(|p| parse_period(p))
            .transpose()?,
        year: sub
            .get_one::<String>("year")
            .map(|y| parse_year(y))
            .transpose()?,
    })
}

fn print_chart(title: &str, chart: &Chart) {
    let rows: Vec<Vec<String>> = chart
        .labels
        .iter()
        .zip(&chart.values)
        .map(|(l, v)| vec![l.clone(), format!("{:.2}", v)])
        .collect();
    println!("{}", pretty_table(&[title, "Amount"], rows));
}

fn finance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = filter_from_args(sub)?;

    let budgets = store::fetch_budgets(conn, &filter)?;
    let disbursements = store::fetch_disbursements(conn, &filter)?;
    let funds = store::fetch_funds(conn, &filter)?;
    let data = report::finance_report(&budgets, &disbursements, &funds);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .accounting
            .iter()
            .map(|row| {
                vec![
                    row.date.to_string(),
                    row.kind.as_str().to_string(),
                    row.description.clone(),
                    format!("{:.2}", row.amount),
                    format!("{:.2}", row.running_total),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Description", "Amount", "Running Total"],
                rows,
            )
        );
        println!("Balance: {:.2}", data.running_total);
        print_chart("Budget by period", &data.summary_chart.budget);
        print_chart("Disbursed by period", &data.summary_chart.disbursements);
        print_chart("Funds by period", &data.summary_chart.fund);
    }
    Ok(())
}

fn overview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = filter_from_args(sub)?;

    let budgets = store::fetch_budgets(conn, &filter)?;
    let disbursements = store::fetch_disbursements(conn, &filter)?;
    let funds = store::fetch_funds(conn, &filter)?;
    let allocations = store::fetch_allocations(
        conn,
        &SplitFilter {
            period: filter.period.clone(),
            year: filter.year,
            ..SplitFilter::default()
        },
    )?;
    let data = report::overview_stats(&budgets, &disbursements, &funds, &allocations);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Allocated", "Disbursed", "Funds", "Students Supported"],
                vec![vec![
                    format!("{:.2}", data.funds_allocated),
                    format!("{:.2}", data.funds_disbursed),
                    format!("{:.2}", data.total_funds),
                    data.students_supported.to_string(),
                ]],
            )
        );
        print_chart("Disbursed by period", &data.total_funding_disbursed);
        print_chart("Funding distribution", &data.funding_distribution);
    }
    Ok(())
}

fn beneficiary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let filter = filter_from_args(sub)?;
    let student_name = sub.get_one::<String>("student").unwrap().trim();

    let student = store::get_student_by_name(conn, student_name)?;
    let disbursements = store::fetch_disbursements_for(conn, student.id, &filter)?;
    let allocations = store::fetch_allocations(
        conn,
        &SplitFilter {
            student_id: Some(student.id),
            period: filter.period.clone(),
            year: filter.year,
            ..SplitFilter::default()
        },
    )?;
    let total_requests = store::count_requests(conn, student.id, None)?;
    let pending_requests = store::count_requests(conn, student.id, Some("pending"))?;
    let data = report::beneficiary_overview_stats(
        &disbursements,
        &allocations,
        total_requests,
        pending_requests,
    );

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Allocated", "Disbursed", "Requests", "Pending"],
                vec![vec![
                    format!("{:.2}", data.funds_allocated),
                    format!("{:.2}", data.funds_disbursed),
                    data.total_requests.to_string(),
                    data.pending_requests.to_string(),
                ]],
            )
        );
        print_chart("Disbursed by period", &data.total_funding_disbursed);
        print_chart("Funding distribution", &data.funding_distribution);
    }
    Ok(())
}

fn performance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let page = sub.get_one::<usize>("page").copied().unwrap_or(1).max(1);

    let filter = RankFilter {
        status: sub.get_one::<String>("status").map(|s| s.trim().to_string()),
        year: sub
            .get_one::<String>("year")
            .map(|y| parse_year(y))
            .transpose()?,
        levels: sub
            .get_one::<String>("levels")
            .map(|l| {
                l.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        search: sub.get_one::<String>("search").map(|s| s.trim().to_string()),
    };

    let rows = store::fetch_disbursement_rankings(conn)?;
    let data = report::performance_report(&rows, &filter, page);

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let top: Vec<Vec<String>> = data
            .student_performance_rank
            .iter()
            .map(|r| {
                vec![
                    r.student.clone(),
                    r.school.clone(),
                    r.level.clone(),
                    format!("{:.2}", r.total_disbursement),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Student", "School", "Level", "Total Disbursed"], top)
        );
        let listing = &data.student_total_disbursements;
        let rows: Vec<Vec<String>> = listing
            .items
            .iter()
            .map(|r| {
                vec![
                    r.student.clone(),
                    r.school.clone(),
                    r.level.clone(),
                    format!("{:.2}", r.total_disbursement),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Student", "School", "Level", "Total Disbursed"], rows)
        );
        println!(
            "Page {}/{} ({} students)",
            listing.current_page, listing.total_pages, listing.total
        );
    }
    Ok(())
}
