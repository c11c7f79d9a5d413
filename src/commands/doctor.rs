// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::PERIODS;
use crate::utils::{decimal_or_zero, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Disbursements pointing at deactivated students
    let mut stmt = conn.prepare(
        "SELECT d.id, s.name FROM disbursements d
         INNER JOIN students s ON d.student_id=s.id WHERE s.status='inactive'",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        rows.push(vec![
            "disbursement_inactive_student".into(),
            format!("{} -> {}", id, name),
        ]);
    }

    // 2) Unknown periods anywhere in the finance tables
    for table in ["budgets", "disbursements", "funds"] {
        let sql = format!("SELECT id, period FROM {} ORDER BY id", table);
        let mut stmt = conn.prepare(&sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let period: String = r.get(1)?;
            if !PERIODS.contains(&period.as_str()) {
                rows.push(vec![
                    "unknown_period".into(),
                    format!("{} {} '{}'", table, id, period),
                ]);
            }
        }
    }

    // 3) Budget totals drifting from their distribution lines
    let mut stmt = conn.prepare("SELECT id, total FROM budgets ORDER BY id")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let total_s: String = r.get(1)?;
        let stored = decimal_or_zero(&total_s);

        let mut lines = Decimal::ZERO;
        let mut dstmt = conn.prepare(
            "SELECT tuition, text_books, extra_classes, exam_fee, home_care, uniform_bag,
                    excursion, transportation, wears, school_feeding, stationery, provision
             FROM budget_distributions WHERE budget_id=?1",
        )?;
        let mut dcur = dstmt.query([id])?;
        while let Some(d) = dcur.next()? {
            for i in 0..12 {
                let v: String = d.get(i)?;
                lines += decimal_or_zero(&v);
            }
        }
        let mut ostmt =
            conn.prepare("SELECT amount FROM other_distributions WHERE budget_id=?1")?;
        let mut ocur = ostmt.query([id])?;
        while let Some(o) = ocur.next()? {
            let v: String = o.get(0)?;
            lines += decimal_or_zero(&v);
        }
        if stored != lines {
            rows.push(vec![
                "budget_total_drift".into(),
                format!("budget {} stored {} vs lines {}", id, stored, lines),
            ]);
        }
    }

    // 4) Amounts that do not parse as decimals (counted as 0 in reports)
    for (table, column) in [
        ("budgets", "total"),
        ("disbursements", "amount"),
        ("funds", "amount"),
        ("other_distributions", "amount"),
    ] {
        let sql = format!("SELECT id, {} FROM {} ORDER BY id", column, table);
        let mut stmt = conn.prepare(&sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let raw: String = r.get(1)?;
            if raw.trim().parse::<Decimal>().is_err() {
                rows.push(vec![
                    "invalid_amount".into(),
                    format!("{} {} '{}'", table, id, raw),
                ]);
            }
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
