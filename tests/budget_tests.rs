// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fundbook::notify::Notifier;
use fundbook::store::{self, SplitFilter};
use fundbook::{cli, commands::budgets, report};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingNotifier {
    events: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn funds_allocated(&self, email: &str, _name: &str, amount: &str) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("allocated:{}:{}", email, amount));
        Ok(())
    }

    fn funds_disbursed(&self, _email: &str, _name: &str, _amount: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn request_submitted(&self, _student: &str, _total: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn request_decision(
        &self,
        _email: &str,
        _name: &str,
        _decision: &str,
        _amount: &str,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE schools(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, location TEXT, phone TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE students(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, parent TEXT NOT NULL, phone TEXT, email TEXT, level TEXT NOT NULL, school_id INTEGER NOT NULL, status TEXT NOT NULL DEFAULT 'active', deactivated_at TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE budgets(id INTEGER PRIMARY KEY AUTOINCREMENT, period TEXT NOT NULL, year INTEGER NOT NULL, total TEXT NOT NULL DEFAULT '0', created_at TEXT NOT NULL DEFAULT (datetime('now')), UNIQUE(period, year));
        CREATE TABLE budget_distributions(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            budget_id INTEGER NOT NULL, student_id INTEGER NOT NULL,
            school TEXT NOT NULL, class TEXT NOT NULL,
            tuition TEXT NOT NULL DEFAULT '0', text_books TEXT NOT NULL DEFAULT '0',
            extra_classes TEXT NOT NULL DEFAULT '0', exam_fee TEXT NOT NULL DEFAULT '0',
            home_care TEXT NOT NULL DEFAULT '0', uniform_bag TEXT NOT NULL DEFAULT '0',
            excursion TEXT NOT NULL DEFAULT '0', transportation TEXT NOT NULL DEFAULT '0',
            wears TEXT NOT NULL DEFAULT '0', school_feeding TEXT NOT NULL DEFAULT '0',
            stationery TEXT NOT NULL DEFAULT '0', provision TEXT NOT NULL DEFAULT '0',
            created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE other_distributions(id INTEGER PRIMARY KEY AUTOINCREMENT, budget_id INTEGER NOT NULL, title TEXT NOT NULL, amount TEXT NOT NULL, comment TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        "#,
    )
    .unwrap();
    conn.execute("INSERT INTO schools(name) VALUES('Accra High')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO students(name, parent, email, level, school_id) VALUES('Ama','Mr Owusu','ama@example.com','shs',1)",
        [],
    )
    .unwrap();
    conn
}

fn run_budget(conn: &Connection, notifier: &RecordingNotifier, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["fundbook", "budget"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("budget", m)) => budgets::handle(conn, notifier, m),
        _ => panic!("no budget subcommand"),
    }
}

#[test]
fn duplicate_period_budget_is_rejected() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_budget(
        &conn,
        &notifier,
        &["create", "--period", "first", "--year", "2024"],
    )
    .unwrap();
    let err = run_budget(
        &conn,
        &notifier,
        &["create", "--period", "first", "--year", "2024"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // Same period in another year is fine.
    run_budget(
        &conn,
        &notifier,
        &["create", "--period", "first", "--year", "2025"],
    )
    .unwrap();
}

#[test]
fn distribute_rolls_total_and_notifies_student() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_budget(
        &conn,
        &notifier,
        &["create", "--period", "first", "--year", "2024"],
    )
    .unwrap();
    run_budget(
        &conn,
        &notifier,
        &[
            "distribute",
            "--id",
            "1",
            "--student",
            "Ama",
            "--school",
            "Accra High",
            "--class",
            "SHS2",
            "--tuition",
            "400",
            "--school-feeding",
            "60.50",
        ],
    )
    .unwrap();

    let total: String = conn
        .query_row("SELECT total FROM budgets WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, "460.50");
    assert_eq!(
        notifier.events.borrow().as_slice(),
        ["allocated:ama@example.com:460.50"]
    );

    run_budget(
        &conn,
        &notifier,
        &[
            "add-other",
            "--id",
            "1",
            "--title",
            "Admin costs",
            "--amount",
            "39.50",
        ],
    )
    .unwrap();
    let total: String = conn
        .query_row("SELECT total FROM budgets WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, "500.00");
}

#[test]
fn split_stats_scope_to_student_and_search() {
    let conn = setup();
    conn.execute(
        "INSERT INTO students(name, parent, level, school_id) VALUES('Kofi','Mrs Addo','jhs',1)",
        [],
    )
    .unwrap();
    let notifier = RecordingNotifier::default();
    run_budget(
        &conn,
        &notifier,
        &["create", "--period", "first", "--year", "2024"],
    )
    .unwrap();
    for (student, class, tuition) in [("Ama", "SHS2", "400"), ("Kofi", "JHS1", "150")] {
        run_budget(
            &conn,
            &notifier,
            &[
                "distribute",
                "--id",
                "1",
                "--student",
                student,
                "--school",
                "Accra High",
                "--class",
                class,
                "--tuition",
                tuition,
            ],
        )
        .unwrap();
    }

    let all = store::fetch_allocations(&conn, &SplitFilter::default()).unwrap();
    let chart = report::category_split(&all);
    assert_eq!(chart.values[0], "550".parse::<Decimal>().unwrap());

    let ama = store::fetch_allocations(
        &conn,
        &SplitFilter {
            student_id: Some(1),
            ..SplitFilter::default()
        },
    )
    .unwrap();
    assert_eq!(ama.len(), 1);
    assert_eq!(ama[0].tuition, "400".parse::<Decimal>().unwrap());

    let by_class = store::fetch_allocations(
        &conn,
        &SplitFilter {
            search: Some("jhs1".into()),
            ..SplitFilter::default()
        },
    )
    .unwrap();
    assert_eq!(by_class.len(), 1);
    assert_eq!(by_class[0].tuition, "150".parse::<Decimal>().unwrap());
}
