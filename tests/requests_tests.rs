// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fundbook::notify::Notifier;
use fundbook::{cli, commands::requests};
use rusqlite::Connection;
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

    fn funds_disbursed(&self, email: &str, _name: &str, amount: &str) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("disbursed:{}:{}", email, amount));
        Ok(())
    }

    fn request_submitted(&self, student: &str, total: &str) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("submitted:{}:{}", student, total));
        Ok(())
    }

    fn request_decision(
        &self,
        email: &str,
        _name: &str,
        decision: &str,
        amount: &str,
    ) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("decision:{}:{}:{}", email, decision, amount));
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
        CREATE TABLE requests(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL, budget_id INTEGER NOT NULL,
            school TEXT NOT NULL, class TEXT NOT NULL,
            tuition TEXT NOT NULL DEFAULT '0', text_books TEXT NOT NULL DEFAULT '0',
            extra_classes TEXT NOT NULL DEFAULT '0', exam_fee TEXT NOT NULL DEFAULT '0',
            home_care TEXT NOT NULL DEFAULT '0', uniform_bag TEXT NOT NULL DEFAULT '0',
            excursion TEXT NOT NULL DEFAULT '0', transportation TEXT NOT NULL DEFAULT '0',
            wears TEXT NOT NULL DEFAULT '0', school_feeding TEXT NOT NULL DEFAULT '0',
            stationery TEXT NOT NULL DEFAULT '0', provision TEXT NOT NULL DEFAULT '0',
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL DEFAULT (datetime('now')));
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
    conn.execute(
        "INSERT INTO budgets(period, year, total) VALUES('first', 2024, '0')",
        [],
    )
    .unwrap();
    conn
}

fn run_request(conn: &Connection, notifier: &RecordingNotifier, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["fundbook", "request"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("request", m)) => requests::handle(conn, notifier, m),
        _ => panic!("no request subcommand"),
    }
}

#[test]
fn submit_records_pending_request_and_notifies() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_request(
        &conn,
        &notifier,
        &[
            "submit",
            "--student",
            "Ama",
            "--budget",
            "1",
            "--school",
            "Accra High",
            "--class",
            "SHS2",
            "--tuition",
            "300",
            "--text-books",
            "50.25",
        ],
    )
    .unwrap();

    let (status, tuition): (String, String) = conn
        .query_row("SELECT status, tuition FROM requests WHERE id=1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(status, "pending");
    assert_eq!(tuition, "300");
    assert_eq!(
        notifier.events.borrow().as_slice(),
        ["submitted:Ama:350.25"]
    );
}

#[test]
fn approve_copies_request_into_distributions_and_rolls_up_total() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_request(
        &conn,
        &notifier,
        &[
            "submit", "--student", "Ama", "--budget", "1", "--school", "Accra High", "--class",
            "SHS2", "--tuition", "300", "--exam-fee", "40",
        ],
    )
    .unwrap();
    run_request(&conn, &notifier, &["approve", "--id", "1"]).unwrap();

    let status: String = conn
        .query_row("SELECT status FROM requests WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(status, "approved");

    let (count, tuition): (i64, String) = conn
        .query_row(
            "SELECT COUNT(*), MAX(tuition) FROM budget_distributions WHERE budget_id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(tuition, "300");

    let total: String = conn
        .query_row("SELECT total FROM budgets WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, "340");

    assert_eq!(
        notifier.events.borrow().last().unwrap(),
        "decision:ama@example.com:approved:340.00"
    );
}

#[test]
fn decline_keeps_budget_untouched() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_request(
        &conn,
        &notifier,
        &[
            "submit", "--student", "Ama", "--budget", "1", "--school", "Accra High", "--class",
            "SHS2", "--wears", "80",
        ],
    )
    .unwrap();
    run_request(&conn, &notifier, &["decline", "--id", "1"]).unwrap();

    let status: String = conn
        .query_row("SELECT status FROM requests WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(status, "declined");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM budget_distributions", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(count, 0);
    let total: String = conn
        .query_row("SELECT total FROM budgets WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(total, "0");
}

#[test]
fn decided_requests_cannot_be_removed_or_redecided() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run_request(
        &conn,
        &notifier,
        &[
            "submit", "--student", "Ama", "--budget", "1", "--school", "Accra High", "--class",
            "SHS2", "--tuition", "10",
        ],
    )
    .unwrap();
    run_request(&conn, &notifier, &["approve", "--id", "1"]).unwrap();

    let err = run_request(&conn, &notifier, &["rm", "--id", "1"]).unwrap_err();
    assert!(err.to_string().contains("Only pending requests"));

    let err = run_request(&conn, &notifier, &["decline", "--id", "1"]).unwrap_err();
    assert!(err.to_string().contains("already been approved"));
}

#[test]
fn submit_rejects_deactivated_student() {
    let conn = setup();
    conn.execute("UPDATE students SET status='inactive' WHERE name='Ama'", [])
        .unwrap();
    let notifier = RecordingNotifier::default();
    let err = run_request(
        &conn,
        &notifier,
        &[
            "submit", "--student", "Ama", "--budget", "1", "--school", "Accra High", "--class",
            "SHS2", "--tuition", "10",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("deactivated"));
    assert!(notifier.events.borrow().is_empty());
}
