// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fundbook::notify::Notifier;
use fundbook::{cli, commands::disbursements};
use rusqlite::Connection;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingNotifier {
    events: RefCell<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn funds_allocated(&self, _email: &str, _name: &str, _amount: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn funds_disbursed(&self, email: &str, name: &str, amount: &str) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push(format!("disbursed:{}:{}:{}", email, name, amount));
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
        CREATE TABLE schools(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, location TEXT, phone TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE students(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, parent TEXT NOT NULL, phone TEXT, email TEXT, level TEXT NOT NULL, school_id INTEGER NOT NULL, status TEXT NOT NULL DEFAULT 'active', deactivated_at TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE disbursements(id INTEGER PRIMARY KEY AUTOINCREMENT, student_id INTEGER, title TEXT, amount TEXT NOT NULL, period TEXT NOT NULL, year INTEGER NOT NULL, status TEXT NOT NULL DEFAULT 'approved', created_at TEXT NOT NULL DEFAULT (datetime('now')));
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
        "INSERT INTO students(name, parent, level, school_id, status) VALUES('Kofi','Mrs Addo','jhs',1,'inactive')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, notifier: &RecordingNotifier, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["fundbook", "disbursement"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("disbursement", m)) => disbursements::handle(conn, notifier, m),
        _ => panic!("no disbursement subcommand"),
    }
}

#[test]
fn add_to_student_stores_and_notifies() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run(
        &conn,
        &notifier,
        &[
            "add", "--student", "Ama", "--amount", "250.50", "--period", "first", "--year",
            "2024",
        ],
    )
    .unwrap();

    let (student_id, amount, status): (i64, String, String) = conn
        .query_row(
            "SELECT student_id, amount, status FROM disbursements WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(student_id, 1);
    assert_eq!(amount, "250.50");
    assert_eq!(status, "approved");
    assert_eq!(
        notifier.events.borrow().as_slice(),
        ["disbursed:ama@example.com:Ama:250.50"]
    );
}

#[test]
fn add_rejects_deactivated_student() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    let err = run(
        &conn,
        &notifier,
        &[
            "add", "--student", "Kofi", "--amount", "10", "--period", "first", "--year", "2024",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("deactivated"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM disbursements", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn add_with_title_needs_no_student() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run(
        &conn,
        &notifier,
        &[
            "add", "--title", "Bus repair", "--amount", "75", "--period", "second", "--year",
            "2024", "--status", "pending",
        ],
    )
    .unwrap();

    let (student_id, title, status): (Option<i64>, String, String) = conn
        .query_row(
            "SELECT student_id, title, status FROM disbursements WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(student_id, None);
    assert_eq!(title, "Bus repair");
    assert_eq!(status, "pending");
    assert!(notifier.events.borrow().is_empty());
}

#[test]
fn add_rejects_unknown_period() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    let err = run(
        &conn,
        &notifier,
        &[
            "add", "--student", "Ama", "--amount", "10", "--period", "fourth", "--year", "2024",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid period 'fourth'"));
}

#[test]
fn edit_switches_between_recipient_and_title() {
    let conn = setup();
    let notifier = RecordingNotifier::default();
    run(
        &conn,
        &notifier,
        &[
            "add", "--student", "Ama", "--amount", "100", "--period", "first", "--year", "2024",
        ],
    )
    .unwrap();

    run(
        &conn,
        &notifier,
        &[
            "edit", "--id", "1", "--title", "General supplies", "--amount", "120", "--period",
            "second", "--year", "2024",
        ],
    )
    .unwrap();

    let (student_id, title, amount, period): (Option<i64>, Option<String>, String, String) = conn
        .query_row(
            "SELECT student_id, title, amount, period FROM disbursements WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(student_id, None);
    assert_eq!(title.as_deref(), Some("General supplies"));
    assert_eq!(amount, "120");
    assert_eq!(period, "second");
}
