// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fundbook::{cli, commands::importer};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE schools(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, location TEXT, phone TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        CREATE TABLE students(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, parent TEXT NOT NULL, phone TEXT, email TEXT, level TEXT NOT NULL, school_id INTEGER NOT NULL, status TEXT NOT NULL DEFAULT 'active', deactivated_at TEXT, created_at TEXT NOT NULL DEFAULT (datetime('now')));
        "#,
    )
    .unwrap();
    conn.execute("INSERT INTO schools(name) VALUES('Accra High')", [])
        .unwrap();
    conn
}

fn run_import(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["fundbook", "import", "students", "--path", path]);
    match matches.subcommand() {
        Some(("import", m)) => importer::handle(conn, m),
        _ => panic!("no import subcommand"),
    }
}

#[test]
fn importer_loads_students_and_trims_fields() {
    let mut conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name,parent,level,school,phone,email\n  Ama Owusu  , Mr Owusu ,shs, Accra High ,0241234567, ama@example.com \nKofi Addo,Mrs Addo,jhs,Accra High,,"
    )
    .unwrap();
    file.flush().unwrap();

    run_import(&mut conn, file.path().to_str().unwrap()).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let (name, email, phone): (String, Option<String>, Option<String>) = conn
        .query_row(
            "SELECT name, email, phone FROM students WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Ama Owusu");
    assert_eq!(email.as_deref(), Some("ama@example.com"));
    assert_eq!(phone.as_deref(), Some("0241234567"));

    let kofi_email: Option<String> = conn
        .query_row("SELECT email FROM students WHERE id=2", [], |r| r.get(0))
        .unwrap();
    assert_eq!(kofi_email, None);
}

#[test]
fn importer_rolls_back_on_unknown_school() {
    let mut conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name,parent,level,school,phone,email\nAma,Mr Owusu,shs,Accra High,,\nEsi,Mr Mensah,jhs,Ghost School,,"
    )
    .unwrap();
    file.flush().unwrap();

    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("School 'Ghost School' not found"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn importer_rejects_duplicate_names() {
    let mut conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name,parent,level,school,phone,email\nAma,Mr Owusu,shs,Accra High,,\nAma,Mrs Addo,jhs,Accra High,,"
    )
    .unwrap();
    file.flush().unwrap();

    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Import student 'Ama'"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = base_conn();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "name,parent,level,school,phone,email\nAma,Mr Owusu,shs,Accra High,,"
    )
    .unwrap();
    file.flush().unwrap();

    let padded = format!("  {}  ", file.path().to_str().unwrap());
    run_import(&mut conn, &padded).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
