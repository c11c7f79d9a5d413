// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Fundbook", "fundbook"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("fundbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS schools(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        location TEXT,
        phone TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS students(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        parent TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        level TEXT NOT NULL,
        school_id INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','inactive')),
        deactivated_at TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(school_id) REFERENCES schools(id)
    );

    -- One budget (allocation plan) per term; period/year is the canonical
    -- filtering dimension across all finance tables.
    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        period TEXT NOT NULL,
        year INTEGER NOT NULL,
        total TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(period, year)
    );

    CREATE TABLE IF NOT EXISTS budget_distributions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        budget_id INTEGER NOT NULL,
        student_id INTEGER NOT NULL,
        school TEXT NOT NULL,
        class TEXT NOT NULL,
        tuition TEXT NOT NULL DEFAULT '0',
        text_books TEXT NOT NULL DEFAULT '0',
        extra_classes TEXT NOT NULL DEFAULT '0',
        exam_fee TEXT NOT NULL DEFAULT '0',
        home_care TEXT NOT NULL DEFAULT '0',
        uniform_bag TEXT NOT NULL DEFAULT '0',
        excursion TEXT NOT NULL DEFAULT '0',
        transportation TEXT NOT NULL DEFAULT '0',
        wears TEXT NOT NULL DEFAULT '0',
        school_feeding TEXT NOT NULL DEFAULT '0',
        stationery TEXT NOT NULL DEFAULT '0',
        provision TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(budget_id) REFERENCES budgets(id) ON DELETE CASCADE,
        FOREIGN KEY(student_id) REFERENCES students(id)
    );

    CREATE TABLE IF NOT EXISTS other_distributions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        budget_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        comment TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(budget_id) REFERENCES budgets(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS requests(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL,
        budget_id INTEGER NOT NULL,
        school TEXT NOT NULL,
        class TEXT NOT NULL,
        tuition TEXT NOT NULL DEFAULT '0',
        text_books TEXT NOT NULL DEFAULT '0',
        extra_classes TEXT NOT NULL DEFAULT '0',
        exam_fee TEXT NOT NULL DEFAULT '0',
        home_care TEXT NOT NULL DEFAULT '0',
        uniform_bag TEXT NOT NULL DEFAULT '0',
        excursion TEXT NOT NULL DEFAULT '0',
        transportation TEXT NOT NULL DEFAULT '0',
        wears TEXT NOT NULL DEFAULT '0',
        school_feeding TEXT NOT NULL DEFAULT '0',
        stationery TEXT NOT NULL DEFAULT '0',
        provision TEXT NOT NULL DEFAULT '0',
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending','approved','declined')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(student_id) REFERENCES students(id),
        FOREIGN KEY(budget_id) REFERENCES budgets(id) ON DELETE CASCADE
    );

    -- student_id and title are mutually exclusive: a disbursement goes to a
    -- named beneficiary or carries a free-text description.
    CREATE TABLE IF NOT EXISTS disbursements(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER,
        title TEXT,
        amount TEXT NOT NULL,
        period TEXT NOT NULL,
        year INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'approved' CHECK(status IN ('pending','approved','declined')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(student_id) REFERENCES students(id)
    );
    CREATE INDEX IF NOT EXISTS idx_disbursements_period_year ON disbursements(period, year);

    CREATE TABLE IF NOT EXISTS funds(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        period TEXT NOT NULL,
        year INTEGER NOT NULL,
        comments TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_funds_period_year ON funds(period, year);
    "#,
    )?;
    Ok(())
}
