// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read adapters between SQLite and the report engine. Fetchers return
//! fully-joined record collections so `report` never issues further store
//! calls mid-computation.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use thiserror::Error;

use crate::models::{
    Allocation, Budget, BudgetDistribution, Disbursement, Fund, OtherDistribution, Request,
    Student,
};
use crate::report::{BudgetRecord, DisbursementRecord, FundRecord, RankedDisbursement};
use crate::utils::decimal_or_zero;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("data unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

fn map_not_found(e: rusqlite::Error, what: String) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(what),
        other => StoreError::Unavailable(other),
    }
}

/// Optional period/year predicate; absent means no filter on that dimension.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    pub period: Option<String>,
    pub year: Option<i32>,
}

impl Filter {
    fn apply(&self, sql: &mut String, params: &mut Vec<String>, prefix: &str) {
        if let Some(ref period) = self.period {
            sql.push_str(&format!(" AND {}period=?", prefix));
            params.push(period.clone());
        }
        if let Some(year) = self.year {
            sql.push_str(&format!(" AND {}year=?", prefix));
            params.push(year.to_string());
        }
    }
}

fn query_params(params: &[String]) -> Vec<&dyn rusqlite::ToSql> {
    params.iter().map(|s| s as &dyn rusqlite::ToSql).collect()
}

pub fn fetch_budgets(conn: &Connection, filter: &Filter) -> Result<Vec<BudgetRecord>, StoreError> {
    let mut sql =
        String::from("SELECT id, total, period, year, created_at FROM budgets WHERE 1=1");
    let mut params = Vec::new();
    filter.apply(&mut sql, &mut params, "");
    sql.push_str(" ORDER BY created_at, id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(query_params(&params)))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let total: String = r.get(1)?;
        data.push(BudgetRecord {
            id: r.get(0)?,
            total: decimal_or_zero(&total),
            period: r.get(2)?,
            year: r.get(3)?,
            created_at: r.get::<_, NaiveDateTime>(4)?,
        });
    }
    Ok(data)
}

pub fn fetch_disbursements(
    conn: &Connection,
    filter: &Filter,
) -> Result<Vec<DisbursementRecord>, StoreError> {
    fetch_disbursement_records(conn, filter, None)
}

/// Beneficiary-scoped variant of `fetch_disbursements`.
pub fn fetch_disbursements_for(
    conn: &Connection,
    student_id: i64,
    filter: &Filter,
) -> Result<Vec<DisbursementRecord>, StoreError> {
    fetch_disbursement_records(conn, filter, Some(student_id))
}

fn fetch_disbursement_records(
    conn: &Connection,
    filter: &Filter,
    student_id: Option<i64>,
) -> Result<Vec<DisbursementRecord>, StoreError> {
    // Join-fetch the recipient name up front; the ledger decides between
    // recipient and title descriptions without further lookups.
    let mut sql = String::from(
        "SELECT d.id, d.amount, d.period, d.year, d.created_at, s.name, d.title
         FROM disbursements d LEFT JOIN students s ON d.student_id=s.id WHERE 1=1",
    );
    let mut params = Vec::new();
    filter.apply(&mut sql, &mut params, "d.");
    if let Some(id) = student_id {
        sql.push_str(" AND d.student_id=?");
        params.push(id.to_string());
    }
    sql.push_str(" ORDER BY d.created_at, d.id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(query_params(&params)))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(1)?;
        data.push(DisbursementRecord {
            id: r.get(0)?,
            amount: decimal_or_zero(&amount),
            period: r.get(2)?,
            year: r.get(3)?,
            created_at: r.get::<_, NaiveDateTime>(4)?,
            student: r.get(5)?,
            title: r.get(6)?,
        });
    }
    Ok(data)
}

pub fn fetch_funds(conn: &Connection, filter: &Filter) -> Result<Vec<FundRecord>, StoreError> {
    let mut sql =
        String::from("SELECT id, amount, title, period, year, created_at FROM funds WHERE 1=1");
    let mut params = Vec::new();
    filter.apply(&mut sql, &mut params, "");
    sql.push_str(" ORDER BY created_at, id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(query_params(&params)))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(1)?;
        data.push(FundRecord {
            id: r.get(0)?,
            amount: decimal_or_zero(&amount),
            title: r.get(2)?,
            period: r.get(3)?,
            year: r.get(4)?,
            created_at: r.get::<_, NaiveDateTime>(5)?,
        });
    }
    Ok(data)
}

/// Disbursements joined to student and school identity for the performance
/// ranker. Title-only disbursements have no student and are excluded.
pub fn fetch_disbursement_rankings(
    conn: &Connection,
) -> Result<Vec<RankedDisbursement>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT s.name, sch.name, s.level, d.status, d.year, d.amount
         FROM disbursements d
         INNER JOIN students s ON d.student_id=s.id
         INNER JOIN schools sch ON s.school_id=sch.id
         ORDER BY d.created_at, d.id",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(5)?;
        data.push(RankedDisbursement {
            student: r.get(0)?,
            school: r.get(1)?,
            level: r.get(2)?,
            status: r.get(3)?,
            year: r.get(4)?,
            amount: decimal_or_zero(&amount),
        });
    }
    Ok(data)
}

/// Predicates for allocation-line fetches feeding the category split.
#[derive(Debug, Default, Clone)]
pub struct SplitFilter {
    pub budget_id: Option<i64>,
    pub student_id: Option<i64>,
    pub period: Option<String>,
    pub year: Option<i32>,
    pub search: Option<String>,
}

pub fn fetch_allocations(
    conn: &Connection,
    filter: &SplitFilter,
) -> Result<Vec<Allocation>, StoreError> {
    let mut sql = String::from(
        "SELECT bd.tuition, bd.text_books, bd.extra_classes, bd.exam_fee, bd.home_care,
                bd.uniform_bag, bd.excursion, bd.transportation, bd.wears, bd.school_feeding,
                bd.stationery, bd.provision
         FROM budget_distributions bd
         INNER JOIN students s ON bd.student_id=s.id
         INNER JOIN budgets b ON bd.budget_id=b.id WHERE 1=1",
    );
    let mut params: Vec<String> = Vec::new();
    if let Some(id) = filter.budget_id {
        sql.push_str(" AND bd.budget_id=?");
        params.push(id.to_string());
    }
    if let Some(id) = filter.student_id {
        sql.push_str(" AND bd.student_id=?");
        params.push(id.to_string());
    }
    if let Some(ref period) = filter.period {
        sql.push_str(" AND b.period=?");
        params.push(period.clone());
    }
    if let Some(year) = filter.year {
        sql.push_str(" AND b.year=?");
        params.push(year.to_string());
    }
    if let Some(ref search) = filter.search {
        sql.push_str(
            " AND (LOWER(s.name) LIKE ? OR LOWER(bd.class) LIKE ? OR LOWER(bd.school) LIKE ?)",
        );
        let term = format!("%{}%", search.to_lowercase());
        params.push(term.clone());
        params.push(term.clone());
        params.push(term);
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(query_params(&params)))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_allocation_row(r, 0)?);
    }
    Ok(data)
}

/// Read twelve consecutive category columns starting at `start`.
pub fn read_allocation_row(
    r: &rusqlite::Row<'_>,
    start: usize,
) -> Result<Allocation, rusqlite::Error> {
    let col = |i: usize| -> Result<rust_decimal::Decimal, rusqlite::Error> {
        let s: String = r.get(start + i)?;
        Ok(decimal_or_zero(&s))
    };
    Ok(Allocation {
        tuition: col(0)?,
        text_books: col(1)?,
        extra_classes: col(2)?,
        exam_fee: col(3)?,
        home_care: col(4)?,
        uniform_bag: col(5)?,
        excursion: col(6)?,
        transportation: col(7)?,
        wears: col(8)?,
        school_feeding: col(9)?,
        stationery: col(10)?,
        provision: col(11)?,
    })
}

pub fn fetch_budget_distributions(
    conn: &Connection,
    budget_id: i64,
    search: Option<&str>,
) -> Result<Vec<BudgetDistribution>, StoreError> {
    let mut sql = String::from(
        "SELECT bd.id, s.name, bd.school, bd.class,
                bd.tuition, bd.text_books, bd.extra_classes, bd.exam_fee, bd.home_care,
                bd.uniform_bag, bd.excursion, bd.transportation, bd.wears, bd.school_feeding,
                bd.stationery, bd.provision, bd.created_at
         FROM budget_distributions bd INNER JOIN students s ON bd.student_id=s.id
         WHERE bd.budget_id=?",
    );
    let mut params = vec![budget_id.to_string()];
    if let Some(search) = search {
        sql.push_str(
            " AND (LOWER(s.name) LIKE ? OR LOWER(bd.class) LIKE ? OR LOWER(bd.school) LIKE ?)",
        );
        let term = format!("%{}%", search.to_lowercase());
        params.push(term.clone());
        params.push(term.clone());
        params.push(term);
    }
    sql.push_str(" ORDER BY bd.created_at, bd.id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(query_params(&params)))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(BudgetDistribution {
            id: r.get(0)?,
            student: r.get(1)?,
            school: r.get(2)?,
            class: r.get(3)?,
            allocation: read_allocation_row(r, 4)?,
            created_at: r.get::<_, NaiveDateTime>(16)?,
        });
    }
    Ok(data)
}

pub fn fetch_other_distributions(
    conn: &Connection,
    budget_id: i64,
) -> Result<Vec<OtherDistribution>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, amount, comment, created_at FROM other_distributions
         WHERE budget_id=? ORDER BY created_at, id",
    )?;
    let mut rows = stmt.query([budget_id])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(2)?;
        data.push(OtherDistribution {
            id: r.get(0)?,
            title: r.get(1)?,
            amount: decimal_or_zero(&amount),
            comment: r.get(3)?,
            created_at: r.get::<_, NaiveDateTime>(4)?,
        });
    }
    Ok(data)
}

pub fn get_budget(conn: &Connection, id: i64) -> Result<Budget, StoreError> {
    conn.query_row(
        "SELECT id, period, year, total, created_at FROM budgets WHERE id=?",
        [id],
        |r| {
            let total: String = r.get(3)?;
            Ok(Budget {
                id: r.get(0)?,
                period: r.get(1)?,
                year: r.get(2)?,
                total: decimal_or_zero(&total),
                created_at: r.get::<_, NaiveDateTime>(4)?,
            })
        },
    )
    .map_err(|e| map_not_found(e, format!("budget {}", id)))
}

pub fn get_fund(conn: &Connection, id: i64) -> Result<Fund, StoreError> {
    conn.query_row(
        "SELECT id, title, amount, period, year, comments, created_at FROM funds WHERE id=?",
        [id],
        |r| {
            let amount: String = r.get(2)?;
            Ok(Fund {
                id: r.get(0)?,
                title: r.get(1)?,
                amount: decimal_or_zero(&amount),
                period: r.get(3)?,
                year: r.get(4)?,
                comments: r.get(5)?,
                created_at: r.get::<_, NaiveDateTime>(6)?,
            })
        },
    )
    .map_err(|e| map_not_found(e, format!("fund {}", id)))
}

pub fn get_disbursement(conn: &Connection, id: i64) -> Result<Disbursement, StoreError> {
    conn.query_row(
        "SELECT d.id, s.name, d.title, d.amount, d.period, d.year, d.status, d.created_at
         FROM disbursements d LEFT JOIN students s ON d.student_id=s.id WHERE d.id=?",
        [id],
        |r| {
            let amount: String = r.get(3)?;
            Ok(Disbursement {
                id: r.get(0)?,
                student: r.get(1)?,
                title: r.get(2)?,
                amount: decimal_or_zero(&amount),
                period: r.get(4)?,
                year: r.get(5)?,
                status: r.get(6)?,
                created_at: r.get::<_, NaiveDateTime>(7)?,
            })
        },
    )
    .map_err(|e| map_not_found(e, format!("disbursement {}", id)))
}

pub fn get_request(conn: &Connection, id: i64) -> Result<Request, StoreError> {
    conn.query_row(
        "SELECT rq.id, s.name, rq.budget_id, rq.school, rq.class,
                rq.tuition, rq.text_books, rq.extra_classes, rq.exam_fee, rq.home_care,
                rq.uniform_bag, rq.excursion, rq.transportation, rq.wears, rq.school_feeding,
                rq.stationery, rq.provision, rq.status, rq.created_at
         FROM requests rq INNER JOIN students s ON rq.student_id=s.id WHERE rq.id=?",
        [id],
        |r| {
            Ok(Request {
                id: r.get(0)?,
                student: r.get(1)?,
                budget_id: r.get(2)?,
                school: r.get(3)?,
                class: r.get(4)?,
                allocation: read_allocation_row(r, 5)?,
                status: r.get(17)?,
                created_at: r.get::<_, NaiveDateTime>(18)?,
            })
        },
    )
    .map_err(|e| map_not_found(e, format!("request {}", id)))
}

pub fn get_student_by_name(conn: &Connection, name: &str) -> Result<Student, StoreError> {
    conn.query_row(
        "SELECT id, name, parent, phone, email, level, school_id, status
         FROM students WHERE name=?",
        [name],
        |r| {
            Ok(Student {
                id: r.get(0)?,
                name: r.get(1)?,
                parent: r.get(2)?,
                phone: r.get(3)?,
                email: r.get(4)?,
                level: r.get(5)?,
                school_id: r.get(6)?,
                status: r.get(7)?,
            })
        },
    )
    .map_err(|e| map_not_found(e, format!("student '{}'", name)))
}

pub fn count_requests(
    conn: &Connection,
    student_id: i64,
    status: Option<&str>,
) -> Result<usize, StoreError> {
    let mut sql = String::from("SELECT COUNT(*) FROM requests WHERE student_id=?");
    let mut params = vec![student_id.to_string()];
    if let Some(status) = status {
        sql.push_str(" AND status=?");
        params.push(status.to_string());
    }
    let count: i64 = conn.query_row(
        &sql,
        rusqlite::params_from_iter(query_params(&params)),
        |r| r.get(0),
    )?;
    Ok(count as usize)
}
