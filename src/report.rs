// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger construction and aggregate reporting. Everything here is pure
//! computation over record collections fetched by `store`; no function in
//! this module touches the database.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{Allocation, PAGE_SIZE, Paginated};

/// School terms, in canonical order. Every period chart carries exactly
/// these labels.
pub const PERIODS: [&str; 3] = ["first", "second", "third"];

/// Display labels for the twelve allocation categories, in the canonical
/// order of `Allocation::values`.
pub const CATEGORY_LABELS: [&str; 12] = [
    "Tuition",
    "Text Books",
    "Extra Classes",
    "Exam Fee",
    "Home Care",
    "Uniform & Bag",
    "Excursion",
    "Transportation",
    "Wears",
    "School Feeding",
    "Stationery",
    "Provision",
];

/// Leaderboard length for the performance report.
pub const LEADERBOARD_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct BudgetRecord {
    pub id: i64,
    pub total: Decimal,
    pub period: String,
    pub year: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct DisbursementRecord {
    pub id: i64,
    pub amount: Decimal,
    pub period: String,
    pub year: i32,
    pub created_at: NaiveDateTime,
    /// Recipient name when the disbursement went to a student.
    pub student: Option<String>,
    /// Free-text description when it did not.
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FundRecord {
    pub id: i64,
    pub amount: Decimal,
    pub title: String,
    pub period: String,
    pub year: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Budget,
    Disbursement,
    Fund,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Budget => "budget",
            RowKind::Disbursement => "disbursement",
            RowKind::Fund => "fund",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RowKind,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDateTime,
    pub running_total: Decimal,
    pub period: String,
    pub year: i32,
}

/// Normalize the three record kinds into one chronological ledger and fold
/// the running balance. Disbursements enter negative; budgets and funds
/// positive. Budget rows are audit lines only: they show the balance at
/// their position without moving it, so the final running total is always
/// `sum(funds) - sum(disbursements)`.
pub fn build_ledger(
    budgets: &[BudgetRecord],
    disbursements: &[DisbursementRecord],
    funds: &[FundRecord],
) -> (Vec<LedgerRow>, Decimal) {
    let mut rows: Vec<LedgerRow> =
        Vec::with_capacity(budgets.len() + disbursements.len() + funds.len());

    for b in budgets {
        rows.push(LedgerRow {
            id: b.id,
            kind: RowKind::Budget,
            amount: b.total,
            description: format!("Budget for {} {}", b.period, b.year),
            date: b.created_at,
            running_total: Decimal::ZERO,
            period: b.period.clone(),
            year: b.year,
        });
    }
    for d in disbursements {
        let description = match d.student.as_deref() {
            Some(name) => format!("Disbursement to {}", name),
            None => format!("Disbursement: {}", d.title.as_deref().unwrap_or("")),
        };
        rows.push(LedgerRow {
            id: d.id,
            kind: RowKind::Disbursement,
            amount: -d.amount,
            description,
            date: d.created_at,
            running_total: Decimal::ZERO,
            period: d.period.clone(),
            year: d.year,
        });
    }
    for f in funds {
        rows.push(LedgerRow {
            id: f.id,
            kind: RowKind::Fund,
            amount: f.amount,
            description: format!("Fund: {}", f.title),
            date: f.created_at,
            running_total: Decimal::ZERO,
            period: f.period.clone(),
            year: f.year,
        });
    }

    // Stable sort: rows sharing a timestamp keep kind order budget,
    // disbursement, fund from the concatenation above.
    rows.sort_by_key(|r| r.date);

    let mut running = Decimal::ZERO;
    for row in &mut rows {
        if row.kind != RowKind::Budget {
            running += row.amount;
        }
        row.running_total = running;
    }

    (rows, running)
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

/// Group (period, amount) pairs by period and project the sums onto the
/// canonical period list. Periods with no data report zero; labels never
/// shrink.
pub fn period_summary<'a>(rows: impl IntoIterator<Item = (&'a str, Decimal)>) -> Chart {
    let mut sums: HashMap<&str, Decimal> = HashMap::new();
    for (period, amount) in rows {
        *sums.entry(period).or_insert(Decimal::ZERO) += amount;
    }
    Chart {
        labels: PERIODS.iter().map(|p| p.to_string()).collect(),
        values: PERIODS
            .iter()
            .map(|p| sums.get(p).copied().unwrap_or(Decimal::ZERO))
            .collect(),
    }
}

/// Column-wise category sums over a set of allocation lines, labelled in
/// canonical category order.
pub fn category_split(rows: &[Allocation]) -> Chart {
    let mut values = [Decimal::ZERO; 12];
    for row in rows {
        for (acc, v) in values.iter_mut().zip(row.values()) {
            *acc += v;
        }
    }
    Chart {
        labels: CATEGORY_LABELS.iter().map(|s| s.to_string()).collect(),
        values: values.to_vec(),
    }
}

/// One disbursement joined to its student and school, as fetched by
/// `store::fetch_disbursement_rankings`.
#[derive(Debug, Clone)]
pub struct RankedDisbursement {
    pub student: String,
    pub school: String,
    pub level: String,
    pub status: String,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct RankFilter {
    /// Case-insensitive substring match on disbursement status.
    pub status: Option<String>,
    pub year: Option<i32>,
    /// Student must be in one of these levels when non-empty.
    pub levels: Vec<String>,
    /// Case-insensitive substring match on student or school name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPerformanceRank {
    pub student: String,
    pub school: String,
    pub level: String,
    pub total_disbursement: Decimal,
}

/// Group filtered disbursements by (student, school), sum the amounts, and
/// order descending by total. Ties keep first-seen order.
pub fn rank_disbursements(
    rows: &[RankedDisbursement],
    filter: &RankFilter,
) -> Vec<StudentPerformanceRank> {
    let status = filter.status.as_deref().map(str::to_lowercase);
    let search = filter.search.as_deref().map(str::to_lowercase);

    let mut ranks: Vec<StudentPerformanceRank> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for row in rows {
        if let Some(ref s) = status {
            if !row.status.to_lowercase().contains(s.as_str()) {
                continue;
            }
        }
        if let Some(year) = filter.year {
            if row.year != year {
                continue;
            }
        }
        if !filter.levels.is_empty()
            && !filter.levels.iter().any(|l| l.eq_ignore_ascii_case(&row.level))
        {
            continue;
        }
        if let Some(ref q) = search {
            if !row.student.to_lowercase().contains(q.as_str())
                && !row.school.to_lowercase().contains(q.as_str())
            {
                continue;
            }
        }
        let key = (row.student.clone(), row.school.clone());
        match index.get(&key) {
            Some(&i) => ranks[i].total_disbursement += row.amount,
            None => {
                index.insert(key, ranks.len());
                ranks.push(StudentPerformanceRank {
                    student: row.student.clone(),
                    school: row.school.clone(),
                    level: row.level.clone(),
                    total_disbursement: row.amount,
                });
            }
        }
    }
    ranks.sort_by(|a, b| b.total_disbursement.cmp(&a.total_disbursement));
    ranks
}

pub fn paginate_ranks(
    ranks: Vec<StudentPerformanceRank>,
    page: usize,
) -> Paginated<StudentPerformanceRank> {
    let page = page.max(1);
    let total = ranks.len();
    let items: Vec<_> = ranks
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    Paginated::new(total, page, items)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryChart {
    pub budget: Chart,
    pub disbursements: Chart,
    pub fund: Chart,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub accounting: Vec<LedgerRow>,
    pub running_total: Decimal,
    pub summary_chart: SummaryChart,
}

pub fn finance_report(
    budgets: &[BudgetRecord],
    disbursements: &[DisbursementRecord],
    funds: &[FundRecord],
) -> FinanceReport {
    let (accounting, running_total) = build_ledger(budgets, disbursements, funds);
    FinanceReport {
        accounting,
        running_total,
        summary_chart: SummaryChart {
            budget: period_summary(budgets.iter().map(|b| (b.period.as_str(), b.total))),
            disbursements: period_summary(
                disbursements.iter().map(|d| (d.period.as_str(), d.amount)),
            ),
            fund: period_summary(funds.iter().map(|f| (f.period.as_str(), f.amount))),
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub funds_allocated: Decimal,
    pub total_funding_disbursed: Chart,
    pub funding_distribution: Chart,
    pub funds_disbursed: Decimal,
    pub students_supported: usize,
    pub total_funds: Decimal,
}

pub fn overview_stats(
    budgets: &[BudgetRecord],
    disbursements: &[DisbursementRecord],
    funds: &[FundRecord],
    allocations: &[Allocation],
) -> OverviewStats {
    let supported: HashSet<&str> = disbursements
        .iter()
        .filter_map(|d| d.student.as_deref())
        .collect();
    OverviewStats {
        funds_allocated: budgets.iter().map(|b| b.total).sum(),
        total_funding_disbursed: period_summary(
            disbursements.iter().map(|d| (d.period.as_str(), d.amount)),
        ),
        funding_distribution: category_split(allocations),
        funds_disbursed: disbursements.iter().map(|d| d.amount).sum(),
        students_supported: supported.len(),
        total_funds: funds.iter().map(|f| f.amount).sum(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryOverviewStats {
    pub funds_allocated: Decimal,
    pub total_funding_disbursed: Chart,
    pub funding_distribution: Chart,
    pub funds_disbursed: Decimal,
    pub total_requests: usize,
    pub pending_requests: usize,
}

/// Overview scoped to one beneficiary: the disbursement and allocation
/// collections must already be filtered to that student.
pub fn beneficiary_overview_stats(
    disbursements: &[DisbursementRecord],
    allocations: &[Allocation],
    total_requests: usize,
    pending_requests: usize,
) -> BeneficiaryOverviewStats {
    BeneficiaryOverviewStats {
        funds_allocated: allocations.iter().map(|a| a.total()).sum(),
        total_funding_disbursed: period_summary(
            disbursements.iter().map(|d| (d.period.as_str(), d.amount)),
        ),
        funding_distribution: category_split(allocations),
        funds_disbursed: disbursements.iter().map(|d| d.amount).sum(),
        total_requests,
        pending_requests,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub student_performance_rank: Vec<StudentPerformanceRank>,
    pub student_total_disbursements: Paginated<StudentPerformanceRank>,
}

/// Leaderboard (top 3, search ignored) plus the paginated full listing.
pub fn performance_report(
    rows: &[RankedDisbursement],
    filter: &RankFilter,
    page: usize,
) -> PerformanceReport {
    let leaderboard_filter = RankFilter {
        search: None,
        ..filter.clone()
    };
    let mut top = rank_disbursements(rows, &leaderboard_filter);
    top.truncate(LEADERBOARD_SIZE);
    PerformanceReport {
        student_performance_rank: top,
        student_total_disbursements: paginate_ranks(rank_disbursements(rows, filter), page),
    }
}
