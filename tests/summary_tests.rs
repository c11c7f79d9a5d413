// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fundbook::models::Allocation;
use fundbook::report::{
    BudgetRecord, CATEGORY_LABELS, DisbursementRecord, FundRecord, PERIODS, category_split,
    overview_stats, period_summary,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn ts(day: u32) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

#[test]
fn period_chart_always_carries_every_period() {
    // Only the second term has data; the others must still appear as zeros.
    let chart = period_summary(vec![("second", dec("120")), ("second", dec("30"))]);
    assert_eq!(chart.labels, PERIODS.map(String::from).to_vec());
    assert_eq!(chart.values, vec![dec("0"), dec("150"), dec("0")]);

    let empty = period_summary(Vec::<(&str, Decimal)>::new());
    assert_eq!(empty.labels.len(), PERIODS.len());
    assert_eq!(empty.values, vec![Decimal::ZERO; PERIODS.len()]);
}

#[test]
fn category_split_keeps_canonical_label_order() {
    let sparse = Allocation {
        provision: dec("40"),
        tuition: dec("600"),
        ..Allocation::default()
    };
    let chart = category_split(&[sparse]);
    assert_eq!(chart.labels, CATEGORY_LABELS.map(String::from).to_vec());
    assert_eq!(chart.values[0], dec("600")); // Tuition first
    assert_eq!(chart.values[11], dec("40")); // Provision last
    assert_eq!(chart.values[1..11], vec![Decimal::ZERO; 10][..]);
}

#[test]
fn category_split_sums_column_wise() {
    let a = Allocation {
        tuition: dec("100"),
        wears: dec("25"),
        ..Allocation::default()
    };
    let b = Allocation {
        tuition: dec("50.50"),
        exam_fee: dec("10"),
        ..Allocation::default()
    };
    let chart = category_split(&[a, b]);
    assert_eq!(chart.values[0], dec("150.50"));
    assert_eq!(chart.values[3], dec("10"));
    assert_eq!(chart.values[8], dec("25"));
}

#[test]
fn overview_counts_supported_students_once() {
    let budgets = vec![
        BudgetRecord {
            id: 1,
            total: dec("1000"),
            period: "first".into(),
            year: 2024,
            created_at: ts(1),
        },
        BudgetRecord {
            id: 2,
            total: dec("500"),
            period: "second".into(),
            year: 2024,
            created_at: ts(2),
        },
    ];
    let disbursements = vec![
        DisbursementRecord {
            id: 1,
            amount: dec("200"),
            period: "first".into(),
            year: 2024,
            created_at: ts(3),
            student: Some("Ama".into()),
            title: None,
        },
        DisbursementRecord {
            id: 2,
            amount: dec("100"),
            period: "second".into(),
            year: 2024,
            created_at: ts(4),
            student: Some("Ama".into()),
            title: None,
        },
        DisbursementRecord {
            id: 3,
            amount: dec("50"),
            period: "second".into(),
            year: 2024,
            created_at: ts(5),
            student: None,
            title: Some("Office supplies".into()),
        },
    ];
    let funds = vec![FundRecord {
        id: 1,
        amount: dec("750"),
        title: "Gala".into(),
        period: "third".into(),
        year: 2024,
        created_at: ts(6),
    }];

    let stats = overview_stats(&budgets, &disbursements, &funds, &[]);
    assert_eq!(stats.funds_allocated, dec("1500"));
    assert_eq!(stats.funds_disbursed, dec("350"));
    assert_eq!(stats.total_funds, dec("750"));
    // Two of three disbursements went to the same student; the title-only
    // one supports nobody.
    assert_eq!(stats.students_supported, 1);
    assert_eq!(
        stats.total_funding_disbursed.values,
        vec![dec("200"), dec("150"), dec("0")]
    );
}
