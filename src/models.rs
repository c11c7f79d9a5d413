// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed page size for every paginated listing.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub parent: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub level: String,
    pub school_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub period: String,
    pub year: i32,
    pub total: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fund {
    pub id: i64,
    pub title: String,
    pub amount: Decimal,
    pub period: String,
    pub year: i32,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disbursement {
    pub id: i64,
    pub student: Option<String>,
    pub title: Option<String>,
    pub amount: Decimal,
    pub period: String,
    pub year: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// One allocation line: the twelve budget categories a student can be
/// funded for. Shared by budget distributions and requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allocation {
    pub tuition: Decimal,
    pub text_books: Decimal,
    pub extra_classes: Decimal,
    pub exam_fee: Decimal,
    pub home_care: Decimal,
    pub uniform_bag: Decimal,
    pub excursion: Decimal,
    pub transportation: Decimal,
    pub wears: Decimal,
    pub school_feeding: Decimal,
    pub stationery: Decimal,
    pub provision: Decimal,
}

impl Allocation {
    /// Category amounts in the canonical reporting order. Must stay in sync
    /// with `report::CATEGORY_LABELS`.
    pub fn values(&self) -> [Decimal; 12] {
        [
            self.tuition,
            self.text_books,
            self.extra_classes,
            self.exam_fee,
            self.home_care,
            self.uniform_bag,
            self.excursion,
            self.transportation,
            self.wears,
            self.school_feeding,
            self.stationery,
            self.provision,
        ]
    }

    pub fn total(&self) -> Decimal {
        self.values().iter().copied().sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetDistribution {
    pub id: i64,
    pub student: String,
    pub school: String,
    pub class: String,
    #[serde(flatten)]
    pub allocation: Allocation,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtherDistribution {
    pub id: i64,
    pub title: String,
    pub amount: Decimal,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: i64,
    pub student: String,
    pub budget_id: i64,
    pub school: String,
    pub class: String,
    #[serde(flatten)]
    pub allocation: Allocation,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    /// `total` is the full (unpaginated) row count; `items` is the current
    /// page slice. An empty set yields zero pages.
    pub fn new(total: usize, current_page: usize, items: Vec<T>) -> Self {
        Paginated {
            total,
            current_page,
            total_pages: total.div_ceil(PAGE_SIZE),
            items,
        }
    }
}
