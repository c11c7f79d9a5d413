// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::Allocation;
use crate::utils::parse_decimal;

/// Read the twelve allocation category flags into an `Allocation`.
pub fn allocation_from_args(sub: &clap::ArgMatches) -> Result<Allocation> {
    let get = |name: &str| parse_decimal(sub.get_one::<String>(name).unwrap());
    Ok(Allocation {
        tuition: get("tuition")?,
        text_books: get("text-books")?,
        extra_classes: get("extra-classes")?,
        exam_fee: get("exam-fee")?,
        home_care: get("home-care")?,
        uniform_bag: get("uniform-bag")?,
        excursion: get("excursion")?,
        transportation: get("transportation")?,
        wears: get("wears")?,
        school_feeding: get("school-feeding")?,
        stationery: get("stationery")?,
        provision: get("provision")?,
    })
}

pub mod schools;
pub mod students;
pub mod budgets;
pub mod requests;
pub mod disbursements;
pub mod funds;
pub mod reports;
pub mod importer;
pub mod exporter;
pub mod doctor;
pub mod notify_settings;
