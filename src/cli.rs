// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

/// CLI flag names for the twelve allocation categories, in canonical order.
pub const CATEGORY_ARGS: [&str; 12] = [
    "tuition",
    "text-books",
    "extra-classes",
    "exam-fee",
    "home-care",
    "uniform-bag",
    "excursion",
    "transportation",
    "wears",
    "school-feeding",
    "stationery",
    "provision",
];

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON Lines"),
    )
}

fn period_year_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .help("Term filter (first|second|third)"),
    )
    .arg(Arg::new("year").long("year").help("Year filter"))
}

fn allocation_args(mut cmd: Command) -> Command {
    for name in CATEGORY_ARGS {
        cmd = cmd.arg(Arg::new(name).long(name).default_value("0"));
    }
    cmd
}

fn page_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("page")
            .long("page")
            .value_parser(clap::value_parser!(usize))
            .default_value("1"),
    )
}

fn school_cmd() -> Command {
    Command::new("school")
        .about("Manage the school directory")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("location").long("location"))
                .arg(Arg::new("phone").long("phone")),
        )
        .subcommand(Command::new("list"))
        .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true)))
}

fn student_cmd() -> Command {
    Command::new("student")
        .about("Manage beneficiary students")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("parent").long("parent").required(true))
                .arg(Arg::new("level").long("level").required(true))
                .arg(Arg::new("school").long("school").required(true))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("email").long("email")),
        )
        .subcommand(json_args(page_arg(
            Command::new("list")
                .arg(Arg::new("search").long("search"))
                .arg(Arg::new("status").long("status")),
        )))
        .subcommand(
            Command::new("edit")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("parent").long("parent"))
                .arg(Arg::new("level").long("level"))
                .arg(Arg::new("school").long("school"))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("email").long("email")),
        )
        .subcommand(Command::new("deactivate").arg(Arg::new("name").long("name").required(true)))
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Manage term budgets and their distributions")
        .subcommand(
            Command::new("create")
                .arg(Arg::new("period").long("period").required(true))
                .arg(Arg::new("year").long("year").required(true)),
        )
        .subcommand(json_args(page_arg(period_year_args(Command::new("list")))))
        .subcommand(json_args(
            Command::new("show")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("search").long("search")),
        ))
        .subcommand(
            Command::new("edit")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("period").long("period").required(true)),
        )
        .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
        .subcommand(allocation_args(
            Command::new("distribute")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("student").long("student").required(true))
                .arg(Arg::new("school").long("school").required(true))
                .arg(Arg::new("class").long("class").required(true)),
        ))
        .subcommand(
            Command::new("add-other")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("comment").long("comment")),
        )
}

fn request_cmd() -> Command {
    Command::new("request")
        .about("Manage beneficiary funding requests")
        .subcommand(allocation_args(
            Command::new("submit")
                .arg(Arg::new("student").long("student").required(true))
                .arg(Arg::new("budget").long("budget").required(true))
                .arg(Arg::new("school").long("school").required(true))
                .arg(Arg::new("class").long("class").required(true)),
        ))
        .subcommand(json_args(page_arg(
            Command::new("list")
                .arg(Arg::new("student").long("student"))
                .arg(Arg::new("status").long("status")),
        )))
        .subcommand(Command::new("approve").arg(Arg::new("id").long("id").required(true)))
        .subcommand(Command::new("decline").arg(Arg::new("id").long("id").required(true)))
        .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
}

fn disbursement_cmd() -> Command {
    Command::new("disbursement")
        .about("Manage disbursements")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("student").long("student"))
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("period").long("period").required(true))
                .arg(Arg::new("year").long("year").required(true))
                .arg(Arg::new("status").long("status").default_value("approved")),
        )
        .subcommand(json_args(page_arg(period_year_args(
            Command::new("list").arg(Arg::new("search").long("search")),
        ))))
        .subcommand(
            Command::new("edit")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("student").long("student"))
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("period").long("period").required(true))
                .arg(Arg::new("year").long("year").required(true))
                .arg(Arg::new("status").long("status")),
        )
        .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
        .subcommand(json_args(
            Command::new("show").arg(Arg::new("id").long("id").required(true)),
        ))
}

fn fund_cmd() -> Command {
    Command::new("fund")
        .about("Manage fund intake")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("period").long("period").required(true))
                .arg(Arg::new("year").long("year").required(true))
                .arg(Arg::new("comment").long("comment")),
        )
        .subcommand(json_args(page_arg(period_year_args(Command::new("list")))))
        .subcommand(
            Command::new("edit")
                .arg(Arg::new("id").long("id").required(true))
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("period").long("period").required(true))
                .arg(Arg::new("year").long("year").required(true))
                .arg(Arg::new("comment").long("comment")),
        )
        .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Finance, overview, and performance reports")
        .subcommand(json_args(period_year_args(Command::new("finance"))))
        .subcommand(json_args(period_year_args(Command::new("overview"))))
        .subcommand(json_args(period_year_args(
            Command::new("beneficiary").arg(Arg::new("student").long("student").required(true)),
        )))
        .subcommand(json_args(page_arg(
            Command::new("performance")
                .arg(Arg::new("search").long("search"))
                .arg(Arg::new("status").long("status"))
                .arg(Arg::new("year").long("year"))
                .arg(
                    Arg::new("levels")
                        .long("levels")
                        .help("Comma-separated student levels"),
                ),
        )))
}

fn import_cmd() -> Command {
    Command::new("import").about("Import data from CSV").subcommand(
        Command::new("students").arg(Arg::new("path").long("path").required(true)),
    )
}

fn export_cmd() -> Command {
    Command::new("export").about("Export data").subcommand(period_year_args(
        Command::new("ledger")
            .arg(Arg::new("format").long("format").default_value("csv"))
            .arg(Arg::new("out").long("out").required(true)),
    ))
}

fn notify_cmd() -> Command {
    Command::new("notify")
        .about("Configure the notification webhook")
        .subcommand(
            Command::new("set-webhook").arg(Arg::new("url").long("url").required(true)),
        )
        .subcommand(Command::new("show"))
}

pub fn build_cli() -> Command {
    Command::new("fundbook")
        .about("Scholarship fund administration: students, budgets, disbursements, funds, reports")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(school_cmd())
        .subcommand(student_cmd())
        .subcommand(budget_cmd())
        .subcommand(request_cmd())
        .subcommand(disbursement_cmd())
        .subcommand(fund_cmd())
        .subcommand(report_cmd())
        .subcommand(import_cmd())
        .subcommand(export_cmd())
        .subcommand(Command::new("doctor").about("Check data integrity"))
        .subcommand(notify_cmd())
}
