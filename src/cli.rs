// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Reference month (defaults to the current month)")
}

fn group_arg() -> Arg {
    Arg::new("group")
        .long("group")
        .value_name("NAME")
        .help("Restrict to one group (defaults to the selected group)")
}

fn all_groups_arg() -> Arg {
    Arg::new("all-groups")
        .long("all-groups")
        .action(ArgAction::SetTrue)
        .conflicts_with("group")
        .help("Ignore the selected group")
}

/// Transaction fields shared by `add` (amount required, kind defaults to
/// expense) and `edit` (every field optional).
fn tx_fields(cmd: Command, adding: bool) -> Command {
    let mut kind = Arg::new("kind")
        .long("kind")
        .value_parser(["income", "expense"])
        .help("income or expense");
    if adding {
        kind = kind.default_value("expense");
    }
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .required(adding)
            .allow_hyphen_values(true),
    )
    .arg(kind)
    .arg(Arg::new("category").long("category"))
    .arg(Arg::new("description").long("description").short('d'))
    .arg(
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD[ HH:MM]")
            .help("Defaults to now"),
    )
    .arg(group_arg())
    .arg(
        Arg::new("payment")
            .long("payment")
            .value_parser(["cash", "credit", "e-cash"]),
    )
}

pub fn build_cli() -> Command {
    command!()
        .name("expensebook")
        .about("Personal income/expense ledger")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("Use this SQLite file instead of the platform data dir"),
        )
        .subcommand(Command::new("init").about("Create the database and default data"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("color").long("color").default_value("#607D8B"))
                        .arg(Arg::new("icon").long("icon").default_value("box")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("new-name").long("new-name"))
                        .arg(Arg::new("color").long("color"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("group")
                .about("Manage groups (sub-ledgers)")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("icon").long("icon").default_value("wallet")),
                )
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true)))
                .subcommand(
                    Command::new("select")
                        .about("Select the group used by default")
                        .arg(Arg::new("name").long("name"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Clear the selection"),
                        )
                        .group(
                            ArgGroup::new("target")
                                .args(["name", "all"])
                                .required(true),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(
                    tx_fields(Command::new("edit"), false)
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("search").long("search").short('s'))
                        .arg(Arg::new("category").long("category"))
                        .arg(group_arg())
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .conflicts_with_all(["from", "to"]),
                        )
                        .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Month dashboard: balances and breakdowns")
                .arg(month_arg())
                .arg(group_arg())
                .arg(all_groups_arg()),
        ))
        .subcommand(
            Command::new("report")
                .about("Month report with transaction listings")
                .subcommand(json_flags(
                    Command::new("show")
                        .arg(month_arg())
                        .arg(group_arg())
                        .arg(all_groups_arg()),
                ))
                .subcommand(
                    Command::new("export")
                        .arg(month_arg())
                        .arg(group_arg())
                        .arg(all_groups_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("backup")
                .about("Local JSON backup and restore")
                .subcommand(Command::new("export").arg(Arg::new("out").long("out").required(true)))
                .subcommand(
                    Command::new("import").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Preferences")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("show-income").arg(
                        Arg::new("value")
                            .required(true)
                            .value_parser(clap::value_parser!(bool)),
                    ),
                )
                .subcommand(Command::new("name").arg(Arg::new("name").required(true))),
        )
}
