// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use expensebook::settings::{AppContext, get_setting, set_setting};
use expensebook::{cli, commands, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn defaults_when_nothing_stored() {
    let conn = setup();
    let ctx = AppContext::load(&conn).unwrap();
    assert_eq!(ctx, AppContext::default());
    assert!(ctx.show_income);
}

#[test]
fn save_and_load_round_trip() {
    let conn = setup();
    let ctx = AppContext {
        selected_group: Some(3),
        show_income: false,
        user_name: Some("Sam".into()),
    };
    ctx.save(&conn).unwrap();
    assert_eq!(AppContext::load(&conn).unwrap(), ctx);

    let cleared = AppContext::default();
    cleared.save(&conn).unwrap();
    assert_eq!(AppContext::load(&conn).unwrap(), cleared);
    assert_eq!(get_setting(&conn, "selected_group_id").unwrap(), None);
}

#[test]
fn garbage_values_fall_back() {
    let conn = setup();
    set_setting(&conn, "selected_group_id", "abc").unwrap();
    set_setting(&conn, "show_income", "maybe").unwrap();
    let ctx = AppContext::load(&conn).unwrap();
    assert_eq!(ctx.selected_group, None);
    assert!(ctx.show_income);
}

#[test]
fn removing_selected_group_resets_selection() {
    let conn = setup();
    conn.execute("INSERT INTO accounts(id,name,icon) VALUES (4,'Trip','airplane')", [])
        .unwrap();
    let ctx = AppContext {
        selected_group: Some(4),
        ..AppContext::default()
    };
    ctx.save(&conn).unwrap();

    let matches = cli::build_cli().get_matches_from(["expensebook", "group", "rm", "--name", "Trip"]);
    let (_, group_m) = matches.subcommand().unwrap();
    commands::groups::handle(&conn, &ctx, group_m).unwrap();
    assert_eq!(AppContext::load(&conn).unwrap().selected_group, None);
}

#[test]
fn show_income_toggle_persists() {
    let conn = setup();
    let matches =
        cli::build_cli().get_matches_from(["expensebook", "settings", "show-income", "false"]);
    let (_, m) = matches.subcommand().unwrap();
    commands::settings::handle(&conn, &AppContext::default(), m).unwrap();
    assert!(!AppContext::load(&conn).unwrap().show_income);
}

#[test]
fn group_select_needs_a_name_or_all() {
    assert!(
        cli::build_cli()
            .try_get_matches_from(["expensebook", "group", "select"])
            .is_err()
    );
    assert!(
        cli::build_cli()
            .try_get_matches_from(["expensebook", "group", "select", "--name", "Trip", "--all"])
            .is_err()
    );
}

#[test]
fn group_select_sets_and_clears_selection() {
    let conn = setup();
    conn.execute("INSERT INTO accounts(id,name,icon) VALUES (7,'Trip','airplane')", [])
        .unwrap();
    let run = |args: &[&str]| {
        let mut full = vec!["expensebook", "group", "select"];
        full.extend_from_slice(args);
        let matches = cli::build_cli().get_matches_from(full);
        let (_, group_m) = matches.subcommand().unwrap();
        let ctx = AppContext::load(&conn).unwrap();
        commands::groups::handle(&conn, &ctx, group_m)
    };

    run(&["--name", "Trip"]).unwrap();
    assert_eq!(AppContext::load(&conn).unwrap().selected_group, Some(7));
    assert!(run(&["--name", "Nowhere"]).is_err());
    assert_eq!(AppContext::load(&conn).unwrap().selected_group, Some(7));
    run(&["--all"]).unwrap();
    assert_eq!(AppContext::load(&conn).unwrap().selected_group, None);
}
