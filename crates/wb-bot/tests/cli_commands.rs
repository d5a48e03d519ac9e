//! CLI integration tests for the wb-bot binary.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

fn wb() -> Command {
    Command::cargo_bin("wb").unwrap()
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_reports_each_group() {
    wb().args(["roll", "3d6", "2plot"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("rolled **3×d6, 2×plot**")
                .and(predicate::str::contains("**3 × d6:**"))
                .and(predicate::str::contains("(subtotal: "))
                .and(predicate::str::contains("**2 × Plot die:**"))
                .and(predicate::str::contains("Grand Total: ")),
        );
}

#[test]
fn roll_credits_user() {
    wb().args(["roll", "d20", "--user", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<@42> rolled **1×d20**"));
}

#[test]
fn roll_plot_only_totals_zero() {
    wb().args(["roll", "4plot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grand Total: 0**"));
}

#[test]
fn roll_rejects_unknown_die() {
    wb().args(["roll", "2d7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: unknown die: d7"));
}

#[test]
fn roll_rejects_oversized_pool() {
    for notation in [vec!["50000000d100"], vec!["3000000000d6", "3000000000d6"]] {
        wb().arg("roll")
            .args(&notation)
            .assert()
            .failure()
            .stderr(predicate::str::contains("error: invalid pool notation"));
    }
}

#[test]
fn roll_requires_notation() {
    wb().arg("roll").assert().failure();
}

// ---------------------------------------------------------------------------
// dice
// ---------------------------------------------------------------------------

#[test]
fn dice_lists_catalog() {
    wb().arg("dice").assert().success().stdout(
        predicate::str::contains("d4")
            .and(predicate::str::contains("d100"))
            .and(predicate::str::contains("1-100"))
            .and(predicate::str::contains("Complication +4")),
    );
}

// ---------------------------------------------------------------------------
// console
// ---------------------------------------------------------------------------

#[test]
fn console_builds_and_rolls_a_pool() {
    wb().arg("console")
        .write_stdin("start\nd6\n3\nmore\nplot\n2\nroll\nquit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Let's roll babay!")
                .and(predicate::str::contains("Added **3 × d6** to your pool."))
                .and(predicate::str::contains("**Current pool:** 3×d6"))
                .and(predicate::str::contains("<@console> rolled **3×d6, 2×plot**"))
                .and(predicate::str::contains("**2 × Plot die:**"))
                .and(predicate::str::contains("Grand Total: ")),
        );
}

#[test]
fn console_count_prompt_mentions_user() {
    wb().args(["console", "--user", "42"])
        .write_stdin("start\nd8\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<@42> Select how many **d8** to roll:",
        ));
}

#[test]
fn console_accepts_huge_timeouts() {
    wb().args([
        "console",
        "--count-timeout",
        "18446744073709551615",
        "--decision-timeout",
        "18446744073709551615",
    ])
    .write_stdin("start\nd6\n2\nroll\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("**2 × d6:**"));
}

#[test]
fn console_answers_by_number() {
    wb().arg("console")
        .write_stdin("start\n2\n1\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("**1 × d6:**"));
}

#[test]
fn console_needs_a_prompt_first() {
    wb().arg("console")
        .write_stdin("d6\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to answer yet"));
}

#[test]
fn console_rejects_unknown_option() {
    wb().arg("console")
        .write_stdin("start\nd7\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("'d7' is not one of the options."));
}

#[test]
fn console_json_output() {
    wb().args(["console", "--json", "--channel", "tavern"])
        .write_stdin("start\nd20\n1\nroll\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""type":"public""#)
                .and(predicate::str::contains(r#""channel":"tavern""#))
                .and(predicate::str::contains(r#""type":"ephemeral""#))
                .and(predicate::str::contains("Grand Total")),
        );
}
