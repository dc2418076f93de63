mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("flux_tracker_cli").unwrap();
    cmd.env("FLUX_TRACKER_CLI_SCRIPT", "1")
        .env("FLUX_TRACKER_HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = common::temp_base();
    let input = [
        "add-category Food",
        "salary 2024-03 2500",
        "add-payment Groceries 120.5 2024-03-05 Food",
        "add-recurring Laptop 300 2024-01-31 3 Food \"new laptop\"",
        "toggle Laptop 2024-02-29 paid",
        "month 2024-02",
        "summary 2024-03",
        "exit",
    ]
    .join("\n");

    cli(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Added category `Food`"))
        .stdout(contains("2024-02-29"))
        .stdout(contains("paid [2/3]"))
        .stdout(contains("Total expenses:  420.50"));

    let json = fs::read_to_string(home.join("data.json")).unwrap();
    assert!(json.contains("\"Groceries\""));
    assert!(json.contains("\"2024-02-29\": true"));
    assert!(json.contains("\"2024-03\": 2500.0"));
}

#[test]
fn unknown_commands_get_suggestions() {
    let home = common::temp_base();
    cli(&home)
        .write_stdin("sumary\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"));
}

#[test]
fn errors_are_printed_and_the_shell_continues() {
    let home = common::temp_base();
    cli(&home)
        .write_stdin("add-category Food\nadd-category food\ntoggle Nothing\ncategories\n")
        .assert()
        .success()
        .stdout(contains("Conflict"))
        .stdout(contains("no payment matches `Nothing`"))
        .stdout(contains("Food"));
}

#[test]
fn legacy_documents_are_migrated_on_start() {
    let home = common::temp_base();
    fs::write(
        home.join("data.json"),
        r#"{"salary": 4200, "payments": [], "categories": []}"#,
    )
    .unwrap();
    cli(&home)
        .write_stdin("salary 2025-05\nadvice 2025-05\nexit\n")
        .assert()
        .success()
        .stdout(contains("Migrated ledger"))
        .stdout(contains("Salary for 2025-05: 4200.00"))
        .stdout(contains("Advice for May 2025"));
}
