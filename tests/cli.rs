use assert_cmd::Command;
use chrono::Local;
use predicates::prelude::*;
use tempfile::TempDir;

fn todolite(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("todolite").unwrap();
    cmd.env("HOME", home.path()).env("NO_COLOR", "1");
    cmd
}

fn json(home: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = todolite(home)
        .args(["--output", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_path_points_into_home() {
    let home = TempDir::new().unwrap();

    todolite(&home)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains(".todolite").and(predicate::str::contains("todolite.db")));

    assert!(home.path().join(".todolite").join("todolite.db").exists());
}

#[test]
fn test_add_list_done_delete() {
    let home = TempDir::new().unwrap();

    let added = json(&home, &["add", "water plants", "--due", "2024-06-01"]);
    assert_eq!(added["id"], 1);
    json(&home, &["add", "file taxes", "--due", "2024-04-15"]);

    let listed = json(&home, &["list"]);
    assert_eq!(listed["count"], 2);
    assert_eq!(listed["items"][0]["name"], "file taxes");

    let done = json(&home, &["done", "2"]);
    assert_eq!(done["done"], true);

    let listed = json(&home, &["list"]);
    assert_eq!(listed["items"][0]["name"], "water plants");
    assert_eq!(listed["items"][1]["name"], "file taxes");

    json(&home, &["rm", "1"]);
    let listed = json(&home, &["list"]);
    assert_eq!(listed["count"], 1);
}

#[test]
fn test_between_and_range() {
    let home = TempDir::new().unwrap();
    json(&home, &["add", "a", "--due", "2024-01-10"]);
    json(&home, &["add", "b", "--due", "2024-02-10"]);
    json(&home, &["add", "c", "--due", "2024-03-10"]);

    let found = json(&home, &["between", "2024-01-10", "2024-02-10"]);
    assert_eq!(found["count"], 2);
    assert_eq!(found["items"][0]["name"], "b");

    let range = json(&home, &["range"]);
    assert_eq!(range["earliest"], "2024-01-10");
    assert_eq!(range["latest"], "2024-03-10");
}

#[test]
fn test_range_on_empty_store_is_today() {
    let home = TempDir::new().unwrap();
    let today = Local::now().date_naive().to_string();

    let range = json(&home, &["range"]);
    assert_eq!(range["earliest"], today.as_str());
    assert_eq!(range["latest"], today.as_str());
}

#[test]
fn test_page_zero_is_rejected() {
    let home = TempDir::new().unwrap();

    todolite(&home)
        .args(["list", "--page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn test_page_far_past_the_end_is_empty() {
    let home = TempDir::new().unwrap();
    json(&home, &["add", "only"]);

    let listed = json(&home, &["list", "--page", "4294967295", "--limit", "4294967295"]);
    assert_eq!(listed["count"], 0);
}

#[test]
fn test_unknown_id_fails() {
    let home = TempDir::new().unwrap();

    todolite(&home)
        .args(["rename", "99", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_pretty_list() {
    let home = TempDir::new().unwrap();
    json(&home, &["add", "read book"]);

    todolite(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1 of 1").and(predicate::str::contains("read book")));
}
