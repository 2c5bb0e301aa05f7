//! CLI integration tests for Basket
//!
//! These tests drive the binary through whole workflows: project setup,
//! list and item management, plan gating, sharing and suggestions.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the basket binary
fn basket_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("basket"));
    cmd.env_remove("BASKET_LOG");
    cmd
}

/// Create a temporary directory and initialize a basket project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    basket_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Runs a command in the project with JSON output and parses stdout
fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = basket_cmd()
        .current_dir(dir.path())
        .args(args)
        .args(["--format", "json"])
        .assert()
        .success();
    serde_json::from_str(&String::from_utf8_lossy(&output.get_output().stdout)).unwrap()
}

fn upgrade(dir: &TempDir) {
    basket_cmd()
        .current_dir(dir.path())
        .args(["plan", "upgrade"])
        .assert()
        .success();
}

fn item_names(dir: &TempDir, list: &str) -> Vec<String> {
    let list = json(dir, &["list", "show", list]);
    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    basket_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized basket project"));

    assert!(dir.path().join(".basket").is_dir());
    assert!(dir.path().join(".basket/exports").is_dir());
    assert!(dir.path().join(".basket/config.toml").is_file());
    assert!(dir.path().join(".basket/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    basket_cmd().arg("init").arg(dir.path()).assert().success();
    basket_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "ls"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a basket project"));
}

// =============================================================================
// List Tests
// =============================================================================

#[test]
fn test_list_new_and_ls() {
    let dir = setup_project();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created list"));

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly"))
        .stdout(predicate::str::contains("Groceries"));

    assert!(dir.path().join(".basket/lists.jsonl").is_file());
}

#[test]
fn test_list_new_json_output() {
    let dir = setup_project();

    let list = json(&dir, &["list", "new", "Weekly", "--category", "household"]);

    assert!(list["id"].as_str().unwrap().starts_with("l-"));
    assert_eq!(list["name"], "Weekly");
    assert_eq!(list["category"], "household");
}

#[test]
fn test_free_plan_caps_lists_at_three() {
    let dir = setup_project();

    for name in ["One", "Two", "Three"] {
        basket_cmd()
            .current_dir(dir.path())
            .args(["list", "new", name])
            .assert()
            .success();
    }

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Four"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upgrade to Premium"));

    upgrade(&dir);

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Four"])
        .assert()
        .success();
}

#[test]
fn test_premium_list_category_is_gated() {
    let dir = setup_project();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Gadgets", "--category", "electronics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upgrade to Premium"));

    upgrade(&dir);

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Gadgets", "--category", "electronics"])
        .assert()
        .success();
}

#[test]
fn test_budget_requires_premium() {
    let dir = setup_project();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Party", "--budget", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Budget Tracking is a Premium feature"));
}

#[test]
fn test_show_survives_overflowing_budget_total() {
    let dir = setup_project();
    upgrade(&dir);
    json(&dir, &["list", "new", "Fleet", "--budget", "50"]);
    json(
        &dir,
        &[
            "item",
            "add",
            "Fleet",
            "Yacht",
            "--qty",
            "100000000000000",
            "--price",
            "100000000000000000",
        ],
    );

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "show", "Fleet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(estimated n/a)"))
        .stdout(predicate::str::contains("Over budget!"));
}

#[test]
fn test_list_saved_when_counter_write_fails() {
    let dir = setup_project();
    // The state file is written via a temp file; a directory in its place
    // makes every state write fail
    fs::create_dir(dir.path().join(".basket/state.toml.tmp")).unwrap();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "new", "Weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created list"))
        .stderr(predicate::str::contains("lists-created counter was not updated"));

    let lists = json(&dir, &["list", "ls"]);
    assert_eq!(lists.as_array().unwrap().len(), 1);
}

#[test]
fn test_list_rename_and_rm() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "rename", "weekly", "Monthly"])
        .assert()
        .success();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "show", "Monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly"));

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "rm", "Monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted list"));

    let lists = json(&dir, &["list", "ls"]);
    assert_eq!(lists.as_array().unwrap().len(), 0);
}

#[test]
fn test_list_rename_changes_category() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    let list = json(&dir, &["list", "rename", "Weekly", "--category", "household"]);
    assert_eq!(list["name"], "Weekly");
    assert_eq!(list["category"], "household");

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "rename", "Weekly", "--category", "electronics"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upgrade to Premium"));

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "rename", "Weekly"])
        .assert()
        .failure();
}

#[test]
fn test_list_ls_templates_only() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["list", "new", "Staples", "--template"]);

    let templates = json(&dir, &["list", "ls", "--templates"]);
    let templates = templates.as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["name"], "Staples");
}

#[test]
fn test_show_unknown_list_fails() {
    let dir = setup_project();

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "show", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("List not found"));
}

#[test]
fn test_from_template_copies_items() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Staples", "--template"]);
    json(&dir, &["item", "add", "Staples", "Bread"]);
    json(&dir, &["item", "add", "Staples", "Eggs"]);
    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "done", "Staples", "Bread"])
        .assert()
        .success();

    let list = json(&dir, &["list", "from-template", "Staples", "This week"]);
    assert_eq!(list["name"], "This week");
    assert_eq!(list["is_template"], false);
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["is_completed"] == false));
}

#[test]
fn test_clear_completed() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["item", "add", "Weekly", "Milk"]);
    json(&dir, &["item", "add", "Weekly", "Bread"]);
    json(&dir, &["item", "done", "Weekly", "milk"]);

    let result = json(&dir, &["list", "clear-completed", "Weekly"]);
    assert_eq!(result["removed"], 1);
    assert_eq!(item_names(&dir, "Weekly"), vec!["Bread"]);
}

#[test]
fn test_locate_requires_premium() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "locate", "Weekly", "--lat", "52.52", "--lon", "13.40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Location Reminders is a Premium feature"));

    upgrade(&dir);

    basket_cmd()
        .current_dir(dir.path())
        .args([
            "list", "locate", "Weekly", "--lat", "52.52", "--lon", "-13.40", "--label", "Corner shop",
        ])
        .assert()
        .success();

    let list = json(&dir, &["list", "show", "Weekly"]);
    assert_eq!(list["location"]["label"], "Corner shop");
    assert_eq!(list["location"]["radius_meters"], 100.0);
}

#[test]
fn test_free_plan_caps_reminders() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    for _ in 0..5 {
        basket_cmd()
            .current_dir(dir.path())
            .args(["list", "remind", "Weekly"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Reminder for Weekly"));
    }

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "remind", "Weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upgrade to Premium"));
}

// =============================================================================
// Item Tests
// =============================================================================

#[test]
fn test_item_add_and_show() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args([
            "item", "add", "Weekly", "Milk", "--qty", "2", "--unit", "liter", "--category", "dairy",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added item"));

    basket_cmd()
        .current_dir(dir.path())
        .args(["list", "show", "Weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Milk"))
        .stdout(predicate::str::contains("2 L"));
}

#[test]
fn test_item_add_rejects_empty_name() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "add", "Weekly", "   "])
        .assert()
        .failure();
}

#[test]
fn test_premium_unit_is_gated() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "add", "Weekly", "Eggs", "--unit", "dozen"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upgrade to Premium"));

    assert!(item_names(&dir, "Weekly").is_empty());
}

#[test]
fn test_item_image_requires_premium() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    let image = dir.path().join("milk.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "add", "Weekly", "Milk", "--image"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item Images is a Premium feature"));

    upgrade(&dir);

    let item = basket_cmd()
        .current_dir(dir.path())
        .args(["item", "add", "Weekly", "Milk", "--format", "json", "--image"])
        .arg(&image)
        .assert()
        .success();
    let item: Value =
        serde_json::from_str(&String::from_utf8_lossy(&item.get_output().stdout)).unwrap();
    assert_eq!(item["image"], "iVBORw==");
}

#[test]
fn test_item_done_toggles() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["item", "add", "Weekly", "Milk", "--price", "1.25"]);

    let item = json(&dir, &["item", "done", "Weekly", "Milk"]);
    assert_eq!(item["is_completed"], true);
    assert_eq!(item["last_purchased_price"], "1.25");

    let item = json(&dir, &["item", "done", "Weekly", "Milk"]);
    assert_eq!(item["is_completed"], false);
}

#[test]
fn test_item_mv_reorders() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    for name in ["A", "B", "C"] {
        json(&dir, &["item", "add", "Weekly", name]);
    }

    let result = json(&dir, &["item", "mv", "Weekly", "0", "2"]);
    assert_eq!(result["order"], serde_json::json!(["B", "A", "C"]));
    assert_eq!(item_names(&dir, "Weekly"), vec!["B", "A", "C"]);
}

#[test]
fn test_item_edit_and_rm() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    let item = json(&dir, &["item", "add", "Weekly", "Milk"]);
    let item_id = item["id"].as_str().unwrap().to_string();

    let edited = json(
        &dir,
        &["item", "edit", "Weekly", &item_id, "--name", "Oat milk", "--notes", "barista"],
    );
    assert_eq!(edited["name"], "Oat milk");
    assert_eq!(edited["notes"], "barista");
    assert_eq!(edited["id"], item_id.as_str());

    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "rm", "Weekly", "oat milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed item"));

    assert!(item_names(&dir, "Weekly").is_empty());
}

// =============================================================================
// Share Tests
// =============================================================================

#[test]
fn test_share_requires_premium() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["share", "Weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("share and export"))
        .stderr(predicate::str::contains("Upgrade to Premium"));
}

#[test]
fn test_share_with_csv() {
    let dir = setup_project();
    upgrade(&dir);
    json(&dir, &["list", "new", "Test List"]);
    json(&dir, &["item", "add", "Test List", "Milk", "--category", "dairy"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["share", "Test List", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. ⭕ Milk (1)"))
        .stdout(predicate::str::contains("CSV saved to"))
        .stdout(predicate::str::contains("Category").not());

    let csv = fs::read_to_string(dir.path().join(".basket/exports/Test_List.csv")).unwrap();
    assert_eq!(csv.lines().nth(1), Some("1,Milk,1,,,,No"));
}

#[test]
fn test_share_records_targets() {
    let dir = setup_project();
    upgrade(&dir);
    json(&dir, &["list", "new", "Weekly"]);

    let shared = json(&dir, &["share", "Weekly", "--with", "sam", "--with", "alex"]);
    assert_eq!(shared["shared_with"], serde_json::json!(["sam", "alex"]));

    let list = json(&dir, &["list", "show", "Weekly"]);
    assert_eq!(list["is_shared"], true);
}

#[test]
fn test_share_stop_clears_targets() {
    let dir = setup_project();
    upgrade(&dir);
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["share", "Weekly", "--with", "sam"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["plan", "downgrade"])
        .assert()
        .success();

    basket_cmd()
        .current_dir(dir.path())
        .args(["share", "Weekly", "--stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped sharing"));

    let list = json(&dir, &["list", "show", "Weekly"]);
    assert_eq!(list["is_shared"], false);
    assert!(list.get("shared_with").is_none());
}

// =============================================================================
// Suggestion Tests
// =============================================================================

#[test]
fn test_suggest_ranks_by_usage() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["item", "add", "Weekly", "Milk"]);
    json(&dir, &["item", "add", "Weekly", "milk"]);
    json(&dir, &["item", "add", "Weekly", "Almond milk"]);
    json(&dir, &["item", "add", "Weekly", "Bread"]);

    let suggestions = json(&dir, &["suggest", "MIL"]);
    let suggestions = suggestions.as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["name"].as_str().unwrap().to_lowercase(), "milk");
    assert_eq!(suggestions[0]["usage_count"], 2);
}

#[test]
fn test_suggest_remembers_removed_items() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);
    json(&dir, &["item", "add", "Weekly", "Cheese"]);
    basket_cmd()
        .current_dir(dir.path())
        .args(["item", "rm", "Weekly", "Cheese"])
        .assert()
        .success();

    basket_cmd()
        .current_dir(dir.path())
        .args(["suggest", "chee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cheese"));
}

#[test]
fn test_suggest_blank_query() {
    let dir = setup_project();

    basket_cmd()
        .current_dir(dir.path())
        .args(["suggest", "  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suggestions"));
}

// =============================================================================
// Plan Tests
// =============================================================================

#[test]
fn test_plan_lifecycle() {
    let dir = setup_project();

    let status = json(&dir, &["plan", "status"]);
    assert_eq!(status["tier"], "free");

    upgrade(&dir);
    let status = json(&dir, &["plan", "status"]);
    assert_eq!(status["tier"], "premium");
    assert!(status["features"]
        .as_array()
        .unwrap()
        .iter()
        .all(|f| f["available"] == true));

    basket_cmd()
        .current_dir(dir.path())
        .args(["plan", "restore"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Premium"));

    basket_cmd()
        .current_dir(dir.path())
        .args(["plan", "downgrade"])
        .assert()
        .success();
    let status = json(&dir, &["plan", "status"]);
    assert_eq!(status["tier"], "free");
}

#[test]
fn test_plan_status_text() {
    let dir = setup_project();
    json(&dir, &["list", "new", "Weekly"]);

    basket_cmd()
        .current_dir(dir.path())
        .args(["plan", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan: Free"))
        .stdout(predicate::str::contains("Lists: 1/3"))
        .stdout(predicate::str::contains("Data Sharing\tlocked"));
}
