//! End-to-end tests for the pcdm binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pcdm").unwrap();
        cmd.env("PCDM_DATA_DIR", self.dir.path().join("data"))
            .env("PCDM_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn add_node(&self, model: &str) -> String {
        let output = self.cmd().args(["node", "add", model]).output().unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).args(["--format", "json"]).output().unwrap();
        assert!(output.status.success(), "{:?} failed", args);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn ids(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn members_persist_between_invocations() {
    let env = Env::new();
    let collection = env.add_node("collection");
    let object = env.add_node("object");
    let file = env.add_node("file");

    env.cmd()
        .args(["member", "add", collection.as_str(), object.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("position 1"));
    env.cmd()
        .args(["member", "add", object.as_str(), file.as_str()])
        .assert()
        .success();

    assert_eq!(ids(&env.json(&["member", "list", collection.as_str()])), vec![object.clone()]);
    assert_eq!(
        ids(&env.json(&["member", "list", object.as_str(), "--kind", "file"])),
        vec![file.clone()]
    );
    assert_eq!(ids(&env.json(&["member", "parents", file.as_str()])), vec![object]);
}

#[test]
fn invalid_membership_fails() {
    let env = Env::new();
    let parent = env.add_node("object");
    let child = env.add_node("object");
    let collection = env.add_node("collection");

    env.cmd().args(["member", "add", parent.as_str(), child.as_str()]).assert().success();
    env.cmd()
        .args(["member", "add", child.as_str(), parent.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
    env.cmd()
        .args(["member", "add", parent.as_str(), collection.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("child must be a pcdm object or file"));
    env.cmd()
        .args(["member", "add", parent.as_str(), "not-an-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid node id"));
}

#[test]
fn related_objects_and_cascade() {
    let env = Env::new();
    let collection = env.add_node("collection");
    let o1 = env.add_node("object");
    let o2 = env.add_node("object");
    let o3 = env.add_node("object");

    env.cmd().args(["member", "add", collection.as_str(), o1.as_str()]).assert().success();
    env.cmd().args(["related", "add", o1.as_str(), o2.as_str()]).assert().success();
    env.cmd().args(["related", "add", o1.as_str(), o3.as_str()]).assert().success();
    env.cmd().args(["related", "add", o2.as_str(), o1.as_str()]).assert().success();
    env.cmd()
        .args(["related", "add", o1.as_str(), o1.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("itself"));
    env.cmd()
        .args(["related", "add", o1.as_str(), collection.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("related object must be a pcdm object"));

    assert_eq!(ids(&env.json(&["related", "list", o1.as_str()])), vec![o2.clone(), o3]);

    env.cmd()
        .args(["node", "delete", o1.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 links removed"));

    assert!(ids(&env.json(&["member", "list", collection.as_str()])).is_empty());
    assert!(ids(&env.json(&["related", "list", o2.as_str()])).is_empty());
}

#[test]
fn foreign_models_are_listed_as_other() {
    let env = Env::new();
    let foreign = env.add_node("af:Base");
    let object = env.add_node("object");

    assert_eq!(ids(&env.json(&["node", "list", "--kind", "other"])), vec![foreign.clone()]);
    env.cmd()
        .args(["member", "add", object.as_str(), foreign.as_str()])
        .assert()
        .failure();
}

#[test]
fn config_policy_applies() {
    let env = Env::new();
    env.cmd()
        .args(["config", "set", "parent_policy", "single"])
        .assert()
        .success();
    env.cmd()
        .args(["config", "get", "parent_policy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("single"));

    let first = env.add_node("collection");
    let second = env.add_node("collection");
    let object = env.add_node("object");

    env.cmd().args(["member", "add", first.as_str(), object.as_str()]).assert().success();
    env.cmd()
        .args(["member", "add", second.as_str(), object.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a member"));
}

#[test]
fn switching_to_single_parent_keeps_existing_members() {
    let env = Env::new();
    let first = env.add_node("collection");
    let second = env.add_node("collection");
    let third = env.add_node("collection");
    let object = env.add_node("object");

    env.cmd().args(["member", "add", first.as_str(), object.as_str()]).assert().success();
    env.cmd().args(["member", "add", second.as_str(), object.as_str()]).assert().success();
    env.cmd()
        .args(["config", "set", "parent_policy", "single"])
        .assert()
        .success();

    let mut parents = ids(&env.json(&["member", "parents", object.as_str()]));
    parents.sort();
    let mut expected = vec![first.clone(), second];
    expected.sort();
    assert_eq!(parents, expected);
    assert_eq!(ids(&env.json(&["member", "list", first.as_str()])), vec![object.clone()]);

    env.cmd()
        .args(["member", "add", third.as_str(), object.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a member"));
    env.cmd()
        .args(["member", "remove", first.as_str(), object.as_str()])
        .assert()
        .success();
}
