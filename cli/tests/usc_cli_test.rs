use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

const OBJECT_SRC: &str = "class Object\n    native;\n";

const ACTOR_SRC: &str = "class Actor extends Object;\n\
\n\
var int Health; // hit points\n\
\n\
function Actor GetOwner();\n";

// A `\` line continuation would swallow the next line's leading spaces, so
// the body's indentation is spelled out with explicit `\n` escapes.
const PAWN_SRC: &str =
    "class Pawn extends Actor;\n\nfunction Fire(int Shots)\n{\n    Health = Shots;\n    self.\n}\n";

fn build_tree() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("Development").join("Src").join("Engine").join("Classes");
    fs::create_dir_all(&classes).unwrap();
    fs::write(classes.join("Object.uc"), OBJECT_SRC).unwrap();
    fs::write(classes.join("Actor.uc"), ACTOR_SRC).unwrap();
    fs::write(classes.join("Pawn.uc"), PAWN_SRC).unwrap();
    let pawn = classes.join("Pawn.uc");
    (dir, pawn)
}

fn usc() -> Command {
    Command::cargo_bin("usc").unwrap()
}

#[test]
fn index_reports_class_count_and_cache_location() {
    let (dir, _) = build_tree();
    usc()
        .args(["--root", dir.path().to_str().unwrap(), "index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indexed"))
        .stdout(predicate::str::contains("classes_cache.json"));
    assert!(dir
        .path()
        .join("Development")
        .join("Src")
        .join("classes_cache.json")
        .exists());
}

#[test]
fn classes_lists_the_hierarchy() {
    let (dir, _) = build_tree();
    usc()
        .args(["--root", dir.path().to_str().unwrap(), "classes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pawn extends actor"))
        .stdout(predicate::str::contains("Actor extends object"));
}

#[test]
fn def_prints_the_declaration_site() {
    let (dir, pawn) = build_tree();
    // `Health` on the assignment line resolves into Actor.uc.
    usc()
        .args([
            "--root",
            dir.path().to_str().unwrap(),
            "def",
            pawn.to_str().unwrap(),
            "--line",
            "5",
            "--col",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Actor.uc:3"));
}

#[test]
fn def_fails_loudly_when_nothing_resolves() {
    let (dir, pawn) = build_tree();
    usc()
        .args([
            "--root",
            dir.path().to_str().unwrap(),
            "def",
            pawn.to_str().unwrap(),
            "--line",
            "5",
            "--col",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no definition found"));
}

#[test]
fn hover_prints_a_code_block() {
    let (dir, pawn) = build_tree();
    usc()
        .args([
            "--root",
            dir.path().to_str().unwrap(),
            "hover",
            pawn.to_str().unwrap(),
            "--line",
            "5",
            "--col",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("```UnrealScript"))
        .stdout(predicate::str::contains("var int Health;"));
}

#[test]
fn complete_after_a_dot_lists_members() {
    let (dir, pawn) = build_tree();
    usc()
        .args([
            "--root",
            dir.path().to_str().unwrap(),
            "complete",
            pawn.to_str().unwrap(),
            "--line",
            "6",
            "--col",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Health\tvar int Health"))
        .stdout(predicate::str::contains("Fire\t(int Shots)"));
}
