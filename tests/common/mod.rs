#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use folio::artifacts::branch::slug::Slug;
use folio::artifacts::objects::record::{NewRecord, RecordEdit};
use folio::{Repository, Session};
use rstest::fixture;
use std::path::Path;

pub fn slug(value: &str) -> Slug {
    Slug::try_parse(value).expect("valid slug")
}

pub fn body(value: &str) -> Vec<RecordEdit> {
    vec![RecordEdit::Body(value.to_string())]
}

/// In-memory session on the trunk with "hello" (title H, body B) committed as version 1
pub async fn trunk_with_hello() -> Session {
    let session = Session::new(Repository::in_memory().expect("in-memory repository"));
    session.switch_current("main").await.expect("switch to trunk");
    session
        .create_record(NewRecord::new(slug("hello"), "H", "ann").with_body("B"))
        .await
        .expect("create hello");
    let outcome = session
        .commit_current_branch("init")
        .await
        .expect("initial commit");
    assert_eq!(outcome.version, Some(1));

    session
}

/// Body of a live record on a branch
pub async fn body_on(session: &Session, branch: &str, slug_value: &str) -> String {
    session
        .repository()
        .get_record(branch, &slug(slug_value))
        .await
        .expect("record exists")
        .record
        .content
        .body
}

#[fixture]
pub fn store_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn run_folio_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("folio").expect("Failed to find folio binary");
    cmd.current_dir(dir);
    cmd.env_remove("FOLIO_STORE");
    cmd.env("FOLIO_AUTHOR", "ann");
    cmd.env("NO_COLOR", "1");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[fixture]
pub fn init_store_dir(store_dir: TempDir) -> TempDir {
    run_folio_command(store_dir.path(), &["init"])
        .assert()
        .success();
    run_folio_command(
        store_dir.path(),
        &["record", "add", "hello", "--title", "H", "--body", "B"],
    )
    .assert()
    .success();
    run_folio_command(store_dir.path(), &["commit", "-m", "init"])
        .assert()
        .success();

    store_dir
}
