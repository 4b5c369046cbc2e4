//! End-to-end CLI tests for the coursedl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command isolated from the caller's config file and session cookie.
fn coursedl(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("coursedl").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("CAUTH")
        .env_remove("RUST_LOG");
    cmd
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    coursedl(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract course syllabi"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    coursedl(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("coursedl"));
}

#[test]
fn test_binary_requires_class_name() {
    let home = TempDir::new().unwrap();
    coursedl(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    coursedl(&home)
        .args(["ml", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_bad_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join("coursedl")).unwrap();
    std::fs::write(home.path().join("coursedl").join("config.toml"), "threads = 4\n").unwrap();

    coursedl(&home)
        .arg("ml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_prints_course_tree() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/onDemandCourses.v1",
        json!({"elements": [{"id": "C1", "name": "Machine Learning"}]}),
    )
    .await;
    mount_json(
        &server,
        "/api/onDemandCourseMaterials.v2/",
        json!({
            "elements": [{"id": "C1", "moduleIds": ["m1"]}],
            "linked": {
                "onDemandCourseMaterialModules.v1": [{"id": "m1", "name": "Week 1", "slug": "week-1", "lessonIds": ["l1"]}],
                "onDemandCourseMaterialLessons.v1": [{"id": "l1", "name": "Intro", "slug": "intro", "itemIds": ["s1"]}],
                "onDemandCourseMaterialItems.v2": [{"id": "s1", "name": "Reading", "slug": "reading", "contentSummary": {"typeName": "supplement"}}]
            }
        }),
    )
    .await;
    mount_json(
        &server,
        "/api/onDemandSupplements.v1/C1~s1",
        json!({"linked": {"openCourseAssets.v1": [
            {"definition": {"value": "<co-content><text>Welcome</text></co-content>"}}
        ]}}),
    )
    .await;

    let home = TempDir::new().unwrap();
    let database = home.path().join("catalog.db");
    coursedl(&home)
        .args(["ml", "--api-base", &server.uri(), "--notebook-base", &server.uri()])
        .arg("--database")
        .arg(&database)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""error_occurred": false"#))
        .stdout(predicate::str::contains(r#""slug": "reading""#));

    assert!(database.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_lists_courses() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/memberships.v1",
        json!({"linked": {"courses.v1": [{"slug": "ml"}, {"slug": "algorithms"}]}}),
    )
    .await;

    let home = TempDir::new().unwrap();
    coursedl(&home)
        .args(["--list-courses", "--api-base", &server.uri()])
        .arg("--database")
        .arg(home.path().join("catalog.db"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ml\nalgorithms"));
}
