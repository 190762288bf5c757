//! End-to-end tests for the mab-simple-gen binary

use std::fs;
use std::path::Path;

use predicates::prelude::*;
use tempfile::TempDir;

fn gen_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("mab-simple-gen"))
}

fn write_transcript(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        "# name: getUser\n\
         GET https://api.example.com/users/7\n\
         \n\
         RESPONSE 200\n\
         Content-Type: application/json\n\
         \n\
         {\"id\": 7, \"name\": \"bob\"}\n",
    )
    .unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_single_platform_generates_into_out() {
    let dir = TempDir::new().unwrap();
    let examples = write_transcript(dir.path(), "users.txt");
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["ios", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generating assets for ios under",
        ))
        .stdout(predicate::str::contains(
            "Success! The mobile API is generated under",
        ));

    let descriptor = read_json(&out.join("RestController.json"));
    assert_eq!(descriptor["platform"], "ios");
    assert_eq!(descriptor["package"], "com.magnet");
    assert_eq!(descriptor["methods"][0]["name"], "getUser");
    assert_eq!(descriptor["methods"][0]["response_schema"]["id"], "int");
}

#[test]
fn test_default_platforms_are_all_three() {
    let dir = TempDir::new().unwrap();
    let examples = write_transcript(dir.path(), "users.txt");
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success();

    for platform in ["ios", "android", "js"] {
        let descriptor = read_json(&out.join(platform).join("RestController.json"));
        assert_eq!(descriptor["platform"], platform);
    }
}

#[test]
fn test_examples_option_is_mandatory() {
    gen_cmd()
        .arg("ios")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "-e|--examples option is mandatory",
        ));
}

#[test]
fn test_remote_examples_are_refused() {
    gen_cmd()
        .args(["ios", "-e", "https://example.com/users.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Remote examples are not supported"));
}

#[test]
fn test_missing_examples_name_the_resource() {
    gen_cmd()
        .args(["ios", "-e", "/no/such/transcripts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot find resource /no/such/transcripts",
        ));
}

#[test]
fn test_force_cleans_a_previous_run() {
    let dir = TempDir::new().unwrap();
    let examples = write_transcript(dir.path(), "users.txt");
    let out = dir.path().join("mobile");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.json"), "{}").unwrap();

    gen_cmd()
        .args(["ios", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap(), "-f"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleanup directory"));

    assert!(!out.join("stale.json").exists());
    assert!(out.join("RestController.json").is_file());
}

#[test]
fn test_class_package_and_namespace_flags() {
    let dir = TempDir::new().unwrap();
    let examples = write_transcript(dir.path(), "users.txt");
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["js", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .args(["-c", "UserApi", "-p", "com.acme", "-n", "v1"])
        .assert()
        .success();

    let descriptor = read_json(&out.join("UserApi.json"));
    assert_eq!(descriptor["controller"], "UserApi");
    assert_eq!(descriptor["package"], "com.acme");
    assert_eq!(descriptor["namespace"], "v1");
}

#[test]
fn test_abort_policy_refuses_untyped_properties() {
    let dir = TempDir::new().unwrap();
    let examples = dir.path().join("nulls.txt");
    fs::write(
        &examples,
        "GET https://api.example.com/users/7\n\
         \n\
         RESPONSE 200\n\
         Content-Type: application/json\n\
         \n\
         {\"note\": null}\n",
    )
    .unwrap();

    gen_cmd()
        .args(["ios", "-e", examples.to_str().unwrap()])
        .args(["-o", dir.path().join("mobile").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot infer a type for 'note'"));
}

#[test]
fn test_default_type_policy_generates_anyway() {
    let dir = TempDir::new().unwrap();
    let examples = dir.path().join("nulls.txt");
    fs::write(
        &examples,
        "GET https://api.example.com/users/7\n\
         \n\
         RESPONSE 200\n\
         Content-Type: application/json\n\
         \n\
         {\"note\": null}\n",
    )
    .unwrap();
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["ios", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap(), "-j", "default-type"])
        .assert()
        .success();

    let descriptor = read_json(&out.join("RestController.json"));
    assert_eq!(descriptor["methods"][0]["response_schema"]["note"], "string");
}

#[test]
fn test_verbose_prints_parsing_progress() {
    let dir = TempDir::new().unwrap();
    let examples = write_transcript(dir.path(), "users.txt");
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["ios", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap(), "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsing example"));
}

#[test]
fn test_directory_of_examples() {
    let dir = TempDir::new().unwrap();
    let examples = dir.path().join("examples");
    fs::create_dir(&examples).unwrap();
    write_transcript(&examples, "users.txt");
    write_transcript(&examples, "orders.txt");
    let out = dir.path().join("mobile");

    gen_cmd()
        .args(["android", "-e", examples.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success();

    let descriptor = read_json(&out.join("RestController.json"));
    assert_eq!(descriptor["methods"].as_array().unwrap().len(), 2);
}
