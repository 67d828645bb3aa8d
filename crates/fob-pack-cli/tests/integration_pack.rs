//! Integration tests for the pack command.
//!
//! Sites are built in temp directories and packed with local and inline
//! scripts only, so no network is needed.

use assert_cmd::Command;
use fob_pack::{BundleKey, ScriptKey};
use fob_pack_cli::cli::PackArgs;
use fob_pack_cli::commands::pack::pack_site;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Home</title></head>
  <body>
    <h1>Hello</h1>
    <script src="/js/app.js"></script>
    <script>console.log(1)</script>
  </body>
</html>"#;

/// Project layout: `src/js/app.js` and `public/{index,about/index}.html`.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/js")).unwrap();
    fs::write(root.join("src/js/app.js"), "window.app = true;").unwrap();
    fs::create_dir_all(root.join("public/about")).unwrap();
    fs::write(root.join("public/index.html"), PAGE).unwrap();
    fs::write(root.join("public/about/index.html"), PAGE).unwrap();
    temp
}

fn args(site_dir: &str) -> PackArgs {
    PackArgs {
        site_dir: PathBuf::from(site_dir),
        no_uglify: true,
        ..PackArgs::default()
    }
}

fn expected_bundle(root: &Path) -> PathBuf {
    let key = BundleKey::for_scripts(&[
        ScriptKey::for_source("/js/app.js"),
        ScriptKey::for_inline("console.log(1)"),
    ]);
    root.join("assets/javascript").join(key.file_name())
}

#[tokio::test]
#[serial]
async fn test_pack_in_place() {
    let temp = project();
    let root = temp.path();

    let outcome = pack_site(&args("public"), root).await.unwrap();

    assert_eq!(outcome.report.documents_scanned, 2);
    assert_eq!(outcome.report.bundles, 1);
    assert_eq!(outcome.report.artifacts, 1);
    assert_eq!(outcome.out_dir, root.join("public"));

    let bundle = expected_bundle(&root.join("public"));
    assert_eq!(
        fs::read_to_string(&bundle).unwrap(),
        "window.app = true;\nconsole.log(1)\n"
    );
    assert_eq!(outcome.bundle_bytes, fs::metadata(&bundle).unwrap().len());

    let html = fs::read_to_string(root.join("public/about/index.html")).unwrap();
    assert_eq!(html.matches("<script").count(), 1);
    assert!(html.contains("/assets/javascript/"));
    assert!(!html.contains("console.log"));
}

#[tokio::test]
#[serial]
async fn test_pack_to_out_dir_leaves_site_untouched() {
    let temp = project();
    let root = temp.path();

    let outcome = pack_site(
        &PackArgs {
            out_dir: Some(PathBuf::from("dist")),
            ..args("public")
        },
        root,
    )
    .await
    .unwrap();

    assert_eq!(outcome.out_dir, root.join("dist"));
    assert!(expected_bundle(&root.join("dist")).exists());
    assert!(root.join("dist/about/index.html").exists());
    assert_eq!(
        fs::read_to_string(root.join("public/index.html")).unwrap(),
        PAGE
    );
}

#[tokio::test]
#[serial]
async fn test_pack_inline_from_config_file() {
    let temp = project();
    let root = temp.path();
    fs::write(root.join("fob-pack.toml"), "inline = true\nuglify = false\n").unwrap();

    let outcome = pack_site(
        &PackArgs {
            site_dir: PathBuf::from("public"),
            ..PackArgs::default()
        },
        root,
    )
    .await
    .unwrap();

    assert!(outcome.options.inline);
    assert_eq!(outcome.report.artifacts, 0);
    assert!(!root.join("public/assets").exists());

    let html = fs::read_to_string(root.join("public/index.html")).unwrap();
    assert!(html.contains("<script>window.app = true;\nconsole.log(1)\n</script>"));
}

#[tokio::test]
#[serial]
async fn test_missing_site_dir() {
    let temp = TempDir::new().unwrap();
    let err = pack_site(&args("nope"), temp.path()).await.unwrap_err();
    assert!(matches!(err, fob_pack_cli::CliError::FileNotFound(_)));
}

#[test]
#[serial]
fn test_binary_packs_site() {
    let temp = project();

    Command::cargo_bin("fob-pack")
        .unwrap()
        .current_dir(temp.path())
        .args(["--no-color", "pack", "public", "--no-uglify"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Pack Summary"));

    assert!(expected_bundle(&temp.path().join("public")).exists());
}

#[test]
#[serial]
fn test_binary_reports_invalid_config() {
    let temp = project();

    Command::cargo_bin("fob-pack")
        .unwrap()
        .current_dir(temp.path())
        .args(["pack", "public", "--output-path", "/abs/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outputPath"));
}
