use assert_cmd::cargo;
use scopeguard::defer;
use std::fs;

#[test]
fn test_cli_help_shows_flags_and_subcommands() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd.arg("--help").output().expect("Failed to run volley");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for needle in [
        "--concurrent",
        "--delay",
        "--unit",
        "--header",
        "--cookies",
        "--referer",
        "--tag",
        "--max-size",
        "decoy",
        "mkform",
    ] {
        assert!(stdout.contains(needle), "help is missing {needle}");
    }
}

#[test]
fn test_cli_version() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let assert = cmd.arg("--version").assert();
    assert
        .success()
        .code(0)
        .stdout(format!("volley {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_requires_a_target() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd.output().expect("Failed to run volley");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No target URL"));
}

// The failure settings below are rejected while the run is being set
// up. Port 2 on loopback would refuse anyway, but no request is ever
// built, so these tests never touch the network.

#[test]
fn test_invalid_range_fails_before_any_request() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .args(["-d", "fast", "http://localhost:2/"])
        .output()
        .expect("Failed to run volley");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid range expression"));
}

#[test]
fn test_invalid_tag_style_fails_before_any_request() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .args(["--tag", "{}", "http://localhost:2/"])
        .output()
        .expect("Failed to run volley");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid tag style"));
}

#[test]
fn test_missing_cookie_file_fails_before_any_request() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .args(["-C", "volley_run_no_such_cookies.txt", "http://localhost:2/"])
        .output()
        .expect("Failed to run volley");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn test_mkform_writes_body_and_prints_the_run_hint() {
    let (_, form_file) = volley_test::create_file(
        "volley_run_mkform.json",
        r#"{"form": {"user": "root", "token": "{t8-8}"}}"#,
    );
    let output_file = form_file.with_extension("form-data");
    defer! {
        let _ = fs::remove_file(&form_file);
        let _ = fs::remove_file(&output_file);
    }

    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .arg("mkform")
        .arg(&form_file)
        .output()
        .expect("Failed to run volley");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## output:"));
    assert!(stdout.contains("-b "));
    assert!(stdout.contains("boundary=----WebKitFormBoundary{t16-16}"));

    let body = fs::read_to_string(&output_file).expect("mkform did not write the body");
    assert!(body.starts_with("------WebKitFormBoundary{#header:0}\r\n"));
    assert!(body.contains("Content-Disposition: form-data; name=\"user\"\r\n\r\nroot\r\n"));
    assert!(body.ends_with("------WebKitFormBoundary{#header:0}--\r\n"));
}

#[test]
fn test_mkform_with_custom_boundary() {
    let (_, form_file) = volley_test::create_file(
        "volley_run_mkform_custom.json",
        r#"{"form": {"page": "1"}}"#,
    );
    let output_file = form_file.with_extension("form-data");
    defer! {
        let _ = fs::remove_file(&form_file);
        let _ = fs::remove_file(&output_file);
    }

    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .args(["mkform", "--boundary", "X0X"])
        .arg(&form_file)
        .output()
        .expect("Failed to run volley");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("boundary=X0X"));

    let body = fs::read_to_string(&output_file).expect("mkform did not write the body");
    assert!(body.starts_with("--X0X\r\n"));
}

#[test]
fn test_mkform_rejects_a_missing_file() {
    let mut cmd = cargo::cargo_bin_cmd!("volley");
    let output = cmd
        .args(["mkform", "volley_run_mkform_missing.json"])
        .output()
        .expect("Failed to run volley");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
