//! Integration tests for CLI commands.

use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

struct Run {
    code: i32,
    stdout: String,
    stderr: String,
}

fn run_cli(args: &[&str], stdin: Option<&str>) -> Run {
    let mut child = Command::new(env!("CARGO_BIN_EXE_missive"))
        .args(args)
        .env_remove("MISSIVE_KID")
        .env_remove("MISSIVE_HMAC_SECRET")
        .env_remove("MISSIVE_KEYRING")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI");

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(text) = stdin {
            pipe.write_all(text.as_bytes()).unwrap();
        }
    }

    let output = child.wait_with_output().unwrap();
    Run {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8(output.stdout).unwrap(),
        stderr: String::from_utf8(output.stderr).unwrap(),
    }
}

fn make_envelope() -> String {
    let run = run_cli(
        &[
            "new",
            "--type",
            "order.created",
            "--source",
            "svc.orders",
            "--data",
            r#"{"orderId":"123"}"#,
        ],
        None,
    );
    assert_eq!(run.code, 0, "{}", run.stderr);
    run.stdout
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn canonicalize_sorts_keys() {
    let run = run_cli(&["canonicalize"], Some(r#"{"b": 1, "a": [true, null]}"#));
    assert_eq!(run.code, 0);
    assert_eq!(run.stdout.trim(), r#"{"a":[true,null],"b":1}"#);
}

#[test]
fn new_prints_a_normalized_envelope() {
    let envelope: Value = serde_json::from_str(&make_envelope()).unwrap();
    assert_eq!(envelope["specversion"], "1.0");
    assert_eq!(envelope["type"], "order.created");
    assert_eq!(envelope["data"], json!({"orderId": "123"}));
    assert_eq!(envelope["correlation_id"], envelope["id"]);
}

#[test]
fn new_error_reply_defaults_type() {
    let run = run_cli(
        &[
            "new",
            "--kind",
            "error",
            "--source",
            "svc.orders",
            "--error-code",
            "NOT_FOUND",
            "--error-message",
            "order missing",
        ],
        None,
    );
    assert_eq!(run.code, 0, "{}", run.stderr);
    let envelope: Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(envelope["type"], "error.reply");
    assert_eq!(envelope["data"]["code"], "NOT_FOUND");
}

#[test]
fn validate_reports_every_issue() {
    let bad = json!({
        "specversion": "2.0",
        "type": "order.created",
        "source": "svc.orders",
        "time": "yesterday",
        "retry_count": -1,
        "data": {}
    });
    let run = run_cli(&["validate", "--json"], Some(&bad.to_string()));
    assert_eq!(run.code, 1);
    let report: Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(report["valid"], false);
    let paths: Vec<&str> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"retry_count"));
}

#[test]
fn validate_accepts_a_fresh_envelope() {
    let run = run_cli(&["validate", "--strict"], Some(&make_envelope()));
    assert_eq!(run.code, 0, "{}", run.stderr);
    assert_eq!(run.stdout.trim(), "valid");
}

#[test]
fn raw_credentials_exit_with_security_code() {
    let leaky = json!({
        "type": "order.created",
        "source": "svc.orders",
        "auth_context": {"method": "JWT", "token_ref": "Bearer abcdef123456"},
        "data": {}
    });
    let run = run_cli(&["validate"], Some(&leaky.to_string()));
    assert_eq!(run.code, 2);
    assert!(!run.stderr.contains("abcdef123456"));
}

#[test]
fn hs256_sign_and_verify() {
    let dir = TempDir::new().unwrap();
    let signed = run_cli(
        &["sign", "--alg", "HS256", "--kid", "shared", "--secret", "super-secret"],
        Some(&make_envelope()),
    );
    assert_eq!(signed.code, 0, "{}", signed.stderr);
    let path = write_file(&dir, "signed.json", &signed.stdout);

    let ok = run_cli(
        &["verify", &path, "--kid", "shared", "--secret", "super-secret"],
        None,
    );
    assert_eq!(ok.code, 0);
    assert_eq!(ok.stdout.trim(), "valid");

    let bad = run_cli(
        &["verify", &path, "--kid", "shared", "--secret", "wrong-secret"],
        None,
    );
    assert_eq!(bad.code, 1);
    assert_eq!(bad.stdout.trim(), "invalid");
}

#[test]
fn verify_rejects_whitespace_edits() {
    let dir = TempDir::new().unwrap();
    let signed = run_cli(
        &["sign", "--alg", "HS256", "--kid", "shared", "--secret", "super-secret"],
        Some(&make_envelope()),
    );
    assert_eq!(signed.code, 0, "{}", signed.stderr);

    let mut edited: Value = serde_json::from_str(&signed.stdout).unwrap();
    edited["source"] = json!("  svc.orders  ");
    edited["actor"] = json!({"sub": "  "});
    let path = write_file(&dir, "edited.json", &edited.to_string());

    let run = run_cli(
        &["verify", &path, "--kid", "shared", "--secret", "super-secret"],
        None,
    );
    assert_eq!(run.code, 1);
    assert_eq!(run.stdout.trim(), "invalid");
}

#[test]
fn keygen_sign_verify_with_keyring() {
    let dir = TempDir::new().unwrap();
    let keygen = run_cli(&["keygen", "--alg", "EdDSA", "--kid", "orders-1"], None);
    assert_eq!(keygen.code, 0, "{}", keygen.stderr);
    let generated: Value = serde_json::from_str(&keygen.stdout).unwrap();

    let key_path = write_file(&dir, "key.b64", generated["private_key"].as_str().unwrap());
    let keyring_path = write_file(
        &dir,
        "keyring.toml",
        generated["keyring_entry"].as_str().unwrap(),
    );

    let signed = run_cli(
        &["sign", "--alg", "EdDSA", "--kid", "orders-1", "--key-file", &key_path],
        Some(&make_envelope()),
    );
    assert_eq!(signed.code, 0, "{}", signed.stderr);

    let verified = run_cli(&["verify", "--keyring", &keyring_path], Some(&signed.stdout));
    assert_eq!(verified.code, 0, "{}", verified.stderr);

    let restricted = write_file(
        &dir,
        "restricted.toml",
        &format!(
            "allowed_algs = [\"HS256\"]\n\n{}",
            generated["keyring_entry"].as_str().unwrap()
        ),
    );
    let rejected = run_cli(&["verify", "--keyring", &restricted], Some(&signed.stdout));
    assert_eq!(rejected.code, 1);
}

#[test]
fn headers_lists_the_binding() {
    let run = run_cli(&["headers", "--json"], Some(&make_envelope()));
    assert_eq!(run.code, 0, "{}", run.stderr);
    let headers: Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(headers["x-envelope-type"], "order.created");
    assert_eq!(headers["x-envelope-source"], "svc.orders");
    assert!(headers.get("traceparent").is_none());
}

#[test]
fn invalid_json_is_an_error() {
    let run = run_cli(&["validate"], Some("not json"));
    assert_eq!(run.code, 1);
    assert!(run.stderr.starts_with("Error:"));
}
