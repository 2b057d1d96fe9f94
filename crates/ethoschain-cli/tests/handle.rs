use assert_cmd::Command;
use std::fs::write;

fn run_event(event: &str) -> serde_json::Value {
    let output = Command::cargo_bin("ethoschain-cli")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("handle")
        .write_stdin(event)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn body(envelope: &serde_json::Value) -> serde_json::Value {
    serde_json::from_str(envelope["body"].as_str().unwrap()).unwrap()
}

#[test]
fn valid_event_returns_report() {
    let envelope = run_event(r#"{"supplier_name": "Violator Corp"}"#);
    assert_eq!(envelope["statusCode"], 200);
    let report = body(&envelope);
    assert_eq!(report["supplier"], "Violator Corp");
    assert_eq!(report["overall_risk"], "RED");
}

#[test]
fn missing_supplier_returns_bad_request() {
    let envelope = run_event("{}");
    assert_eq!(envelope["statusCode"], 400);
    assert_eq!(body(&envelope)["error"], "supplier_name is required");
}

#[test]
fn invalid_date_range_returns_bad_request() {
    let envelope = run_event(
        r#"{"supplier_name": "Acme", "date_from": "2024-06-01", "date_to": "2024-01-01"}"#,
    );
    assert_eq!(envelope["statusCode"], 400);
}

#[test]
fn reads_event_from_file() {
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write(
        file.path(),
        r#"{"supplier_name": "Acme", "category": "Environment"}"#,
    )
    .unwrap();

    let output = Command::cargo_bin("ethoschain-cli")
        .unwrap()
        .args(["handle", "--event", file.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["statusCode"], 200);
    assert_eq!(body(&envelope)["risk_scores"]["Environment"], 70);
}
