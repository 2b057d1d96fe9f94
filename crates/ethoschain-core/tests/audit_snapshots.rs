use std::time::{Duration, SystemTime};

use ethoschain_core::{AuditQuery, AuditReport, AuditSettings, Supervisor};
use insta::assert_json_snapshot;

fn report_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_764_115_200)
}

async fn audit(supplier: &str) -> AuditReport {
    let supervisor = Supervisor::from_settings(&AuditSettings::default())
        .await
        .expect("default settings should wire a supervisor");
    supervisor
        .audit_at(&AuditQuery::new(supplier), report_time())
        .await
        .unwrap_or_else(|err| panic!("audit failed for {supplier}: {err}"))
}

#[tokio::test(flavor = "current_thread")]
async fn generic_supplier_snapshot() {
    let report = audit("Acme Corporation").await;
    assert_json_snapshot!("generic_supplier", report);
}

#[tokio::test(flavor = "current_thread")]
async fn clean_supplier_snapshot() {
    let report = audit("CleanCorp Inc").await;
    assert_json_snapshot!("clean_supplier", report);
}
