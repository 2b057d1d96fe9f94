use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::supervisor::{AuditQuery, Supervisor};

/// HTTP-style response returned by the event entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON document encoded as a string.
    pub body: String,
}

impl Envelope {
    fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    fn error(status_code: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            status_code,
            body: json!({ "error": message }).to_string(),
        }
    }

    /// Decode the body back into JSON.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Cloud-function style entry: a JSON event in, a status envelope out.
///
/// The event carries `supplier_name` plus optional `category`, `date_from`
/// and `date_to`. Every failure is terminal for the request.
pub async fn handle_event(supervisor: &Supervisor, event: Value) -> Envelope {
    let query: AuditQuery = match serde_json::from_value(event) {
        Ok(query) => query,
        Err(err) => {
            warn!(%err, "rejecting malformed audit event");
            return Envelope::error(400, format!("invalid event: {err}"));
        }
    };

    match supervisor.audit_query(&query).await {
        Ok(report) => match serde_json::to_string(&report) {
            Ok(body) => Envelope::ok(body),
            Err(err) => {
                error!(%err, "failed to encode audit report");
                Envelope::error(500, err.to_string())
            }
        },
        Err(err) if err.is_validation() => {
            warn!(%err, "rejecting audit request");
            Envelope::error(400, err.to_string())
        }
        Err(err) => {
            error!(%err, "audit failed");
            Envelope::error(500, err.to_string())
        }
    }
}
