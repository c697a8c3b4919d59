//! Back-office records: materials, audit trail, notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A material stocked for jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "qrCode", default)]
    pub qr_code: Option<String>,
    /// Decimal serialized as a string.
    pub price: String,
    #[serde(default)]
    pub unit: String,
}

/// One entry of the admin audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    pub action: String,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<serde_json::Value>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Query filter for the audit-log listing.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub search: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

impl AuditLogFilter {
    /// Query pairs in the order the backend expects.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("ordering", "timestamp".to_string())];
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            query.push(("search", search.clone()));
        }
        if let Some(since) = &self.since {
            query.push(("timestamp__gte", since.clone()));
        }
        if let Some(until) = &self.until {
            query.push(("timestamp__lte", until.clone()));
        }
        query
    }
}

/// An admin-facing notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub recipient: Option<serde_json::Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub message: String,
    #[serde(default)]
    pub related_type: Option<String>,
    #[serde(default)]
    pub related_id: Option<serde_json::Value>,
    #[serde(default)]
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_wire_names() {
        let json = serde_json::json!({"id": 1, "name": "PVC pipe", "qrCode": "QR-1", "price": "12.50", "unit": "m"});
        let material: Material = serde_json::from_value(json).unwrap();
        assert_eq!(material.qr_code.as_deref(), Some("QR-1"));
        let back = serde_json::to_value(&material).unwrap();
        assert_eq!(back["qrCode"], "QR-1");
    }

    #[test]
    fn test_audit_filter_query() {
        let filter = AuditLogFilter {
            search: Some(String::new()),
            since: Some("2024-06-01".into()),
            until: None,
        };
        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("ordering", "timestamp".to_string()),
                ("timestamp__gte", "2024-06-01".to_string())
            ]
        );
    }

    #[test]
    fn test_notification_type_field() {
        let json = serde_json::json!({
            "id": 9, "type": "complaint", "message": "New complaint", "read": false,
            "timestamp": "2024-06-01T10:00:00Z"
        });
        let n: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(n.kind.as_deref(), Some("complaint"));
        assert!(!n.read);
    }
}
