//! Service catalog: categories and the services inside them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A bookable service within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal prices arrive as strings from the backend.
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub category: Option<serde_json::Value>,
}

impl ServiceItem {
    /// Price as display text, whether sent as a number or a string.
    pub fn price_label(&self) -> String {
        match &self.price {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_price_label() {
        let json = serde_json::json!([
            {"id": 1, "name": "Tap repair", "price": "450.00"},
            {"id": 2, "name": "Deep clean", "price": 1200},
            {"id": 3, "name": "Inspection"}
        ]);
        let items: Vec<ServiceItem> = serde_json::from_value(json).unwrap();
        let labels: Vec<_> = items.iter().map(ServiceItem::price_label).collect();
        assert_eq!(labels, vec!["450.00", "1200", "-"]);
    }
}
