//! Fiscal document data as read from the document store.
//!
//! Classification fields stay raw (`Option<String>`) so that missing or
//! malformed codes reach the calculator and are reported together.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Money;

/// Whether the document records goods coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    pub item_id: String,
    #[serde(default)]
    pub cfop: Option<String>,
    #[serde(default)]
    pub ncm: Option<String>,
    pub value: Money,
    /// ICMS highlighted on the item; excluded from the credit base.
    #[serde(default)]
    pub icms_amount: Option<Money>,
    #[serde(default)]
    pub description: String,
}

impl DocumentItem {
    pub fn new(item_id: impl Into<String>, cfop: &str, ncm: &str, value: Money) -> Self {
        Self {
            item_id: item_id.into(),
            cfop: Some(cfop.to_string()),
            ncm: Some(ncm.to_string()),
            value,
            icms_amount: None,
            description: String::new(),
        }
    }

    pub fn with_icms(mut self, icms: Money) -> Self {
        self.icms_amount = Some(icms);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalDocumentData {
    pub document_id: String,
    pub organization_id: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub operation_type: Option<OperationType>,
    #[serde(default)]
    pub items: Vec<DocumentItem>,
}

impl FiscalDocumentData {
    pub fn new(
        document_id: impl Into<String>,
        organization_id: impl Into<String>,
        issue_date: NaiveDate,
        operation_type: OperationType,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            organization_id: organization_id.into(),
            issue_date,
            operation_type: Some(operation_type),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: DocumentItem) -> Self {
        self.items.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_classification_deserializes_as_none() {
        let json = r#"{
            "document_id": "NF-1",
            "organization_id": "org",
            "issue_date": "2025-03-10",
            "items": [{ "item_id": "1", "value": { "amount": "10.00", "currency": "BRL" } }]
        }"#;
        let doc: FiscalDocumentData = serde_json::from_str(json).unwrap();
        assert!(doc.operation_type.is_none());
        assert!(doc.items[0].cfop.is_none());
        assert!(doc.items[0].icms_amount.is_none());
        assert_eq!(doc.items[0].value, Money::brl(dec!(10)));
    }

    #[test]
    fn operation_type_lowercase() {
        assert_eq!(
            serde_json::to_string(&OperationType::Entry).unwrap(),
            "\"entry\""
        );
    }
}
