//! Domain DTOs for the order API.
//!
//! # Design
//! These types mirror the backend's JSON but are defined independently of
//! the mock-server crate; the integration tests catch schema drift. `Order`
//! stays an open object because its columns come from whatever spreadsheet
//! the backend imported.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A customer fulfillment record. All fields are kept as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Order {
    pub fields: Map<String, Value>,
}

impl Order {
    pub fn order_id(&self) -> Option<&str> {
        self.fields.get("order_id").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// How an order's fulfillment is routed. The valid set is owned by the
/// backend and listed by `/api/transfer-options`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TransferType(pub String);

impl TransferType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recorded outcome of scanning a SKU against an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ScanStatus(pub String);

impl ScanStatus {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderPage {
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    pub order_id: String,
    pub details: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemainingSku {
    pub sku: String,
    pub title: String,
    pub quantity_requested: u32,
    pub quantity_scanned: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemainingSkus {
    pub order_id: String,
    pub remaining_skus: Vec<RemainingSku>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannedSku {
    pub sku: String,
    pub timestamp: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanHistory {
    pub order_id: String,
    pub scanned_skus: Vec<ScannedSku>,
}

/// Request payload for recording a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRequest {
    pub sku: String,
    pub status: ScanStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatedSku {
    pub sku: String,
    pub quantity_scanned: u32,
    pub status: String,
    pub scan_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    pub message: String,
    pub updated_sku: UpdatedSku,
}

/// Request payload for reclassifying an order's transfer type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferRequest {
    pub transfer_type: TransferType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferResult {
    pub message: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferOptions {
    pub options: Vec<TransferType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    pub message: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrdersSummary {
    pub total_orders: u64,
    pub fulfilled_orders: u64,
    pub pending_orders: u64,
    pub scanned_items: u64,
    pub total_items: u64,
}
