//! API client core for the order-management service.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies `HttpResponse` values without
//! touching the network (host-does-IO pattern). `OrderApi` adds an optional
//! executing layer on top through the `Transport` trait.
//!
//! # Design
//! - `OrderClient` is stateless: it holds only the configured base URL.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - Every parser shares one rule: 2xx bodies decode into a typed shape,
//!   anything else becomes `ApiError::Http { status, message }` using the
//!   server's `error` field or `"Unknown error"`. The export download is the
//!   exception and always reports `"Failed to download file"`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod multipart;
pub mod response;
pub mod transport;
pub mod types;

pub use client::OrderClient;
pub use config::ClientConfig;
pub use download::Download;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{handle_download, handle_response};
pub use transport::{OrderApi, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    Order, OrderDetail, OrderPage, OrdersSummary, RemainingSku, RemainingSkus, ScanHistory,
    ScanRequest, ScanResult, ScanStatus, ScannedSku, TransferOptions, TransferRequest,
    TransferResult, TransferType, UpdatedSku, UploadResult,
};
