//! Stateless HTTP request builder and response parser for the order API.
//!
//! # Design
//! `OrderClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. All
//! parsers go through `handle_response`, except the export which goes
//! through `handle_download`.

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::download::Download;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, APPLICATION_JSON};
use crate::multipart::{Form, Part};
use crate::response::{handle_download, handle_response};
use crate::types::{
    OrderDetail, OrderPage, OrdersSummary, RemainingSkus, ScanHistory, ScanRequest, ScanResult,
    ScanStatus, TransferOptions, TransferRequest, TransferResult, TransferType, UploadResult,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Form field the import endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";

// RFC 3986 path segment: everything but unreserved characters and sub-delims.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Synchronous, stateless client for the order API.
#[derive(Debug, Clone)]
pub struct OrderClient {
    base_url: String,
}

impl OrderClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn order_url(&self, order_id: &str, suffix: &str) -> String {
        let id = utf8_percent_encode(order_id, PATH_SEGMENT);
        format!("{}/api/orders/{id}{suffix}", self.base_url)
    }

    fn json_post<T: Serialize>(url: String, payload: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post(url, APPLICATION_JSON, Bytes::from(body)))
    }

    // --- orders ---

    pub fn build_list_orders(&self, page: u32, size: u32) -> HttpRequest {
        HttpRequest::get(self.url(&format!("/api/orders?page={page}&size={size}")))
    }

    pub fn parse_list_orders(&self, response: HttpResponse) -> Result<OrderPage, ApiError> {
        handle_response(response)
    }

    pub fn build_get_order(&self, order_id: &str) -> HttpRequest {
        HttpRequest::get(self.order_url(order_id, ""))
    }

    pub fn parse_get_order(&self, response: HttpResponse) -> Result<OrderDetail, ApiError> {
        handle_response(response)
    }

    pub fn build_orders_summary(&self) -> HttpRequest {
        HttpRequest::get(self.url("/api/orders/summary"))
    }

    pub fn parse_orders_summary(&self, response: HttpResponse) -> Result<OrdersSummary, ApiError> {
        handle_response(response)
    }

    // --- skus ---

    pub fn build_remaining_skus(&self, order_id: &str) -> HttpRequest {
        HttpRequest::get(self.order_url(order_id, "/remaining-skus"))
    }

    pub fn parse_remaining_skus(&self, response: HttpResponse) -> Result<RemainingSkus, ApiError> {
        handle_response(response)
    }

    pub fn build_scanned_history(&self, order_id: &str) -> HttpRequest {
        HttpRequest::get(self.order_url(order_id, "/scanned-history"))
    }

    pub fn parse_scanned_history(&self, response: HttpResponse) -> Result<ScanHistory, ApiError> {
        handle_response(response)
    }

    pub fn build_scan_sku(
        &self,
        order_id: &str,
        sku: &str,
        status: &ScanStatus,
    ) -> Result<HttpRequest, ApiError> {
        let payload = ScanRequest {
            sku: sku.to_string(),
            status: status.clone(),
        };
        Self::json_post(self.order_url(order_id, "/scan"), &payload)
    }

    pub fn parse_scan_sku(&self, response: HttpResponse) -> Result<ScanResult, ApiError> {
        handle_response(response)
    }

    // --- transfer ---

    pub fn build_update_transfer(
        &self,
        order_id: &str,
        transfer_type: &TransferType,
    ) -> Result<HttpRequest, ApiError> {
        let payload = TransferRequest {
            transfer_type: transfer_type.clone(),
        };
        Self::json_post(self.order_url(order_id, "/transfer"), &payload)
    }

    pub fn parse_update_transfer(&self, response: HttpResponse) -> Result<TransferResult, ApiError> {
        handle_response(response)
    }

    pub fn build_transfer_options(&self) -> HttpRequest {
        HttpRequest::get(self.url("/api/transfer-options"))
    }

    pub fn parse_transfer_options(&self, response: HttpResponse) -> Result<TransferOptions, ApiError> {
        handle_response(response)
    }

    // --- files ---

    pub fn build_upload_file(&self, file_name: &str, data: impl Into<Bytes>) -> HttpRequest {
        self.build_upload_form(Form::new().part(Part::file(UPLOAD_FIELD, file_name, data)))
    }

    /// Upload with a caller-built form, e.g. to pin the boundary.
    pub fn build_upload_form(&self, form: Form) -> HttpRequest {
        let (content_type, body) = form.into_body();
        HttpRequest::post(self.url("/api/upload"), &content_type, body)
    }

    pub fn parse_upload_file(&self, response: HttpResponse) -> Result<UploadResult, ApiError> {
        handle_response(response)
    }

    pub fn build_download_file(&self) -> HttpRequest {
        HttpRequest::get(self.url("/api/download"))
    }

    pub fn parse_download_file(&self, response: HttpResponse) -> Result<Download, ApiError> {
        handle_download(response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::http::HttpMethod;

    fn client() -> OrderClient {
        OrderClient::new("http://localhost:5000")
    }

    fn json_body(req: &HttpRequest) -> Value {
        serde_json::from_slice(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_list_orders_carries_pagination() {
        let req = client().build_list_orders(3, 25);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:5000/api/orders?page=3&size=25");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_order_endpoints() {
        let c = client();
        assert_eq!(c.build_get_order("A1").url, "http://localhost:5000/api/orders/A1");
        assert_eq!(
            c.build_remaining_skus("A1").url,
            "http://localhost:5000/api/orders/A1/remaining-skus"
        );
        assert_eq!(
            c.build_scanned_history("A1").url,
            "http://localhost:5000/api/orders/A1/scanned-history"
        );
        assert_eq!(c.build_orders_summary().url, "http://localhost:5000/api/orders/summary");
        assert_eq!(c.build_transfer_options().url, "http://localhost:5000/api/transfer-options");
        assert_eq!(c.build_download_file().url, "http://localhost:5000/api/download");
    }

    #[test]
    fn order_id_is_percent_encoded() {
        let req = client().build_get_order("A 1/2?x");
        assert_eq!(req.url, "http://localhost:5000/api/orders/A%201%2F2%3Fx");
    }

    #[test]
    fn build_scan_sku_posts_json() {
        let req = client()
            .build_scan_sku("A1", "SKU-9", &ScanStatus::new("scanned"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/api/orders/A1/scan");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(json_body(&req), serde_json::json!({"sku": "SKU-9", "status": "scanned"}));
    }

    #[test]
    fn build_update_transfer_posts_json() {
        let req = client()
            .build_update_transfer("A1", &TransferType::new("courier"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/api/orders/A1/transfer");
        assert_eq!(json_body(&req), serde_json::json!({"transfer_type": "courier"}));
    }

    #[test]
    fn build_upload_form_is_multipart() {
        let form = Form::with_boundary("BOUND").part(Part::file(UPLOAD_FIELD, "orders.csv", "x"));
        let req = client().build_upload_form(form);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:5000/api/upload");
        assert_eq!(req.header("content-type"), Some("multipart/form-data; boundary=BOUND"));
        let body = String::from_utf8(req.body.unwrap().to_vec()).unwrap();
        assert!(body.contains("name=\"file\"; filename=\"orders.csv\""));
        assert!(body.ends_with("--BOUND--\r\n"));
    }

    #[test]
    fn build_upload_file_uses_generated_boundary() {
        let req = client().build_upload_file("orders.xlsx", vec![1u8, 2, 3]);
        let content_type = req.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary=----OrderFormBoundary"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let c = OrderClient::new("http://localhost:5000/");
        assert_eq!(c.build_orders_summary().url, "http://localhost:5000/api/orders/summary");
    }

    #[test]
    fn from_config_uses_base_url() {
        let c = OrderClient::from_config(&ClientConfig::new("http://orders.internal:8080"));
        assert_eq!(c.base_url(), "http://orders.internal:8080");
    }

    #[test]
    fn parse_list_orders_success() {
        let response = HttpResponse::new(
            200,
            r#"{"page":1,"size":10,"total_pages":1,"orders":[{"order_id":"A1","status":"pending"}]}"#,
        );
        let page = client().parse_list_orders(response).unwrap();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.orders.len(), 1);
        assert_eq!(page.orders[0].order_id(), Some("A1"));
    }

    #[test]
    fn parse_get_order_not_found() {
        let response = HttpResponse::new(404, r#"{"error":"Order not found"}"#);
        let err = client().parse_get_order(response).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, ref message } if message == "Order not found"));
    }

    #[test]
    fn parse_scan_sku_success() {
        let response = HttpResponse::new(
            200,
            r#"{"message":"SKU scanned","updated_sku":{"sku":"S1","quantity_scanned":2,"status":"scanned","scan_timestamp":"2024-01-01T00:00:00Z"}}"#,
        );
        let result = client().parse_scan_sku(response).unwrap();
        assert_eq!(result.updated_sku.quantity_scanned, 2);
    }

    #[test]
    fn parse_summary_bad_json() {
        let response = HttpResponse::new(200, "not json");
        let err = client().parse_orders_summary(response).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_download_failure_uses_fixed_message() {
        let response = HttpResponse::new(404, r#"{"error":"No file available"}"#);
        let err = client().parse_download_file(response).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), Some("Failed to download file"));
    }
}
