//! Executing requests.
//!
//! `OrderClient` never does I/O. `OrderApi` pairs it with a [`Transport`] so
//! callers who do not want to drive the round-trip themselves get one method
//! per endpoint. Transports return non-2xx responses as data; classification
//! stays in `handle_response`.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::client::{OrderClient, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::config::ClientConfig;
use crate::download::Download;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{
    OrderDetail, OrderPage, OrdersSummary, RemainingSkus, ScanHistory, ScanResult, ScanStatus,
    TransferOptions, TransferResult, TransferType, UploadResult,
};

/// Executes one HTTP round-trip.
///
/// Implementations must return 4xx/5xx responses as `Ok` and reserve `Err`
/// (as [`ApiError::Transport`]) for failures where no response exists.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// Response bodies are read in full with no size cap unless one is set with
/// [`UreqTransport::with_body_limit`].
#[cfg(feature = "ureq")]
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

#[cfg(feature = "ureq")]
impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ureq")]
impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are data here, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }

    /// Fail with [`ApiError::Transport`] when a response body exceeds `limit` bytes.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

#[cfg(feature = "ureq")]
impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        use crate::http::HttpMethod;

        let transport_err = |e: ureq::Error| ApiError::Transport(e.to_string());

        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call().map_err(transport_err)?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(&body[..]).map_err(transport_err)?,
                    None => builder.send_empty().map_err(transport_err)?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_vec()
            .map_err(transport_err)?;

        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

/// One method per endpoint: build, execute, parse.
#[derive(Debug, Clone)]
pub struct OrderApi<T> {
    client: OrderClient,
    transport: T,
}

#[cfg(feature = "ureq")]
impl OrderApi<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> OrderApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: OrderClient::from_config(config),
            transport,
        }
    }

    pub fn client(&self) -> &OrderClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// First page with the default page size.
    pub fn orders(&self) -> Result<OrderPage, ApiError> {
        self.list_orders(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }

    pub fn list_orders(&self, page: u32, size: u32) -> Result<OrderPage, ApiError> {
        let response = self.send(self.client.build_list_orders(page, size))?;
        self.client.parse_list_orders(response)
    }

    pub fn get_order(&self, order_id: &str) -> Result<OrderDetail, ApiError> {
        let response = self.send(self.client.build_get_order(order_id))?;
        self.client.parse_get_order(response)
    }

    pub fn remaining_skus(&self, order_id: &str) -> Result<RemainingSkus, ApiError> {
        let response = self.send(self.client.build_remaining_skus(order_id))?;
        self.client.parse_remaining_skus(response)
    }

    pub fn scanned_history(&self, order_id: &str) -> Result<ScanHistory, ApiError> {
        let response = self.send(self.client.build_scanned_history(order_id))?;
        self.client.parse_scanned_history(response)
    }

    pub fn scan_sku(&self, order_id: &str, sku: &str, status: &ScanStatus) -> Result<ScanResult, ApiError> {
        let response = self.send(self.client.build_scan_sku(order_id, sku, status)?)?;
        self.client.parse_scan_sku(response)
    }

    pub fn update_transfer(
        &self,
        order_id: &str,
        transfer_type: &TransferType,
    ) -> Result<TransferResult, ApiError> {
        let response = self.send(self.client.build_update_transfer(order_id, transfer_type)?)?;
        self.client.parse_update_transfer(response)
    }

    pub fn transfer_options(&self) -> Result<TransferOptions, ApiError> {
        let response = self.send(self.client.build_transfer_options())?;
        self.client.parse_transfer_options(response)
    }

    pub fn upload_file(&self, file_name: &str, data: impl Into<Bytes>) -> Result<UploadResult, ApiError> {
        let response = self.send(self.client.build_upload_file(file_name, data))?;
        self.client.parse_upload_file(response)
    }

    /// Read `path` from disk and upload it under its own file name.
    pub fn upload_path(&self, path: impl AsRef<Path>) -> Result<UploadResult, ApiError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| crate::download::DEFAULT_FILE_NAME.to_string());
        self.upload_file(&file_name, data)
    }

    pub fn download_file(&self) -> Result<Download, ApiError> {
        let response = self.send(self.client.build_download_file())?;
        self.client.parse_download_file(response)
    }

    /// Fetch the export and save it into `dir`; returns the written path.
    pub fn download_file_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ApiError> {
        self.download_file()?.save_to(dir)
    }

    pub fn orders_summary(&self) -> Result<OrdersSummary, ApiError> {
        let response = self.send(self.client.build_orders_summary())?;
        self.client.parse_orders_summary(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::http::HttpMethod;

    /// Replays canned responses and records what was sent.
    struct Canned {
        responses: RefCell<Vec<HttpResponse>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: RefCell::new(responses),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    fn api(transport: &Canned) -> OrderApi<&Canned> {
        OrderApi::with_transport(&ClientConfig::new("http://backend"), transport)
    }

    #[test]
    fn orders_uses_default_pagination() {
        let transport = Canned::new(vec![HttpResponse::new(
            200,
            r#"{"page":1,"size":10,"total_pages":0,"orders":[]}"#,
        )]);
        let page = api(&transport).orders().unwrap();
        assert!(page.orders.is_empty());
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://backend/api/orders?page=1&size=10");
    }

    #[test]
    fn classified_errors_surface_unchanged() {
        let transport = Canned::new(vec![HttpResponse::new(400, r#"{"error":"Invalid transfer type"}"#)]);
        let err = api(&transport)
            .update_transfer("A1", &TransferType::new("teleport"))
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), Some("Invalid transfer type"));
    }

    #[test]
    fn transport_failure_is_not_classified() {
        let transport = Canned::new(Vec::new());
        let err = api(&transport).orders_summary().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn download_failure_never_touches_disk() {
        let transport = Canned::new(vec![HttpResponse::new(404, "")]);
        let dir = std::env::temp_dir().join(format!("order-core-api-{}", std::process::id()));
        let err = api(&transport).download_file_to(&dir).unwrap_err();
        assert_eq!(err.message(), Some("Failed to download file"));
        assert!(!dir.join("orders.xlsx").exists());
    }

    #[test]
    fn upload_missing_path_is_io_error() {
        let transport = Canned::new(Vec::new());
        let err = api(&transport)
            .upload_path("/definitely/not/here/orders.xlsx")
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
        assert!(transport.sent.borrow().is_empty());
    }
}
