use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const TRANSFER_OPTIONS: [&str; 3] = ["warehouse", "store", "courier"];
/// Largest accepted `/api/upload` request body.
pub const UPLOAD_LIMIT: usize = 64 * 1024 * 1024;
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkuLine {
    pub sku: String,
    pub title: String,
    pub quantity_requested: u32,
    pub quantity_scanned: u32,
    pub status: Option<String>,
    pub scan_timestamp: Option<String>,
}

impl SkuLine {
    pub fn new(sku: &str, title: &str, quantity_requested: u32) -> Self {
        Self {
            sku: sku.to_string(),
            title: title.to_string(),
            quantity_requested,
            quantity_scanned: 0,
            status: None,
            scan_timestamp: None,
        }
    }

    fn is_complete(&self) -> bool {
        self.quantity_scanned >= self.quantity_requested
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub customer: String,
    pub transfer_type: Option<String>,
    pub skus: Vec<SkuLine>,
}

impl Order {
    fn is_fulfilled(&self) -> bool {
        self.skus.iter().all(SkuLine::is_complete)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ScanEvent {
    pub sku: String,
    pub timestamp: Option<String>,
    pub status: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub orders: Vec<Order>,
    pub scans: Vec<(String, ScanEvent)>,
    pub upload: Option<Vec<u8>>,
}

impl Store {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Self::default()
        }
    }

    fn order_mut(&mut self, order_id: &str) -> Result<&mut Order, AppError> {
        self.orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(order_not_found)
    }

    fn order(&self, order_id: &str) -> Result<&Order, AppError> {
        self.orders
            .iter()
            .find(|o| o.order_id == order_id)
            .ok_or_else(order_not_found)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Failure rendered as the backend's `{"error": "..."}` envelope.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn order_not_found() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "Order not found")
}

pub fn seed_orders() -> Vec<Order> {
    vec![
        Order {
            order_id: "A1".to_string(),
            customer: "Ada Lovelace".to_string(),
            transfer_type: None,
            skus: vec![SkuLine::new("SKU-100", "Brass gear", 2), SkuLine::new("SKU-200", "Punch card", 1)],
        },
        Order {
            order_id: "B2".to_string(),
            customer: "Charles Babbage".to_string(),
            transfer_type: Some("warehouse".to_string()),
            skus: vec![SkuLine::new("SKU-300", "Difference engine crank", 1)],
        },
        Order {
            order_id: "C3".to_string(),
            customer: "Grace Hopper".to_string(),
            transfer_type: None,
            skus: vec![SkuLine::new("SKU-400", "Relay", 3)],
        },
    ]
}

/// Router over the seed orders.
pub fn app() -> Router {
    app_with_store(Store::with_orders(seed_orders()))
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/summary", get(orders_summary))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/remaining-skus", get(remaining_skus))
        .route("/api/orders/{id}/scanned-history", get(scanned_history))
        .route("/api/orders/{id}/scan", post(scan_sku))
        .route("/api/orders/{id}/transfer", post(update_transfer))
        .route("/api/transfer-options", get(transfer_options))
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/api/download", get(download_file))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

async fn list_orders(
    State(db): State<Db>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let Pagination { page, size } = pagination;
    if page == 0 || size == 0 {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "page and size must be positive"));
    }
    let store = db.read().await;
    let total_pages = store.orders.len().div_ceil(size as usize);
    let orders: Vec<&Order> = store
        .orders
        .iter()
        .skip((page as usize - 1) * size as usize)
        .take(size as usize)
        .collect();
    Ok(Json(json!({
        "page": page,
        "size": size,
        "total_pages": total_pages,
        "orders": orders,
    })))
}

async fn get_order(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, AppError> {
    let store = db.read().await;
    let order = store.order(&id)?;
    Ok(Json(json!({ "order_id": order.order_id, "details": order })))
}

async fn remaining_skus(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = db.read().await;
    let order = store.order(&id)?;
    let remaining: Vec<Value> = order
        .skus
        .iter()
        .filter(|line| !line.is_complete())
        .map(|line| {
            json!({
                "sku": line.sku,
                "title": line.title,
                "quantity_requested": line.quantity_requested,
                "quantity_scanned": line.quantity_scanned,
            })
        })
        .collect();
    Ok(Json(json!({ "order_id": order.order_id, "remaining_skus": remaining })))
}

async fn scanned_history(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = db.read().await;
    let order = store.order(&id)?;
    let history: Vec<&ScanEvent> = store
        .scans
        .iter()
        .filter(|(order_id, _)| *order_id == order.order_id)
        .map(|(_, event)| event)
        .collect();
    Ok(Json(json!({ "order_id": order.order_id, "scanned_skus": history })))
}

#[derive(Deserialize)]
pub struct ScanInput {
    pub sku: String,
    pub status: String,
}

async fn scan_sku(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ScanInput>,
) -> Result<Json<Value>, AppError> {
    if input.sku.is_empty() || input.status.is_empty() {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "sku and status are required"));
    }
    let mut store = db.write().await;
    let order = store.order_mut(&id)?;
    let line = order
        .skus
        .iter_mut()
        .find(|line| line.sku == input.sku)
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "SKU not found in order"))?;
    if line.is_complete() {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "SKU already fully scanned"));
    }

    let timestamp = chrono::Utc::now().to_rfc3339();
    line.quantity_scanned += 1;
    line.status = Some(input.status.clone());
    line.scan_timestamp = Some(timestamp.clone());
    let updated = json!({
        "sku": line.sku,
        "quantity_scanned": line.quantity_scanned,
        "status": input.status,
        "scan_timestamp": timestamp,
    });

    let order_id = order.order_id.clone();
    store.scans.push((
        order_id,
        ScanEvent {
            sku: input.sku,
            timestamp: Some(timestamp),
            status: input.status,
        },
    ));
    Ok(Json(json!({ "message": "SKU scanned successfully", "updated_sku": updated })))
}

#[derive(Deserialize)]
pub struct TransferInput {
    pub transfer_type: String,
}

async fn update_transfer(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TransferInput>,
) -> Result<Json<Value>, AppError> {
    if !TRANSFER_OPTIONS.contains(&input.transfer_type.as_str()) {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "Invalid transfer type"));
    }
    let mut store = db.write().await;
    let order = store.order_mut(&id)?;
    order.transfer_type = Some(input.transfer_type);
    Ok(Json(json!({ "message": "Transfer type updated", "order_id": order.order_id })))
}

async fn transfer_options() -> Json<Value> {
    Json(json!({ "options": TRANSFER_OPTIONS }))
}

async fn upload_file(State(db): State<Db>, mut multipart: Multipart) -> Result<Json<Value>, AppError> {
    let bad_request = |e: axum::extract::multipart::MultipartError| AppError::new(e.status(), e.body_text());
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AppError::new(StatusCode::BAD_REQUEST, "No selected file"));
        }
        let data = field.bytes().await.map_err(bad_request)?;
        db.write().await.upload = Some(data.to_vec());
        let file_path = format!("uploads/{}-{file_name}", Uuid::new_v4());
        return Ok(Json(json!({ "message": "File uploaded successfully", "file_path": file_path })));
    }
    Err(AppError::new(StatusCode::BAD_REQUEST, "No file part"))
}

async fn download_file(State(db): State<Db>) -> Result<Response, AppError> {
    let store = db.read().await;
    let data = store
        .upload
        .clone()
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "No file available"))?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.xlsx\""),
        ],
        data,
    )
        .into_response())
}

async fn orders_summary(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let total_orders = store.orders.len();
    let fulfilled_orders = store.orders.iter().filter(|o| o.is_fulfilled()).count();
    let lines = store.orders.iter().flat_map(|o| o.skus.iter());
    let (scanned_items, total_items) = lines.fold((0u64, 0u64), |(scanned, total), line| {
        (
            scanned + u64::from(line.quantity_scanned),
            total + u64::from(line.quantity_requested),
        )
    });
    Json(json!({
        "total_orders": total_orders,
        "fulfilled_orders": fulfilled_orders,
        "pending_orders": total_orders - fulfilled_orders,
        "scanned_items": scanned_items,
        "total_items": total_items,
    }))
}
