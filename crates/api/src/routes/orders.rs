//! Order CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    Cursor, CustomerId, DEFAULT_PAGE_SIZE, FindAllPage, LineItem, Money, Order, OrderRepository,
    OrderStatus,
};
use kv_store::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Largest page a client may ask for.
const MAX_PAGE_SIZE: usize = 100;

/// Shared application state accessible from all handlers.
pub struct AppState<S: KeyValueStore> {
    pub repository: OrderRepository<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: Option<u64>,
    pub customer_id: String,
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Deserialize)]
pub struct LineItemRequest {
    pub item_id: String,
    pub quantity: u32,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub cursor: Option<u64>,
    pub size: Option<usize>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: u64,
    pub customer_id: String,
    pub status: String,
    pub line_items: Vec<LineItemResponse>,
    pub total_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct LineItemResponse {
    pub item_id: String,
    pub quantity: u32,
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub items: Vec<OrderResponse>,
    /// Cursor for the next page; `0` when there are no more pages.
    pub next: u64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id.as_u64(),
            customer_id: order.customer_id.to_string(),
            status: order.status().to_string(),
            total_cents: order.total().cents(),
            line_items: order
                .line_items
                .iter()
                .map(|item| LineItemResponse {
                    item_id: item.item_id.to_string(),
                    quantity: item.quantity,
                    price_cents: item.price.cents(),
                })
                .collect(),
            created_at: order.created_at,
            shipped_at: order.shipped_at,
            completed_at: order.completed_at,
        }
    }
}

// -- Handlers --

/// POST /orders — place a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let customer_id = parse_uuid("customer_id", &req.customer_id).map(CustomerId::from_uuid)?;

    let line_items = req
        .line_items
        .iter()
        .map(|item| -> Result<LineItem, ApiError> {
            Ok(LineItem::new(
                parse_uuid("item_id", &item.item_id)?,
                item.quantity,
                Money::from_cents(item.price_cents),
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let order_id = req.order_id.map(OrderId::new).unwrap_or_else(OrderId::random);
    let order = Order::new(order_id, customer_id, line_items, Utc::now());
    state.repository.insert(&order).await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders — list one page of orders.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let cursor = Cursor::new(query.cursor.unwrap_or_default());

    let result = state
        .repository
        .find_all(FindAllPage::after(cursor, size))
        .await?;

    Ok(Json(OrderListResponse {
        items: result.orders.into_iter().map(OrderResponse::from).collect(),
        next: result.cursor.as_u64(),
    }))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.repository.find_by_id(order_id).await?;
    Ok(Json(order.into()))
}

/// PUT /orders/:id — move an order to its next status.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target: OrderStatus = req.status.parse().map_err(ApiError::BadRequest)?;

    let mut order = state.repository.find_by_id(order_id).await?;
    order.transition_to(target, Utc::now())?;
    state.repository.update(&order).await?;

    Ok(Json(order.into()))
}

/// DELETE /orders/:id — remove an order.
#[tracing::instrument(skip(state))]
pub async fn delete<S: KeyValueStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.repository.delete_by_id(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))
}

fn parse_uuid(field: &str, value: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(value).map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}
