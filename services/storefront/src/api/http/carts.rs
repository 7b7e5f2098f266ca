//! 购物车接口

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use shop_common::UserId;
use shop_cqrs_core::{CommandHandler, QueryHandler};
use shop_errors::{AppError, AppResult};

use super::dto::{AddCartItemRequest, CartResponse, UpdateCartItemRequest, bad_request};
use crate::application::cart::{
    AddCartItemCommand, ClearCartCommand, GetCartQuery, RemoveCartItemCommand,
    UpdateCartItemCommand,
};
use crate::container::AppState;
use crate::domain::cart::{Cart, ProductId};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/carts/{user_id}", get(get_cart).delete(clear_cart))
        .route("/api/carts/{user_id}/items", post(add_item))
        .route(
            "/api/carts/{user_id}/items/{product_id}",
            delete(remove_item).put(update_item),
        )
}

fn respond(cart: &Cart) -> AppResult<Json<CartResponse>> {
    Ok(Json(CartResponse::try_from(cart)?))
}

async fn get_cart(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<CartResponse>> {
    let Path(user_id) = path.map_err(bad_request)?;
    let user_id = UserId::new(user_id);

    let cart = state
        .cart_queries
        .handle(GetCartQuery { user_id })
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart for user {} not found", user_id)))?;
    respond(&cart)
}

async fn add_item(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<AddCartItemRequest>, JsonRejection>,
) -> AppResult<Json<CartResponse>> {
    let Path(user_id) = path.map_err(bad_request)?;
    let Json(request) = body.map_err(bad_request)?;

    let cart = state
        .cart_commands
        .handle(AddCartItemCommand {
            user_id: UserId::new(user_id),
            product_id: request.product_id,
            quantity: request.quantity,
            unit_price: request.unit_price,
            currency: request.currency,
        })
        .await?;
    respond(&cart)
}

async fn update_item(
    State(state): State<AppState>,
    path: Result<Path<(i64, ProductId)>, PathRejection>,
    body: Result<Json<UpdateCartItemRequest>, JsonRejection>,
) -> AppResult<Json<CartResponse>> {
    let Path((user_id, product_id)) = path.map_err(bad_request)?;
    let Json(request) = body.map_err(bad_request)?;

    let cart = state
        .cart_commands
        .handle(UpdateCartItemCommand {
            user_id: UserId::new(user_id),
            product_id,
            quantity: request.quantity,
        })
        .await?;
    respond(&cart)
}

async fn remove_item(
    State(state): State<AppState>,
    path: Result<Path<(i64, ProductId)>, PathRejection>,
) -> AppResult<Json<CartResponse>> {
    let Path((user_id, product_id)) = path.map_err(bad_request)?;

    let cart = state
        .cart_commands
        .handle(RemoveCartItemCommand {
            user_id: UserId::new(user_id),
            product_id,
        })
        .await?;
    respond(&cart)
}

async fn clear_cart(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(user_id) = path.map_err(bad_request)?;

    state
        .cart_commands
        .handle(ClearCartCommand {
            user_id: UserId::new(user_id),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
