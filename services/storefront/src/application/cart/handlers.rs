//! 购物车用例处理器

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shop_common::UserId;
use shop_cqrs_core::{CommandHandler, QueryHandler};
use shop_errors::{AppError, AppResult};
use tracing::info;

use super::commands::{
    AddCartItemCommand, ClearCartCommand, RemoveCartItemCommand, UpdateCartItemCommand,
};
use super::queries::GetCartQuery;
use crate::application::analytics::EventTracker;
use crate::domain::analytics::{Event, EventType};
use crate::domain::cart::Cart;
use crate::domain::repositories::CartRepository;
use crate::domain::value_objects::{Currency, Money, Quantity};

/// 购物车命令处理器
pub struct CartCommandHandler {
    carts: Arc<dyn CartRepository>,
    tracker: EventTracker,
}

impl CartCommandHandler {
    pub fn new(carts: Arc<dyn CartRepository>, tracker: EventTracker) -> Self {
        Self { carts, tracker }
    }

    async fn existing_cart(&self, user_id: UserId) -> AppResult<Cart> {
        self.carts
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Cart for user {} not found", user_id)))
    }

    async fn track(&self, event_type: EventType, user_id: UserId, payload: serde_json::Value) {
        let event = Event::for_user(event_type, user_id.to_string())
            .and_then(|event| event.with_payload(payload));
        self.tracker.track_best_effort(event).await;
    }
}

#[async_trait]
impl CommandHandler<AddCartItemCommand> for CartCommandHandler {
    async fn handle(&self, command: AddCartItemCommand) -> AppResult<Cart> {
        info!(
            user_id = %command.user_id,
            product_id = command.product_id,
            quantity = command.quantity,
            "Handling AddCartItemCommand"
        );

        let quantity = Quantity::new(command.quantity)?;
        let currency = match command.currency.as_deref() {
            Some(code) => Currency::new(code)?,
            None => Currency::default(),
        };
        let unit_price = Money::new(command.unit_price, currency);

        let mut cart = self
            .carts
            .find_by_user_id(command.user_id)
            .await?
            .unwrap_or_else(|| Cart::new(command.user_id));
        cart.add_item(command.product_id, quantity, unit_price.clone())?;
        let cart = self.carts.save(&cart).await?;

        self.track(
            EventType::AddToCart,
            command.user_id,
            json!({
                "product_id": command.product_id,
                "quantity": quantity.value(),
                "unit_price": unit_price.amount,
                "currency": unit_price.currency.code(),
            }),
        )
        .await;

        Ok(cart)
    }
}

#[async_trait]
impl CommandHandler<UpdateCartItemCommand> for CartCommandHandler {
    async fn handle(&self, command: UpdateCartItemCommand) -> AppResult<Cart> {
        info!(
            user_id = %command.user_id,
            product_id = command.product_id,
            quantity = command.quantity,
            "Handling UpdateCartItemCommand"
        );

        let quantity = Quantity::new(command.quantity)?;
        let mut cart = self.existing_cart(command.user_id).await?;
        cart.update_quantity(command.product_id, quantity)?;
        self.carts.save(&cart).await
    }
}

#[async_trait]
impl CommandHandler<RemoveCartItemCommand> for CartCommandHandler {
    async fn handle(&self, command: RemoveCartItemCommand) -> AppResult<Cart> {
        info!(
            user_id = %command.user_id,
            product_id = command.product_id,
            "Handling RemoveCartItemCommand"
        );

        let mut cart = self.existing_cart(command.user_id).await?;
        let removed = cart.remove_item(command.product_id)?;
        let cart = self.carts.save(&cart).await?;

        self.track(
            EventType::RemoveFromCart,
            command.user_id,
            json!({
                "product_id": removed.product_id,
                "quantity": removed.quantity.value(),
            }),
        )
        .await;

        Ok(cart)
    }
}

#[async_trait]
impl CommandHandler<ClearCartCommand> for CartCommandHandler {
    async fn handle(&self, command: ClearCartCommand) -> AppResult<()> {
        info!(user_id = %command.user_id, "Handling ClearCartCommand");

        if let Some(cart) = self.carts.find_by_user_id(command.user_id).await? {
            self.carts.delete(&cart).await?;
        }
        Ok(())
    }
}

/// 购物车查询处理器
pub struct CartQueryHandler {
    carts: Arc<dyn CartRepository>,
}

impl CartQueryHandler {
    pub fn new(carts: Arc<dyn CartRepository>) -> Self {
        Self { carts }
    }
}

#[async_trait]
impl QueryHandler<GetCartQuery> for CartQueryHandler {
    async fn handle(&self, query: GetCartQuery) -> AppResult<Option<Cart>> {
        self.carts.find_by_user_id(query.user_id).await
    }
}
