//! shop-cqrs-core - CQRS 核心库
//!
//! 用例以 Command（写）/ Query（读）建模，各自由一个 Handler 处理。

mod command;
mod query;

pub use command::*;
pub use query::*;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shop_errors::{AppError, AppResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct SetPrice {
        sku: &'static str,
        cents: i64,
    }

    impl Command for SetPrice {
        type Result = ();
    }

    struct GetPrice {
        sku: &'static str,
    }

    impl Query for GetPrice {
        type Result = Option<i64>;
    }

    #[derive(Default)]
    struct PriceBook {
        prices: Mutex<HashMap<&'static str, i64>>,
    }

    #[async_trait]
    impl CommandHandler<SetPrice> for PriceBook {
        async fn handle(&self, command: SetPrice) -> AppResult<()> {
            if command.cents < 0 {
                return Err(AppError::validation("price must not be negative"));
            }
            self.prices.lock().unwrap().insert(command.sku, command.cents);
            Ok(())
        }
    }

    #[async_trait]
    impl QueryHandler<GetPrice> for PriceBook {
        async fn handle(&self, query: GetPrice) -> AppResult<Option<i64>> {
            Ok(self.prices.lock().unwrap().get(query.sku).copied())
        }
    }

    #[tokio::test]
    async fn test_one_handler_serves_commands_and_queries() {
        let book = PriceBook::default();
        CommandHandler::handle(&book, SetPrice { sku: "A-1", cents: 1999 }).await.unwrap();

        assert_eq!(QueryHandler::handle(&book, GetPrice { sku: "A-1" }).await.unwrap(), Some(1999));
        assert_eq!(QueryHandler::handle(&book, GetPrice { sku: "B-2" }).await.unwrap(), None);
        assert!(CommandHandler::handle(&book, SetPrice { sku: "A-1", cents: -1 }).await.is_err());
    }
}
