//! 值对象

mod email;
mod money;
mod quantity;

pub use email::{Email, EmailError};
pub use money::{Currency, Money};
pub use quantity::Quantity;
