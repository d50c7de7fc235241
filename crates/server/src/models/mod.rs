//! Database-backed domain models.

pub mod address;
pub mod cart;
pub mod meal;
pub mod order;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartLine, CartLineView};
pub use meal::Meal;
pub use order::{Order, OrderLine};
pub use user::User;
