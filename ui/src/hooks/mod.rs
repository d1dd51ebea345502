pub mod use_cart;
pub mod use_orders;
pub mod use_profile;
pub mod use_query;

pub use use_cart::use_cart;
pub use use_orders::use_orders;
pub use use_profile::use_profile;
pub use use_query::{QueryHookReturn, use_query};
