use crate::ProductId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Set the quantity of a product in the cart. A quantity of zero
/// removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}
