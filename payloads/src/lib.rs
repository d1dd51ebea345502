use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError, ok_body, ok_empty};

#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct UserId(pub Uuid);

#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct ProductId(pub Uuid);

#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct OrderId(pub Uuid);
