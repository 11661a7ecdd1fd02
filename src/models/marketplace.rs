use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceItem {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub seller_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceStatus {
    Available,
    Sold,
}

/// Ranked results are produced server-side; their shape is passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceSearch {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub nearby_shops: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyShops {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub results: Vec<Value>,
}
