use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "offers";
pub const OFFER_PRODUCT_TABLE_NAME: &str = "offer_products";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Offer {
    pub id: String,
    pub customer: String,
    pub department: Option<String>,
    pub value: f64,
    pub status: String,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct OfferProduct {
    pub id: String,
    pub offer_id: String,
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, FromRow)]
pub struct OfferProductDetail {
    #[sqlx(flatten)]
    pub offer_product: OfferProduct,
    pub product_name: Option<String>,
    pub unit_price: Option<f64>,
}
