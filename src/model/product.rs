use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "products";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub format: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: i64,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub commission: f64,
    pub image: Option<String>,
    pub serial: Option<String>,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}
