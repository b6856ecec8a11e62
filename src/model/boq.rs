use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

use crate::core::costing::{CostBreakdown, ProductFormat};

pub const TABLE_NAME: &str = "boqs";
pub const LINE_ITEM_TABLE_NAME: &str = "boq_line_items";
pub const TIMELINE_TABLE_NAME: &str = "boq_timeline";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Boq {
    pub id: String,
    pub project: String,
    pub department: Option<String>,
    pub approver: Option<String>,
    pub owner: Option<String>,
    pub status: String,
    pub budget: f64,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct BoqLineItem {
    pub id: String,
    pub boq_id: String,
    pub position: i64,
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: i64,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub profit_margin: f64,
    pub format: String,
    pub margin_value: f64,
    pub vat: f64,
    pub ait: f64,
    pub ex_works_cost: f64,
    pub cnf_cost: f64,
    pub shipping_cost: f64,
    pub total_unit_price: f64,
    pub total_price: f64,
}

impl BoqLineItem {
    pub fn cost(&self) -> CostBreakdown {
        CostBreakdown {
            format: ProductFormat::parse(&self.format).unwrap_or_default(),
            unit_price: self.unit_price,
            margin_pct: self.profit_margin,
            margin_value: self.margin_value,
            vat: self.vat,
            ait: self.ait,
            ex_works: self.ex_works_cost,
            cnf: self.cnf_cost,
            shipping: self.shipping_cost,
            total_unit_price: self.total_unit_price,
            quantity: self.quantity,
            total_price: self.total_price,
        }
    }
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct BoqTimeline {
    pub id: String,
    pub boq_id: String,
    pub title: String,
    pub actor: Option<String>,
    pub created_date: DateTime<FixedOffset>,
}
