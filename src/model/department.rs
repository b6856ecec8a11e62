use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "departments";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}
