use chrono::{DateTime, FixedOffset};
use sqlx::{types::Json, FromRow};

pub const TABLE_NAME: &str = "user_roles";

#[derive(Clone, Debug, FromRow)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Json<Vec<String>>,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}
