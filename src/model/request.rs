use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "requests";
pub const ACTIVITY_TABLE_NAME: &str = "request_activity_log";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Request {
    pub id: String,
    pub request_type: String,
    pub requester: Option<String>,
    pub amount: f64,
    pub status: String,
    pub manager: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct RequestActivity {
    pub id: String,
    pub request_id: String,
    pub action: String,
    pub actor: Option<String>,
    pub created_date: DateTime<FixedOffset>,
}
