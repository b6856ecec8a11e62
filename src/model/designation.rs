use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "designations";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Designation {
    pub id: String,
    pub department_id: String,
    pub title: String,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, FromRow)]
pub struct DesignationWithDepartment {
    #[sqlx(flatten)]
    pub designation: Designation,
    pub department_name: Option<String>,
}
