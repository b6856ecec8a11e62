use chrono::{DateTime, FixedOffset};
use sqlx::{types::Json, FromRow};

pub const TABLE_NAME: &str = "user_role_assignments";

#[derive(Clone, Debug, FromRow)]
pub struct RoleAssignment {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub assigned_date: DateTime<FixedOffset>,
    /// The role's permission list as it was when the role was assigned.
    pub permissions: Json<Vec<String>>,
}

#[derive(Clone, Debug, FromRow)]
pub struct RoleAssignmentDetail {
    #[sqlx(flatten)]
    pub assignment: RoleAssignment,
    pub role_name: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
}
