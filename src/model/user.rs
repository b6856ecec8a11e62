use chrono::{DateTime, FixedOffset};
use sqlx::{prelude::FromRow, types::Json};

use crate::core::permission::{PermissionHolder, ROLE_ADMIN};

pub const TABLE_NAME: &str = "users";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub status: String,
    pub permissions: Option<Json<Vec<String>>>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub department_id: Option<String>,
    pub designation_id: Option<String>,
    pub created_date: DateTime<FixedOffset>,
    pub updated_date: DateTime<FixedOffset>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_approved(&self) -> bool {
        self.status == STATUS_APPROVED
    }

    pub fn permission_list(&self) -> Vec<String> {
        self.permissions
            .as_ref()
            .map(|x| x.0.clone())
            .unwrap_or_default()
    }
}

impl PermissionHolder for User {
    fn role(&self) -> &str {
        &self.role
    }

    fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_ref().map(|x| x.0.as_slice())
    }
}

/// User row joined with its department name and designation title.
#[derive(Clone, Debug, FromRow)]
pub struct UserWithRelations {
    #[sqlx(flatten)]
    pub user: User,
    pub department_name: Option<String>,
    pub designation_title: Option<String>,
}
