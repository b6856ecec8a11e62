use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string, model::role_assignment::RoleAssignmentDetail};

#[derive(Object, Deserialize, Serialize)]
pub struct RoleAssignmentResponse {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub role_name: Option<String>,
    pub permissions: Vec<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub assigned_date: String,
}

impl From<RoleAssignmentDetail> for RoleAssignmentResponse {
    fn from(value: RoleAssignmentDetail) -> Self {
        Self {
            id: value.assignment.id,
            user_id: value.assignment.user_id,
            role_id: value.assignment.role_id,
            role_name: value.role_name,
            permissions: value.assignment.permissions.0,
            user_name: value.user_name,
            email: value.email,
            assigned_date: datetime_to_string(value.assignment.assigned_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum RoleAssignmentListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<RoleAssignmentResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RoleAssignmentDetailResponses {
    #[oai(status = 200)]
    Ok(Json<RoleAssignmentResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleAssignmentCreateRequest {
    pub user_id: Option<String>,
    pub role_id: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct RoleAssignmentCreateResponse {
    pub assignment: RoleAssignmentResponse,
    /// The user's permission snapshot after the assignment.
    pub user_permissions: Vec<String>,
}

#[derive(ApiResponse)]
pub enum RoleAssignmentCreateResponses {
    #[oai(status = 201)]
    Created(Json<RoleAssignmentCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RoleAssignmentDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
