use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string, model::designation::DesignationWithDepartment};

#[derive(Object, Deserialize, Serialize)]
pub struct DesignationResponse {
    pub id: String,
    pub department_id: String,
    pub department_name: Option<String>,
    pub title: String,
    pub created_date: String,
    pub updated_date: String,
}

impl From<DesignationWithDepartment> for DesignationResponse {
    fn from(value: DesignationWithDepartment) -> Self {
        let designation = value.designation;
        Self {
            id: designation.id,
            department_id: designation.department_id,
            department_name: value.department_name,
            title: designation.title,
            created_date: datetime_to_string(designation.created_date),
            updated_date: datetime_to_string(designation.updated_date),
        }
    }
}

#[derive(ApiResponse)]
pub enum DesignationListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<DesignationResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum DesignationDetailResponses {
    #[oai(status = 200)]
    Ok(Json<DesignationResponse>),

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
pub struct DesignationRequest {
    pub department_id: Option<String>,
    pub title: Option<String>,
}

#[derive(ApiResponse)]
pub enum DesignationCreateResponses {
    #[oai(status = 201)]
    Created(Json<DesignationResponse>),

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
pub enum DesignationUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<DesignationResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum DesignationDeleteResponses {
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
