use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{
    core::utils::datetime_to_string,
    model::request::{Request, RequestActivity},
};

#[derive(Object, Deserialize, Serialize)]
pub struct RequestResponse {
    pub id: String,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub request_type: String,
    pub requester: Option<String>,
    pub amount: f64,
    pub status: String,
    pub manager: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

impl From<Request> for RequestResponse {
    fn from(value: Request) -> Self {
        Self {
            id: value.id,
            request_type: value.request_type,
            requester: value.requester,
            amount: value.amount,
            status: value.status,
            manager: value.manager,
            department: value.department,
            notes: value.notes,
            created_date: datetime_to_string(value.created_date),
            updated_date: datetime_to_string(value.updated_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RequestActivityResponse {
    pub id: String,
    pub action: String,
    pub actor: Option<String>,
    pub created_date: String,
}

impl From<RequestActivity> for RequestActivityResponse {
    fn from(value: RequestActivity) -> Self {
        Self {
            id: value.id,
            action: value.action,
            actor: value.actor,
            created_date: datetime_to_string(value.created_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RequestDetailResponse {
    pub request: RequestResponse,
    pub activity: Vec<RequestActivityResponse>,
}

#[derive(Object, Default, Deserialize, Serialize)]
pub struct RequestRequest {
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub request_type: Option<String>,
    pub requester: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub manager: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

#[derive(ApiResponse)]
pub enum RequestListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<RequestResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum RequestDetailResponses {
    #[oai(status = 200)]
    Ok(Json<RequestDetailResponse>),

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
pub enum RequestCreateResponses {
    #[oai(status = 201)]
    Created(Json<RequestDetailResponse>),

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
pub enum RequestUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<RequestDetailResponse>),

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
pub enum RequestDeleteResponses {
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
