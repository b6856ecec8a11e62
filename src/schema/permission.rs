use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::core::permission::{Feature, Module};

#[derive(Object, Deserialize, Serialize)]
pub struct FeatureResponse {
    pub module: String,
    pub name: String,
    pub permissions: Vec<String>,
}

impl FeatureResponse {
    pub fn new(module: &Module, feature: &Feature) -> Self {
        Self {
            module: module.name.to_string(),
            name: feature.name.to_string(),
            permissions: feature.permissions.iter().map(|x| x.to_string()).collect(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ModuleResponse {
    pub name: String,
    pub features: Vec<FeatureResponse>,
}

impl From<&Module> for ModuleResponse {
    fn from(value: &Module) -> Self {
        Self {
            name: value.name.to_string(),
            features: value
                .features
                .iter()
                .map(|feature| FeatureResponse::new(value, feature))
                .collect(),
        }
    }
}

#[derive(ApiResponse)]
pub enum ModuleListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ModuleResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum FeatureListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<FeatureResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

/// Permission set held by a user or a role.
#[derive(Object, Deserialize, Serialize)]
pub struct PermissionSetResponse {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct PermissionSetRequest {
    pub permissions: Vec<String>,
}

#[derive(ApiResponse)]
pub enum PermissionSetResponses {
    #[oai(status = 200)]
    Ok(Json<PermissionSetResponse>),

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
