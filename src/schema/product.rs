use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string, model::product::Product};

#[derive(Object, Deserialize, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub format: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: i64,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub commission: f64,
    /// Inline data URL.
    pub image: Option<String>,
    pub serial: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            format: value.format,
            description: value.description,
            brand: value.brand,
            model: value.model,
            origin: value.origin,
            shipment: value.shipment,
            manufacturer: value.manufacturer,
            quantity: value.quantity,
            unit: value.unit,
            unit_price: value.unit_price,
            commission: value.commission,
            image: value.image,
            serial: value.serial,
            created_date: datetime_to_string(value.created_date),
            updated_date: datetime_to_string(value.updated_date),
        }
    }
}

#[derive(Object, Default, Deserialize, Serialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub commission: Option<f64>,
    pub image: Option<String>,
    pub serial: Option<String>,
}

#[derive(ApiResponse)]
pub enum ProductListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ProductResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ProductDetailResponses {
    #[oai(status = 200)]
    Ok(Json<ProductResponse>),

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
pub enum ProductCreateResponses {
    #[oai(status = 201)]
    Created(Json<ProductResponse>),

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
pub enum ProductUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<ProductResponse>),

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
pub enum ProductDeleteResponses {
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
