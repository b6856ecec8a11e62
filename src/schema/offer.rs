use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{
    core::utils::datetime_to_string,
    model::offer::{Offer, OfferProductDetail},
};

#[derive(Object, Deserialize, Serialize)]
pub struct OfferResponse {
    pub id: String,
    pub customer: String,
    pub department: Option<String>,
    pub value: f64,
    pub status: String,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

impl From<Offer> for OfferResponse {
    fn from(value: Offer) -> Self {
        Self {
            id: value.id,
            customer: value.customer,
            department: value.department,
            value: value.value,
            status: value.status,
            owner: value.owner,
            notes: value.notes,
            created_date: datetime_to_string(value.created_date),
            updated_date: datetime_to_string(value.updated_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct OfferProductResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub unit_price: Option<f64>,
    pub quantity: i64,
}

impl From<OfferProductDetail> for OfferProductResponse {
    fn from(value: OfferProductDetail) -> Self {
        Self {
            id: value.offer_product.id,
            product_id: value.offer_product.product_id,
            product_name: value.product_name,
            unit_price: value.unit_price,
            quantity: value.offer_product.quantity,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct OfferDetailResponse {
    pub offer: OfferResponse,
    pub products: Vec<OfferProductResponse>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct OfferProductRequest {
    pub product_id: String,
    pub quantity: Option<i64>,
}

/// On update, absent fields keep their value and a present `products` list
/// replaces the previous one.
#[derive(Object, Default, Deserialize, Serialize)]
pub struct OfferRequest {
    pub customer: Option<String>,
    pub department: Option<String>,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub notes: Option<String>,
    pub products: Option<Vec<OfferProductRequest>>,
}

#[derive(ApiResponse)]
pub enum OfferListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<OfferResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum OfferDetailResponses {
    #[oai(status = 200)]
    Ok(Json<OfferDetailResponse>),

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
pub enum OfferCreateResponses {
    #[oai(status = 201)]
    Created(Json<OfferDetailResponse>),

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
pub enum OfferUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<OfferDetailResponse>),

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
pub enum OfferDeleteResponses {
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
