use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{
    core::{
        costing::{CostBreakdown, CostSummary},
        utils::datetime_to_string,
    },
    model::boq::{Boq, BoqLineItem, BoqTimeline},
};

#[derive(Object, Deserialize, Serialize)]
pub struct BoqResponse {
    pub id: String,
    pub project: String,
    pub department: Option<String>,
    pub approver: Option<String>,
    pub owner: Option<String>,
    pub status: String,
    pub budget: f64,
    pub created_date: String,
    pub updated_date: String,
}

impl From<Boq> for BoqResponse {
    fn from(value: Boq) -> Self {
        Self {
            id: value.id,
            project: value.project,
            department: value.department,
            approver: value.approver,
            owner: value.owner,
            status: value.status,
            budget: value.budget,
            created_date: datetime_to_string(value.created_date),
            updated_date: datetime_to_string(value.updated_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct BoqLineItemResponse {
    pub id: String,
    pub position: i64,
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub unit: Option<String>,
    pub cost: LineCostResponse,
}

impl From<BoqLineItem> for BoqLineItemResponse {
    fn from(value: BoqLineItem) -> Self {
        let cost = LineCostResponse::from(&value.cost());
        Self {
            id: value.id,
            position: value.position,
            product_id: value.product_id,
            product_name: value.product_name,
            product_description: value.product_description,
            brand: value.brand,
            model: value.model,
            origin: value.origin,
            shipment: value.shipment,
            manufacturer: value.manufacturer,
            unit: value.unit,
            cost,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct LineCostResponse {
    pub format: String,
    pub unit_price: f64,
    pub profit_margin: f64,
    pub margin_value: f64,
    pub vat: f64,
    pub ait: f64,
    pub ex_works_cost: f64,
    pub cnf_cost: f64,
    pub shipping_cost: f64,
    pub total_unit_price: f64,
    pub quantity: i64,
    pub total_price: f64,
}

impl From<&CostBreakdown> for LineCostResponse {
    fn from(value: &CostBreakdown) -> Self {
        Self {
            format: value.format.as_str().to_string(),
            unit_price: value.unit_price,
            profit_margin: value.margin_pct,
            margin_value: value.margin_value,
            vat: value.vat,
            ait: value.ait,
            ex_works_cost: value.ex_works,
            cnf_cost: value.cnf,
            shipping_cost: value.shipping,
            total_unit_price: value.total_unit_price,
            quantity: value.quantity,
            total_price: value.total_price,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct CostSummaryResponse {
    pub total_local: f64,
    pub total_foreign: f64,
    pub total_vat: f64,
    pub total_ait: f64,
    pub total_ex_works: f64,
    pub total_cnf: f64,
    pub total_shipping: f64,
    pub grand_total: f64,
}

impl From<CostSummary> for CostSummaryResponse {
    fn from(value: CostSummary) -> Self {
        Self {
            total_local: value.total_local,
            total_foreign: value.total_foreign,
            total_vat: value.total_vat,
            total_ait: value.total_ait,
            total_ex_works: value.total_ex_works,
            total_cnf: value.total_cnf,
            total_shipping: value.total_shipping,
            grand_total: value.grand_total,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct BoqTimelineResponse {
    pub id: String,
    pub title: String,
    pub actor: Option<String>,
    pub created_date: String,
}

impl From<BoqTimeline> for BoqTimelineResponse {
    fn from(value: BoqTimeline) -> Self {
        Self {
            id: value.id,
            title: value.title,
            actor: value.actor,
            created_date: datetime_to_string(value.created_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct BoqDetailResponse {
    pub boq: BoqResponse,
    pub items: Vec<BoqLineItemResponse>,
    pub summary: CostSummaryResponse,
    pub timeline: Vec<BoqTimelineResponse>,
}

/// One line of a BOQ. With `product_id` set, absent descriptive fields,
/// price and format are taken from the product.
#[derive(Object, Clone, Default, Deserialize, Serialize)]
pub struct BoqLineItemRequest {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub profit_margin: Option<f64>,
    pub format: Option<String>,
    pub ex_works_cost: Option<f64>,
    pub cnf_cost: Option<f64>,
    pub shipping_cost: Option<f64>,
}

/// On update, absent fields keep their value and a present `items` list
/// replaces every line item.
#[derive(Object, Default, Deserialize, Serialize)]
pub struct BoqRequest {
    pub project: Option<String>,
    pub department: Option<String>,
    pub approver: Option<String>,
    pub owner: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
    pub items: Option<Vec<BoqLineItemRequest>>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct CostingRequest {
    pub items: Vec<BoqLineItemRequest>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct CostingResponse {
    pub items: Vec<LineCostResponse>,
    pub summary: CostSummaryResponse,
}

#[derive(ApiResponse)]
pub enum CostingResponses {
    #[oai(status = 200)]
    Ok(Json<CostingResponse>),

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
pub enum BoqListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<BoqResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum BoqDetailResponses {
    #[oai(status = 200)]
    Ok(Json<BoqDetailResponse>),

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
pub enum BoqCreateResponses {
    #[oai(status = 201)]
    Created(Json<BoqDetailResponse>),

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
pub enum BoqUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<BoqDetailResponse>),

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
pub enum BoqDeleteResponses {
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
