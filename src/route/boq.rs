use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::{
        costing::{calculate_line_cost, summarize, CostBreakdown, CostInput, ProductFormat},
        security::{require_permission, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::{
        boq::{Boq, BoqLineItem, BoqTimeline},
        parse_document_status,
        product::Product,
        STATUS_DOCUMENT_PENDING,
    },
    repository::{
        boq::{
            create_boq, create_boq_timeline, delete_boq, get_all_boq, get_boq_by_id,
            get_boq_line_items, get_boq_timeline, replace_boq_line_items, update_boq, BoqChanges,
        },
        product::get_product_by_id,
    },
    schema::{
        boq::{
            BoqCreateResponses, BoqDeleteResponses, BoqDetailResponse, BoqDetailResponses,
            BoqLineItemRequest, BoqListResponses, BoqRequest, BoqResponse, BoqUpdateResponses,
            CostingRequest, CostingResponse, CostingResponses, LineCostResponse,
        },
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
    },
    AppState,
};

pub const TIMELINE_SUBMITTED: &str = "Submitted";

#[derive(Tags)]
enum ApiBoqTags {
    Boq,
}

fn validate_boq_request(json: &BoqRequest) -> Result<Option<&'static str>, String> {
    if json.budget.is_some_and(|x| x < 0.0) {
        return Err("Budget cannot be negative".to_string());
    }
    match clean_opt(json.status.clone()) {
        Some(status) => match parse_document_status(&status) {
            Some(val) => Ok(Some(val)),
            None => Err(format!("Invalid status: {}", status)),
        },
        None => Ok(None),
    }
}

/// Resolves and costs the requested lines in order. The inner error is a
/// message for the caller.
async fn build_boq_line_items(
    tx: &mut Transaction<'_, Sqlite>,
    boq_id: &str,
    items: Vec<BoqLineItemRequest>,
) -> anyhow::Result<Result<Vec<BoqLineItem>, String>> {
    let mut result = vec![];
    for (idx, item) in items.into_iter().enumerate() {
        let position = idx as i64 + 1;
        let quantity = item.quantity.unwrap_or(1);
        if quantity < 1 {
            return Ok(Err(format!(
                "Line {}: quantity must be at least 1",
                position
            )));
        }
        let amounts = [
            item.unit_price,
            item.profit_margin,
            item.ex_works_cost,
            item.cnf_cost,
            item.shipping_cost,
        ];
        if amounts.iter().flatten().any(|x| *x < 0.0) {
            return Ok(Err(format!("Line {}: amounts cannot be negative", position)));
        }

        let product = match clean_opt(item.product_id.clone()) {
            Some(product_id) => match get_product_by_id(tx, &product_id).await? {
                Some(val) => Some(val),
                None => return Ok(Err("Invalid product".to_string())),
            },
            None => None,
        };

        let format = match clean_opt(item.format) {
            Some(format) => match ProductFormat::parse(&format) {
                Some(val) => val,
                None => return Ok(Err("Format must be local or foreign".to_string())),
            },
            None => product
                .as_ref()
                .and_then(|x| ProductFormat::parse(&x.format))
                .unwrap_or_default(),
        };
        let Some(product_name) =
            clean_opt(item.product_name).or(product.as_ref().map(|x| x.name.clone()))
        else {
            return Ok(Err(format!("Line {}: product name is required", position)));
        };
        let unit_price = item
            .unit_price
            .or(product.as_ref().map(|x| x.unit_price))
            .unwrap_or(0.0);

        let cost = calculate_line_cost(&CostInput {
            format,
            unit_price,
            margin_pct: item.profit_margin.unwrap_or(0.0),
            quantity,
            ex_works: item.ex_works_cost.unwrap_or(0.0),
            cnf: item.cnf_cost.unwrap_or(0.0),
            shipping: item.shipping_cost.unwrap_or(0.0),
        });

        let fallback = |value: Option<String>, from_product: fn(&Product) -> Option<String>| {
            clean_opt(value).or(product.as_ref().and_then(from_product))
        };
        result.push(BoqLineItem {
            id: generate_id("BLI"),
            boq_id: boq_id.to_string(),
            position,
            product_id: product.as_ref().map(|x| x.id.clone()),
            product_name,
            product_description: fallback(item.product_description, |x| x.description.clone()),
            brand: fallback(item.brand, |x| x.brand.clone()),
            model: fallback(item.model, |x| x.model.clone()),
            origin: fallback(item.origin, |x| x.origin.clone()),
            shipment: fallback(item.shipment, |x| x.shipment.clone()),
            manufacturer: fallback(item.manufacturer, |x| x.manufacturer.clone()),
            quantity: cost.quantity,
            unit: fallback(item.unit, |x| x.unit.clone()),
            unit_price: cost.unit_price,
            profit_margin: cost.margin_pct,
            format: cost.format.as_str().to_string(),
            margin_value: cost.margin_value,
            vat: cost.vat,
            ait: cost.ait,
            ex_works_cost: cost.ex_works,
            cnf_cost: cost.cnf,
            shipping_cost: cost.shipping,
            total_unit_price: cost.total_unit_price,
            total_price: cost.total_price,
        });
    }
    Ok(Ok(result))
}

async fn log_boq_timeline(
    tx: &mut Transaction<'_, Sqlite>,
    boq_id: &str,
    title: &str,
    actor: &str,
) -> anyhow::Result<()> {
    let entry = BoqTimeline {
        id: generate_id("BTL"),
        boq_id: boq_id.to_string(),
        title: title.to_string(),
        actor: Some(actor.to_string()),
        created_date: now(),
    };
    create_boq_timeline(tx, &entry).await
}

async fn boq_detail(
    tx: &mut Transaction<'_, Sqlite>,
    boq: Boq,
) -> anyhow::Result<BoqDetailResponse> {
    let items = get_boq_line_items(tx, &boq.id).await?;
    let timeline = get_boq_timeline(tx, &boq.id).await?;
    let costs: Vec<CostBreakdown> = items.iter().map(|x| x.cost()).collect();
    Ok(BoqDetailResponse {
        boq: boq.into(),
        items: items.into_iter().map(|x| x.into()).collect(),
        summary: summarize(&costs).into(),
        timeline: timeline.into_iter().map(|x| x.into()).collect(),
    })
}

pub struct ApiBoq;

#[OpenApi]
impl ApiBoq {
    #[oai(path = "/boqs", method = "get", tag = "ApiBoqTags::Boq")]
    async fn get_all_boq_api(
        &self,
        Query(status): Query<Option<String>>,
        Query(department): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> BoqListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return BoqListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "get_all_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_boq").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return BoqListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return BoqListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return BoqListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "get_all_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_boq(&mut tx, clean_opt(status), clean_opt(department)).await {
            Ok(data) => {
                BoqListResponses::Ok(Json(data.into_iter().map(BoqResponse::from).collect()))
            }
            Err(err) => BoqListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "get_all_boq_api",
                    "get all boq",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Costs line items without storing anything.
    #[oai(path = "/boqs/costing", method = "post", tag = "ApiBoqTags::Boq")]
    async fn costing_boq_api(
        &self,
        Json(json): Json<CostingRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CostingResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return CostingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "costing_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_boq").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return CostingResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return CostingResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return CostingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "costing_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let items = match build_boq_line_items(&mut tx, "", json.items).await {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return CostingResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
            Err(err) => {
                return CostingResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "costing_boq_api",
                        "cost line items",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let costs: Vec<CostBreakdown> = items.iter().map(|x| x.cost()).collect();
        CostingResponses::Ok(Json(CostingResponse {
            items: costs.iter().map(LineCostResponse::from).collect(),
            summary: summarize(&costs).into(),
        }))
    }

    #[oai(path = "/boqs/:id", method = "get", tag = "ApiBoqTags::Boq")]
    async fn get_detail_boq_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> BoqDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return BoqDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "get_detail_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_boq").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return BoqDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return BoqDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return BoqDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "get_detail_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let boq = match get_boq_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => return BoqDetailResponses::NotFound(Json(NotFoundResponse::new("BOQ", &id))),
            Err(err) => {
                return BoqDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "get_detail_boq_api",
                        "get boq",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match boq_detail(&mut tx, boq).await {
            Ok(val) => BoqDetailResponses::Ok(Json(val)),
            Err(err) => BoqDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "get_detail_boq_api",
                    "get boq detail",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/boqs", method = "post", tag = "ApiBoqTags::Boq")]
    async fn create_boq_api(
        &self,
        Json(json): Json<BoqRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> BoqCreateResponses {
        let status = match validate_boq_request(&json) {
            Ok(val) => val.unwrap_or(STATUS_DOCUMENT_PENDING),
            Err(message) => {
                return BoqCreateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        let Some(project) = clean_opt(json.project) else {
            return BoqCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Project name is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return BoqCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "create_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_permission(&mut tx, &state.config, auth.0.token, "create_boq")
            .await
        {
            Ok(Access::Granted(val)) => val,
            Ok(Access::Unauthorized) => {
                return BoqCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return BoqCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return BoqCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "create_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let now = now();
        let boq = Boq {
            id: generate_id("BOQ"),
            project,
            department: clean_opt(json.department),
            approver: clean_opt(json.approver),
            owner: clean_opt(json.owner).or(Some(user.name.clone())),
            status: status.to_string(),
            budget: json.budget.unwrap_or(0.0),
            created_date: now,
            updated_date: now,
        };
        let items = match build_boq_line_items(&mut tx, &boq.id, json.items.unwrap_or_default())
            .await
        {
            Ok(Ok(val)) => val,
            Ok(Err(message)) => {
                return BoqCreateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
            Err(err) => {
                return BoqCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "create_boq_api",
                        "cost line items",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = create_boq(&mut tx, &boq).await {
            return BoqCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "create_boq_api",
                    "create boq",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = replace_boq_line_items(&mut tx, &boq.id, &items).await {
            return BoqCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "create_boq_api",
                    "create boq line items",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = log_boq_timeline(&mut tx, &boq.id, TIMELINE_SUBMITTED, &user.name).await
        {
            return BoqCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "create_boq_api",
                    "log boq timeline",
                    &err.to_string(),
                ),
            ));
        }
        let detail = match boq_detail(&mut tx, boq).await {
            Ok(val) => val,
            Err(err) => {
                return BoqCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "create_boq_api",
                        "get boq detail",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return BoqCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "create_boq_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        BoqCreateResponses::Created(Json(detail))
    }

    #[oai(path = "/boqs/:id", method = "put", tag = "ApiBoqTags::Boq")]
    async fn update_boq_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<BoqRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> BoqUpdateResponses {
        let status = match validate_boq_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return BoqUpdateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        if json.project.is_some() && clean_opt(json.project.clone()).is_none() {
            return BoqUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Project name cannot be empty",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_permission(&mut tx, &state.config, auth.0.token, "edit_boq").await
        {
            Ok(Access::Granted(val)) => val,
            Ok(Access::Unauthorized) => {
                return BoqUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return BoqUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let existing = match get_boq_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => return BoqUpdateResponses::NotFound(Json(NotFoundResponse::new("BOQ", &id))),
            Err(err) => {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "get boq",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Some(items) = json.items {
            let items = match build_boq_line_items(&mut tx, &id, items).await {
                Ok(Ok(val)) => val,
                Ok(Err(message)) => {
                    return BoqUpdateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
                }
                Err(err) => {
                    return BoqUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.boq",
                            "update_boq_api",
                            "cost line items",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Err(err) = replace_boq_line_items(&mut tx, &id, &items).await {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "replace boq line items",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let changes = BoqChanges {
            project: clean_opt(json.project),
            department: json.department,
            approver: json.approver,
            owner: json.owner,
            status: status.map(|x| x.to_string()),
            budget: json.budget,
        };
        if let Err(err) = update_boq(&mut tx, &id, changes, now()).await {
            return BoqUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "update_boq_api",
                    "update boq",
                    &err.to_string(),
                ),
            ));
        }
        if let Some(status) = status.filter(|x| *x != existing.status) {
            if let Err(err) = log_boq_timeline(&mut tx, &id, status, &user.name).await {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "log boq timeline",
                        &err.to_string(),
                    ),
                ));
            }
        }
        let boq = match get_boq_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => return BoqUpdateResponses::NotFound(Json(NotFoundResponse::new("BOQ", &id))),
            Err(err) => {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "get updated boq",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let detail = match boq_detail(&mut tx, boq).await {
            Ok(val) => val,
            Err(err) => {
                return BoqUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "update_boq_api",
                        "get boq detail",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return BoqUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "update_boq_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        BoqUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/boqs/:id", method = "delete", tag = "ApiBoqTags::Boq")]
    async fn delete_boq_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> BoqDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return BoqDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "delete_boq_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "delete_boq").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return BoqDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return BoqDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return BoqDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "delete_boq_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_boq_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => return BoqDeleteResponses::NotFound(Json(NotFoundResponse::new("BOQ", &id))),
            Err(err) => {
                return BoqDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.boq",
                        "delete_boq_api",
                        "get boq",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_boq(&mut tx, &id).await {
            return BoqDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "delete_boq_api",
                    "delete boq",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return BoqDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.boq",
                    "delete_boq_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        BoqDeleteResponses::NoContent
    }
}
