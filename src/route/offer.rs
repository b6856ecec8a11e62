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
        security::{require_permission, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::{
        offer::{Offer, OfferProduct},
        parse_document_status, STATUS_DOCUMENT_PENDING,
    },
    repository::{
        offer::{
            create_offer, delete_offer, get_all_offer, get_offer_by_id, get_offer_products,
            replace_offer_products, update_offer, OfferChanges,
        },
        product::get_product_by_id,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        offer::{
            OfferCreateResponses, OfferDeleteResponses, OfferDetailResponse,
            OfferDetailResponses, OfferListResponses, OfferProductRequest, OfferRequest,
            OfferResponse, OfferUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiOfferTags {
    Offer,
}

/// Checks the request body; returns the canonical status if one was sent.
fn validate_offer_request(json: &OfferRequest) -> Result<Option<&'static str>, String> {
    if json.value.is_some_and(|x| x < 0.0) {
        return Err("Offer value cannot be negative".to_string());
    }
    if let Some(products) = &json.products {
        if products.iter().any(|x| x.quantity.is_some_and(|q| q < 1)) {
            return Err("Product quantity must be at least 1".to_string());
        }
    }
    match clean_opt(json.status.clone()) {
        Some(status) => match parse_document_status(&status) {
            Some(val) => Ok(Some(val)),
            None => Err(format!("Invalid status: {}", status)),
        },
        None => Ok(None),
    }
}

/// Resolves requested product lines. The inner error names the first
/// product that does not exist.
async fn build_offer_products(
    tx: &mut Transaction<'_, Sqlite>,
    offer_id: &str,
    items: Vec<OfferProductRequest>,
) -> anyhow::Result<Result<Vec<OfferProduct>, String>> {
    let mut result = vec![];
    for item in items {
        let product_id = item.product_id.trim().to_string();
        if get_product_by_id(tx, &product_id).await?.is_none() {
            return Ok(Err(format!("Invalid product: {}", product_id)));
        }
        result.push(OfferProduct {
            id: generate_id("OP"),
            offer_id: offer_id.to_string(),
            product_id,
            quantity: item.quantity.unwrap_or(1),
        });
    }
    Ok(Ok(result))
}

async fn offer_detail(
    tx: &mut Transaction<'_, Sqlite>,
    offer: Offer,
) -> anyhow::Result<OfferDetailResponse> {
    let products = get_offer_products(tx, &offer.id).await?;
    Ok(OfferDetailResponse {
        offer: offer.into(),
        products: products.into_iter().map(|x| x.into()).collect(),
    })
}

pub struct ApiOffer;

#[OpenApi]
impl ApiOffer {
    #[oai(path = "/offers", method = "get", tag = "ApiOfferTags::Offer")]
    async fn get_all_offer_api(
        &self,
        Query(status): Query<Option<String>>,
        Query(department): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OfferListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OfferListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "get_all_offer_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_offers").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return OfferListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return OfferListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return OfferListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "get_all_offer_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_offer(&mut tx, clean_opt(status), clean_opt(department)).await {
            Ok(data) => {
                OfferListResponses::Ok(Json(data.into_iter().map(OfferResponse::from).collect()))
            }
            Err(err) => OfferListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "get_all_offer_api",
                    "get all offer",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/offers/:id", method = "get", tag = "ApiOfferTags::Offer")]
    async fn get_detail_offer_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OfferDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OfferDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "get_detail_offer_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_offers").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return OfferDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return OfferDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return OfferDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "get_detail_offer_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let offer = match get_offer_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return OfferDetailResponses::NotFound(Json(NotFoundResponse::new("Offer", &id)))
            }
            Err(err) => {
                return OfferDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "get_detail_offer_api",
                        "get offer",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match offer_detail(&mut tx, offer).await {
            Ok(val) => OfferDetailResponses::Ok(Json(val)),
            Err(err) => OfferDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "get_detail_offer_api",
                    "get offer products",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/offers", method = "post", tag = "ApiOfferTags::Offer")]
    async fn create_offer_api(
        &self,
        Json(json): Json<OfferRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OfferCreateResponses {
        let status = match validate_offer_request(&json) {
            Ok(val) => val.unwrap_or(STATUS_DOCUMENT_PENDING),
            Err(message) => {
                return OfferCreateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        let Some(customer) = clean_opt(json.customer) else {
            return OfferCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Customer is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OfferCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "create_offer_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_permission(&mut tx, &state.config, auth.0.token, "create_offer")
            .await
        {
            Ok(Access::Granted(val)) => val,
            Ok(Access::Unauthorized) => {
                return OfferCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return OfferCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return OfferCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "create_offer_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let now = now();
        let offer = Offer {
            id: generate_id("OFFER"),
            customer,
            department: clean_opt(json.department),
            value: json.value.unwrap_or(0.0),
            status: status.to_string(),
            owner: clean_opt(json.owner).or(Some(user.name)),
            notes: clean_opt(json.notes),
            created_date: now,
            updated_date: now,
        };
        let products =
            match build_offer_products(&mut tx, &offer.id, json.products.unwrap_or_default())
                .await
            {
                Ok(Ok(val)) => val,
                Ok(Err(message)) => {
                    return OfferCreateResponses::BadRequest(Json(BadRequestResponse::new(
                        &message,
                    )))
                }
                Err(err) => {
                    return OfferCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.offer",
                            "create_offer_api",
                            "check offer products",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if let Err(err) = create_offer(&mut tx, &offer).await {
            return OfferCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "create_offer_api",
                    "create offer",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = replace_offer_products(&mut tx, &offer.id, &products).await {
            return OfferCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "create_offer_api",
                    "create offer products",
                    &err.to_string(),
                ),
            ));
        }
        let detail = match offer_detail(&mut tx, offer).await {
            Ok(val) => val,
            Err(err) => {
                return OfferCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "create_offer_api",
                        "get offer products",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return OfferCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "create_offer_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        OfferCreateResponses::Created(Json(detail))
    }

    #[oai(path = "/offers/:id", method = "put", tag = "ApiOfferTags::Offer")]
    async fn update_offer_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<OfferRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OfferUpdateResponses {
        let status = match validate_offer_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return OfferUpdateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        if json.customer.is_some() && clean_opt(json.customer.clone()).is_none() {
            return OfferUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Customer cannot be empty",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "edit_offer").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return OfferUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return OfferUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_offer_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return OfferUpdateResponses::NotFound(Json(NotFoundResponse::new("Offer", &id)))
            }
            Err(err) => {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "get offer",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Some(items) = json.products {
            let products = match build_offer_products(&mut tx, &id, items).await {
                Ok(Ok(val)) => val,
                Ok(Err(message)) => {
                    return OfferUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        &message,
                    )))
                }
                Err(err) => {
                    return OfferUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.offer",
                            "update_offer_api",
                            "check offer products",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Err(err) = replace_offer_products(&mut tx, &id, &products).await {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "replace offer products",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let changes = OfferChanges {
            customer: clean_opt(json.customer),
            department: json.department,
            value: json.value,
            status: status.map(|x| x.to_string()),
            owner: json.owner,
            notes: json.notes,
        };
        if let Err(err) = update_offer(&mut tx, &id, changes, now()).await {
            return OfferUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "update_offer_api",
                    "update offer",
                    &err.to_string(),
                ),
            ));
        }
        let offer = match get_offer_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return OfferUpdateResponses::NotFound(Json(NotFoundResponse::new("Offer", &id)))
            }
            Err(err) => {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "get updated offer",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let detail = match offer_detail(&mut tx, offer).await {
            Ok(val) => val,
            Err(err) => {
                return OfferUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "update_offer_api",
                        "get offer products",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return OfferUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "update_offer_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        OfferUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/offers/:id", method = "delete", tag = "ApiOfferTags::Offer")]
    async fn delete_offer_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> OfferDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return OfferDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "delete_offer_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "delete_offer").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return OfferDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return OfferDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return OfferDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "delete_offer_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_offer_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return OfferDeleteResponses::NotFound(Json(NotFoundResponse::new("Offer", &id)))
            }
            Err(err) => {
                return OfferDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.offer",
                        "delete_offer_api",
                        "get offer",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_offer(&mut tx, &id).await {
            return OfferDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "delete_offer_api",
                    "delete offer",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return OfferDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.offer",
                    "delete_offer_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        OfferDeleteResponses::NoContent
    }
}
