use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::{
    core::{
        costing::ProductFormat,
        security::{require_permission, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::product::Product,
    repository::product::{
        create_product, delete_product, get_all_product, get_product_by_id, update_product,
        ProductChanges,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        product::{
            ProductCreateResponses, ProductDeleteResponses, ProductDetailResponses,
            ProductListResponses, ProductRequest, ProductResponse, ProductUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProductTags {
    Product,
}

/// Shared numeric and format checks for create and update.
fn validate_product_request(json: &ProductRequest) -> Result<Option<ProductFormat>, String> {
    if json.quantity.is_some_and(|x| x < 0) {
        return Err("Quantity cannot be negative".to_string());
    }
    if json.unit_price.is_some_and(|x| x < 0.0) {
        return Err("Unit price cannot be negative".to_string());
    }
    if json.commission.is_some_and(|x| x < 0.0) {
        return Err("Commission cannot be negative".to_string());
    }
    match clean_opt(json.format.clone()) {
        Some(format) => match ProductFormat::parse(&format) {
            Some(val) => Ok(Some(val)),
            None => Err("Format must be local or foreign".to_string()),
        },
        None => Ok(None),
    }
}

pub struct ApiProduct;

#[OpenApi]
impl ApiProduct {
    #[oai(path = "/products", method = "get", tag = "ApiProductTags::Product")]
    async fn get_all_product_api(
        &self,
        Query(format): Query<Option<String>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProductListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "get_all_product_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_product").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ProductListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ProductListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ProductListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "get_all_product_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let format = clean_opt(format).map(|x| x.to_lowercase());
        match get_all_product(&mut tx, format, clean_opt(search)).await {
            Ok(data) => ProductListResponses::Ok(Json(
                data.into_iter().map(ProductResponse::from).collect(),
            )),
            Err(err) => ProductListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "get_all_product_api",
                    "get all product",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/products/:id", method = "get", tag = "ApiProductTags::Product")]
    async fn get_detail_product_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProductDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "get_detail_product_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_product").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ProductDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ProductDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ProductDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "get_detail_product_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_product_by_id(&mut tx, &id).await {
            Ok(Some(val)) => ProductDetailResponses::Ok(Json(val.into())),
            Ok(None) => {
                ProductDetailResponses::NotFound(Json(NotFoundResponse::new("Product", &id)))
            }
            Err(err) => ProductDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "get_detail_product_api",
                    "get product",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/products", method = "post", tag = "ApiProductTags::Product")]
    async fn create_product_api(
        &self,
        Json(json): Json<ProductRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductCreateResponses {
        let format = match validate_product_request(&json) {
            Ok(val) => val.unwrap_or_default(),
            Err(message) => {
                return ProductCreateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        let Some(name) = clean_opt(json.name) else {
            return ProductCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Product name is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProductCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "create_product_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "create_product").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ProductCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ProductCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ProductCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "create_product_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let now = now();
        let product = Product {
            id: generate_id("PROD"),
            name,
            format: format.as_str().to_string(),
            description: clean_opt(json.description),
            brand: clean_opt(json.brand),
            model: clean_opt(json.model),
            origin: clean_opt(json.origin),
            shipment: clean_opt(json.shipment),
            manufacturer: clean_opt(json.manufacturer),
            quantity: json.quantity.unwrap_or(0),
            unit: clean_opt(json.unit),
            unit_price: json.unit_price.unwrap_or(0.0),
            commission: json.commission.unwrap_or(0.0),
            image: clean_opt(json.image),
            serial: clean_opt(json.serial),
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_product(&mut tx, &product).await {
            return ProductCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "create_product_api",
                    "create product",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return ProductCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "create_product_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        ProductCreateResponses::Created(Json(product.into()))
    }

    #[oai(path = "/products/:id", method = "put", tag = "ApiProductTags::Product")]
    async fn update_product_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<ProductRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductUpdateResponses {
        let format = match validate_product_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return ProductUpdateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        if json.name.is_some() && clean_opt(json.name.clone()).is_none() {
            return ProductUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Product name cannot be empty",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "update_product_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "edit_product").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ProductUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ProductUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "update_product_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_product_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return ProductUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Product", &id,
                )))
            }
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "update_product_api",
                        "get product",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let changes = ProductChanges {
            name: clean_opt(json.name),
            format: format.map(|x| x.as_str().to_string()),
            description: json.description,
            brand: json.brand,
            model: json.model,
            origin: json.origin,
            shipment: json.shipment,
            manufacturer: json.manufacturer,
            quantity: json.quantity,
            unit: json.unit,
            unit_price: json.unit_price,
            commission: json.commission,
            image: json.image,
            serial: json.serial,
        };
        if let Err(err) = update_product(&mut tx, &id, changes, now()).await {
            return ProductUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "update_product_api",
                    "update product",
                    &err.to_string(),
                ),
            ));
        }
        let product = match get_product_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return ProductUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Product", &id,
                )))
            }
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "update_product_api",
                        "get updated product",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return ProductUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "update_product_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        ProductUpdateResponses::Ok(Json(product.into()))
    }

    #[oai(path = "/products/:id", method = "delete", tag = "ApiProductTags::Product")]
    async fn delete_product_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProductDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "delete_product_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "delete_product").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ProductDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ProductDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ProductDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "delete_product_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_product_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return ProductDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Product", &id,
                )))
            }
            Err(err) => {
                return ProductDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.product",
                        "delete_product_api",
                        "get product",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_product(&mut tx, &id).await {
            return ProductDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "delete_product_api",
                    "delete product",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return ProductDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.product",
                    "delete_product_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        ProductDeleteResponses::NoContent
    }
}
