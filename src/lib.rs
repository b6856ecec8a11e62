use std::sync::Arc;

use poem::{
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
    EndpointExt, Route,
};
use poem_openapi::OpenApiService;
use route::{
    auth::ApiAuth, boq::ApiBoq, department::ApiDepartment, designation::ApiDesignation,
    offer::ApiOffer, permission::ApiPermission, product::ApiProduct, profile::ApiProfile,
    request::ApiRequest, role::ApiRole, role_assignment::ApiRoleAssignment, user::ApiUser,
};
use settings::Config;
use sqlx::{Pool, Sqlite};

pub mod cli;
pub mod core;
#[cfg(test)]
pub mod factory;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod settings;

pub struct AppState {
    pub db: Pool<Sqlite>,
    pub config: Config,
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route = OpenApiService::new(
        (
            ApiAuth,
            ApiProfile,
            ApiUser,
            ApiDepartment,
            ApiDesignation,
            ApiRole,
            ApiRoleAssignment,
            ApiPermission,
            ApiProduct,
            ApiOffer,
            ApiBoq,
            ApiRequest,
        ),
        "Genesis ERP",
        "1.0",
    )
    .server(prefix.clone());
    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(Cors::new())
}
