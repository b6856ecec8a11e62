use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::{
    core::{
        permission::{normalize_permissions, CATALOG},
        security::{require_admin, Access, BearerAuthorization},
        utils::{clean_opt, now},
    },
    repository::{
        role::{get_role_by_id, update_role},
        user::{get_user_by_id, set_user_permissions},
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        permission::{
            FeatureListResponses, FeatureResponse, ModuleListResponses, ModuleResponse,
            PermissionSetRequest, PermissionSetResponse, PermissionSetResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiPermissionTags {
    Permission,
}

pub struct ApiPermission;

#[OpenApi]
impl ApiPermission {
    /// The static capability catalog grouped by module.
    #[oai(
        path = "/admin/permissions/modules",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_permission_modules_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ModuleListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ModuleListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_permission_modules_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return ModuleListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return ModuleListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return ModuleListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_permission_modules_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        ModuleListResponses::Ok(Json(CATALOG.iter().map(ModuleResponse::from).collect()))
    }

    /// Flat feature list, optionally narrowed to one module (case-insensitive).
    #[oai(
        path = "/admin/permissions/features",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_permission_features_api(
        &self,
        Query(module): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> FeatureListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return FeatureListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_permission_features_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return FeatureListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return FeatureListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return FeatureListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_permission_features_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let module = clean_opt(module);
        let features: Vec<FeatureResponse> = CATALOG
            .iter()
            .filter(|x| match &module {
                Some(name) => x.name.eq_ignore_ascii_case(name),
                None => true,
            })
            .flat_map(|x| x.features.iter().map(|f| FeatureResponse::new(x, f)))
            .collect();
        FeatureListResponses::Ok(Json(features))
    }

    #[oai(
        path = "/admin/permissions/user/:id",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_user_permission_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionSetResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_user_permission_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return PermissionSetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return PermissionSetResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_user_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_user_by_id(&mut tx, &id).await {
            Ok(Some(user)) => PermissionSetResponses::Ok(Json(PermissionSetResponse {
                permissions: user.permission_list(),
                id: user.id,
                name: user.name,
                role: Some(user.role),
            })),
            Ok(None) => PermissionSetResponses::NotFound(Json(NotFoundResponse::new("User", &id))),
            Err(err) => PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "get_user_permission_api",
                    "get user",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Replaces a user's permission list. An empty list clears it, so the
    /// user falls back to the configured permission policy.
    #[oai(
        path = "/admin/permissions/user/:id",
        method = "put",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn update_user_permission_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<PermissionSetRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionSetResponses {
        let permissions = match normalize_permissions(&json.permissions) {
            Ok(val) => val,
            Err(unknown) => {
                return PermissionSetResponses::BadRequest(Json(BadRequestResponse::new(
                    &format!("Unknown permission: {}", unknown),
                )))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_user_permission_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return PermissionSetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return PermissionSetResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_user_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let user = match get_user_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return PermissionSetResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_user_permission_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let stored = if permissions.is_empty() {
            None
        } else {
            Some(permissions.clone())
        };
        if let Err(err) = set_user_permissions(&mut tx, &user.id, stored, now()).await {
            return PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_user_permission_api",
                    "set user permissions",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_user_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PermissionSetResponses::Ok(Json(PermissionSetResponse {
            id: user.id,
            name: user.name,
            role: Some(user.role),
            permissions,
        }))
    }

    #[oai(
        path = "/admin/permissions/role/:id",
        method = "get",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn get_role_permission_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionSetResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_role_permission_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return PermissionSetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return PermissionSetResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "get_role_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_role_by_id(&mut tx, &id).await {
            Ok(Some(role)) => PermissionSetResponses::Ok(Json(PermissionSetResponse {
                id: role.id,
                name: role.name,
                role: None,
                permissions: role.permissions.0,
            })),
            Ok(None) => PermissionSetResponses::NotFound(Json(NotFoundResponse::new("Role", &id))),
            Err(err) => PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "get_role_permission_api",
                    "get role",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/permissions/role/:id",
        method = "put",
        tag = "ApiPermissionTags::Permission"
    )]
    async fn update_role_permission_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<PermissionSetRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PermissionSetResponses {
        let permissions = match normalize_permissions(&json.permissions) {
            Ok(val) => val,
            Err(unknown) => {
                return PermissionSetResponses::BadRequest(Json(BadRequestResponse::new(
                    &format!("Unknown permission: {}", unknown),
                )))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_role_permission_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return PermissionSetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return PermissionSetResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_role_permission_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let mut role = match get_role_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return PermissionSetResponses::NotFound(Json(NotFoundResponse::new("Role", &id)))
            }
            Err(err) => {
                return PermissionSetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.permission",
                        "update_role_permission_api",
                        "get role",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let name = role.name.clone();
        let description = role.description.clone();
        if let Err(err) = update_role(&mut tx, &mut role, name, description, permissions, now()).await
        {
            return PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_role_permission_api",
                    "update role",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return PermissionSetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.permission",
                    "update_role_permission_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PermissionSetResponses::Ok(Json(PermissionSetResponse {
            id: role.id,
            name: role.name,
            role: None,
            permissions: role.permissions.0,
        }))
    }
}
