use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use sqlx::types::Json as SqlxJson;

use crate::{
    core::{
        permission::normalize_permissions,
        security::{require_admin, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::role::Role,
    repository::{
        role::{
            create_role, delete_role, get_all_role, get_role_by_id, get_role_by_name, update_role,
        },
        role_assignment::{get_assigned_user_ids, refresh_user_permissions},
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        role::{
            RoleCreateResponses, RoleDeleteResponses, RoleDetailResponses, RoleListResponses,
            RoleRequest, RoleResponse, RoleUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRoleTags {
    Role,
}

pub struct ApiRole;

#[OpenApi]
impl ApiRole {
    #[oai(path = "/admin/user-roles", method = "get", tag = "ApiRoleTags::Role")]
    async fn get_all_role_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_all_role_api",
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
                return RoleListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RoleListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_all_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_role(&mut tx).await {
            Ok(data) => RoleListResponses::Ok(Json(
                data.into_iter().map(RoleResponse::from).collect(),
            )),
            Err(err) => RoleListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "get_all_role_api",
                    "get all role",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/admin/user-roles/:id", method = "get", tag = "ApiRoleTags::Role")]
    async fn get_detail_role_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
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
                return RoleDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RoleDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "get_detail_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_role_by_id(&mut tx, &id).await {
            Ok(Some(val)) => RoleDetailResponses::Ok(Json(val.into())),
            Ok(None) => RoleDetailResponses::NotFound(Json(NotFoundResponse::new("Role", &id))),
            Err(err) => RoleDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "get_detail_role_api",
                    "get role",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/admin/user-roles", method = "post", tag = "ApiRoleTags::Role")]
    async fn create_role_api(
        &self,
        Json(json): Json<RoleRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleCreateResponses {
        let Some(name) = clean_opt(json.name) else {
            return RoleCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Role name is required",
            )));
        };
        let permissions = match normalize_permissions(&json.permissions.unwrap_or_default()) {
            Ok(val) => val,
            Err(unknown) => {
                return RoleCreateResponses::BadRequest(Json(BadRequestResponse::new(&format!(
                    "Unknown permission: {}",
                    unknown
                ))))
            }
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
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
                return RoleCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RoleCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_role_by_name(&mut tx, &name, None).await {
            Ok(Some(_)) => {
                return RoleCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Role name already exists",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return RoleCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "create_role_api",
                        "check role name",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let now = now();
        let role = Role {
            id: generate_id("ROLE"),
            name,
            description: clean_opt(json.description),
            permissions: SqlxJson(permissions),
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_role(&mut tx, &role).await {
            return RoleCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "create_role_api",
                    "create role",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RoleCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "create_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleCreateResponses::Created(Json(role.into()))
    }

    /// Changing a role does not touch the permission snapshots of users it
    /// was already assigned to.
    #[oai(path = "/admin/user-roles/:id", method = "put", tag = "ApiRoleTags::Role")]
    async fn update_role_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<RoleRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleUpdateResponses {
        if json.name.is_some() && clean_opt(json.name.clone()).is_none() {
            return RoleUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Role name is required",
            )));
        }
        let permissions = match json.permissions.as_deref().map(normalize_permissions) {
            Some(Ok(val)) => Some(val),
            Some(Err(unknown)) => {
                return RoleUpdateResponses::BadRequest(Json(BadRequestResponse::new(&format!(
                    "Unknown permission: {}",
                    unknown
                ))))
            }
            None => None,
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
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
                return RoleUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RoleUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let mut role = match get_role_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RoleUpdateResponses::NotFound(Json(NotFoundResponse::new("Role", &id)))
            }
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "get role",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let name = clean_opt(json.name).unwrap_or(role.name.clone());
        match get_role_by_name(&mut tx, &name, Some(&id)).await {
            Ok(Some(_)) => {
                return RoleUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Role name already exists",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return RoleUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "update_role_api",
                        "check role name",
                        &err.to_string(),
                    ),
                ))
            }
        }
        let description = match json.description {
            Some(val) => clean_opt(Some(val)),
            None => role.description.clone(),
        };
        let permissions = permissions.unwrap_or(role.permissions.0.clone());

        if let Err(err) =
            update_role(&mut tx, &mut role, name, description, permissions, now()).await
        {
            return RoleUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "update_role_api",
                    "update role",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RoleUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "update_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleUpdateResponses::Ok(Json(role.into()))
    }

    #[oai(path = "/admin/user-roles/:id", method = "delete", tag = "ApiRoleTags::Role")]
    async fn delete_role_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
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
                return RoleDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RoleDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_role_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return RoleDeleteResponses::NotFound(Json(NotFoundResponse::new("Role", &id)))
            }
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "get role",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let user_ids = match get_assigned_user_ids(&mut tx, &id).await {
            Ok(val) => val,
            Err(err) => {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "get assigned users",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = delete_role(&mut tx, &id).await {
            return RoleDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "delete_role_api",
                    "delete role",
                    &err.to_string(),
                ),
            ));
        }
        // assignments are gone with the role; rebuild from what the users still hold
        for user_id in user_ids.iter() {
            if let Err(err) = refresh_user_permissions(&mut tx, user_id).await {
                return RoleDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role",
                        "delete_role_api",
                        "refresh user permissions",
                        &err.to_string(),
                    ),
                ));
            }
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RoleDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role",
                    "delete_role_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleDeleteResponses::NoContent
    }
}
