use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::{
    core::{
        security::{require_admin, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::role_assignment::{RoleAssignment, RoleAssignmentDetail},
    repository::{
        role::get_role_by_id,
        role_assignment::{
            create_role_assignment, delete_role_assignment, get_all_role_assignment,
            get_role_assignment_by_id, get_role_assignment_by_pair, grant_role_permissions,
            refresh_user_permissions,
        },
        user::get_user_by_id,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        role_assignment::{
            RoleAssignmentCreateRequest, RoleAssignmentCreateResponse,
            RoleAssignmentCreateResponses, RoleAssignmentDeleteResponses,
            RoleAssignmentDetailResponses, RoleAssignmentListResponses, RoleAssignmentResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRoleAssignmentTags {
    RoleAssignment,
}

pub struct ApiRoleAssignment;

#[OpenApi]
impl ApiRoleAssignment {
    #[oai(
        path = "/admin/user-role-assignments",
        method = "get",
        tag = "ApiRoleAssignmentTags::RoleAssignment"
    )]
    async fn get_all_role_assignment_api(
        &self,
        Query(user_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleAssignmentListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleAssignmentListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "get_all_role_assignment_api",
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
                return RoleAssignmentListResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return RoleAssignmentListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RoleAssignmentListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "get_all_role_assignment_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_role_assignment(&mut tx, clean_opt(user_id)).await {
            Ok(data) => RoleAssignmentListResponses::Ok(Json(
                data.into_iter().map(RoleAssignmentResponse::from).collect(),
            )),
            Err(err) => RoleAssignmentListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "get_all_role_assignment_api",
                    "get all role assignment",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/user-role-assignments/:id",
        method = "get",
        tag = "ApiRoleAssignmentTags::RoleAssignment"
    )]
    async fn get_detail_role_assignment_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleAssignmentDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleAssignmentDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "get_detail_role_assignment_api",
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
                return RoleAssignmentDetailResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return RoleAssignmentDetailResponses::Forbidden(Json(
                    ForbiddenResponse::default(),
                ))
            }
            Err(err) => {
                return RoleAssignmentDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "get_detail_role_assignment_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_role_assignment_by_id(&mut tx, &id).await {
            Ok(Some(val)) => RoleAssignmentDetailResponses::Ok(Json(val.into())),
            Ok(None) => RoleAssignmentDetailResponses::NotFound(Json(NotFoundResponse::new(
                "Role assignment",
                &id,
            ))),
            Err(err) => RoleAssignmentDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "get_detail_role_assignment_api",
                    "get role assignment",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Assigns a role and rewrites the user's permission snapshot in the same
    /// transaction.
    #[oai(
        path = "/admin/user-role-assignments",
        method = "post",
        tag = "ApiRoleAssignmentTags::RoleAssignment"
    )]
    async fn create_role_assignment_api(
        &self,
        Json(json): Json<RoleAssignmentCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleAssignmentCreateResponses {
        let (Some(user_id), Some(role_id)) = (clean_opt(json.user_id), clean_opt(json.role_id))
        else {
            return RoleAssignmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "User ID and Role ID are required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
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
                return RoleAssignmentCreateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return RoleAssignmentCreateResponses::Forbidden(Json(
                    ForbiddenResponse::default(),
                ))
            }
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let user = match get_user_by_id(&mut tx, &user_id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RoleAssignmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "User not found",
                )))
            }
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let role = match get_role_by_id(&mut tx, &role_id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RoleAssignmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Role not found",
                )))
            }
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
                        "get role",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match get_role_assignment_by_pair(&mut tx, &user_id, &role_id).await {
            Ok(Some(_)) => {
                return RoleAssignmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Role already assigned to this user",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
                        "check role assignment",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let assignment = RoleAssignment {
            id: generate_id("URA"),
            user_id,
            role_id,
            assigned_date: now(),
            permissions: role.permissions.clone(),
        };
        if let Err(err) = create_role_assignment(&mut tx, &assignment).await {
            return RoleAssignmentCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "create_role_assignment_api",
                    "create role assignment",
                    &err.to_string(),
                ),
            ));
        }
        let user_permissions = match grant_role_permissions(&mut tx, &user, &role.permissions.0)
            .await
        {
            Ok(val) => val,
            Err(err) => {
                return RoleAssignmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "create_role_assignment_api",
                        "grant role permissions",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RoleAssignmentCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "create_role_assignment_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }

        tracing::info!(
            "role {} assigned to user {}",
            role.name,
            user.username
        );
        let detail = RoleAssignmentDetail {
            assignment,
            role_name: Some(role.name),
            user_name: Some(user.name),
            email: Some(user.email),
        };
        RoleAssignmentCreateResponses::Created(Json(RoleAssignmentCreateResponse {
            assignment: detail.into(),
            user_permissions,
        }))
    }

    /// Removes an assignment and rebuilds the user's permissions from the
    /// snapshots of the roles they still hold.
    #[oai(
        path = "/admin/user-role-assignments/:id",
        method = "delete",
        tag = "ApiRoleAssignmentTags::RoleAssignment"
    )]
    async fn delete_role_assignment_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RoleAssignmentDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RoleAssignmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "delete_role_assignment_api",
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
                return RoleAssignmentDeleteResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return RoleAssignmentDeleteResponses::Forbidden(Json(
                    ForbiddenResponse::default(),
                ))
            }
            Err(err) => {
                return RoleAssignmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "delete_role_assignment_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let assignment = match get_role_assignment_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val.assignment,
            Ok(None) => {
                return RoleAssignmentDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Role assignment",
                    &id,
                )))
            }
            Err(err) => {
                return RoleAssignmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.role_assignment",
                        "delete_role_assignment_api",
                        "get role assignment",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if let Err(err) = delete_role_assignment(&mut tx, &id).await {
            return RoleAssignmentDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "delete_role_assignment_api",
                    "delete role assignment",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = refresh_user_permissions(&mut tx, &assignment.user_id).await {
            return RoleAssignmentDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "delete_role_assignment_api",
                    "refresh user permissions",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RoleAssignmentDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.role_assignment",
                    "delete_role_assignment_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RoleAssignmentDeleteResponses::NoContent
    }
}
