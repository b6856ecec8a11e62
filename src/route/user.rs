use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use super::auth::MIN_PASSWORD_LENGTH;
use crate::{
    core::{
        permission::{ROLE_ADMIN, ROLE_USER},
        security::{hash_password, require_admin, Access, BearerAuthorization},
        utils::{clean_opt, is_valid_email, now},
    },
    model::user::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED},
    repository::{
        department::get_department_by_id,
        designation::get_designation_by_id,
        user::{
            delete_user, get_all_user, get_pending_user, get_user_by_id,
            get_user_with_relations_by_id, is_email_taken, is_phone_taken, is_username_taken,
            update_user, UserChanges,
        },
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            SuccessResponse, UnauthorizedResponse,
        },
        user::{
            PasswordResetRequest, PasswordResetResponses, UserDeleteResponses,
            UserDetailResponses, UserListResponses, UserProfileResponse, UserStatusRequest,
            UserUpdateRequest, UserUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

#[OpenApi]
impl ApiUser {
    #[oai(path = "/admin/pending-users", method = "get", tag = "ApiUserTags::User")]
    async fn get_pending_user_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_pending_user_api",
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
                return UserListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_pending_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_pending_user(&mut tx).await {
            Ok(data) => UserListResponses::Ok(Json(
                data.into_iter().map(UserProfileResponse::from).collect(),
            )),
            Err(err) => UserListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "get_pending_user_api",
                    "get pending users",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/admin/users", method = "get", tag = "ApiUserTags::User")]
    async fn get_all_user_api(
        &self,
        Query(department_id): Query<Option<String>>,
        Query(designation_id): Query<Option<String>>,
        Query(status): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_all_user_api",
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
                return UserListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_all_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_user(
            &mut tx,
            clean_opt(department_id),
            clean_opt(designation_id),
            clean_opt(status),
        )
        .await
        {
            Ok(data) => UserListResponses::Ok(Json(
                data.into_iter().map(UserProfileResponse::from).collect(),
            )),
            Err(err) => UserListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "get_all_user_api",
                    "get all users",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/admin/users/:id", method = "get", tag = "ApiUserTags::User")]
    async fn get_detail_user_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
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
                return UserDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_detail_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_user_with_relations_by_id(&mut tx, &id).await {
            Ok(Some(val)) => UserDetailResponses::Ok(Json(val.into())),
            Ok(None) => UserDetailResponses::NotFound(Json(NotFoundResponse::new("User", &id))),
            Err(err) => UserDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "get_detail_user_api",
                    "get user",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/admin/users/:id", method = "put", tag = "ApiUserTags::User")]
    async fn update_user_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<UserUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
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
                return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        // Check if user exists
        let existing = match get_user_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let name = json.name.map(|x| x.trim().to_string());
        if name.as_deref() == Some("") {
            return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Name cannot be empty",
            )));
        }
        let email = clean_opt(json.email);
        let mobile = clean_opt(json.mobile);
        let username = clean_opt(json.username);
        let department_id = clean_opt(json.department_id);
        let designation_id = clean_opt(json.designation_id);
        let status = clean_opt(json.status);
        let role = clean_opt(json.role);

        if let Some(status) = status.as_deref() {
            if ![STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED].contains(&status) {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid status. Must be \"pending\", \"approved\" or \"rejected\"",
                )));
            }
        }
        if let Some(role) = role.as_deref() {
            if ![ROLE_USER, ROLE_ADMIN].contains(&role) {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid role. Must be \"user\" or \"admin\"",
                )));
            }
        }

        // Validate email uniqueness (if changed)
        if let Some(email) = email.as_deref().filter(|x| *x != existing.email) {
            if !is_valid_email(email) {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid email format",
                )));
            }
            match is_email_taken(&mut tx, email, Some(&id)).await {
                Ok(true) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Email already registered",
                    )))
                }
                Ok(false) => {}
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "check email",
                            &err.to_string(),
                        ),
                    ))
                }
            }
        }

        // Validate mobile uniqueness (if changed)
        if let Some(mobile) = mobile
            .as_deref()
            .filter(|x| Some(*x) != existing.phone.as_deref())
        {
            match is_phone_taken(&mut tx, mobile, Some(&id)).await {
                Ok(true) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Mobile number already registered",
                    )))
                }
                Ok(false) => {}
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "check mobile",
                            &err.to_string(),
                        ),
                    ))
                }
            }
        }

        // Validate username uniqueness (if changed)
        if let Some(username) = username.as_deref().filter(|x| *x != existing.username) {
            match is_username_taken(&mut tx, username, Some(&id)).await {
                Ok(true) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Username already taken",
                    )))
                }
                Ok(false) => {}
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "check username",
                            &err.to_string(),
                        ),
                    ))
                }
            }
        }

        // Validate department and designation if provided
        if let Some(department_id) = department_id.as_deref() {
            match get_department_by_id(&mut tx, department_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Invalid department",
                    )))
                }
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "get department",
                            &err.to_string(),
                        ),
                    ))
                }
            }
        }
        if let Some(designation_id) = designation_id.as_deref() {
            let designation = match get_designation_by_id(&mut tx, designation_id).await {
                Ok(Some(val)) => val.designation,
                Ok(None) => {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Invalid designation",
                    )))
                }
                Err(err) => {
                    return UserUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "update_user_api",
                            "get designation",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            if let Some(department_id) = department_id.as_deref() {
                if designation.department_id != department_id {
                    return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Designation does not belong to selected department",
                    )));
                }
            }
        }

        let changes = UserChanges {
            name,
            email,
            username,
            role,
            status,
            phone: mobile,
            address: json.address,
            department_id,
            designation_id,
            ..Default::default()
        };
        if let Err(err) = update_user(&mut tx, &id, changes, now()).await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "update user",
                    &err.to_string(),
                ),
            ));
        }
        let updated = match get_user_with_relations_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_api",
                        "get updated user",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserUpdateResponses::Ok(Json(updated.into()))
    }

    #[oai(path = "/admin/users/:id", method = "delete", tag = "ApiUserTags::User")]
    async fn delete_user_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
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
                return UserDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let existing = match get_user_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return UserDeleteResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if existing.is_admin() {
            return UserDeleteResponses::BadRequest(Json(BadRequestResponse::new(
                "Cannot delete admin users",
            )));
        }

        if let Err(err) = delete_user(&mut tx, &id).await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "delete user",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserDeleteResponses::NoContent
    }

    #[oai(
        path = "/admin/users/:id/status",
        method = "put",
        tag = "ApiUserTags::User"
    )]
    async fn update_user_status_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<UserStatusRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        let status = json.status.trim().to_string();
        if status != STATUS_APPROVED && status != STATUS_REJECTED {
            return UserUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid status. Must be \"approved\" or \"rejected\"",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_status_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let admin = match require_admin(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(val)) => val,
            Ok(Access::Unauthorized) => {
                return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return UserUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_status_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        match get_user_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_status_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let changes = UserChanges {
            status: Some(status.clone()),
            ..Default::default()
        };
        if let Err(err) = update_user(&mut tx, &id, changes, now()).await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_status_api",
                    "update status",
                    &err.to_string(),
                ),
            ));
        }
        let updated = match get_user_with_relations_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return UserUpdateResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "update_user_status_api",
                        "get updated user",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "update_user_status_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        tracing::info!(
            "user {} set to {} by {}",
            updated.user.username,
            status,
            admin.username
        );
        UserUpdateResponses::Ok(Json(updated.into()))
    }

    #[oai(
        path = "/admin/users/:id/password",
        method = "put",
        tag = "ApiUserTags::User"
    )]
    async fn reset_user_password_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<PasswordResetRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PasswordResetResponses {
        if json.password.chars().count() < MIN_PASSWORD_LENGTH {
            return PasswordResetResponses::BadRequest(Json(BadRequestResponse::new(
                "Password must be at least 6 characters",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PasswordResetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "reset_user_password_api",
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
                return PasswordResetResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return PasswordResetResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return PasswordResetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "reset_user_password_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_user_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return PasswordResetResponses::NotFound(Json(NotFoundResponse::new("User", &id)))
            }
            Err(err) => {
                return PasswordResetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "reset_user_password_api",
                        "get user",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let hashed_password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return PasswordResetResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "reset_user_password_api",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let changes = UserChanges {
            password: Some(hashed_password),
            ..Default::default()
        };
        if let Err(err) = update_user(&mut tx, &id, changes, now()).await {
            return PasswordResetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "reset_user_password_api",
                    "update password",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return PasswordResetResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "reset_user_password_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PasswordResetResponses::Ok(Json(SuccessResponse {
            success: true,
            message: "Password reset successfully".to_string(),
        }))
    }
}
