use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use super::auth::MIN_PASSWORD_LENGTH;
use crate::{
    core::{
        security::{hash_password, require_user, verify_hash_password, Access, BearerAuthorization},
        utils::{clean_opt, now},
    },
    repository::user::{get_user_with_relations_by_id, is_phone_taken, update_user, UserChanges},
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, SuccessResponse,
            UnauthorizedResponse,
        },
        user::{
            PasswordChangeRequest, PasswordChangeResponses, ProfileResponses,
            ProfileUpdateRequest, ProfileUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

#[OpenApi]
impl ApiProfile {
    #[oai(path = "/user/profile", method = "get", tag = "ApiProfileTags::Profile")]
    async fn get_profile_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_user(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(val)) => val,
            Ok(_) => return ProfileResponses::Unauthorized(Json(UnauthorizedResponse::default())),
            Err(err) => {
                return ProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "get_profile_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        match get_user_with_relations_by_id(&mut tx, &user.id).await {
            Ok(Some(val)) => ProfileResponses::Ok(Json(val.into())),
            Ok(None) => ProfileResponses::NotFound(Json(NotFoundResponse::new("User", &user.id))),
            Err(err) => ProfileResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "get_profile_api",
                    "get user profile",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/user/profile", method = "put", tag = "ApiProfileTags::Profile")]
    async fn update_profile_api(
        &self,
        Json(json): Json<ProfileUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProfileUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_user(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(val)) => val,
            Ok(_) => {
                return ProfileUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        if json.name.is_some() && clean_opt(json.name.clone()).is_none() {
            return ProfileUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Name cannot be empty",
            )));
        }
        let phone = json.phone.map(|x| x.trim().to_string());
        if let Some(phone) = phone.as_deref().filter(|x| !x.is_empty()) {
            match is_phone_taken(&mut tx, phone, Some(&user.id)).await {
                Ok(true) => {
                    return ProfileUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                        "Mobile number already registered",
                    )))
                }
                Ok(false) => {}
                Err(err) => {
                    return ProfileUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.profile",
                            "update_profile_api",
                            "check phone",
                            &err.to_string(),
                        ),
                    ))
                }
            }
        }

        let changes = UserChanges {
            name: clean_opt(json.name),
            bio: json.bio,
            phone,
            address: json.address,
            city: json.city,
            country: json.country,
            profile_picture: json.profile_picture,
            ..Default::default()
        };
        if let Err(err) = update_user(&mut tx, &user.id, changes, now()).await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "update_profile_api",
                    "update user",
                    &err.to_string(),
                ),
            ));
        }
        let profile = match get_user_with_relations_by_id(&mut tx, &user.id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return ProfileUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "User", &user.id,
                )))
            }
            Err(err) => {
                return ProfileUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "update_profile_api",
                        "get user profile",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return ProfileUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "update_profile_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        ProfileUpdateResponses::Ok(Json(profile.into()))
    }

    #[oai(path = "/user/password", method = "put", tag = "ApiProfileTags::Profile")]
    async fn change_password_api(
        &self,
        Json(json): Json<PasswordChangeRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PasswordChangeResponses {
        let (Some(current_password), Some(new_password), Some(confirm_password)) = (
            json.current_password.filter(|x| !x.is_empty()),
            json.new_password.filter(|x| !x.is_empty()),
            json.confirm_password.filter(|x| !x.is_empty()),
        ) else {
            return PasswordChangeResponses::BadRequest(Json(BadRequestResponse::new(
                "All password fields are required",
            )));
        };
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return PasswordChangeResponses::BadRequest(Json(BadRequestResponse::new(
                "New password must be at least 6 characters",
            )));
        }
        if new_password != confirm_password {
            return PasswordChangeResponses::BadRequest(Json(BadRequestResponse::new(
                "New password and confirmation do not match",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PasswordChangeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "change_password_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user = match require_user(&mut tx, &state.config, auth.0.token).await {
            Ok(Access::Granted(val)) => val,
            Ok(_) => {
                return PasswordChangeResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(err) => {
                return PasswordChangeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "change_password_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let is_valid = match verify_hash_password(&current_password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return PasswordChangeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "change_password_api",
                        "verify current password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if !is_valid {
            return PasswordChangeResponses::Unauthorized(Json(UnauthorizedResponse {
                message: "Current password is incorrect".to_string(),
            }));
        }

        let hashed_password = match hash_password(&new_password) {
            Ok(val) => val,
            Err(err) => {
                return PasswordChangeResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "change_password_api",
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
        if let Err(err) = update_user(&mut tx, &user.id, changes, now()).await {
            return PasswordChangeResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "change_password_api",
                    "update password",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return PasswordChangeResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.profile",
                    "change_password_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        PasswordChangeResponses::Ok(Json(SuccessResponse {
            success: true,
            message: "Password updated successfully".to_string(),
        }))
    }
}
