use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        permission::ROLE_USER,
        security::{
            generate_token_from_user, hash_password, resolve_token, verify_hash_password,
            BearerAuthorization, TokenUser,
        },
        utils::{clean_opt, datetime_to_string, generate_id, is_valid_email, now},
    },
    model::user::{User, STATUS_PENDING},
    repository::{
        department::get_department_by_id,
        designation::get_designation_by_id,
        user::{
            create_user, get_user_by_username, get_user_with_relations_by_id, is_email_taken,
            is_phone_taken, is_username_taken,
        },
    },
    schema::{
        auth::{
            LoginRequest, LoginResponse, LoginResponses, SignupRequest, SignupResponse,
            SignupResponses, VerifyResponse, VerifyResponses,
        },
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
    },
    AppState,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/signup", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_signup(
        &self,
        Json(json): Json<SignupRequest>,
        state: Data<&Arc<AppState>>,
    ) -> SignupResponses {
        let (
            Some(name),
            Some(email),
            Some(username),
            Some(password),
            Some(department_id),
            Some(designation_id),
            Some(mobile),
            Some(address),
        ) = (
            clean_opt(json.name),
            clean_opt(json.email),
            clean_opt(json.username),
            json.password.filter(|x| !x.is_empty()),
            clean_opt(json.department_id),
            clean_opt(json.designation_id),
            clean_opt(json.mobile),
            clean_opt(json.address),
        )
        else {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "All fields are required",
            )));
        };
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "Password must be at least 6 characters",
            )));
        }
        if !is_valid_email(&email) {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid email format",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Uniqueness: email, then mobile, then username
        match is_email_taken(&mut tx, &email, None).await {
            Ok(true) => {
                return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                    "Email already registered",
                )))
            }
            Ok(false) => {}
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "check email",
                        &err.to_string(),
                    ),
                ))
            }
        }
        match is_phone_taken(&mut tx, &mobile, None).await {
            Ok(true) => {
                return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                    "Mobile number already registered",
                )))
            }
            Ok(false) => {}
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "check mobile",
                        &err.to_string(),
                    ),
                ))
            }
        }
        match is_username_taken(&mut tx, &username, None).await {
            Ok(true) => {
                return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                    "Username already taken",
                )))
            }
            Ok(false) => {}
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "check username",
                        &err.to_string(),
                    ),
                ))
            }
        }

        // Department must exist and own the designation
        let department = match get_department_by_id(&mut tx, &department_id).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "get department",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if department.is_none() {
            return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid department selected",
            )));
        }
        let designation = match get_designation_by_id(&mut tx, &designation_id).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "get designation",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match designation {
            Some(val) if val.designation.department_id == department_id => {}
            _ => {
                return SignupResponses::BadRequest(Json(BadRequestResponse::new(
                    "Invalid designation selected for this department",
                )))
            }
        }

        let hashed_password = match hash_password(&password) {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_signup",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let now = now();
        let user = User {
            id: generate_id("USER"),
            name,
            email,
            username,
            password: hashed_password,
            role: ROLE_USER.to_string(),
            status: STATUS_PENDING.to_string(),
            permissions: None,
            profile_picture: None,
            bio: None,
            phone: Some(mobile),
            address: Some(address),
            city: None,
            country: None,
            department_id: Some(department_id),
            designation_id: Some(designation_id),
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_user(&mut tx, &user).await {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_signup",
                "create user",
                &err.to_string(),
            )));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_signup",
                "commit transaction",
                &err.to_string(),
            )));
        }

        tracing::info!("new signup pending approval: username={}", user.username);
        SignupResponses::Created(Json(SignupResponse {
            success: true,
            message: "Account created successfully. Please wait for admin approval.".to_string(),
            user_id: user.id,
        }))
    }

    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        Json(json): Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        let (Some(username), Some(password)) = (
            clean_opt(json.username),
            json.password.filter(|x| !x.is_empty()),
        ) else {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new(
                "Username and password are required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get username on db
        let user = match get_user_by_username(&mut tx, &username).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "check user on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let Some(user) = user else {
            return LoginResponses::Unauthorized(Json(UnauthorizedResponse {
                message: "Invalid credentials".to_string(),
            }));
        };

        // validate user password
        let is_valid = match verify_hash_password(&password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            return LoginResponses::Unauthorized(Json(UnauthorizedResponse {
                message: "Invalid credentials".to_string(),
            }));
        }
        if !user.is_approved() {
            return LoginResponses::Forbidden(Json(ForbiddenResponse {
                message: "Account pending approval. Please wait for admin approval.".to_string(),
            }));
        }

        let (token, exp) = match generate_token_from_user(&user, &state.config) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "generate token",
                    &err.to_string(),
                )))
            }
        };

        let profile = match get_user_with_relations_by_id(&mut tx, &user.id).await {
            Ok(Some(val)) => val.into(),
            Ok(None) => user.into(),
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get user profile",
                    &err.to_string(),
                )))
            }
        };

        LoginResponses::Ok(Json(LoginResponse {
            success: true,
            token,
            token_type: "Bearer".to_string(),
            exp: datetime_to_string(exp),
            exp_in: state.config.jwt_exp as i64 * 60,
            user: profile,
        }))
    }

    #[oai(path = "/auth/verify", method = "get", tag = "ApiAuthTags::Auth")]
    async fn auth_verify(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> VerifyResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token against the live row
        let user = match resolve_token(&mut tx, &state.config.jwt_secret, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "resolve token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let user = match user {
            TokenUser::Approved(val) => val,
            TokenUser::Missing => {
                return VerifyResponses::NotFound(Json(NotFoundResponse {
                    message: "User not found".to_string(),
                }))
            }
            TokenUser::Invalid | TokenUser::NotApproved(_) => {
                return VerifyResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
        };

        let profile = match get_user_with_relations_by_id(&mut tx, &user.id).await {
            Ok(Some(val)) => val.into(),
            Ok(None) => user.into(),
            Err(err) => {
                return VerifyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_verify",
                        "get user profile",
                        &err.to_string(),
                    ),
                ))
            }
        };

        VerifyResponses::Ok(Json(VerifyResponse {
            success: true,
            user: profile,
        }))
    }
}
