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
        parse_document_status,
        request::{Request, RequestActivity},
        STATUS_DOCUMENT_PENDING,
    },
    repository::request::{
        create_request, create_request_activity, delete_request, get_all_request,
        get_request_activity, get_request_by_id, update_request, RequestChanges,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        request::{
            RequestCreateResponses, RequestDeleteResponses, RequestDetailResponse,
            RequestDetailResponses, RequestListResponses, RequestRequest, RequestResponse,
            RequestUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiRequestTags {
    Request,
}

fn validate_request_request(json: &RequestRequest) -> Result<Option<&'static str>, String> {
    if json.amount.is_some_and(|x| x < 0.0) {
        return Err("Amount cannot be negative".to_string());
    }
    match clean_opt(json.status.clone()) {
        Some(status) => match parse_document_status(&status) {
            Some(val) => Ok(Some(val)),
            None => Err(format!("Invalid status: {}", status)),
        },
        None => Ok(None),
    }
}

async fn log_request_activity(
    tx: &mut Transaction<'_, Sqlite>,
    request_id: &str,
    action: String,
    actor: &str,
) -> anyhow::Result<()> {
    let activity = RequestActivity {
        id: generate_id("RAL"),
        request_id: request_id.to_string(),
        action,
        actor: Some(actor.to_string()),
        created_date: now(),
    };
    create_request_activity(tx, &activity).await
}

async fn request_detail(
    tx: &mut Transaction<'_, Sqlite>,
    request: Request,
) -> anyhow::Result<RequestDetailResponse> {
    let activity = get_request_activity(tx, &request.id).await?;
    Ok(RequestDetailResponse {
        request: request.into(),
        activity: activity.into_iter().map(|x| x.into()).collect(),
    })
}

pub struct ApiRequest;

#[OpenApi]
impl ApiRequest {
    #[oai(path = "/requests", method = "get", tag = "ApiRequestTags::Request")]
    async fn get_all_request_api(
        &self,
        Query(status): Query<Option<String>>,
        Query(department): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RequestListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RequestListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "get_all_request_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_requests").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return RequestListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RequestListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RequestListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "get_all_request_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_request(&mut tx, clean_opt(status), clean_opt(department)).await {
            Ok(data) => RequestListResponses::Ok(Json(
                data.into_iter().map(RequestResponse::from).collect(),
            )),
            Err(err) => RequestListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "get_all_request_api",
                    "get all request",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/requests/:id", method = "get", tag = "ApiRequestTags::Request")]
    async fn get_detail_request_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RequestDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RequestDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "get_detail_request_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "view_requests").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return RequestDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RequestDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RequestDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "get_detail_request_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let request = match get_request_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RequestDetailResponses::NotFound(Json(NotFoundResponse::new(
                    "Request", &id,
                )))
            }
            Err(err) => {
                return RequestDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "get_detail_request_api",
                        "get request",
                        &err.to_string(),
                    ),
                ))
            }
        };
        match request_detail(&mut tx, request).await {
            Ok(val) => RequestDetailResponses::Ok(Json(val)),
            Err(err) => RequestDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "get_detail_request_api",
                    "get request activity",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/requests", method = "post", tag = "ApiRequestTags::Request")]
    async fn create_request_api(
        &self,
        Json(json): Json<RequestRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RequestCreateResponses {
        let status = match validate_request_request(&json) {
            Ok(val) => val.unwrap_or(STATUS_DOCUMENT_PENDING),
            Err(message) => {
                return RequestCreateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        let Some(request_type) = clean_opt(json.request_type) else {
            return RequestCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Request type is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RequestCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "create_request_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user =
            match require_permission(&mut tx, &state.config, auth.0.token, "create_request").await
            {
                Ok(Access::Granted(val)) => val,
                Ok(Access::Unauthorized) => {
                    return RequestCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Ok(Access::Forbidden) => {
                    return RequestCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
                }
                Err(err) => {
                    return RequestCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.request",
                            "create_request_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let now = now();
        let request = Request {
            id: generate_id("REQ"),
            request_type,
            requester: clean_opt(json.requester).or(Some(user.name.clone())),
            amount: json.amount.unwrap_or(0.0),
            status: status.to_string(),
            manager: clean_opt(json.manager),
            department: clean_opt(json.department),
            notes: clean_opt(json.notes),
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_request(&mut tx, &request).await {
            return RequestCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "create_request_api",
                    "create request",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) =
            log_request_activity(&mut tx, &request.id, "Request submitted".to_string(), &user.name)
                .await
        {
            return RequestCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "create_request_api",
                    "log request activity",
                    &err.to_string(),
                ),
            ));
        }
        let detail = match request_detail(&mut tx, request).await {
            Ok(val) => val,
            Err(err) => {
                return RequestCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "create_request_api",
                        "get request activity",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RequestCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "create_request_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RequestCreateResponses::Created(Json(detail))
    }

    #[oai(path = "/requests/:id", method = "put", tag = "ApiRequestTags::Request")]
    async fn update_request_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<RequestRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RequestUpdateResponses {
        let status = match validate_request_request(&json) {
            Ok(val) => val,
            Err(message) => {
                return RequestUpdateResponses::BadRequest(Json(BadRequestResponse::new(&message)))
            }
        };
        if json.request_type.is_some() && clean_opt(json.request_type.clone()).is_none() {
            return RequestUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Request type cannot be empty",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RequestUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "update_request_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let user =
            match require_permission(&mut tx, &state.config, auth.0.token, "edit_request").await {
                Ok(Access::Granted(val)) => val,
                Ok(Access::Unauthorized) => {
                    return RequestUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Ok(Access::Forbidden) => {
                    return RequestUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
                }
                Err(err) => {
                    return RequestUpdateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.request",
                            "update_request_api",
                            "get user from token",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        let existing = match get_request_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RequestUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Request", &id,
                )))
            }
            Err(err) => {
                return RequestUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "update_request_api",
                        "get request",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let changes = RequestChanges {
            request_type: clean_opt(json.request_type),
            requester: json.requester,
            amount: json.amount,
            status: status.map(|x| x.to_string()),
            manager: json.manager,
            department: json.department,
            notes: json.notes,
        };
        if let Err(err) = update_request(&mut tx, &id, changes, now()).await {
            return RequestUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "update_request_api",
                    "update request",
                    &err.to_string(),
                ),
            ));
        }
        if let Some(status) = status.filter(|x| *x != existing.status) {
            if let Err(err) = log_request_activity(
                &mut tx,
                &id,
                format!("Status changed to {}", status),
                &user.name,
            )
            .await
            {
                return RequestUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "update_request_api",
                        "log request activity",
                        &err.to_string(),
                    ),
                ));
            }
        }
        let request = match get_request_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return RequestUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Request", &id,
                )))
            }
            Err(err) => {
                return RequestUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "update_request_api",
                        "get updated request",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let detail = match request_detail(&mut tx, request).await {
            Ok(val) => val,
            Err(err) => {
                return RequestUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "update_request_api",
                        "get request activity",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RequestUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "update_request_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RequestUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/requests/:id", method = "delete", tag = "ApiRequestTags::Request")]
    async fn delete_request_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> RequestDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RequestDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "delete_request_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        match require_permission(&mut tx, &state.config, auth.0.token, "delete_request").await {
            Ok(Access::Granted(_)) => {}
            Ok(Access::Unauthorized) => {
                return RequestDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return RequestDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return RequestDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "delete_request_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_request_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return RequestDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Request", &id,
                )))
            }
            Err(err) => {
                return RequestDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.request",
                        "delete_request_api",
                        "get request",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_request(&mut tx, &id).await {
            return RequestDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "delete_request_api",
                    "delete request",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return RequestDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.request",
                    "delete_request_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        RequestDeleteResponses::NoContent
    }
}
