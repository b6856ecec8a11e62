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
    model::designation::{Designation, DesignationWithDepartment},
    repository::{
        department::get_department_by_id,
        designation::{
            create_designation, delete_designation, get_all_designation, get_designation_by_id,
            update_designation,
        },
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        designation::{
            DesignationCreateResponses, DesignationDeleteResponses, DesignationDetailResponses,
            DesignationListResponses, DesignationRequest, DesignationResponse,
            DesignationUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiDesignationTags {
    Designation,
}

pub struct ApiDesignation;

#[OpenApi]
impl ApiDesignation {
    /// Public list used by the signup form, optionally narrowed to one department.
    #[oai(
        path = "/designations",
        method = "get",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn get_public_designation_api(
        &self,
        Query(department_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> DesignationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "get_public_designation_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_all_designation(&mut tx, clean_opt(department_id)).await {
            Ok(data) => DesignationListResponses::Ok(Json(
                data.into_iter().map(DesignationResponse::from).collect(),
            )),
            Err(err) => DesignationListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "get_public_designation_api",
                    "get all designation",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/designations",
        method = "get",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn get_all_designation_api(
        &self,
        Query(department_id): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DesignationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "get_all_designation_api",
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
                return DesignationListResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DesignationListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DesignationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "get_all_designation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_designation(&mut tx, clean_opt(department_id)).await {
            Ok(data) => DesignationListResponses::Ok(Json(
                data.into_iter().map(DesignationResponse::from).collect(),
            )),
            Err(err) => DesignationListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "get_all_designation_api",
                    "get all designation",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/designations/:id",
        method = "get",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn get_detail_designation_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DesignationDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "get_detail_designation_api",
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
                return DesignationDetailResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DesignationDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DesignationDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "get_detail_designation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_designation_by_id(&mut tx, &id).await {
            Ok(Some(val)) => DesignationDetailResponses::Ok(Json(val.into())),
            Ok(None) => DesignationDetailResponses::NotFound(Json(NotFoundResponse::new(
                "Designation",
                &id,
            ))),
            Err(err) => DesignationDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "get_detail_designation_api",
                    "get designation",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/designations",
        method = "post",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn create_designation_api(
        &self,
        Json(json): Json<DesignationRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DesignationCreateResponses {
        let (Some(department_id), Some(title)) =
            (clean_opt(json.department_id), clean_opt(json.title))
        else {
            return DesignationCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Department ID and title are required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "create_designation_api",
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
                return DesignationCreateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DesignationCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DesignationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "create_designation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let department = match get_department_by_id(&mut tx, &department_id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return DesignationCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Department not found",
                )))
            }
            Err(err) => {
                return DesignationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "create_designation_api",
                        "get department",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let now = now();
        let designation = Designation {
            id: generate_id("DESG"),
            department_id,
            title,
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_designation(&mut tx, &designation).await {
            return DesignationCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "create_designation_api",
                    "create designation",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DesignationCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "create_designation_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DesignationCreateResponses::Created(Json(
            DesignationWithDepartment {
                designation,
                department_name: Some(department.name),
            }
            .into(),
        ))
    }

    #[oai(
        path = "/admin/designations/:id",
        method = "put",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn update_designation_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<DesignationRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DesignationUpdateResponses {
        if json.title.is_some() && clean_opt(json.title.clone()).is_none() {
            return DesignationUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Designation title cannot be empty",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "update_designation_api",
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
                return DesignationUpdateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DesignationUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DesignationUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "update_designation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let existing = match get_designation_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return DesignationUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Designation",
                    &id,
                )))
            }
            Err(err) => {
                return DesignationUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "update_designation_api",
                        "get designation",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let mut designation = existing.designation;

        let department_id =
            clean_opt(json.department_id).unwrap_or(designation.department_id.clone());
        let department = match get_department_by_id(&mut tx, &department_id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return DesignationUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Department not found",
                )))
            }
            Err(err) => {
                return DesignationUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "update_designation_api",
                        "get department",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let title = clean_opt(json.title).unwrap_or(designation.title.clone());

        if let Err(err) =
            update_designation(&mut tx, &mut designation, department_id, title, now()).await
        {
            return DesignationUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "update_designation_api",
                    "update designation",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DesignationUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "update_designation_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DesignationUpdateResponses::Ok(Json(
            DesignationWithDepartment {
                designation,
                department_name: Some(department.name),
            }
            .into(),
        ))
    }

    #[oai(
        path = "/admin/designations/:id",
        method = "delete",
        tag = "ApiDesignationTags::Designation"
    )]
    async fn delete_designation_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DesignationDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DesignationDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "delete_designation_api",
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
                return DesignationDeleteResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DesignationDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DesignationDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "delete_designation_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_designation_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return DesignationDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Designation",
                    &id,
                )))
            }
            Err(err) => {
                return DesignationDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.designation",
                        "delete_designation_api",
                        "get designation",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_designation(&mut tx, &id).await {
            return DesignationDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "delete_designation_api",
                    "delete designation",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DesignationDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.designation",
                    "delete_designation_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DesignationDeleteResponses::NoContent
    }
}
