use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};

use crate::{
    core::{
        security::{require_admin, Access, BearerAuthorization},
        utils::{clean_opt, generate_id, now},
    },
    model::department::Department,
    repository::department::{
        create_department, delete_department, get_all_department, get_department_by_id,
        get_department_by_name, update_department,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        department::{
            DepartmentCreateResponses, DepartmentDeleteResponses, DepartmentDetailResponses,
            DepartmentListResponses, DepartmentRequest, DepartmentResponse,
            DepartmentUpdateResponses,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiDepartmentTags {
    Department,
}

pub struct ApiDepartment;

#[OpenApi]
impl ApiDepartment {
    /// Public list used by the signup form.
    #[oai(path = "/departments", method = "get", tag = "ApiDepartmentTags::Department")]
    async fn get_public_department_api(
        &self,
        state: Data<&Arc<AppState>>,
    ) -> DepartmentListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "get_public_department_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        match get_all_department(&mut tx).await {
            Ok(data) => DepartmentListResponses::Ok(Json(
                data.into_iter().map(DepartmentResponse::from).collect(),
            )),
            Err(err) => DepartmentListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "get_public_department_api",
                    "get all department",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/departments",
        method = "get",
        tag = "ApiDepartmentTags::Department"
    )]
    async fn get_all_department_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DepartmentListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "get_all_department_api",
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
                return DepartmentListResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Ok(Access::Forbidden) => {
                return DepartmentListResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DepartmentListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "get_all_department_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_all_department(&mut tx).await {
            Ok(data) => DepartmentListResponses::Ok(Json(
                data.into_iter().map(DepartmentResponse::from).collect(),
            )),
            Err(err) => DepartmentListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "get_all_department_api",
                    "get all department",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/departments/:id",
        method = "get",
        tag = "ApiDepartmentTags::Department"
    )]
    async fn get_detail_department_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DepartmentDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "get_detail_department_api",
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
                return DepartmentDetailResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DepartmentDetailResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DepartmentDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "get_detail_department_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_department_by_id(&mut tx, &id).await {
            Ok(Some(val)) => DepartmentDetailResponses::Ok(Json(val.into())),
            Ok(None) => DepartmentDetailResponses::NotFound(Json(NotFoundResponse::new(
                "Department",
                &id,
            ))),
            Err(err) => DepartmentDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "get_detail_department_api",
                    "get department",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/admin/departments",
        method = "post",
        tag = "ApiDepartmentTags::Department"
    )]
    async fn create_department_api(
        &self,
        Json(json): Json<DepartmentRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DepartmentCreateResponses {
        let Some(name) = clean_opt(json.name) else {
            return DepartmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                "Department name is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "create_department_api",
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
                return DepartmentCreateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DepartmentCreateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DepartmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "create_department_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_department_by_name(&mut tx, &name, None).await {
            Ok(Some(_)) => {
                return DepartmentCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Department already exists",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return DepartmentCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "create_department_api",
                        "check department name",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let now = now();
        let department = Department {
            id: generate_id("DEPT"),
            name,
            created_date: now,
            updated_date: now,
        };
        if let Err(err) = create_department(&mut tx, &department).await {
            return DepartmentCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "create_department_api",
                    "create department",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DepartmentCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "create_department_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DepartmentCreateResponses::Created(Json(department.into()))
    }

    #[oai(
        path = "/admin/departments/:id",
        method = "put",
        tag = "ApiDepartmentTags::Department"
    )]
    async fn update_department_api(
        &self,
        Path(id): Path<String>,
        Json(json): Json<DepartmentRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DepartmentUpdateResponses {
        let Some(name) = clean_opt(json.name) else {
            return DepartmentUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                "Department name is required",
            )));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "update_department_api",
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
                return DepartmentUpdateResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DepartmentUpdateResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DepartmentUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "update_department_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let mut department = match get_department_by_id(&mut tx, &id).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return DepartmentUpdateResponses::NotFound(Json(NotFoundResponse::new(
                    "Department",
                    &id,
                )))
            }
            Err(err) => {
                return DepartmentUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "update_department_api",
                        "get department",
                        &err.to_string(),
                    ),
                ))
            }
        };

        match get_department_by_name(&mut tx, &name, Some(&id)).await {
            Ok(Some(_)) => {
                return DepartmentUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    "Department name already exists",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return DepartmentUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "update_department_api",
                        "check department name",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = update_department(&mut tx, &mut department, name, now()).await {
            return DepartmentUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "update_department_api",
                    "update department",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DepartmentUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "update_department_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DepartmentUpdateResponses::Ok(Json(department.into()))
    }

    #[oai(
        path = "/admin/departments/:id",
        method = "delete",
        tag = "ApiDepartmentTags::Department"
    )]
    async fn delete_department_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DepartmentDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return DepartmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "delete_department_api",
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
                return DepartmentDeleteResponses::Unauthorized(Json(
                    UnauthorizedResponse::default(),
                ))
            }
            Ok(Access::Forbidden) => {
                return DepartmentDeleteResponses::Forbidden(Json(ForbiddenResponse::default()))
            }
            Err(err) => {
                return DepartmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "delete_department_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        }

        match get_department_by_id(&mut tx, &id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return DepartmentDeleteResponses::NotFound(Json(NotFoundResponse::new(
                    "Department",
                    &id,
                )))
            }
            Err(err) => {
                return DepartmentDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.department",
                        "delete_department_api",
                        "get department",
                        &err.to_string(),
                    ),
                ))
            }
        }

        if let Err(err) = delete_department(&mut tx, &id).await {
            return DepartmentDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "delete_department_api",
                    "delete department",
                    &err.to_string(),
                ),
            ));
        }

        // Commit db transaction
        if let Err(err) = tx.commit().await {
            return DepartmentDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.department",
                    "delete_department_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        DepartmentDeleteResponses::NoContent
    }
}
