use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::{types::Json, SqlitePool};

use crate::{
    core::{
        permission::{ROLE_ADMIN, ROLE_USER},
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    factory::role::RoleFactory,
    init_openapi_route,
    model::{role::Role, user::STATUS_APPROVED},
};

#[sqlx::test]
async fn test_assign_roles_snapshots_permissions(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let admin = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let staff = generate_test_user(
        &mut db,
        &config,
        "staff",
        "password",
        ROLE_USER,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let mut factory = RoleFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Role {
        permissions: Json(match idx {
            0 => vec!["view_boq".to_string()],
            _ => vec!["view_boq".to_string(), "view_product".to_string()],
        }),
        ..data.clone()
    });
    let roles = factory.generate_many(&app_state.db, 2, 0).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When first role
    let resp = cli
        .post("/api/admin/user-role-assignments")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"user_id": staff.user.id, "role_id": roles[0].id}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value()
        .object()
        .get("user_permissions")
        .assert_string_array(&["view_boq"]);
    let assignment = json.value().object().get("assignment").object();
    assignment.get("role_name").assert_string(&roles[0].name);
    assignment.get("user_name").assert_string("staff name");
    let first_assignment_id = assignment.get("id").string().to_string();

    // When second role
    let resp = cli
        .post("/api/admin/user-role-assignments")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"user_id": staff.user.id, "role_id": roles[1].id}))
        .send()
        .await;

    // Expect union in catalog order
    resp.assert_status(StatusCode::CREATED);
    resp.json()
        .await
        .value()
        .object()
        .get("user_permissions")
        .assert_string_array(&["view_product", "view_boq"]);
    let res: (Option<String>,) = sqlx::query_as("SELECT permissions FROM users WHERE id = ?")
        .bind(&staff.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, Some(r#"["view_product","view_boq"]"#.to_string()));

    // When listing the user's assignments
    let resp = cli
        .get("/api/admin/user-role-assignments")
        .query("user_id", &staff.user.id)
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(2);

    // When detail
    let resp = cli
        .get(format!(
            "/api/admin/user-role-assignments/{}",
            first_assignment_id
        ))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("role_id")
        .assert_string(&roles[0].id);
    Ok(())
}

#[sqlx::test]
async fn test_assign_role_validation(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let admin = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let staff = generate_test_user(
        &mut db,
        &config,
        "staff",
        "password",
        ROLE_USER,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let role = RoleFactory::new().generate_one(&app_state.db, ()).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/admin/user-role-assignments")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"user_id": staff.user.id, "role_id": role.id}))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let cases = [
        (
            json!({"user_id": staff.user.id, "role_id": role.id}),
            "Role already assigned to this user",
        ),
        (
            json!({"user_id": "USER-missing", "role_id": role.id}),
            "User not found",
        ),
        (
            json!({"user_id": staff.user.id, "role_id": "ROLE-missing"}),
            "Role not found",
        ),
        (
            json!({"user_id": staff.user.id}),
            "User ID and Role ID are required",
        ),
    ];
    for (payload, message) in cases {
        // When
        let resp = cli
            .post("/api/admin/user-role-assignments")
            .header("authorization", format!("Bearer {}", admin.token))
            .body_json(&payload)
            .send()
            .await;

        // Expect
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_json(&json!({ "message": message })).await;
    }
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_role_assignments")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 1);
    Ok(())
}

#[sqlx::test]
async fn test_unassign_role_recomputes_permissions(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let admin = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let staff = generate_test_user(
        &mut db,
        &config,
        "staff",
        "password",
        ROLE_USER,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let mut factory = RoleFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Role {
        permissions: Json(match idx {
            0 => vec!["view_offers".to_string(), "create_offer".to_string()],
            _ => vec!["view_requests".to_string()],
        }),
        ..data.clone()
    });
    let roles = factory.generate_many(&app_state.db, 2, 0).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let mut assignment_ids: Vec<String> = vec![];
    for role in roles.iter() {
        let resp = cli
            .post("/api/admin/user-role-assignments")
            .header("authorization", format!("Bearer {}", admin.token))
            .body_json(&json!({"user_id": staff.user.id, "role_id": role.id}))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
        let json = resp.json().await;
        assignment_ids.push(
            json.value()
                .object()
                .get("assignment")
                .object()
                .get("id")
                .string()
                .to_string(),
        );
    }

    // When removing the offers role
    let resp = cli
        .delete(format!(
            "/api/admin/user-role-assignments/{}",
            assignment_ids[0]
        ))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect only the remaining role's capabilities
    resp.assert_status(StatusCode::NO_CONTENT);
    let res: (Option<String>,) = sqlx::query_as("SELECT permissions FROM users WHERE id = ?")
        .bind(&staff.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, Some(r#"["view_requests"]"#.to_string()));
    let resp = cli
        .get("/api/offers")
        .header("authorization", format!("Bearer {}", staff.token))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    // When removing the last role
    let resp = cli
        .delete(format!(
            "/api/admin/user-role-assignments/{}",
            assignment_ids[1]
        ))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect snapshot cleared
    resp.assert_status(StatusCode::NO_CONTENT);
    let res: (Option<String>,) = sqlx::query_as("SELECT permissions FROM users WHERE id = ?")
        .bind(&staff.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, None);

    // When removing an unknown assignment
    let resp = cli
        .delete("/api/admin/user-role-assignments/URA-missing")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_role_edit_does_not_reach_assigned_user(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let admin = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let staff = generate_test_user(
        &mut db,
        &config,
        "karim",
        "password",
        ROLE_USER,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let mut factory = RoleFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Role {
        permissions: Json(match idx {
            0 => vec!["view_product".to_string()],
            _ => vec!["view_boq".to_string()],
        }),
        ..data.clone()
    });
    let roles = factory.generate_many(&app_state.db, 2, 0).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);
    let resp = cli
        .post("/api/admin/user-role-assignments")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"user_id": staff.user.id, "role_id": roles[0].id}))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let resp = cli
        .put(format!("/api/admin/user-roles/{}", roles[0].id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": ["delete_product"]}))
        .send()
        .await;
    resp.assert_status_is_ok();

    // When another role is assigned after the edit
    let resp = cli
        .post("/api/admin/user-role-assignments")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"user_id": staff.user.id, "role_id": roles[1].id}))
        .send()
        .await;

    // Expect the first role's original list, not its edit
    resp.assert_status(StatusCode::CREATED);
    resp.json()
        .await
        .value()
        .object()
        .get("user_permissions")
        .assert_string_array(&["view_product", "view_boq"]);
    let res: (Option<String>,) = sqlx::query_as("SELECT permissions FROM users WHERE id = ?")
        .bind(&staff.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, Some(r#"["view_product","view_boq"]"#.to_string()));

    // When listing the user's assignments
    let resp = cli
        .get("/api/admin/user-role-assignments")
        .query("user_id", &staff.user.id)
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect each assignment keeps the list it was granted
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().array();
    data.assert_len(2);
    for idx in 0..2 {
        let item = data.get(idx).object();
        if item.get("role_id").string() == roles[0].id {
            item.get("permissions").assert_string_array(&["view_product"]);
        } else {
            item.get("permissions").assert_string_array(&["view_boq"]);
        }
    }
    Ok(())
}
