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
async fn test_get_permission_catalog(pool: SqlitePool) -> anyhow::Result<()> {
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
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When modules
    let resp = cli
        .get("/api/admin/permissions/modules")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().array();
    data.assert_len(3);
    data.get(0).object().get("name").assert_string("Dashboard");
    let sales = data.get(1).object();
    sales.get("name").assert_string("Sales");
    let products = sales.get("features").array().get(0).object();
    products.get("name").assert_string("Products");
    products.get("permissions").assert_string_array(&[
        "view_product",
        "create_product",
        "edit_product",
        "delete_product",
    ]);

    // When features of one module, any casing
    let resp = cli
        .get("/api/admin/permissions/features")
        .query("module", &"sAlEs")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().array();
    data.assert_len(4);
    data.get(3).object().get("name").assert_string("Requests");
    data.get(3).object().get("module").assert_string("Sales");

    // When every feature
    let resp = cli
        .get("/api/admin/permissions/features")
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(9);
    Ok(())
}

#[sqlx::test]
async fn test_catalog_requires_admin(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
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
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .get("/api/admin/permissions/modules")
        .header("authorization", format!("Bearer {}", staff.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[sqlx::test]
async fn test_set_user_permissions(pool: SqlitePool) -> anyhow::Result<()> {
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
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When set
    let resp = cli
        .put(format!("/api/admin/permissions/user/{}", staff.user.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": ["view_product", "view_boq"]}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("role").assert_string(ROLE_USER);
    json.value()
        .object()
        .get("permissions")
        .assert_string_array(&["view_product", "view_boq"]);

    // When read back
    let resp = cli
        .get(format!("/api/admin/permissions/user/{}", staff.user.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("permissions")
        .assert_string_array(&["view_product", "view_boq"]);

    // When the user reaches a capability outside the list
    let resp = cli
        .get("/api/offers")
        .header("authorization", format!("Bearer {}", staff.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);

    // When cleared
    let resp = cli
        .put(format!("/api/admin/permissions/user/{}", staff.user.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": []}))
        .send()
        .await;

    // Expect stored as NULL
    resp.assert_status_is_ok();
    let res: (Option<String>,) = sqlx::query_as("SELECT permissions FROM users WHERE id = ?")
        .bind(&staff.user.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, None);

    // When unknown capability
    let resp = cli
        .put(format!("/api/admin/permissions/user/{}", staff.user.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": ["view_product", "fly"]}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Unknown permission: fly"}))
        .await;

    // When unknown user
    let resp = cli
        .put("/api/admin/permissions/user/USER-missing")
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": ["view_product"]}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_set_role_permissions(pool: SqlitePool) -> anyhow::Result<()> {
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
    let mut factory = RoleFactory::<&'static str>::new();
    factory.modified_one(|data, ext| Role {
        name: ext.to_string(),
        permissions: Json(vec!["view_requests".to_string()]),
        ..data.clone()
    });
    let role = factory.generate_one(&app_state.db, "Requester").await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put(format!("/api/admin/permissions/role/{}", role.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .body_json(&json!({"permissions": ["view_requests", "create_request"]}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let res: (String, String) = sqlx::query_as("SELECT name, permissions FROM user_roles WHERE id = ?")
        .bind(&role.id)
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(res.0, "Requester".to_string());
    assert_eq!(res.1, r#"["view_requests","create_request"]"#.to_string());

    // When read back
    let resp = cli
        .get(format!("/api/admin/permissions/role/{}", role.id))
        .header("authorization", format!("Bearer {}", admin.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value().object().get("name").assert_string("Requester");
    json.value()
        .object()
        .get("permissions")
        .assert_string_array(&["view_requests", "create_request"]);
    Ok(())
}
