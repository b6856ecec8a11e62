use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    core::{
        permission::ROLE_ADMIN,
        test_utils::{generate_test_user, test_app_state, test_config},
    },
    factory::{department::DepartmentFactory, designation::DesignationFactory},
    init_openapi_route,
    model::{designation::Designation, user::STATUS_APPROVED},
};

#[sqlx::test]
async fn test_get_public_designations_by_department(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let department = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let other = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let mut factory = DesignationFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Designation {
        title: format!("Engineer {}", 3 - idx),
        ..data.clone()
    });
    factory
        .generate_many(&app_state.db, &department.id, 3, 0)
        .await?;
    DesignationFactory::new()
        .generate_many(&app_state.db, &other.id, 2, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When filtered
    let resp = cli
        .get("/api/designations")
        .query("department_id", &department.id)
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().array();
    data.assert_len(3);
    data.get(0).object().get("title").assert_string("Engineer 1");
    data.get(0)
        .object()
        .get("department_name")
        .assert_string(&department.name);

    // When unfiltered
    let resp = cli.get("/api/designations").send().await;

    // Expect
    resp.assert_status_is_ok();
    resp.json().await.value().array().assert_len(5);
    Ok(())
}

#[sqlx::test]
async fn test_create_designation(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let test_user = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let department = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .post("/api/admin/designations")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"department_id": department.id, "title": "Site Engineer"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value().object().get("title").assert_string("Site Engineer");
    json.value()
        .object()
        .get("department_name")
        .assert_string(&department.name);
    let id = json.value().object().get("id").string().to_string();
    assert!(id.starts_with("DESG-"));

    // When missing title
    let resp = cli
        .post("/api/admin/designations")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"department_id": department.id}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department ID and title are required"}))
        .await;

    // When unknown department
    let resp = cli
        .post("/api/admin/designations")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"department_id": "DEPT-missing", "title": "Site Engineer"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department not found"}))
        .await;
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM designations")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 1);
    Ok(())
}

#[sqlx::test]
async fn test_update_designation_partial(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let test_user = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let department = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let other = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let designation = DesignationFactory::new()
        .generate_one(&app_state.db, &department.id, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When only title
    let resp = cli
        .put(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"title": "Project Manager"}))
        .send()
        .await;

    // Expect department kept
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("title")
        .assert_string("Project Manager");
    json.value()
        .object()
        .get("department_id")
        .assert_string(&department.id);

    // When moving department
    let resp = cli
        .put(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"department_id": other.id}))
        .send()
        .await;

    // Expect title kept
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("title")
        .assert_string("Project Manager");
    json.value()
        .object()
        .get("department_name")
        .assert_string(&other.name);

    // When blank title
    let resp = cli
        .put(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"title": "  "}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Designation title cannot be empty"}))
        .await;

    // When unknown department
    let resp = cli
        .put(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"department_id": "DEPT-missing"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department not found"}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_delete_designation(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let test_user = generate_test_user(
        &mut db,
        &config,
        "admin",
        "password",
        ROLE_ADMIN,
        STATUS_APPROVED,
        None,
    )
    .await?;
    let department = DepartmentFactory::new()
        .generate_one(&app_state.db, ())
        .await?;
    let designation = DesignationFactory::new()
        .generate_one(&app_state.db, &department.id, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .delete(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NO_CONTENT);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM designations")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);

    // When detail of deleted
    let resp = cli
        .get(format!("/api/admin/designations/{}", designation.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
