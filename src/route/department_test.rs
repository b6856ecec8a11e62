use chrono::{DateTime, Duration};
use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    core::{
        permission::{ROLE_ADMIN, ROLE_USER},
        test_utils::{generate_test_user, test_app_state, test_config},
        utils::{datetime_to_string, now},
    },
    factory::{department::DepartmentFactory, designation::DesignationFactory},
    init_openapi_route,
    model::{department::Department, user::STATUS_APPROVED},
};

#[sqlx::test]
async fn test_get_public_departments(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut factory = DepartmentFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Department {
        name: format!("Department {}", 3 - idx),
        ..data.clone()
    });
    factory.generate_many(&app_state.db, 3, 0).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli.get("/api/departments").send().await;

    // Expect ordered by name
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let data = json.value().array();
    data.assert_len(3);
    data.get(0).object().get("name").assert_string("Department 1");
    data.get(2).object().get("name").assert_string("Department 3");
    Ok(())
}

#[sqlx::test]
async fn test_admin_department_requires_admin(pool: SqlitePool) -> anyhow::Result<()> {
    // Given
    let config = test_config();
    let app_state = test_app_state(pool, &config);
    let mut db = app_state.db.acquire().await?;
    let test_user = generate_test_user(
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
        .post("/api/admin/departments")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Sales"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);

    // When without token
    let resp = cli.get("/api/admin/departments").send().await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 0);
    Ok(())
}

#[sqlx::test]
async fn test_create_update_department(pool: SqlitePool) -> anyhow::Result<()> {
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
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When create
    let resp = cli
        .post("/api/admin/departments")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "  Sales  "}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let json = resp.json().await;
    json.value().object().get("name").assert_string("Sales");
    let id = json.value().object().get("id").string().to_string();
    assert!(id.starts_with("DEPT-"));

    // When duplicate
    let resp = cli
        .post("/api/admin/departments")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Sales"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department already exists"}))
        .await;

    // When blank name
    let resp = cli
        .post("/api/admin/departments")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "   "}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department name is required"}))
        .await;

    // When update a day-old row
    let backdated = now() - Duration::days(1);
    sqlx::query("UPDATE departments SET created_date = ?, updated_date = ? WHERE id = ?")
        .bind(backdated)
        .bind(backdated)
        .bind(&id)
        .execute(&app_state.db)
        .await?;
    let created_date = datetime_to_string(backdated);
    let resp = cli
        .put(format!("/api/admin/departments/{}", id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Sales & Marketing"}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let json = resp.json().await;
    json.value()
        .object()
        .get("name")
        .assert_string("Sales & Marketing");
    json.value()
        .object()
        .get("created_date")
        .assert_string(&created_date);
    let updated_date = json.value().object().get("updated_date").string().to_string();
    assert!(
        DateTime::parse_from_rfc3339(&updated_date)? > DateTime::parse_from_rfc3339(&created_date)?
    );

    // When get detail
    let resp = cli
        .get(format!("/api/admin/departments/{}", id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("name")
        .assert_string("Sales & Marketing");
    Ok(())
}

#[sqlx::test]
async fn test_update_department_name_conflict(pool: SqlitePool) -> anyhow::Result<()> {
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
    let mut factory = DepartmentFactory::<usize>::new();
    factory.modified_many(|data, idx, _| Department {
        name: format!("Department {}", idx),
        ..data.clone()
    });
    let departments = factory.generate_many(&app_state.db, 2, 0).await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .put(format!("/api/admin/departments/{}", departments[0].id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Department 1"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.assert_json(&json!({"message": "Department name already exists"}))
        .await;

    // When keep own name
    let resp = cli
        .put(format!("/api/admin/departments/{}", departments[0].id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Department 0"}))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();

    // When unknown id
    let resp = cli
        .put("/api/admin/departments/DEPT-missing")
        .header("authorization", format!("Bearer {}", test_user.token))
        .body_json(&json!({"name": "Anything"}))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    resp.assert_json(&json!({"message": "Department with id = DEPT-missing not found"}))
        .await;
    Ok(())
}

#[sqlx::test]
async fn test_delete_department_cascades_designations(pool: SqlitePool) -> anyhow::Result<()> {
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
    DesignationFactory::new()
        .generate_many(&app_state.db, &department.id, 3, ())
        .await?;
    DesignationFactory::new()
        .generate_many(&app_state.db, &other.id, 2, ())
        .await?;
    let app = init_openapi_route(app_state.clone(), &config);
    let cli = TestClient::new(app);

    // When
    let resp = cli
        .delete(format!("/api/admin/departments/{}", department.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NO_CONTENT);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 1);
    let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM designations")
        .fetch_one(&app_state.db)
        .await?;
    assert_eq!(num_data.0, 2);

    // When deleting again
    let resp = cli
        .delete(format!("/api/admin/departments/{}", department.id))
        .header("authorization", format!("Bearer {}", test_user.token))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
