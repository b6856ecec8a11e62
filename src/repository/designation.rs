use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::designation::{Designation, DesignationWithDepartment, TABLE_NAME},
};

const SELECT_WITH_DEPARTMENT: &str = "d.*, dept.name AS department_name";
const FROM_WITH_DEPARTMENT: &str =
    "designations d LEFT JOIN departments dept ON d.department_id = dept.id";

/// Designations ordered by department name then title.
pub async fn get_all_designation(
    tx: &mut Transaction<'_, Sqlite>,
    department_id: Option<String>,
) -> anyhow::Result<Vec<DesignationWithDepartment>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];
    if let Some(department_id) = department_id {
        binds.push(SqlxBinds::String(department_id));
        filters.push("d.department_id = ?".to_string());
    }
    let stmt = query_builder(
        Some(SELECT_WITH_DEPARTMENT.to_string()),
        FROM_WITH_DEPARTMENT,
        &filters,
        vec!["dept.name".to_string(), "d.title".to_string()],
    );
    let q = binds_query_as::<DesignationWithDepartment>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_designation_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<DesignationWithDepartment>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["d.id = ?".to_string()];
    let stmt = query_builder(
        Some(SELECT_WITH_DEPARTMENT.to_string()),
        FROM_WITH_DEPARTMENT,
        &filters,
        vec![],
    );
    let q = binds_query_as::<DesignationWithDepartment>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_designation(
    tx: &mut Transaction<'_, Sqlite>,
    designation: &Designation,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, department_id, title, created_date, updated_date)
    VALUES (?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&designation.id)
    .bind(&designation.department_id)
    .bind(&designation.title)
    .bind(designation.created_date)
    .bind(designation.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_designation(
    tx: &mut Transaction<'_, Sqlite>,
    designation: &mut Designation,
    department_id: String,
    title: String,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    designation.department_id = department_id;
    designation.title = title;
    designation.updated_date = now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET department_id = ?, title = ?, updated_date = ?
        WHERE id = ?"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&designation.department_id)
    .bind(&designation.title)
    .bind(designation.updated_date)
    .bind(&designation.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_designation(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
