use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::department::{Department, TABLE_NAME},
};

pub async fn get_all_department(
    tx: &mut Transaction<'_, Sqlite>,
) -> anyhow::Result<Vec<Department>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &[],
        vec!["name".to_string()],
    );
    let q = binds_query_as::<Department>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_department_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Department>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Department>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

/// Department named `name`, ignoring the one with `exclude_id`.
pub async fn get_department_by_name(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<Option<Department>> {
    let mut binds: Vec<SqlxBinds> = vec![SqlxBinds::String(name.to_string())];
    let mut filters: Vec<String> = vec!["name = ?".to_string()];
    if let Some(exclude_id) = exclude_id {
        binds.push(SqlxBinds::String(exclude_id.to_string()));
        filters.push("id != ?".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Department>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_department(
    tx: &mut Transaction<'_, Sqlite>,
    department: &Department,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, created_date, updated_date)
    VALUES (?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&department.id)
    .bind(&department.name)
    .bind(department.created_date)
    .bind(department.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_department(
    tx: &mut Transaction<'_, Sqlite>,
    department: &mut Department,
    name: String,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    department.name = name;
    department.updated_date = now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = ?, updated_date = ?
        WHERE id = ?"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&department.name)
    .bind(department.updated_date)
    .bind(&department.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete; designations of the department go with it.
pub async fn delete_department(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
