use chrono::{DateTime, FixedOffset};
use sqlx::{types::Json, Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::role::{Role, TABLE_NAME},
};

pub async fn get_all_role(tx: &mut Transaction<'_, Sqlite>) -> anyhow::Result<Vec<Role>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &[],
        vec!["name".to_string()],
    );
    let q = binds_query_as::<Role>(&stmt, vec![]);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Role>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Role>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_by_name(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<Option<Role>> {
    let mut binds: Vec<SqlxBinds> = vec![SqlxBinds::String(name.to_string())];
    let mut filters: Vec<String> = vec!["name = ?".to_string()];
    if let Some(exclude_id) = exclude_id {
        binds.push(SqlxBinds::String(exclude_id.to_string()));
        filters.push("id != ?".to_string());
    }
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Role>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_role(tx: &mut Transaction<'_, Sqlite>, role: &Role) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, description, permissions, created_date, updated_date)
    VALUES (?, ?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&role.id)
    .bind(&role.name)
    .bind(&role.description)
    .bind(&role.permissions)
    .bind(role.created_date)
    .bind(role.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_role(
    tx: &mut Transaction<'_, Sqlite>,
    role: &mut Role,
    name: String,
    description: Option<String>,
    permissions: Vec<String>,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    role.name = name;
    role.description = description;
    role.permissions = Json(permissions);
    role.updated_date = now;
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET name = ?, description = ?, permissions = ?, updated_date = ?
        WHERE id = ?"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&role.name)
    .bind(&role.description)
    .bind(&role.permissions)
    .bind(role.updated_date)
    .bind(&role.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete; assignments of the role go with it.
pub async fn delete_role(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
