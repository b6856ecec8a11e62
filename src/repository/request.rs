use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds, UpdateBuilder},
    model::request::{Request, RequestActivity, ACTIVITY_TABLE_NAME, TABLE_NAME},
};

pub async fn get_all_request(
    tx: &mut Transaction<'_, Sqlite>,
    status: Option<String>,
    department: Option<String>,
) -> anyhow::Result<Vec<Request>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];
    if let Some(status) = status {
        binds.push(SqlxBinds::String(status));
        filters.push("status = ?".to_string());
    }
    if let Some(department) = department {
        binds.push(SqlxBinds::String(department));
        filters.push("department = ?".to_string());
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string(), "id DESC".to_string()],
    );
    let q = binds_query_as::<Request>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_request_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Request>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Request>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_request(
    tx: &mut Transaction<'_, Sqlite>,
    request: &Request,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, request_type, requester, amount, status, manager, department, notes,
    created_date, updated_date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&request.id)
    .bind(&request.request_type)
    .bind(&request.requester)
    .bind(request.amount)
    .bind(&request.status)
    .bind(&request.manager)
    .bind(&request.department)
    .bind(&request.notes)
    .bind(request.created_date)
    .bind(request.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct RequestChanges {
    pub request_type: Option<String>,
    pub requester: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub manager: Option<String>,
    pub department: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_request(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    changes: RequestChanges,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let mut builder = UpdateBuilder::new();
    let text_columns = [
        ("request_type", changes.request_type),
        ("requester", changes.requester),
        ("status", changes.status),
        ("manager", changes.manager),
        ("department", changes.department),
        ("notes", changes.notes),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            builder.set(column, SqlxBinds::String(value));
        }
    }
    if let Some(amount) = changes.amount {
        builder.set("amount", SqlxBinds::Float(amount));
    }
    builder.set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

pub async fn delete_request(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn get_request_activity(
    tx: &mut Transaction<'_, Sqlite>,
    request_id: &str,
) -> anyhow::Result<Vec<RequestActivity>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(request_id.to_string())];
    let filters: Vec<String> = vec!["request_id = ?".to_string()];
    let stmt = query_builder(
        None,
        ACTIVITY_TABLE_NAME,
        &filters,
        vec!["created_date".to_string(), "id".to_string()],
    );
    let q = binds_query_as::<RequestActivity>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn create_request_activity(
    tx: &mut Transaction<'_, Sqlite>,
    activity: &RequestActivity,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            "INSERT INTO {} (id, request_id, action, actor, created_date) VALUES (?, ?, ?, ?, ?)",
            ACTIVITY_TABLE_NAME
        )
        .as_str(),
    )
    .bind(&activity.id)
    .bind(&activity.request_id)
    .bind(&activity.action)
    .bind(&activity.actor)
    .bind(activity.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
