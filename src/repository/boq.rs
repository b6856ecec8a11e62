use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds, UpdateBuilder},
    model::boq::{
        Boq, BoqLineItem, BoqTimeline, LINE_ITEM_TABLE_NAME, TABLE_NAME, TIMELINE_TABLE_NAME,
    },
};

pub async fn get_all_boq(
    tx: &mut Transaction<'_, Sqlite>,
    status: Option<String>,
    department: Option<String>,
) -> anyhow::Result<Vec<Boq>> {
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
    let q = binds_query_as::<Boq>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_boq_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Boq>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Boq>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_boq(tx: &mut Transaction<'_, Sqlite>, boq: &Boq) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, project, department, approver, owner, status, budget, created_date,
    updated_date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&boq.id)
    .bind(&boq.project)
    .bind(&boq.department)
    .bind(&boq.approver)
    .bind(&boq.owner)
    .bind(&boq.status)
    .bind(boq.budget)
    .bind(boq.created_date)
    .bind(boq.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct BoqChanges {
    pub project: Option<String>,
    pub department: Option<String>,
    pub approver: Option<String>,
    pub owner: Option<String>,
    pub status: Option<String>,
    pub budget: Option<f64>,
}

pub async fn update_boq(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    changes: BoqChanges,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let mut builder = UpdateBuilder::new();
    let text_columns = [
        ("project", changes.project),
        ("department", changes.department),
        ("approver", changes.approver),
        ("owner", changes.owner),
        ("status", changes.status),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            builder.set(column, SqlxBinds::String(value));
        }
    }
    if let Some(budget) = changes.budget {
        builder.set("budget", SqlxBinds::Float(budget));
    }
    builder.set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

pub async fn delete_boq(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn get_boq_line_items(
    tx: &mut Transaction<'_, Sqlite>,
    boq_id: &str,
) -> anyhow::Result<Vec<BoqLineItem>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(boq_id.to_string())];
    let filters: Vec<String> = vec!["boq_id = ?".to_string()];
    let stmt = query_builder(
        None,
        LINE_ITEM_TABLE_NAME,
        &filters,
        vec!["position".to_string()],
    );
    let q = binds_query_as::<BoqLineItem>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

/// Replaces every line item of the BOQ.
pub async fn replace_boq_line_items(
    tx: &mut Transaction<'_, Sqlite>,
    boq_id: &str,
    items: &[BoqLineItem],
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE boq_id = ?", LINE_ITEM_TABLE_NAME).as_str())
        .bind(boq_id)
        .execute(&mut **tx)
        .await?;
    for item in items {
        sqlx::query(
            format!(
                r#"
        INSERT INTO {} (id, boq_id, position, product_id, product_name, product_description,
        brand, model, origin, shipment, manufacturer, quantity, unit, unit_price, profit_margin,
        format, margin_value, vat, ait, ex_works_cost, cnf_cost, shipping_cost,
        total_unit_price, total_price)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                LINE_ITEM_TABLE_NAME
            )
            .as_str(),
        )
        .bind(&item.id)
        .bind(&item.boq_id)
        .bind(item.position)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(&item.product_description)
        .bind(&item.brand)
        .bind(&item.model)
        .bind(&item.origin)
        .bind(&item.shipment)
        .bind(&item.manufacturer)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_price)
        .bind(item.profit_margin)
        .bind(&item.format)
        .bind(item.margin_value)
        .bind(item.vat)
        .bind(item.ait)
        .bind(item.ex_works_cost)
        .bind(item.cnf_cost)
        .bind(item.shipping_cost)
        .bind(item.total_unit_price)
        .bind(item.total_price)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn get_boq_timeline(
    tx: &mut Transaction<'_, Sqlite>,
    boq_id: &str,
) -> anyhow::Result<Vec<BoqTimeline>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(boq_id.to_string())];
    let filters: Vec<String> = vec!["boq_id = ?".to_string()];
    let stmt = query_builder(
        None,
        TIMELINE_TABLE_NAME,
        &filters,
        vec!["created_date".to_string(), "id".to_string()],
    );
    let q = binds_query_as::<BoqTimeline>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn create_boq_timeline(
    tx: &mut Transaction<'_, Sqlite>,
    entry: &BoqTimeline,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            "INSERT INTO {} (id, boq_id, title, actor, created_date) VALUES (?, ?, ?, ?, ?)",
            TIMELINE_TABLE_NAME
        )
        .as_str(),
    )
    .bind(&entry.id)
    .bind(&entry.boq_id)
    .bind(&entry.title)
    .bind(&entry.actor)
    .bind(entry.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
