use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds, UpdateBuilder},
    model::offer::{
        Offer, OfferProduct, OfferProductDetail, OFFER_PRODUCT_TABLE_NAME, TABLE_NAME,
    },
};

pub async fn get_all_offer(
    tx: &mut Transaction<'_, Sqlite>,
    status: Option<String>,
    department: Option<String>,
) -> anyhow::Result<Vec<Offer>> {
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
    let q = binds_query_as::<Offer>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_offer_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Offer>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Offer>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_offer(tx: &mut Transaction<'_, Sqlite>, offer: &Offer) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, customer, department, value, status, owner, notes, created_date,
    updated_date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&offer.id)
    .bind(&offer.customer)
    .bind(&offer.department)
    .bind(offer.value)
    .bind(&offer.status)
    .bind(&offer.owner)
    .bind(&offer.notes)
    .bind(offer.created_date)
    .bind(offer.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct OfferChanges {
    pub customer: Option<String>,
    pub department: Option<String>,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_offer(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    changes: OfferChanges,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let mut builder = UpdateBuilder::new();
    let text_columns = [
        ("customer", changes.customer),
        ("department", changes.department),
        ("status", changes.status),
        ("owner", changes.owner),
        ("notes", changes.notes),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            builder.set(column, SqlxBinds::String(value));
        }
    }
    if let Some(value) = changes.value {
        builder.set("value", SqlxBinds::Float(value));
    }
    builder.set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

pub async fn delete_offer(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn get_offer_products(
    tx: &mut Transaction<'_, Sqlite>,
    offer_id: &str,
) -> anyhow::Result<Vec<OfferProductDetail>> {
    let data: Vec<OfferProductDetail> = sqlx::query_as(
        r#"SELECT op.*, p.name AS product_name, p.unit_price AS unit_price
        FROM offer_products op
        LEFT JOIN products p ON op.product_id = p.id
        WHERE op.offer_id = ?
        ORDER BY op.id"#,
    )
    .bind(offer_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(data)
}

/// Replaces every product line of the offer.
pub async fn replace_offer_products(
    tx: &mut Transaction<'_, Sqlite>,
    offer_id: &str,
    products: &[OfferProduct],
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE offer_id = ?", OFFER_PRODUCT_TABLE_NAME).as_str())
        .bind(offer_id)
        .execute(&mut **tx)
        .await?;
    for item in products {
        sqlx::query(
            format!(
                "INSERT INTO {} (id, offer_id, product_id, quantity) VALUES (?, ?, ?, ?)",
                OFFER_PRODUCT_TABLE_NAME
            )
            .as_str(),
        )
        .bind(&item.id)
        .bind(&item.offer_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
