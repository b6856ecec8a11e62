use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds, UpdateBuilder},
    model::product::{Product, TABLE_NAME},
};

pub async fn get_all_product(
    tx: &mut Transaction<'_, Sqlite>,
    format: Option<String>,
    search: Option<String>,
) -> anyhow::Result<Vec<Product>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(format) = format {
        binds.push(SqlxBinds::String(format));
        filters.push("format = ?".to_string());
    }
    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        binds.push(SqlxBinds::String(pattern.clone()));
        binds.push(SqlxBinds::String(pattern.clone()));
        binds.push(SqlxBinds::String(pattern));
        filters.push("(name LIKE ? OR brand LIKE ? OR model LIKE ?)".to_string());
    }

    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string(), "id DESC".to_string()],
    );
    let q = binds_query_as::<Product>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_product_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<Product>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<Product>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_product(
    tx: &mut Transaction<'_, Sqlite>,
    product: &Product,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, name, format, description, brand, model, origin, shipment,
    manufacturer, quantity, unit, unit_price, commission, image, serial, created_date,
    updated_date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.format)
    .bind(&product.description)
    .bind(&product.brand)
    .bind(&product.model)
    .bind(&product.origin)
    .bind(&product.shipment)
    .bind(&product.manufacturer)
    .bind(product.quantity)
    .bind(&product.unit)
    .bind(product.unit_price)
    .bind(product.commission)
    .bind(&product.image)
    .bind(&product.serial)
    .bind(product.created_date)
    .bind(product.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub origin: Option<String>,
    pub shipment: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub commission: Option<f64>,
    pub image: Option<String>,
    pub serial: Option<String>,
}

pub async fn update_product(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    changes: ProductChanges,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let mut builder = UpdateBuilder::new();
    let text_columns = [
        ("name", changes.name),
        ("format", changes.format),
        ("description", changes.description),
        ("brand", changes.brand),
        ("model", changes.model),
        ("origin", changes.origin),
        ("shipment", changes.shipment),
        ("manufacturer", changes.manufacturer),
        ("unit", changes.unit),
        ("image", changes.image),
        ("serial", changes.serial),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            builder.set(column, SqlxBinds::String(value));
        }
    }
    if let Some(quantity) = changes.quantity {
        builder.set("quantity", SqlxBinds::Int(quantity));
    }
    if let Some(unit_price) = changes.unit_price {
        builder.set("unit_price", SqlxBinds::Float(unit_price));
    }
    if let Some(commission) = changes.commission {
        builder.set("commission", SqlxBinds::Float(commission));
    }
    builder.set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

pub async fn delete_product(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
