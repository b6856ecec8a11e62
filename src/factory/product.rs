use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    core::{costing::FORMAT_LOCAL, utils::generate_id},
    model::product::Product,
};

pub struct ProductFactory<T: Clone> {
    modifier_one: fn(x: &Product, ext: T) -> Product,
    modifier_many: fn(x: &Product, idx: usize, ext: T) -> Product,
}

impl<T: Clone> Default for ProductFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (id, name, format, description, brand, model, origin, shipment,
    manufacturer, quantity, unit, unit_price, commission, image, serial, created_date,
    updated_date)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;

impl<T: Clone> ProductFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Product, ext: T) -> Product) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Product, idx: usize, ext: T) -> Product) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &SqlitePool, ext: T) -> anyhow::Result<Product> {
        let data = ProductDummy::new().generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(INSERT_PRODUCT)
            .bind(&data.id)
            .bind(&data.name)
            .bind(&data.format)
            .bind(&data.description)
            .bind(&data.brand)
            .bind(&data.model)
            .bind(&data.origin)
            .bind(&data.shipment)
            .bind(&data.manufacturer)
            .bind(data.quantity)
            .bind(&data.unit)
            .bind(data.unit_price)
            .bind(data.commission)
            .bind(&data.image)
            .bind(&data.serial)
            .bind(data.created_date)
            .bind(data.updated_date)
            .execute(db)
            .await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &SqlitePool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Product>> {
        let data = ProductDummy::new().generate_many(num);
        let mut result: Vec<Product> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(INSERT_PRODUCT)
                .bind(&item.id)
                .bind(&item.name)
                .bind(&item.format)
                .bind(&item.description)
                .bind(&item.brand)
                .bind(&item.model)
                .bind(&item.origin)
                .bind(&item.shipment)
                .bind(&item.manufacturer)
                .bind(item.quantity)
                .bind(&item.unit)
                .bind(item.unit_price)
                .bind(item.commission)
                .bind(&item.image)
                .bind(&item.serial)
                .bind(item.created_date)
                .bind(item.updated_date)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct ProductDummy {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[dummy(faker = "1..500")]
    pub quantity: i64,
    #[dummy(faker = "1.0..10000.0")]
    pub unit_price: f64,
    pub created_date: DateTime<FixedOffset>,
}

impl ProductDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_product(dummy: Self) -> Product {
        Product {
            id: generate_id("PROD"),
            name: dummy.name,
            format: FORMAT_LOCAL.to_string(),
            description: dummy.description,
            brand: dummy.brand,
            model: dummy.model,
            origin: None,
            shipment: None,
            manufacturer: None,
            quantity: dummy.quantity,
            unit: Some("pcs".to_string()),
            unit_price: dummy.unit_price,
            commission: 0.0,
            image: None,
            serial: None,
            created_date: dummy.created_date,
            updated_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self) -> Product {
        Self::to_product(self.clone())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Product> {
        let mut result: Vec<Product> = vec![];
        for _ in 0..num {
            result.push(Self::to_product(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use crate::{factory::product::ProductFactory, model::product::Product};

    #[sqlx::test]
    async fn test_generate_one_modified(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = ProductFactory::<f64>::new();
        factory.modified_one(|data, ext| Product {
            format: "foreign".to_string(),
            unit_price: ext,
            ..data.clone()
        });
        factory.generate_one(&pool, 250.0).await?;

        // Expect
        let res: (String, f64) = sqlx::query_as("SELECT format, unit_price FROM products")
            .fetch_one(&pool)
            .await?;
        assert_eq!(res.0, "foreign".to_string());
        assert_eq!(res.1, 250.0);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = ProductFactory::new();
        let products = factory.generate_many(&pool, 5, ()).await?;

        // Expect
        assert_eq!(products.len(), 5);
        let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 5);
        Ok(())
    }
}
