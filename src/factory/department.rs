use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{core::utils::generate_id, model::department::Department};

pub struct DepartmentFactory<T: Clone> {
    modifier_one: fn(x: &Department, ext: T) -> Department,
    modifier_many: fn(x: &Department, idx: usize, ext: T) -> Department,
}

impl<T: Clone> Default for DepartmentFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DepartmentFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Department, ext: T) -> Department) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Department, idx: usize, ext: T) -> Department) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &SqlitePool, ext: T) -> anyhow::Result<Department> {
        let data = DepartmentDummy::new().generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO departments (id, name, created_date, updated_date)
        VALUES (?, ?, ?, ?)"#,
        )
        .bind(&data.id)
        .bind(&data.name)
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
    ) -> anyhow::Result<Vec<Department>> {
        let data = DepartmentDummy::new().generate_many(num);
        let mut result: Vec<Department> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(
                r#"
            INSERT INTO departments (id, name, created_date, updated_date)
            VALUES (?, ?, ?, ?)"#,
            )
            .bind(&item.id)
            .bind(&item.name)
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
struct DepartmentDummy {
    pub name: String,
    pub created_date: DateTime<FixedOffset>,
}

impl DepartmentDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_department(dummy: Self) -> Department {
        Department {
            id: generate_id("DEPT"),
            name: dummy.name,
            created_date: dummy.created_date,
            updated_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self) -> Department {
        Self::to_department(self.clone())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Department> {
        let mut result: Vec<Department> = vec![];
        for _ in 0..num {
            result.push(Self::to_department(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use crate::{factory::department::DepartmentFactory, model::department::Department};

    #[sqlx::test]
    async fn test_generate_one_modified(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = DepartmentFactory::<&'static str>::new();
        factory.modified_one(|data, ext| Department {
            name: ext.to_string(),
            ..data.clone()
        });
        let department = factory.generate_one(&pool, "Procurement").await?;

        // Expect
        let res: (String, String) = sqlx::query_as("SELECT id, name FROM departments")
            .fetch_one(&pool)
            .await?;
        assert_eq!(res.0, department.id);
        assert_eq!(res.1, "Procurement".to_string());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = DepartmentFactory::new();
        factory.generate_many(&pool, 4, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 4);
        Ok(())
    }
}
