use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{core::utils::generate_id, model::designation::Designation};

/// Designations need an existing department, so every generate call takes
/// the department id.
pub struct DesignationFactory<T: Clone> {
    modifier_one: fn(x: &Designation, ext: T) -> Designation,
    modifier_many: fn(x: &Designation, idx: usize, ext: T) -> Designation,
}

impl<T: Clone> Default for DesignationFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DesignationFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Designation, ext: T) -> Designation) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &Designation, idx: usize, ext: T) -> Designation,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(
        &mut self,
        db: &SqlitePool,
        department_id: &str,
        ext: T,
    ) -> anyhow::Result<Designation> {
        let data = DesignationDummy::new().generate_one(department_id);
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO designations (id, department_id, title, created_date, updated_date)
        VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&data.id)
        .bind(&data.department_id)
        .bind(&data.title)
        .bind(data.created_date)
        .bind(data.updated_date)
        .execute(db)
        .await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &SqlitePool,
        department_id: &str,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Designation>> {
        let data = DesignationDummy::new().generate_many(department_id, num);
        let mut result: Vec<Designation> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(
                r#"
            INSERT INTO designations (id, department_id, title, created_date, updated_date)
            VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(&item.id)
            .bind(&item.department_id)
            .bind(&item.title)
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
struct DesignationDummy {
    pub title: String,
    pub created_date: DateTime<FixedOffset>,
}

impl DesignationDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_designation(dummy: Self, department_id: &str) -> Designation {
        Designation {
            id: generate_id("DESG"),
            department_id: department_id.to_string(),
            title: dummy.title,
            created_date: dummy.created_date,
            updated_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self, department_id: &str) -> Designation {
        Self::to_designation(self.clone(), department_id)
    }

    pub fn generate_many(&self, department_id: &str, num: u32) -> Vec<Designation> {
        let mut result: Vec<Designation> = vec![];
        for _ in 0..num {
            result.push(Self::to_designation(Faker.fake::<Self>(), department_id));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use crate::factory::{department::DepartmentFactory, designation::DesignationFactory};

    #[sqlx::test]
    async fn test_generate_many(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let department = DepartmentFactory::new().generate_one(&pool, ()).await?;

        // When
        let mut factory = DesignationFactory::new();
        factory.generate_many(&pool, &department.id, 3, ()).await?;

        // Expect
        let num_data: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM designations WHERE department_id = ?")
                .bind(&department.id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(num_data.0, 3);
        Ok(())
    }
}
