use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::{types::Json, SqlitePool};

use crate::{core::utils::generate_id, model::role::Role};

pub struct RoleFactory<T: Clone> {
    modifier_one: fn(x: &Role, ext: T) -> Role,
    modifier_many: fn(x: &Role, idx: usize, ext: T) -> Role,
}

impl<T: Clone> Default for RoleFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RoleFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Role, ext: T) -> Role) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Role, idx: usize, ext: T) -> Role) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &SqlitePool, ext: T) -> anyhow::Result<Role> {
        let data = RoleDummy::new().generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO user_roles (id, name, description, permissions, created_date, updated_date)
        VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.permissions)
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
    ) -> anyhow::Result<Vec<Role>> {
        let data = RoleDummy::new().generate_many(num);
        let mut result: Vec<Role> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(
                r#"
            INSERT INTO user_roles (id, name, description, permissions, created_date, updated_date)
            VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(&item.permissions)
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
struct RoleDummy {
    pub name: String,
    pub description: Option<String>,
    pub created_date: DateTime<FixedOffset>,
}

impl RoleDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_role(dummy: Self) -> Role {
        Role {
            id: generate_id("ROLE"),
            name: dummy.name,
            description: dummy.description,
            permissions: Json(vec![]),
            created_date: dummy.created_date,
            updated_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self) -> Role {
        Self::to_role(self.clone())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Role> {
        let mut result: Vec<Role> = vec![];
        for _ in 0..num {
            result.push(Self::to_role(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{types::Json, SqlitePool};

    use crate::{factory::role::RoleFactory, model::role::Role};

    #[sqlx::test]
    async fn test_generate_one(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = RoleFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = RoleFactory::<&'static str>::new();
        factory.modified_one(|data, ext| Role {
            name: ext.to_string(),
            permissions: Json(vec!["view_boq".to_string()]),
            ..data.clone()
        });
        factory.generate_one(&pool, "Estimator").await?;

        // Expect
        let res: (String, String) = sqlx::query_as("SELECT name, permissions FROM user_roles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(res.0, "Estimator".to_string());
        assert_eq!(res.1, r#"["view_boq"]"#.to_string());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let mut factory = RoleFactory::new();
        factory.generate_many(&pool, 10, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 10);
        Ok(())
    }
}
