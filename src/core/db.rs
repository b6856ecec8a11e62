use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::Migrator,
    pool::PoolOptions,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous},
    Pool, Sqlite,
};

use crate::{
    core::{
        permission::ROLE_ADMIN,
        security::hash_password,
        utils::{generate_id, now},
    },
    model::{
        department::Department,
        designation::Designation,
        user::{User, STATUS_APPROVED},
    },
    repository,
    settings::Config,
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(config: &Config) -> anyhow::Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .busy_timeout(Duration::from_secs(5));
    let pool = PoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .idle_timeout(Duration::from_secs(60))
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const DEFAULT_DEPARTMENTS: [(&str, &str); 5] = [
    ("DEPT-001", "Information Technology"),
    ("DEPT-002", "Human Resources"),
    ("DEPT-003", "Finance"),
    ("DEPT-004", "Operations"),
    ("DEPT-005", "Sales & Marketing"),
];

// (department name, title); unknown department names fall back to the first department
const DEFAULT_DESIGNATIONS: [(&str, &str); 12] = [
    ("Information Technology", "Software Engineer"),
    ("Information Technology", "Senior Software Engineer"),
    ("Information Technology", "Team Lead"),
    ("Information Technology", "Project Manager"),
    ("Human Resources", "HR Manager"),
    ("Human Resources", "HR Executive"),
    ("Finance", "Finance Manager"),
    ("Finance", "Accountant"),
    ("Operations", "Operations Manager"),
    ("Operations", "Operations Executive"),
    ("Sales & Marketing", "Sales Manager"),
    ("Sales & Marketing", "Marketing Executive"),
];

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub departments_created: usize,
    pub designations_created: usize,
}

/// Seeds the default admin, departments and designations into empty tables.
pub async fn seed_defaults(pool: &Pool<Sqlite>) -> anyhow::Result<SeedReport> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();
    let now = now();

    let user_count: (i64,) = sqlx::query_as("SELECT count(id) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    if user_count.0 == 0 {
        let admin = User {
            id: generate_id("USER"),
            name: "System Admin".to_string(),
            email: "admin@genesis.com".to_string(),
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: hash_password(DEFAULT_ADMIN_PASSWORD)?,
            role: ROLE_ADMIN.to_string(),
            status: STATUS_APPROVED.to_string(),
            permissions: None,
            profile_picture: None,
            bio: None,
            phone: None,
            address: None,
            city: None,
            country: None,
            department_id: None,
            designation_id: None,
            created_date: now,
            updated_date: now,
        };
        repository::user::create_user(&mut tx, &admin).await?;
        report.admin_created = true;
        tracing::info!(
            "default admin user created: username={}",
            DEFAULT_ADMIN_USERNAME
        );
    }

    let department_count: (i64,) = sqlx::query_as("SELECT count(id) FROM departments")
        .fetch_one(&mut *tx)
        .await?;
    if department_count.0 == 0 {
        for (id, name) in DEFAULT_DEPARTMENTS {
            let department = Department {
                id: id.to_string(),
                name: name.to_string(),
                created_date: now,
                updated_date: now,
            };
            repository::department::create_department(&mut tx, &department).await?;
            report.departments_created += 1;
        }
        tracing::info!("{} default departments seeded", report.departments_created);
    }

    let designation_count: (i64,) = sqlx::query_as("SELECT count(id) FROM designations")
        .fetch_one(&mut *tx)
        .await?;
    if designation_count.0 == 0 {
        let departments = repository::department::get_all_department(&mut tx).await?;
        if departments.is_empty() {
            tracing::warn!("cannot seed designations: no departments found");
        } else {
            for (idx, (department_name, title)) in DEFAULT_DESIGNATIONS.iter().enumerate() {
                let department = departments
                    .iter()
                    .find(|x| x.name == *department_name)
                    .unwrap_or(&departments[0]);
                let designation = Designation {
                    id: format!("DESG-{:03}", idx + 1),
                    department_id: department.id.clone(),
                    title: title.to_string(),
                    created_date: now,
                    updated_date: now,
                };
                repository::designation::create_designation(&mut tx, &designation).await?;
                report.designations_created += 1;
            }
            tracing::info!(
                "{} default designations seeded",
                report.designations_created
            );
        }
    }

    tx.commit().await?;
    Ok(report)
}
