use sqlx::{migrate::Migrate, Pool, Sqlite};
use tokio::process::Command;

use crate::core::db::{run_migrations, seed_defaults, SeedReport, MIGRATOR};

/// Scaffolds a reversible migration pair through sqlx-cli.
pub async fn db_generate(migration_name: &str) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("add")
        .arg(migration_name)
        .arg("-r")
        .status()
        .await?;
    if !status.success() {
        anyhow::bail!("sqlx migrate add exited with {}", status);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

pub async fn db_list(pool: &Pool<Sqlite>) -> anyhow::Result<Vec<MigrationStatus>> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied: Vec<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|x| x.version)
        .collect();
    let data = MIGRATOR
        .iter()
        .filter(|x| !x.migration_type.is_down_migration())
        .map(|x| MigrationStatus {
            version: x.version,
            description: x.description.to_string(),
            applied: applied.contains(&x.version),
        })
        .collect();
    Ok(data)
}

pub async fn db_migrate(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    run_migrations(pool).await
}

/// Reverts the most recently applied migration. Returns its version, or
/// `None` when nothing was applied.
pub async fn db_revert(pool: &Pool<Sqlite>) -> anyhow::Result<Option<i64>> {
    let mut applied: Vec<i64> = {
        let mut conn = pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        conn.list_applied_migrations()
            .await?
            .into_iter()
            .map(|x| x.version)
            .collect()
    };
    applied.sort();
    let Some(latest) = applied.pop() else {
        return Ok(None);
    };
    let target = applied.last().copied().unwrap_or(0);
    MIGRATOR.undo(pool, target).await?;
    Ok(Some(latest))
}

pub async fn db_seed(pool: &Pool<Sqlite>) -> anyhow::Result<SeedReport> {
    seed_defaults(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;

    #[sqlx::test(migrations = false)]
    async fn test_migrate_list_revert(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let before = db_list(&pool).await?;
        assert!(!before.is_empty());
        assert!(before.iter().all(|x| !x.applied));

        // When
        db_migrate(&pool).await?;

        // Expect
        let after = db_list(&pool).await?;
        assert!(after.iter().all(|x| x.applied));
        let tables: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(tables.0, 1);

        // When
        let reverted = db_revert(&pool).await?;

        // Expect
        assert_eq!(reverted, after.last().map(|x| x.version));
        let tables: (i64,) = sqlx::query_as(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(tables.0, 0);
        assert_eq!(db_revert(&pool).await?, None);
        Ok(())
    }

    #[sqlx::test]
    async fn test_seed(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let report = db_seed(&pool).await?;

        // Expect
        assert!(report.admin_created);
        assert_eq!(report.departments_created, 5);
        Ok(())
    }
}
