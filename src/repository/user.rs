use chrono::{DateTime, FixedOffset};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds, UpdateBuilder},
    model::user::{User, UserWithRelations, STATUS_PENDING, TABLE_NAME},
};

const SELECT_WITH_RELATIONS: &str = r#"u.*, d.name AS department_name, des.title AS designation_title"#;
const FROM_WITH_RELATIONS: &str = r#"users u
    LEFT JOIN departments d ON u.department_id = d.id
    LEFT JOIN designations des ON u.designation_id = des.id"#;

/// Users with their department and designation, newest first.
pub async fn get_all_user(
    tx: &mut Transaction<'_, Sqlite>,
    department_id: Option<String>,
    designation_id: Option<String>,
    status: Option<String>,
) -> anyhow::Result<Vec<UserWithRelations>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];

    if let Some(department_id) = department_id {
        binds.push(SqlxBinds::String(department_id));
        filters.push("u.department_id = ?".to_string());
    }
    if let Some(designation_id) = designation_id {
        binds.push(SqlxBinds::String(designation_id));
        filters.push("u.designation_id = ?".to_string());
    }
    if let Some(status) = status {
        binds.push(SqlxBinds::String(status));
        filters.push("u.status = ?".to_string());
    }

    let stmt = query_builder(
        Some(SELECT_WITH_RELATIONS.to_string()),
        FROM_WITH_RELATIONS,
        &filters,
        vec!["u.created_date DESC".to_string(), "u.id DESC".to_string()],
    );
    let q = binds_query_as::<UserWithRelations>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_pending_user(
    tx: &mut Transaction<'_, Sqlite>,
) -> anyhow::Result<Vec<UserWithRelations>> {
    get_all_user(tx, None, None, Some(STATUS_PENDING.to_string())).await
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<User>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_user_with_relations_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<UserWithRelations>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["u.id = ?".to_string()];
    let stmt = query_builder(
        Some(SELECT_WITH_RELATIONS.to_string()),
        FROM_WITH_RELATIONS,
        &filters,
        vec![],
    );
    let q = binds_query_as::<UserWithRelations>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_user_by_username(
    tx: &mut Transaction<'_, Sqlite>,
    username: &str,
) -> anyhow::Result<Option<User>> {
    let res_user: Option<User> = sqlx::query_as(
        r#"SELECT *
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(res_user)
}

/// Whether another user (other than `exclude_id`) already holds `value` in
/// the unique `column`.
async fn is_taken(
    tx: &mut Transaction<'_, Sqlite>,
    column: &str,
    value: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let mut binds: Vec<SqlxBinds> = vec![SqlxBinds::String(value.to_string())];
    let mut filters: Vec<String> = vec![format!("{} = ?", column)];
    if let Some(exclude_id) = exclude_id {
        binds.push(SqlxBinds::String(exclude_id.to_string()));
        filters.push("id != ?".to_string());
    }
    let stmt = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
    );
    let count = binds_query_as::<(i64,)>(&stmt, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count.0 > 0)
}

pub async fn is_email_taken(
    tx: &mut Transaction<'_, Sqlite>,
    email: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    is_taken(tx, "email", email, exclude_id).await
}

pub async fn is_username_taken(
    tx: &mut Transaction<'_, Sqlite>,
    username: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    is_taken(tx, "username", username, exclude_id).await
}

pub async fn is_phone_taken(
    tx: &mut Transaction<'_, Sqlite>,
    phone: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    is_taken(tx, "phone", phone, exclude_id).await
}

pub async fn create_user(tx: &mut Transaction<'_, Sqlite>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, name, email, username, password, role, status, permissions,
        profile_picture, bio, phone, address, city, country, department_id, designation_id,
        created_date, updated_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.role)
    .bind(&user.status)
    .bind(&user.permissions)
    .bind(&user.profile_picture)
    .bind(&user.bio)
    .bind(&user.phone)
    .bind(&user.address)
    .bind(&user.city)
    .bind(&user.country)
    .bind(&user.department_id)
    .bind(&user.designation_id)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Column changes for a partial user update. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub department_id: Option<String>,
    pub designation_id: Option<String>,
}

pub async fn update_user(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    changes: UserChanges,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let mut builder = UpdateBuilder::new();
    let columns = [
        ("name", changes.name),
        ("email", changes.email),
        ("username", changes.username),
        ("password", changes.password),
        ("role", changes.role),
        ("status", changes.status),
        ("profile_picture", changes.profile_picture),
        ("bio", changes.bio),
        ("phone", changes.phone),
        ("address", changes.address),
        ("city", changes.city),
        ("country", changes.country),
        ("department_id", changes.department_id),
        ("designation_id", changes.designation_id),
    ];
    for (column, value) in columns {
        if let Some(value) = value {
            builder.set(column, SqlxBinds::String(value));
        }
    }
    builder.set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

/// Overwrites the permission snapshot; `None` clears it.
pub async fn set_user_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    permissions: Option<Vec<String>>,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    let permissions = match permissions {
        Some(val) => Some(serde_json::to_string(&val)?),
        None => None,
    };
    let mut builder = UpdateBuilder::new();
    builder
        .set("permissions", SqlxBinds::OptionString(permissions))
        .set("updated_date", SqlxBinds::DateTimeFixedOffset(now));
    let (stmt, binds) = builder.build(TABLE_NAME, id);
    binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(())
}

pub async fn delete_user(tx: &mut Transaction<'_, Sqlite>, id: &str) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::{
        core::{
            permission::ROLE_USER,
            test_utils::{generate_test_user, test_config},
            utils::now,
        },
        model::user::STATUS_APPROVED,
    };

    #[sqlx::test]
    async fn test_partial_update_keeps_other_columns(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let config = test_config();
        let mut db = pool.acquire().await?;
        let test_user = generate_test_user(
            &mut db,
            &config,
            "karim",
            "password",
            ROLE_USER,
            STATUS_APPROVED,
            None,
        )
        .await?;

        // When
        let mut tx = pool.begin().await?;
        update_user(
            &mut tx,
            &test_user.user.id,
            UserChanges {
                city: Some("Dhaka".to_string()),
                ..Default::default()
            },
            now(),
        )
        .await?;
        set_user_permissions(
            &mut tx,
            &test_user.user.id,
            Some(vec!["view_boq".to_string()]),
            now(),
        )
        .await?;
        let user = get_user_by_id(&mut tx, &test_user.user.id).await?;

        // Expect
        let user = user.unwrap();
        assert_eq!(user.city, Some("Dhaka".to_string()));
        assert_eq!(user.name, test_user.user.name);
        assert_eq!(user.permission_list(), vec!["view_boq".to_string()]);
        assert!(user.updated_date > test_user.user.updated_date);
        Ok(())
    }

    #[sqlx::test]
    async fn test_uniqueness_checks(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let config = test_config();
        let mut db = pool.acquire().await?;
        let test_user = generate_test_user(
            &mut db,
            &config,
            "karim",
            "password",
            ROLE_USER,
            STATUS_APPROVED,
            None,
        )
        .await?;

        // When
        let mut tx = pool.begin().await?;

        // Expect
        assert!(is_username_taken(&mut tx, "karim", None).await?);
        assert!(!is_username_taken(&mut tx, "karim", Some(&test_user.user.id)).await?);
        assert!(is_email_taken(&mut tx, &test_user.user.email, None).await?);
        assert!(!is_phone_taken(&mut tx, "0170000000", None).await?);
        Ok(())
    }
}
