use sqlx::{Sqlite, Transaction};

use crate::{
    core::{
        permission::merge_permissions,
        sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
        utils::now,
    },
    model::{
        role_assignment::{RoleAssignment, RoleAssignmentDetail, TABLE_NAME},
        user::User,
    },
    repository::user::set_user_permissions,
};

const SELECT_DETAIL: &str =
    "ura.*, ur.name AS role_name, u.name AS user_name, u.email AS email";
const FROM_DETAIL: &str = r#"user_role_assignments ura
    LEFT JOIN user_roles ur ON ura.role_id = ur.id
    LEFT JOIN users u ON ura.user_id = u.id"#;

pub async fn get_all_role_assignment(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Option<String>,
) -> anyhow::Result<Vec<RoleAssignmentDetail>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];
    if let Some(user_id) = user_id {
        binds.push(SqlxBinds::String(user_id));
        filters.push("ura.user_id = ?".to_string());
    }
    let stmt = query_builder(
        Some(SELECT_DETAIL.to_string()),
        FROM_DETAIL,
        &filters,
        vec!["ura.assigned_date DESC".to_string(), "ura.id DESC".to_string()],
    );
    let q = binds_query_as::<RoleAssignmentDetail>(&stmt, binds);
    let data = q.fetch_all(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_assignment_by_id(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<Option<RoleAssignmentDetail>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(id.to_string())];
    let filters: Vec<String> = vec!["ura.id = ?".to_string()];
    let stmt = query_builder(
        Some(SELECT_DETAIL.to_string()),
        FROM_DETAIL,
        &filters,
        vec![],
    );
    let q = binds_query_as::<RoleAssignmentDetail>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn get_role_assignment_by_pair(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    role_id: &str,
) -> anyhow::Result<Option<RoleAssignment>> {
    let binds: Vec<SqlxBinds> = vec![
        SqlxBinds::String(user_id.to_string()),
        SqlxBinds::String(role_id.to_string()),
    ];
    let filters: Vec<String> = vec!["user_id = ?".to_string(), "role_id = ?".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![]);
    let q = binds_query_as::<RoleAssignment>(&stmt, binds);
    let data = q.fetch_optional(&mut **tx).await?;
    Ok(data)
}

pub async fn create_role_assignment(
    tx: &mut Transaction<'_, Sqlite>,
    assignment: &RoleAssignment,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, user_id, role_id, assigned_date, permissions)
    VALUES (?, ?, ?, ?, ?)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&assignment.id)
    .bind(&assignment.user_id)
    .bind(&assignment.role_id)
    .bind(assignment.assigned_date)
    .bind(&assignment.permissions)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_role_assignment(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = ?", TABLE_NAME).as_str())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn get_assigned_user_ids(
    tx: &mut Transaction<'_, Sqlite>,
    role_id: &str,
) -> anyhow::Result<Vec<String>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(role_id.to_string())];
    let filters: Vec<String> = vec!["role_id = ?".to_string()];
    let stmt = query_builder(
        Some("user_id".to_string()),
        TABLE_NAME,
        &filters,
        vec!["user_id".to_string()],
    );
    let data = binds_query_as::<(String,)>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data.into_iter().map(|x| x.0).collect())
}

/// Adds a newly assigned role's permissions to the user's stored list.
/// Other roles the user holds are not re-read.
pub async fn grant_role_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    user: &User,
    role_permissions: &[String],
) -> anyhow::Result<Vec<String>> {
    let current = user
        .permissions
        .as_ref()
        .map(|x| x.0.clone())
        .unwrap_or_default();
    let permissions = merge_permissions(&[current, role_permissions.to_vec()]);
    set_user_permissions(tx, &user.id, Some(permissions.clone()), now()).await?;
    Ok(permissions)
}

/// Rebuilds the user's list from the snapshots taken when each remaining
/// role was assigned. With no roles left the list is cleared.
pub async fn refresh_user_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
) -> anyhow::Result<Option<Vec<String>>> {
    let assignments = get_all_role_assignment(tx, Some(user_id.to_string())).await?;
    let permissions = if assignments.is_empty() {
        None
    } else {
        let lists: Vec<Vec<String>> = assignments
            .into_iter()
            .map(|x| x.assignment.permissions.0)
            .collect();
        Some(merge_permissions(&lists))
    };
    set_user_permissions(tx, user_id, permissions.clone(), now()).await?;
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use sqlx::{types::Json, SqlitePool};

    use super::*;
    use crate::{
        core::{
            permission::ROLE_USER,
            test_utils::{generate_test_user, test_config},
            utils::generate_id,
        },
        factory::role::RoleFactory,
        model::{role::Role, user::STATUS_APPROVED},
        repository::{role::update_role, user::get_user_by_id},
    };

    fn assignment(user_id: &str, role: &Role) -> RoleAssignment {
        RoleAssignment {
            id: generate_id("URA"),
            user_id: user_id.to_string(),
            role_id: role.id.clone(),
            assigned_date: now(),
            permissions: role.permissions.clone(),
        }
    }

    #[sqlx::test]
    async fn test_granted_permissions_ignore_later_role_edits(
        pool: SqlitePool,
    ) -> anyhow::Result<()> {
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
        let mut role_factory = RoleFactory::<usize>::new();
        role_factory.modified_many(|data, idx, _| Role {
            permissions: Json(if idx == 0 {
                vec!["view_product".to_string()]
            } else {
                vec!["view_boq".to_string()]
            }),
            ..data.clone()
        });
        let roles = role_factory.generate_many(&pool, 2, 0).await?;
        let mut tx = pool.begin().await?;

        // When role A is assigned, then edited, then role B is assigned
        let first = assignment(&test_user.user.id, &roles[0]);
        create_role_assignment(&mut tx, &first).await?;
        let user = get_user_by_id(&mut tx, &test_user.user.id).await?.unwrap();
        let granted = grant_role_permissions(&mut tx, &user, &roles[0].permissions.0).await?;
        assert_eq!(granted, vec!["view_product".to_string()]);
        let mut edited = roles[0].clone();
        update_role(
            &mut tx,
            &mut edited,
            roles[0].name.clone(),
            roles[0].description.clone(),
            vec!["delete_product".to_string()],
            now(),
        )
        .await?;
        let second = assignment(&test_user.user.id, &roles[1]);
        create_role_assignment(&mut tx, &second).await?;
        let user = get_user_by_id(&mut tx, &test_user.user.id).await?.unwrap();
        let granted = grant_role_permissions(&mut tx, &user, &roles[1].permissions.0).await?;

        // Expect role A's edit is not applied
        assert_eq!(
            granted,
            vec!["view_product".to_string(), "view_boq".to_string()]
        );

        // When role B is unassigned
        delete_role_assignment(&mut tx, &second.id).await?;
        let refreshed = refresh_user_permissions(&mut tx, &test_user.user.id).await?;

        // Expect the snapshot taken for role A
        assert_eq!(refreshed, Some(vec!["view_product".to_string()]));

        // When role A is unassigned
        delete_role_assignment(&mut tx, &first.id).await?;
        let cleared = refresh_user_permissions(&mut tx, &test_user.user.id).await?;

        // Expect
        assert_eq!(cleared, None);
        let user = get_user_by_id(&mut tx, &test_user.user.id).await?.unwrap();
        assert!(user.permissions.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_get_assigned_user_ids(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let config = test_config();
        let mut db = pool.acquire().await?;
        let first = generate_test_user(
            &mut db,
            &config,
            "first",
            "password",
            ROLE_USER,
            STATUS_APPROVED,
            None,
        )
        .await?;
        let second = generate_test_user(
            &mut db,
            &config,
            "second",
            "password",
            ROLE_USER,
            STATUS_APPROVED,
            None,
        )
        .await?;
        let roles = RoleFactory::<usize>::new()
            .generate_many(&pool, 2, 0)
            .await?;
        let mut tx = pool.begin().await?;
        create_role_assignment(&mut tx, &assignment(&first.user.id, &roles[0])).await?;
        create_role_assignment(&mut tx, &assignment(&second.user.id, &roles[0])).await?;
        create_role_assignment(&mut tx, &assignment(&first.user.id, &roles[1])).await?;

        // When
        let mut user_ids = get_assigned_user_ids(&mut tx, &roles[0].id).await?;

        // Expect
        user_ids.sort();
        let mut expected = vec![first.user.id.clone(), second.user.id.clone()];
        expected.sort();
        assert_eq!(user_ids, expected);
        assert_eq!(
            get_assigned_user_ids(&mut tx, &roles[1].id).await?,
            vec![first.user.id.clone()]
        );
        Ok(())
    }
}
