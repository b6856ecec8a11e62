use sqlx::SqlitePool;

use crate::{
    core::{
        permission::ROLE_ADMIN,
        security::hash_password,
        utils::{generate_id, is_valid_email, now},
    },
    model::user::{User, STATUS_APPROVED},
    repository::{self, user::UserChanges},
};

/// Creates an approved admin account.
pub async fn create_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    name: &str,
    email: &str,
) -> anyhow::Result<User> {
    if password.len() < 6 {
        anyhow::bail!("Password must be at least 6 characters");
    }
    if !is_valid_email(email) {
        anyhow::bail!("Invalid email format");
    }

    let mut tx = pool.begin().await?;
    if repository::user::is_username_taken(&mut tx, username, None).await? {
        anyhow::bail!("Username already taken");
    }
    if repository::user::is_email_taken(&mut tx, email, None).await? {
        anyhow::bail!("Email already registered");
    }

    let now = now();
    let user = User {
        id: generate_id("USER"),
        name: name.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password: hash_password(password)?,
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
    repository::user::create_user(&mut tx, &user).await?;
    tx.commit().await?;
    tracing::info!("admin user created: username={}", username);
    Ok(user)
}

pub async fn reset_password(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    if password.len() < 6 {
        anyhow::bail!("Password must be at least 6 characters");
    }
    let mut tx = pool.begin().await?;
    let user = match repository::user::get_user_by_username(&mut tx, username).await? {
        Some(val) => val,
        None => anyhow::bail!("User {} not found", username),
    };
    let changes = UserChanges {
        password: Some(hash_password(password)?),
        ..Default::default()
    };
    repository::user::update_user(&mut tx, &user.id, changes, now()).await?;
    tx.commit().await?;
    tracing::info!("password reset: username={}", username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::core::security::verify_hash_password;

    #[sqlx::test]
    async fn test_create_admin(pool: SqlitePool) -> anyhow::Result<()> {
        // When
        let user = create_admin(&pool, "root", "secret1", "Root", "root@genesis.com").await?;

        // Expect
        let db_res: Option<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT username, password, role, status
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(&user.id)
        .fetch_optional(&pool)
        .await?;
        let db_res = db_res.expect("admin row");
        assert!(user.id.starts_with("USER-"));
        assert_eq!(db_res.0, "root");
        assert!(verify_hash_password("secret1", &db_res.1)?);
        assert_eq!(db_res.2, ROLE_ADMIN);
        assert_eq!(db_res.3, STATUS_APPROVED);
        Ok(())
    }

    #[sqlx::test]
    async fn test_create_admin_rejects_duplicates(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        create_admin(&pool, "root", "secret1", "Root", "root@genesis.com").await?;

        // When
        let same_username =
            create_admin(&pool, "root", "secret1", "Other", "other@genesis.com").await;
        let same_email = create_admin(&pool, "other", "secret1", "Other", "root@genesis.com").await;
        let bad_email = create_admin(&pool, "third", "secret1", "Third", "not-an-email").await;

        // Expect
        assert_eq!(
            same_username.err().map(|x| x.to_string()),
            Some("Username already taken".to_string())
        );
        assert_eq!(
            same_email.err().map(|x| x.to_string()),
            Some("Email already registered".to_string())
        );
        assert!(bad_email.is_err());
        let count: (i64,) = sqlx::query_as("SELECT count(id) FROM users")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_reset_password(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        create_admin(&pool, "root", "secret1", "Root", "root@genesis.com").await?;

        // When
        reset_password(&pool, "root", "changed99").await?;

        // Expect
        let db_res: (String,) = sqlx::query_as("SELECT password FROM users WHERE username = ?")
            .bind("root")
            .fetch_one(&pool)
            .await?;
        assert!(verify_hash_password("changed99", &db_res.0)?);
        assert!(!verify_hash_password("secret1", &db_res.0)?);
        assert!(reset_password(&pool, "ghost", "changed99").await.is_err());
        assert!(reset_password(&pool, "root", "abc").await.is_err());
        Ok(())
    }
}
