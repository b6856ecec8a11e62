use std::sync::Arc;

use fake::{Fake, Faker};
use sqlx::{pool::PoolConnection, types::Json, Sqlite, SqlitePool};

use super::security::generate_token_from_user;
use crate::{
    core::{
        security::hash_password,
        utils::{generate_id, now},
    },
    model::user::User,
    settings::Config,
    AppState,
};

pub fn generate_random<T: fake::Dummy<fake::Faker>>() -> T {
    Faker.fake()
}

/// Config built from defaults only, independent of the process environment.
pub fn test_config() -> Config {
    let mut config = match envy::from_iter::<_, Config>(Vec::<(String, String)>::new()) {
        Ok(val) => val,
        Err(err) => panic!("default config: {}", err),
    };
    config.prefix = Some("/api".to_string());
    config.jwt_secret = "test-secret".to_string();
    config
}

pub fn test_app_state(pool: SqlitePool, config: &Config) -> Arc<AppState> {
    Arc::new(AppState {
        db: pool,
        config: config.clone(),
    })
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

pub async fn generate_test_user(
    db: &mut PoolConnection<Sqlite>,
    config: &Config,
    username: &str,
    password: &str,
    role: &str,
    status: &str,
    permissions: Option<Vec<String>>,
) -> anyhow::Result<TestUser> {
    // Prepare user
    let hashed_password = hash_password(password)?;
    let now = now();
    let user = User {
        id: generate_id("USER"),
        name: format!("{} name", username),
        email: format!("{}@genesis.test", username),
        username: username.to_string(),
        password: hashed_password,
        role: role.to_string(),
        status: status.to_string(),
        permissions: permissions.map(Json),
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

    // create user on db
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, username, password, role, status, permissions,
        created_date, updated_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.role)
    .bind(&user.status)
    .bind(&user.permissions)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;

    // Generate token
    let (token, _) = generate_token_from_user(&user, config)?;

    Ok(TestUser { user, token })
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use crate::{
        core::{
            permission::ROLE_ADMIN,
            security::get_user_from_token,
            test_utils::{generate_test_user, test_config},
        },
        model::user::STATUS_APPROVED,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: SqlitePool) -> anyhow::Result<()> {
        // Given
        let config = test_config();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &config,
            "testuser",
            "testpassword",
            ROLE_ADMIN,
            STATUS_APPROVED,
            Some(vec!["view_boq".to_string()]),
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(String, String, Option<String>)> =
            sqlx::query_as("SELECT id, username, permissions FROM users WHERE id = ?")
                .bind(&res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert!(user.is_some());
        assert_eq!(user.unwrap().2, Some(r#"["view_boq"]"#.to_string()));

        // is jwt token valid
        let mut tx = pool.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &config.jwt_secret, Some(res.token.clone())).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().username, "testuser".to_string());
        Ok(())
    }
}
