use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};

use crate::{
    core::permission::has_permission,
    model::user::User,
    repository::user::get_user_by_id,
    settings::Config,
};

/// password hashing
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("hash password: {}", err))?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(password: &str, password_hash: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|err| anyhow::anyhow!("parse password hash: {}", err))?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}


pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub name: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, exp: i64) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
            exp,
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

/// Issues a token for `user`, returning it with its expiry.
pub fn generate_token_from_user(
    user: &User,
    config: &Config,
) -> anyhow::Result<(String, DateTime<FixedOffset>)> {
    let exp = Utc::now() + Duration::minutes(config.jwt_exp as i64);
    let claims = Claims::new(user, exp.timestamp());
    let token = encode_token(&claims, &config.jwt_secret)?;
    Ok((token, exp.fixed_offset()))
}

pub fn token_expiry(claims: &Claims) -> Option<DateTime<FixedOffset>> {
    Utc.timestamp_opt(claims.exp, 0)
        .single()
        .map(|x| x.fixed_offset())
}

/// Outcome of resolving a bearer token against the live user table.
#[derive(Debug)]
pub enum TokenUser {
    Invalid,
    Missing,
    NotApproved(User),
    Approved(User),
}

pub async fn resolve_token(
    tx: &mut Transaction<'_, Sqlite>,
    jwt_secret: &str,
    jwt_token: Option<String>,
) -> anyhow::Result<TokenUser> {
    let Some(jwt_token) = jwt_token else {
        return Ok(TokenUser::Invalid);
    };
    let claims = match decode_token(&jwt_token, jwt_secret) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("rejected token: {}", err);
            return Ok(TokenUser::Invalid);
        }
    };
    let user = get_user_by_id(tx, &claims.id).await?;
    Ok(match user {
        None => TokenUser::Missing,
        Some(user) if user.is_approved() => TokenUser::Approved(user),
        Some(user) => TokenUser::NotApproved(user),
    })
}

/// Approved user behind the token, if any.
pub async fn get_user_from_token(
    tx: &mut Transaction<'_, Sqlite>,
    jwt_secret: &str,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    match resolve_token(tx, jwt_secret, jwt_token).await? {
        TokenUser::Approved(user) => Ok(Some(user)),
        _ => Ok(None),
    }
}

#[derive(Debug)]
pub enum Access {
    Granted(User),
    Unauthorized,
    Forbidden,
}

/// Any approved user.
pub async fn require_user(
    tx: &mut Transaction<'_, Sqlite>,
    config: &Config,
    jwt_token: Option<String>,
) -> anyhow::Result<Access> {
    Ok(match get_user_from_token(tx, &config.jwt_secret, jwt_token).await? {
        Some(user) => Access::Granted(user),
        None => Access::Unauthorized,
    })
}

/// Approved user with the admin role.
pub async fn require_admin(
    tx: &mut Transaction<'_, Sqlite>,
    config: &Config,
    jwt_token: Option<String>,
) -> anyhow::Result<Access> {
    Ok(match get_user_from_token(tx, &config.jwt_secret, jwt_token).await? {
        Some(user) if user.is_admin() => Access::Granted(user),
        Some(_) => Access::Forbidden,
        None => Access::Unauthorized,
    })
}

/// Approved user holding `capability` under the configured policy.
pub async fn require_permission(
    tx: &mut Transaction<'_, Sqlite>,
    config: &Config,
    jwt_token: Option<String>,
    capability: &str,
) -> anyhow::Result<Access> {
    Ok(match get_user_from_token(tx, &config.jwt_secret, jwt_token).await? {
        Some(user) if has_permission(&user, capability, config.permission_policy) => {
            Access::Granted(user)
        }
        Some(user) => {
            tracing::info!(
                "user {} denied capability {} (policy {:?})",
                user.username,
                capability,
                config.permission_policy
            );
            Access::Forbidden
        }
        None => Access::Unauthorized,
    })
}


#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
