use std::{fs, io::ErrorKind, path::Path};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    core::permission::{self, PermissionHolder, PermissionPolicy},
    schema::user::UserProfileResponse,
};

const EVENT_CAPACITY: usize = 16;

/// Cached copy of the authenticated user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl PermissionHolder for SessionUser {
    fn role(&self) -> &str {
        &self.role
    }

    fn permissions(&self) -> Option<&[String]> {
        Some(&self.permissions)
    }
}

impl From<UserProfileResponse> for SessionUser {
    fn from(value: UserProfileResponse) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            username: value.username,
            role: value.role,
            status: value.status,
            permissions: value.permissions,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    LoggedIn(SessionUser),
    UserUpdated(SessionUser),
    RoleChanged(String),
    PermissionsChanged(Vec<String>),
    LoggedOut,
}

/// Serialized form of a live session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub expires_at: DateTime<FixedOffset>,
    pub user: SessionUser,
}

/// One authenticated identity, owned by whoever drives the client.
///
/// Every mutation is announced on a broadcast channel. Sends never block and
/// are dropped when nobody subscribes.
pub struct SessionCache {
    data: Option<SessionData>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { data: None, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    pub fn login(&mut self, token: String, expires_at: DateTime<FixedOffset>, user: SessionUser) {
        self.data = Some(SessionData {
            token,
            expires_at,
            user: user.clone(),
        });
        self.notify(SessionEvent::LoggedIn(user));
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.data.as_ref().map(|x| &x.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|x| x.token.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<FixedOffset>> {
        self.data.as_ref().map(|x| x.expires_at)
    }

    /// Value for the `Authorization` header.
    pub fn auth_header(&self) -> Option<String> {
        self.token().map(|x| format!("Bearer {}", x))
    }

    pub fn is_authenticated(&self, now: DateTime<FixedOffset>) -> bool {
        match &self.data {
            Some(data) => data.expires_at > now,
            None => false,
        }
    }

    /// Drops the session once its token has expired. Returns true when it did.
    pub fn invalidate_expired(&mut self, now: DateTime<FixedOffset>) -> bool {
        if self.data.is_some() && !self.is_authenticated(now) {
            self.logout();
            return true;
        }
        false
    }

    pub fn has_permission(&self, capability: &str, policy: PermissionPolicy) -> bool {
        match self.current_user() {
            Some(user) => permission::has_permission(user, capability, policy),
            None => false,
        }
    }

    /// Replaces the cached user after the server returned a newer copy.
    pub fn update_user(&mut self, user: SessionUser) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        let role_changed = data.user.role != user.role;
        let permissions_changed = data.user.permissions != user.permissions;
        data.user = user.clone();
        self.notify(SessionEvent::UserUpdated(user.clone()));
        if role_changed {
            self.notify(SessionEvent::RoleChanged(user.role.clone()));
        }
        if permissions_changed {
            self.notify(SessionEvent::PermissionsChanged(user.permissions));
        }
    }

    pub fn set_role(&mut self, role: &str) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        data.user.role = role.to_string();
        self.notify(SessionEvent::RoleChanged(role.to_string()));
    }

    pub fn set_permissions(&mut self, permissions: Vec<String>) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        data.user.permissions = permissions.clone();
        self.notify(SessionEvent::PermissionsChanged(permissions));
    }

    pub fn logout(&mut self) {
        if self.data.take().is_some() {
            self.notify(SessionEvent::LoggedOut);
        }
    }

    /// Writes the session as JSON; an empty cache removes the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        match &self.data {
            Some(data) => {
                let json = serde_json::to_string_pretty(data)?;
                fs::write(path, json)?;
            }
            None => match fs::remove_file(path) {
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            },
        }
        Ok(())
    }

    /// Restores a cache written by [`SessionCache::save`]. A missing file
    /// yields an empty cache.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut cache = Self::new();
        let raw = match fs::read_to_string(path) {
            Ok(val) => val,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(cache),
            Err(err) => return Err(err.into()),
        };
        let data: SessionData = serde_json::from_str(&raw)?;
        cache.data = Some(data);
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::core::{
        permission::{ROLE_ADMIN, ROLE_USER},
        test_utils::generate_random,
        utils::now,
    };

    fn session_user(role: &str, permissions: Vec<&str>) -> SessionUser {
        SessionUser {
            id: "USER-1".to_string(),
            name: "Rahim".to_string(),
            email: "rahim@genesis.com".to_string(),
            username: "rahim".to_string(),
            role: role.to_string(),
            status: "approved".to_string(),
            permissions: permissions.into_iter().map(String::from).collect(),
        }
    }

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("session-{}.json", generate_random::<u64>()))
    }

    #[test]
    fn test_login_and_logout() {
        let mut cache = SessionCache::new();
        let mut rx = cache.subscribe();
        let now = now();

        cache.login(
            "abc".to_string(),
            now + Duration::hours(1),
            session_user(ROLE_USER, vec!["view_product"]),
        );
        assert!(cache.is_authenticated(now));
        assert_eq!(cache.auth_header(), Some("Bearer abc".to_string()));
        assert!(cache.has_permission("view_product", PermissionPolicy::Deny));
        assert!(!cache.has_permission("delete_product", PermissionPolicy::Legacy));
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::LoggedIn(_))));

        cache.logout();
        assert!(cache.current_user().is_none());
        assert!(!cache.has_permission("view_product", PermissionPolicy::Legacy));
        assert_eq!(rx.try_recv(), Ok(SessionEvent::LoggedOut));
    }

    #[test]
    fn test_expired_session_is_invalidated() {
        let mut cache = SessionCache::new();
        let now = now();
        cache.login(
            "abc".to_string(),
            now - Duration::minutes(1),
            session_user(ROLE_USER, vec![]),
        );
        assert!(!cache.is_authenticated(now));
        assert!(cache.invalidate_expired(now));
        assert!(cache.token().is_none());
        assert!(!cache.invalidate_expired(now));
    }

    #[test]
    fn test_update_user_announces_changes() {
        let mut cache = SessionCache::new();
        cache.login(
            "abc".to_string(),
            now() + Duration::hours(1),
            session_user(ROLE_USER, vec!["view_product"]),
        );
        let mut rx = cache.subscribe();

        cache.update_user(session_user(ROLE_ADMIN, vec!["view_product", "view_boq"]));

        assert!(matches!(rx.try_recv(), Ok(SessionEvent::UserUpdated(_))));
        assert_eq!(
            rx.try_recv(),
            Ok(SessionEvent::RoleChanged(ROLE_ADMIN.to_string()))
        );
        assert_eq!(
            rx.try_recv(),
            Ok(SessionEvent::PermissionsChanged(vec![
                "view_product".to_string(),
                "view_boq".to_string()
            ]))
        );
        assert!(cache.has_permission("delete_boq", PermissionPolicy::Deny));
    }

    #[test]
    fn test_set_role_and_permissions() {
        let mut cache = SessionCache::new();
        cache.set_role(ROLE_ADMIN);
        assert!(cache.current_user().is_none());

        cache.login(
            "abc".to_string(),
            now() + Duration::hours(1),
            session_user(ROLE_USER, vec![]),
        );
        let mut rx = cache.subscribe();
        cache.set_permissions(vec!["view_offers".to_string()]);
        assert!(cache.has_permission("view_offers", PermissionPolicy::Deny));
        assert!(!cache.has_permission("create_offer", PermissionPolicy::Deny));
        cache.set_role(ROLE_ADMIN);
        assert!(cache.has_permission("create_offer", PermissionPolicy::Deny));
        assert_eq!(
            rx.try_recv(),
            Ok(SessionEvent::PermissionsChanged(vec![
                "view_offers".to_string()
            ]))
        );
        assert_eq!(
            rx.try_recv(),
            Ok(SessionEvent::RoleChanged(ROLE_ADMIN.to_string()))
        );
    }

    #[test]
    fn test_save_and_load() -> anyhow::Result<()> {
        let path = temp_path();
        let mut cache = SessionCache::new();
        let expires_at = now() + Duration::hours(1);
        cache.login(
            "abc".to_string(),
            expires_at,
            session_user(ROLE_USER, vec!["view_boq"]),
        );
        cache.save(&path)?;

        let loaded = SessionCache::load(&path)?;
        assert_eq!(loaded.token(), Some("abc"));
        assert_eq!(loaded.expires_at(), Some(expires_at));
        assert_eq!(
            loaded.current_user(),
            Some(&session_user(ROLE_USER, vec!["view_boq"]))
        );

        cache.logout();
        cache.save(&path)?;
        assert!(!path.exists());
        assert!(SessionCache::load(&path)?.current_user().is_none());
        Ok(())
    }

    #[test]
    fn test_load_rejects_string_encoded_permissions() -> anyhow::Result<()> {
        let path = temp_path();
        fs::write(
            &path,
            r#"{"token":"abc","expires_at":"2030-01-01T00:00:00Z",
            "user":{"id":"USER-1","name":"a","email":"a@b.c","username":"a",
            "role":"user","status":"approved","permissions":"[\"view_boq\"]"}}"#,
        )?;
        let loaded = SessionCache::load(&path);
        fs::remove_file(&path)?;
        assert!(loaded.is_err());
        Ok(())
    }
}
