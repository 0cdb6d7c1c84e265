use lazy_static::lazy_static;
use tracing::warn;

use crate::auth::dto::PublicUser;
use crate::auth::password::{hash_password, verify_password};
use crate::config::StaticUserConfig;

lazy_static! {
    /// Verified against when the username is unknown, so both branches cost one Argon2 pass.
    static ref DUMMY_HASH: Option<String> = hash_password("cryptorelay-unknown-user").ok();
}

/// The one account known to the service. Never created through the API.
#[derive(Debug, Clone)]
pub struct StaticUser {
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
}

impl StaticUser {
    pub fn from_config(cfg: &StaticUserConfig) -> Self {
        Self {
            email: cfg.username.clone(),
            hashed_password: cfg.password_hash.clone(),
            is_active: true,
        }
    }

    /// Looks the user up by name; `None` for anyone else.
    pub fn find(&self, username: &str) -> Option<&StaticUser> {
        (self.email == username).then_some(self)
    }

    /// Returns the user when both name and password match an active account.
    pub fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<Option<&StaticUser>> {
        let Some(user) = self.find(username) else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            warn!(%username, "login unknown user");
            return Ok(None);
        };
        if !verify_password(password, &user.hashed_password)? {
            warn!(%username, "login invalid password");
            return Ok(None);
        }
        if !user.is_active {
            warn!(%username, "login inactive user");
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            email: self.email.clone(),
            is_active: self.is_active,
        }
    }
}
