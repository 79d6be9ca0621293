// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Signed-in user context, hydrated from and written back to a key/value
//! client-state store.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{UserId, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClientStateKey {
    UserRole,
    UserId,
    CompanyName,
    JobRole,
    Subdomain,
    UserEmail,
    UserPhone,
    Theme,
}

impl ClientStateKey {
    pub const ALL: [Self; 8] = [
        Self::UserRole,
        Self::UserId,
        Self::CompanyName,
        Self::JobRole,
        Self::Subdomain,
        Self::UserEmail,
        Self::UserPhone,
        Self::Theme,
    ];

    /// Keys owned by the sign-in; sign-out removes these and nothing else.
    pub const SESSION: [Self; 7] = [
        Self::UserRole,
        Self::UserId,
        Self::CompanyName,
        Self::JobRole,
        Self::Subdomain,
        Self::UserEmail,
        Self::UserPhone,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRole => "userRole",
            Self::UserId => "userID",
            Self::CompanyName => "companyName",
            Self::JobRole => "jobRole",
            Self::Subdomain => "subdomain",
            Self::UserEmail => "userEmail",
            Self::UserPhone => "userPhone",
            Self::Theme => "theme",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Persistent string map keyed by [`ClientStateKey`].
pub trait ClientStateStore {
    fn get_state(&self, key: ClientStateKey) -> Result<Option<String>>;
    fn put_state(&self, key: ClientStateKey, value: &str) -> Result<()>;
    fn remove_state(&self, key: ClientStateKey) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub role: Option<UserRole>,
    pub company_name: Option<String>,
    pub job_role: Option<String>,
    pub subdomain: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub theme: Theme,
}

impl Session {
    pub fn hydrate(store: &dyn ClientStateStore) -> Result<Self> {
        let role = match read(store, ClientStateKey::UserRole)? {
            Some(code) => {
                let role = UserRole::parse(&code);
                if role.is_none() {
                    warn!(code = %code, "ignoring unknown stored user role");
                }
                role
            }
            None => None,
        };
        let theme = match read(store, ClientStateKey::Theme)? {
            Some(value) => Theme::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "ignoring unknown stored theme");
                Theme::default()
            }),
            None => Theme::default(),
        };
        Ok(Self {
            user_id: read(store, ClientStateKey::UserId)?.map(UserId::from),
            role,
            company_name: read(store, ClientStateKey::CompanyName)?,
            job_role: read(store, ClientStateKey::JobRole)?,
            subdomain: read(store, ClientStateKey::Subdomain)?,
            email: read(store, ClientStateKey::UserEmail)?,
            phone: read(store, ClientStateKey::UserPhone)?,
            theme,
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.as_ref().is_some_and(|id| !id.is_empty())
    }

    /// Write every session key; absent values are removed from the store.
    pub fn persist(&self, store: &dyn ClientStateStore) -> Result<()> {
        for key in ClientStateKey::ALL {
            match self.value(key) {
                Some(value) => store
                    .put_state(key, &value)
                    .with_context(|| format!("persist {}", key.as_str()))?,
                None => store
                    .remove_state(key)
                    .with_context(|| format!("clear {}", key.as_str()))?,
            }
        }
        debug!(user = ?self.user_id, "session persisted");
        Ok(())
    }

    /// Forget the signed-in user. The theme preference survives.
    pub fn sign_out(&mut self, store: &dyn ClientStateStore) -> Result<()> {
        for key in ClientStateKey::SESSION {
            store
                .remove_state(key)
                .with_context(|| format!("clear {}", key.as_str()))?;
        }
        *self = Self {
            theme: self.theme,
            ..Self::default()
        };
        Ok(())
    }

    pub fn set_theme(&mut self, store: &dyn ClientStateStore, theme: Theme) -> Result<()> {
        store
            .put_state(ClientStateKey::Theme, theme.as_str())
            .context("persist theme")?;
        self.theme = theme;
        Ok(())
    }

    pub fn value(&self, key: ClientStateKey) -> Option<String> {
        match key {
            ClientStateKey::UserRole => self.role.map(|role| role.code().to_owned()),
            ClientStateKey::UserId => self.user_id.as_ref().map(|id| id.as_str().to_owned()),
            ClientStateKey::CompanyName => self.company_name.clone(),
            ClientStateKey::JobRole => self.job_role.clone(),
            ClientStateKey::Subdomain => self.subdomain.clone(),
            ClientStateKey::UserEmail => self.email.clone(),
            ClientStateKey::UserPhone => self.phone.clone(),
            ClientStateKey::Theme => Some(self.theme.as_str().to_owned()),
        }
    }
}

fn read(store: &dyn ClientStateStore, key: ClientStateKey) -> Result<Option<String>> {
    let value = store
        .get_state(key)
        .with_context(|| format!("read {}", key.as_str()))?;
    Ok(value.filter(|value| !value.is_empty()))
}
