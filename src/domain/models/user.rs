use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId(Uuid);
impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login(String);
impl Login {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::EmptyLogin);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stable group codes, independent of the `user_groups` row ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCode {
    Admin = 0,
    User = 1,
}

impl GroupCode {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Admin),
            1 => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_code(self) -> i32 {
        self as i32
    }
}

/// Stable state codes, independent of the `user_states` row ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCode {
    Active = 0,
    Blocked = 1,
}

impl StateCode {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Blocked),
            _ => None,
        }
    }

    pub fn as_code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    login: Login,
    created_at: DateTime<Utc>,
    group_id: i32,
    state_id: i32,
}

impl User {
    pub fn new(
        id: Uuid,
        login: Login,
        created_at: DateTime<Utc>,
        group_id: i32,
        state_id: i32,
    ) -> Self {
        Self {
            id: UserId::from_uuid(id),
            login,
            created_at,
            group_id,
            state_id,
        }
    }

    // getters only
    pub fn id(&self) -> &UserId {
        &self.id
    }
    pub fn login(&self) -> &str {
        self.login.as_str()
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn group_id(&self) -> i32 {
        self.group_id
    }
    pub fn state_id(&self) -> i32 {
        self.state_id
    }
}
