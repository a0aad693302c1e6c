use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::{Resource, UuidIds};

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input; `email` must be unique among users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

impl NewUser {
    /// Validating constructor.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Result<Self, ServiceError> {
        let input = Self { email: email.into(), name: name.into() };
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_email(&self.email)?;
        validate_name(&self.name)
    }
}

/// Only the display name is mutable after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: String,
}

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ServiceError::invalid("email", "email is required"));
    }
    if !email.contains('@') {
        return Err(ServiceError::invalid("email", "email must contain '@'"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::invalid("name", "name is required"));
    }
    Ok(())
}

impl User {
    /// Rename the user, refreshing `updated_at`.
    pub fn update_name(&mut self, name: impl Into<String>, at: DateTime<Utc>) -> Result<(), ServiceError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.updated_at = at;
        Ok(())
    }
}

impl Resource for User {
    type Id = Uuid;
    type Ids = UuidIds;
    type Input = NewUser;
    type Patch = UserPatch;

    const KIND: &'static str = "user";

    fn validate(input: &NewUser) -> Result<(), ServiceError> {
        input.validate()
    }

    fn build(id: Uuid, input: NewUser, now: DateTime<Utc>) -> Self {
        User { id, email: input.email, name: input.name, created_at: now, updated_at: now }
    }

    fn apply(&mut self, patch: UserPatch) -> Result<(), ServiceError> {
        let at = self.updated_at;
        self.update_name(patch.name, at)
    }

    fn id(&self) -> &Uuid { &self.id }

    fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    fn set_updated_at(&mut self, at: DateTime<Utc>) { self.updated_at = at; }

    fn unique_key(&self) -> Option<&str> { Some(&self.email) }

    fn input_unique_key(input: &NewUser) -> Option<&str> { Some(&input.email) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_rejects_bad_fields() {
        assert!(matches!(NewUser::new("", "A"), Err(ServiceError::InvalidField { field: "email", .. })));
        assert!(matches!(NewUser::new("no-at-sign", "A"), Err(ServiceError::InvalidField { field: "email", .. })));
        assert!(matches!(NewUser::new("a@b.c", ""), Err(ServiceError::InvalidField { field: "name", .. })));
        assert!(NewUser::new("a@b.c", "A").is_ok());
    }

    #[test]
    fn update_name_validates_before_mutating() {
        let now = Utc::now();
        let mut u = User { id: Uuid::new_v4(), email: "a@b.c".into(), name: "A".into(), created_at: now, updated_at: now };
        assert!(u.update_name("", now).is_err());
        assert_eq!(u.name, "A");
        u.update_name("B", now).unwrap();
        assert_eq!(u.name, "B");
    }
}
