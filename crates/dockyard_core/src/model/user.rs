//! User account record.

use super::{require_email, require_text, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "user";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    /// Stored as given; credential hashing belongs to the auth layer.
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: 0,
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email(ENTITY, &self.email)?;
        require_text(ENTITY, "password", &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::User;

    #[test]
    fn serialized_user_omits_password() {
        let user = User::new("example@example.com", "hello1234");
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("example@example.com"));
        assert!(!json.contains("hello1234"));
    }

    #[test]
    fn validate_requires_password() {
        assert!(User::new("example@example.com", "").validate().is_err());
        assert!(User::new("example@example.com", "x").validate().is_ok());
    }
}
