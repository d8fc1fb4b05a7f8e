use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A registered user.
///
/// The credential is an opaque secret supplied by the caller (already hashed);
/// it is skipped on serialization so it can never leak through a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub credential: String,
}

impl User {
    pub fn new(name: String, email: String, credential: String) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            credential,
        }
    }

    /// Public identity of this user, without the credential.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity annotation attached to projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_is_not_serialized() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "argon2$secret".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["name"], "Ada");
        assert!(json.get("credential").is_none());
    }

    #[test]
    fn test_summary_matches_user() {
        let user = User::new("Ada".to_string(), "ada@example.com".to_string(), "x".to_string());
        let summary = user.summary();
        assert_eq!(summary.id, user.id);
        assert_eq!(summary.email, "ada@example.com");
    }
}
