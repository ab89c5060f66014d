//! In-memory user directory.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::routing::Role;

/// An account as configured.
#[derive(Clone, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// What the API returns about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    /// Identifier is an email or username, compared case-insensitively;
    /// the secret must match exactly.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Option<UserProfile> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return None;
        }
        self.users
            .iter()
            .find(|u| u.email.to_lowercase() == identifier || u.username.to_lowercase() == identifier)
            .filter(|u| u.password == secret)
            .map(UserProfile::from)
    }

    pub fn find(&self, id: &str) -> Option<UserProfile> {
        self.users.iter().find(|u| u.id == id).map(UserProfile::from)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            UserRecord {
                id: "u-1".to_string(),
                email: "Lan.Tran@center.edu".to_string(),
                username: "lantran".to_string(),
                display_name: "Lan Tran".to_string(),
                password: "S3cret!".to_string(),
                role: Role::Teacher,
            },
            UserRecord {
                id: "u-2".to_string(),
                email: "minh@center.edu".to_string(),
                username: "minh".to_string(),
                display_name: "Minh".to_string(),
                password: "pw".to_string(),
                role: Role::Student,
            },
        ])
    }

    #[test]
    fn test_identifier_is_case_insensitive() {
        let dir = directory();
        let user = dir.authenticate("lan.tran@CENTER.edu", "S3cret!").unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.role, Role::Teacher);
        assert!(dir.authenticate("  LANTRAN ", "S3cret!").is_some());
    }

    #[test]
    fn test_secret_is_exact() {
        let dir = directory();
        assert!(dir.authenticate("lantran", "s3cret!").is_none());
        assert!(dir.authenticate("lantran", "").is_none());
        assert!(dir.authenticate("", "pw").is_none());
        assert!(dir.authenticate("nobody", "pw").is_none());
    }

    #[test]
    fn test_find_by_id() {
        let dir = directory();
        assert_eq!(dir.find("u-2").unwrap().username, "minh");
        assert!(dir.find("u-3").is_none());
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_debug_hides_password() {
        let dir = directory();
        let rendered = format!("{dir:?}");
        assert!(!rendered.contains("S3cret!"));
        assert!(rendered.contains("lantran"));
    }
}
