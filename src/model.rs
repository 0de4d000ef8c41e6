//! Entities, request payloads and list filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Opaque entity identifier.
///
/// Issued by [`crate::id_generator::IdGenerator`] and exposed on the wire as a
/// decimal string. Ordering follows issue order, which is also insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Resolve a client-supplied id. Anything that could not have been issued
    /// by the generator yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Reject forms like "+1" or "01" so an id has exactly one spelling
        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("'{}' is not an entity id", s));
        }
        s.parse::<u64>().map(EntityId).map_err(|e| e.to_string())
    }
}

impl TryFrom<String> for EntityId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Case-insensitive substring match on name or email.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub completed: bool,
}

/// Body of `POST /api/users`. Both fields must be present and non-empty.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewUser {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// Body of `PATCH /api/users/:id`.
///
/// An absent field leaves the stored value alone; a present one is applied
/// as given, including the empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Body of `POST /api/todos`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Body of `PATCH /api/todos/:id`. Same presence semantics as [`UserPatch`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub user_id: Option<String>,
}

/// Exact-match filters for listing todos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub user_id: Option<String>,
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub(crate) fn matches(&self, todo: &Todo) -> bool {
        let user_ok = self
            .user_id
            .as_deref()
            .map_or(true, |wanted| todo.user_id.to_string() == wanted);
        let completed_ok = self.completed.map_or(true, |wanted| todo.completed == wanted);
        user_ok && completed_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_serializes_as_string() {
        let json = serde_json::to_string(&EntityId::new(42)).unwrap();
        assert_eq!(json, r#""42""#);
    }

    #[test]
    fn test_entity_id_parse_rejects_foreign_spellings() {
        assert_eq!(EntityId::parse("7"), Some(EntityId::new(7)));
        assert_eq!(EntityId::parse("07"), None);
        assert_eq!(EntityId::parse("+7"), None);
        assert_eq!(EntityId::parse("0"), None);
        assert_eq!(EntityId::parse("abc"), None);
        assert_eq!(EntityId::parse(""), None);
    }

    #[test]
    fn test_todo_uses_camel_case() {
        let todo = Todo {
            id: EntityId::new(3),
            user_id: EntityId::new(1),
            title: "Ship it".to_string(),
            completed: false,
        };
        let value = serde_json::to_value(&todo).unwrap();
        assert_eq!(value["userId"], "1");
        assert_eq!(value["id"], "3");
    }

    #[test]
    fn test_new_user_validation() {
        assert!(NewUser::new("Ada", "ada@example.com").validate().is_ok());
        assert!(NewUser::new("", "ada@example.com").validate().is_err());
        assert!(NewUser::default().validate().is_err());
    }

    #[test]
    fn test_new_todo_validation() {
        assert!(NewTodo::new("1", "Write tests").validate().is_ok());
        assert!(NewTodo::new("1", "").validate().is_err());
        let missing_user = NewTodo {
            user_id: None,
            ..NewTodo::new("1", "Write tests")
        };
        assert!(missing_user.validate().is_err());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_empty() {
        let patch: UserPatch = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some(""));
        assert!(patch.email.is_none());
    }

    #[test]
    fn test_user_matches_case_insensitively() {
        let user = User {
            id: EntityId::new(1),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(user.matches("love"));
        assert!(user.matches("example"));
        assert!(!user.matches("turing"));
    }
}
