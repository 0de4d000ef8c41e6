//! In-memory store for users and todos.
//!
//! The store owns both collections and the identifier sequence. It enforces
//! that every todo references an existing user at write time and removes a
//! user's todos in the same call that removes the user. Callers provide
//! mutual exclusion (see [`crate::handlers::AppState`]); every method here
//! either fully applies or leaves the store untouched.

use std::collections::BTreeMap;

use tracing::debug;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::id_generator::IdGenerator;
use crate::model::{EntityId, NewTodo, NewUser, Todo, TodoFilter, TodoPatch, User, UserPatch};

#[derive(Debug, Default)]
pub struct EntityStore {
    // Keyed by monotonically issued ids, so iteration order is insertion order.
    users: BTreeMap<EntityId, User>,
    todos: BTreeMap<EntityId, Todo>,
    ids: IdGenerator,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users, or those whose name or email contains `query` ignoring case.
    pub fn list_users(&self, query: Option<&str>) -> Vec<User> {
        match query.filter(|q| !q.is_empty()) {
            Some(q) => {
                let needle = q.to_lowercase();
                self.users
                    .values()
                    .filter(|user| user.matches(&needle))
                    .cloned()
                    .collect()
            }
            None => self.users.values().cloned().collect(),
        }
    }

    pub fn create_user(&mut self, input: NewUser) -> Result<User> {
        input.validate().map_err(|_| ApiError::InvalidUserInput)?;
        let (Some(name), Some(email)) = (input.name, input.email) else {
            return Err(ApiError::InvalidUserInput);
        };

        let user = User {
            id: self.ids.next_id(),
            name,
            email,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<User> {
        self.resolve_user(id)
            .and_then(|id| self.users.get(&id))
            .cloned()
            .ok_or(ApiError::UserNotFound)
    }

    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> Result<User> {
        let user = self
            .resolve_user(id)
            .and_then(|id| self.users.get_mut(&id))
            .ok_or(ApiError::UserNotFound)?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        Ok(user.clone())
    }

    /// Remove a user and every todo it owns. Returns how many todos went with it.
    pub fn delete_user(&mut self, id: &str) -> Result<usize> {
        let id = self.resolve_user(id).ok_or(ApiError::UserNotFound)?;
        self.users.remove(&id);

        let before = self.todos.len();
        self.todos.retain(|_, todo| todo.user_id != id);
        let cascaded = before - self.todos.len();

        debug!(user_id = %id, cascaded, "Deleted user");
        Ok(cascaded)
    }

    pub fn list_todos(&self, filter: &TodoFilter) -> Vec<Todo> {
        self.todos
            .values()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect()
    }

    pub fn create_todo(&mut self, input: NewTodo) -> Result<Todo> {
        input.validate().map_err(|_| ApiError::InvalidTodoInput)?;
        let (Some(user_id), Some(title)) = (input.user_id, input.title) else {
            return Err(ApiError::InvalidTodoInput);
        };
        let user_id = self
            .resolve_user(&user_id)
            .ok_or(ApiError::InvalidReference)?;

        let todo = Todo {
            id: self.ids.next_id(),
            user_id,
            title,
            completed: input.completed.unwrap_or(false),
        };
        self.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    pub fn get_todo(&self, id: &str) -> Result<Todo> {
        EntityId::parse(id)
            .and_then(|id| self.todos.get(&id))
            .cloned()
            .ok_or(ApiError::TodoNotFound)
    }

    pub fn update_todo(&mut self, id: &str, patch: TodoPatch) -> Result<Todo> {
        let todo_id = EntityId::parse(id)
            .filter(|id| self.todos.contains_key(id))
            .ok_or(ApiError::TodoNotFound)?;

        // Resolve the new owner before touching the todo so a bad reference
        // leaves it unmodified.
        let new_owner = match patch.user_id.as_deref() {
            Some(raw) => Some(self.resolve_user(raw).ok_or(ApiError::InvalidReference)?),
            None => None,
        };

        let todo = self
            .todos
            .get_mut(&todo_id)
            .ok_or(ApiError::TodoNotFound)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(user_id) = new_owner {
            todo.user_id = user_id;
        }
        Ok(todo.clone())
    }

    pub fn delete_todo(&mut self, id: &str) -> Result<()> {
        EntityId::parse(id)
            .and_then(|id| self.todos.remove(&id))
            .map(|_| ())
            .ok_or(ApiError::TodoNotFound)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn todo_count(&self) -> usize {
        self.todos.len()
    }

    /// Id of an existing user, if `raw` names one.
    fn resolve_user(&self, raw: &str) -> Option<EntityId> {
        EntityId::parse(raw).filter(|id| self.users.contains_key(id))
    }
}
