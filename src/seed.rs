//! Demo users and todos for a freshly started service.

use crate::error::Result;
use crate::model::{NewTodo, NewUser};
use crate::store::EntityStore;

/// Populate `store` through the regular create operations, so seeded ids come
/// from the same sequence as everything created later.
pub fn seed_demo_data(store: &mut EntityStore) -> Result<()> {
    let ada = store.create_user(NewUser::new("Ada Lovelace", "ada@example.com"))?;
    let alan = store.create_user(NewUser::new("Alan Turing", "alan@example.com"))?;

    let ada_id = ada.id.to_string();
    store.create_todo(NewTodo::new(&ada_id, "Write the first program").completed(true))?;
    store.create_todo(NewTodo::new(&ada_id, "Review analytical engine notes"))?;
    store.create_todo(NewTodo::new(alan.id.to_string(), "Break Enigma"))?;

    Ok(())
}
