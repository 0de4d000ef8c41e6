//! Process-wide identifier sequence shared by users and todos.

use crate::model::EntityId;

/// Monotonic counter handing out entity identifiers.
///
/// Starts at 1 and never reuses a value, so an id refers to at most one
/// entity over the lifetime of the store.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id().to_string(), "1");
        assert_eq!(ids.next_id().to_string(), "2");
    }

    #[test]
    fn test_never_repeats() {
        let mut ids = IdGenerator::new();
        let issued: Vec<EntityId> = (0..50).map(|_| ids.next_id()).collect();
        let mut deduped = issued.clone();
        deduped.dedup();
        assert_eq!(issued, deduped);
        assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
