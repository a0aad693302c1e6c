//! Identifier strategies.
//!
//! An entity chooses exactly one of these through `Resource::Ids`. The store
//! keeps the generator under its write lock, so ids are drawn one at a time.

use uuid::Uuid;

/// Produces fresh identifiers for newly created records.
pub trait IdStrategy: Send + Sync + 'static {
    type Id;

    fn next_id(&mut self) -> Self::Id;
}

/// Random v4 UUIDs, safe to expose outside the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdStrategy for UuidIds {
    type Id = Uuid;

    fn next_id(&mut self) -> Uuid { Uuid::new_v4() }
}

/// Monotonic integer keys. Numbers are never handed out twice, even after
/// the record holding them is deleted.
#[derive(Debug, Clone, Copy)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self { Self { next: first } }
}

impl Default for SequentialIds {
    fn default() -> Self { Self::starting_at(1) }
}

impl IdStrategy for SequentialIds {
    type Id = u64;

    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_starts_at_one_and_counts_up() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        let mut ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_id(), 100);
    }

    #[test]
    fn uuids_differ() {
        let mut ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
