//! Component H: the Pending-Writes Queue.
//!
//! An in-memory FIFO of interaction text waiting to be embedded and
//! indexed into the Vector Store. Commits themselves never block on
//! embedding; the recorder appends to this queue synchronously and a
//! caller (or a background task) drains it into `VectorStore` on its own
//! schedule, matching the original's `_add_to_pending_writes` /
//! `sync_to_vectordb` / `clear_pending_writes` split.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::hash::ObjectHash;
use crate::internal::object::types::CommitSource;
use crate::vectordb::Role;

/// One piece of text awaiting embedding, tied back to the commit it came
/// from.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub commit_id: ObjectHash,
    pub role: Role,
    pub text: String,
    pub files: Vec<String>,
    pub source: CommitSource,
}

/// Thread-safe FIFO queue. `Mutex`-guarded rather than lock-free since
/// writes happen once per commit, not on a hot path.
#[derive(Default)]
pub struct PendingWrites {
    queue: Mutex<VecDeque<PendingWrite>>,
}

impl PendingWrites {
    pub fn new() -> PendingWrites {
        PendingWrites::default()
    }

    pub fn push(&self, write: PendingWrite) {
        self.queue.lock().unwrap().push_back(write);
    }

    pub fn count(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Removes and returns every queued write, in FIFO order, leaving the
    /// queue empty.
    pub fn drain(&self) -> Vec<PendingWrite> {
        self.queue.lock().unwrap().drain(..).collect()
    }

    pub fn clear(&self) {
        self.queue.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashKind, set_hash_kind_for_test};
    use crate::internal::object::types::ObjectType;

    fn write(seed: &str) -> PendingWrite {
        PendingWrite {
            commit_id: ObjectHash::from_type_and_data(ObjectType::Commit, seed.as_bytes()),
            role: Role::Prompt,
            text: seed.to_string(),
            files: vec![],
            source: CommitSource::User,
        }
    }

    #[test]
    fn test_drain_preserves_fifo_order() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let queue = PendingWrites::new();
        queue.push(write("one"));
        queue.push(write("two"));
        assert_eq!(queue.count(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].text, "one");
        assert_eq!(drained[1].text, "two");
        assert_eq!(queue.count(), 0);
    }

    #[test]
    fn test_clear_empties_queue_without_returning_items() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let queue = PendingWrites::new();
        queue.push(write("one"));
        queue.clear();
        assert_eq!(queue.count(), 0);
    }
}
