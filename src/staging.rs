//! In-memory staging store for tasks awaiting analysis.
//!
//! The `StagingStore` is the only owner of the staged list. Input adapters
//! write through `add` and `replace_all`; everything else reads a snapshot.

use crate::task::TaskRecord;

/// Ordered, ephemeral collection of staged tasks.
#[derive(Debug, Default)]
pub struct StagingStore {
    tasks: Vec<TaskRecord>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Ids are not checked for collisions.
    pub fn add(&mut self, record: TaskRecord) {
        self.tasks.push(record);
    }

    /// Discard the current contents and take the new sequence as is.
    pub fn replace_all(&mut self, records: Vec<TaskRecord>) {
        self.tasks = records;
    }

    /// Current staged tasks in insertion order.
    pub fn snapshot(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Generate the next available task id (max + 1, or 1 when empty).
    ///
    /// `None` once a staged id is already `i64::MAX`.
    pub fn next_id(&self) -> Option<i64> {
        self.max_id().unwrap_or(0).checked_add(1)
    }

    /// Largest staged id, if anything is staged.
    pub fn max_id(&self) -> Option<i64> {
        self.tasks.iter().map(|t| t.id).max()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64) -> TaskRecord {
        TaskRecord::from_raw(&json!({ "id": id }), 1)
    }

    #[test]
    fn next_id_starts_at_one_and_follows_the_maximum() {
        let mut store = StagingStore::new();
        assert_eq!(store.next_id(), Some(1));
        store.add(record(7));
        store.add(record(2));
        assert_eq!(store.next_id(), Some(8));
    }

    #[test]
    fn next_id_is_none_when_the_largest_id_is_max() {
        let mut store = StagingStore::new();
        store.replace_all(vec![record(3), record(i64::MAX)]);
        assert_eq!(store.next_id(), None);
        assert_eq!(store.max_id(), Some(i64::MAX));
    }

    #[test]
    fn replace_all_discards_previous_contents() {
        let mut store = StagingStore::new();
        store.add(record(1));
        store.replace_all(vec![record(5), record(5)]);
        let ids: Vec<i64> = store.snapshot().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 5]);
    }
}
