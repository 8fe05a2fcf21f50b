//! # Subject registry.
//!
//! Plain data structure mapping subject names to the ordered list of active
//! subscriptions. It does no locking itself: the owning bus keeps it behind a
//! single `RwLock` together with the lifecycle flag.
//!
//! ```text
//! HashMap<String, Vec<Arc<Entry>>>
//!   "orders"  → [#1 audit, #4 mailer]
//!   "metrics" → [#2 sink]
//! ```
//!
//! ## Rules
//! - A subject key exists only while it has at least one entry (empty lists are removed eagerly)
//! - Entries keep insertion order; removal preserves the order of the rest
//! - [`Registry::snapshot`] copies the list so handlers never run under the lock

use std::collections::HashMap;
use std::sync::Arc;

use crate::handlers::HandlerRef;

/// One registered interest.
pub(crate) struct Entry<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) id: u64,
    pub(crate) handler: HandlerRef<M>,
}

impl<M> Entry<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) fn new(id: u64, handler: HandlerRef<M>) -> Arc<Self> {
        Arc::new(Self { id, handler })
    }
}

/// Subject → subscriptions map.
pub(crate) struct Registry<M>
where
    M: Send + Sync + 'static,
{
    subjects: HashMap<String, Vec<Arc<Entry<M>>>>,
}

impl<M> Registry<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            subjects: HashMap::new(),
        }
    }

    /// Appends an entry to the subject's list, creating the subject if needed.
    pub(crate) fn insert(&mut self, subject: &str, entry: Arc<Entry<M>>) {
        self.subjects
            .entry(subject.to_owned())
            .or_default()
            .push(entry);
    }

    /// Removes the entry with the given id.
    ///
    /// Returns `false` when nothing matched (already removed).
    pub(crate) fn remove(&mut self, subject: &str, id: u64) -> bool {
        let Some(entries) = self.subjects.get_mut(subject) else {
            return false;
        };

        let removed = match entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        };

        if entries.is_empty() {
            self.subjects.remove(subject);
        }
        removed
    }

    /// Copies the current subscribers of a subject (empty if unknown).
    pub(crate) fn snapshot(&self, subject: &str) -> Vec<Arc<Entry<M>>> {
        self.subjects.get(subject).cloned().unwrap_or_default()
    }

    /// Number of subjects with at least one subscriber.
    pub(crate) fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Number of subscribers of a subject.
    pub(crate) fn subscriber_count(&self, subject: &str) -> usize {
        self.subjects.get(subject).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerFn;

    fn entry(id: u64) -> Arc<Entry<String>> {
        Entry::new(id, HandlerFn::arc("noop", |_msg: String| async {}))
    }

    fn ids(reg: &Registry<String>, subject: &str) -> Vec<u64> {
        reg.snapshot(subject).iter().map(|e| e.id).collect()
    }

    #[test]
    fn insert_keeps_order() {
        let mut reg = Registry::new();
        reg.insert("a", entry(1));
        reg.insert("a", entry(2));
        reg.insert("a", entry(3));
        reg.insert("b", entry(4));

        assert_eq!(ids(&reg, "a"), vec![1, 2, 3]);
        assert_eq!(reg.subject_count(), 2);
        assert_eq!(reg.subscriber_count("b"), 1);
    }

    #[test]
    fn remove_middle_preserves_rest() {
        let mut reg = Registry::new();
        reg.insert("a", entry(1));
        reg.insert("a", entry(2));
        reg.insert("a", entry(3));

        assert!(reg.remove("a", 2));
        assert_eq!(ids(&reg, "a"), vec![1, 3]);
    }

    #[test]
    fn last_removal_deletes_subject() {
        let mut reg = Registry::new();
        reg.insert("a", entry(1));

        assert!(reg.remove("a", 1));
        assert_eq!(reg.subject_count(), 0);
        assert!(reg.snapshot("a").is_empty());
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut reg = Registry::new();
        reg.insert("a", entry(1));

        assert!(!reg.remove("a", 99));
        assert!(!reg.remove("zzz", 1));
        assert_eq!(ids(&reg, "a"), vec![1]);
    }

    #[test]
    fn empty_subject_is_an_ordinary_key() {
        let mut reg = Registry::new();
        reg.insert("", entry(7));
        assert_eq!(ids(&reg, ""), vec![7]);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut reg = Registry::new();
        reg.insert("a", entry(1));
        let snap = reg.snapshot("a");
        reg.remove("a", 1);
        assert_eq!(snap.len(), 1);
    }
}
