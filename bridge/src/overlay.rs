//! Transaction-scoped storage overlay.
//!
//! Every exposed bridge operation runs against a `StateOverlay`: a shadow
//! map of pending writes over the borrowed base store. `commit` flushes the
//! pending writes in one pass; dropping the overlay without committing
//! discards them, which is what gives each operation its all-or-nothing
//! semantics.

use std::collections::BTreeMap;
use std::ops::Bound;

use cosmwasm_std::{Order, Record, Storage};

/// A pending write: `Some` for set, `None` for remove
type PendingOp = Option<Vec<u8>>;

pub struct StateOverlay<'a> {
    base: &'a mut dyn Storage,
    pending: BTreeMap<Vec<u8>, PendingOp>,
}

impl<'a> StateOverlay<'a> {
    pub fn new(base: &'a mut dyn Storage) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// Flush all pending writes to the base store
    pub fn commit(self) {
        let Self { base, pending } = self;
        for (key, op) in pending {
            match op {
                Some(value) => base.set(&key, &value),
                None => base.remove(&key),
            }
        }
    }
}

impl Storage for StateOverlay<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(op) => op.clone(),
            None => self.base.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), None);
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        // merge the base range with the pending ops covering the same bounds
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.range(start, end, Order::Ascending).collect();

        let lower = match start {
            Some(s) => Bound::Included(s.to_vec()),
            None => Bound::Unbounded,
        };
        let upper = match end {
            Some(e) => Bound::Excluded(e.to_vec()),
            None => Bound::Unbounded,
        };
        for (key, op) in self.pending.range((lower, upper)) {
            match op {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        match order {
            Order::Ascending => Box::new(merged.into_iter()),
            Order::Descending => Box::new(merged.into_iter().rev()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    #[test]
    fn writes_are_visible_through_the_overlay() {
        let mut base = MockStorage::new();
        base.set(b"a", b"1");

        let mut overlay = StateOverlay::new(&mut base);
        overlay.set(b"b", b"2");
        overlay.remove(b"a");

        assert_eq!(overlay.get(b"a"), None);
        assert_eq!(overlay.get(b"b"), Some(b"2".to_vec()));
    }

    #[test]
    fn dropping_discards_pending_writes() {
        let mut base = MockStorage::new();
        base.set(b"a", b"1");

        {
            let mut overlay = StateOverlay::new(&mut base);
            overlay.set(b"b", b"2");
            overlay.remove(b"a");
            // dropped without commit
        }

        assert_eq!(base.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(base.get(b"b"), None);
    }

    #[test]
    fn commit_flushes_pending_writes() {
        let mut base = MockStorage::new();
        base.set(b"a", b"1");

        let mut overlay = StateOverlay::new(&mut base);
        overlay.set(b"b", b"2");
        overlay.remove(b"a");
        overlay.commit();

        assert_eq!(base.get(b"a"), None);
        assert_eq!(base.get(b"b"), Some(b"2".to_vec()));
    }

    #[test]
    fn range_merges_base_and_pending() {
        let mut base = MockStorage::new();
        base.set(b"a", b"1");
        base.set(b"c", b"3");

        let mut overlay = StateOverlay::new(&mut base);
        overlay.set(b"b", b"2");
        overlay.set(b"c", b"30");
        overlay.remove(b"a");

        let records: Vec<Record> = overlay.range(None, None, Order::Ascending).collect();
        assert_eq!(
            records,
            vec![
                (b"b".to_vec(), b"2".to_vec()),
                (b"c".to_vec(), b"30".to_vec()),
            ]
        );

        let descending: Vec<Record> = overlay.range(None, None, Order::Descending).collect();
        assert_eq!(descending.len(), 2);
        assert_eq!(descending[0].0, b"c".to_vec());
    }

    #[test]
    fn range_respects_bounds() {
        let mut base = MockStorage::new();
        base.set(b"a", b"1");

        let mut overlay = StateOverlay::new(&mut base);
        overlay.set(b"b", b"2");
        overlay.set(b"d", b"4");

        let records: Vec<Record> = overlay
            .range(Some(b"b"), Some(b"d"), Order::Ascending)
            .collect();
        assert_eq!(records, vec![(b"b".to_vec(), b"2".to_vec())]);
    }
}
