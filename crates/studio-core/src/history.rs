//! Linear modification history with a movable cursor
//!
//! Each entry stores the state produced by its modification; the state
//! before the first entry is kept separately, so undo and redo restore
//! snapshots rather than replaying inverses.

use crate::constants::DEFAULT_HISTORY_CAPACITY;
use crate::modification::Modification;

/// An applied modification and the state right after it
#[derive(Debug, Clone)]
pub struct HistoryEntry<S> {
    pub modification: Modification,
    pub state: S,
}

/// Ordered log of applied modifications
///
/// Invariant: `-1 <= index() < len()`.
#[derive(Debug, Clone)]
pub struct History<S> {
    entries: Vec<HistoryEntry<S>>,
    /// Position of the current entry; `None` means before the first entry
    cursor: Option<usize>,
    /// State before `entries[0]`
    initial: S,
    capacity: usize,
}

impl<S: Clone> History<S> {
    pub fn new(initial: S) -> Self {
        Self::with_capacity(initial, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(initial: S, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            initial,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `-1` when nothing is applied
    pub fn index(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[HistoryEntry<S>] {
        &self.entries
    }

    pub fn modifications(&self) -> impl Iterator<Item = &Modification> {
        self.entries.iter().map(|e| &e.modification)
    }

    pub fn current(&self) -> Option<&HistoryEntry<S>> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Timestamp that keeps the log non-decreasing
    pub fn stamp(&self, now_ms: u64) -> u64 {
        let last = self
            .current()
            .or_else(|| self.entries.last())
            .map_or(0, |e| e.modification.timestamp);
        now_ms.max(last)
    }

    /// Append after the cursor, discarding any redo branch
    pub fn push(&mut self, modification: Modification, state: S) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(HistoryEntry {
            modification,
            state,
        });

        if self.entries.len() > self.capacity {
            let dropped = self.entries.remove(0);
            self.initial = dropped.state;
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }

    /// Step back; returns the state to restore
    pub fn undo(&mut self) -> Option<&S> {
        let cursor = self.cursor?;
        self.cursor = cursor.checked_sub(1);
        Some(match self.cursor {
            Some(c) => &self.entries[c].state,
            None => &self.initial,
        })
    }

    /// Step forward; returns the state to restore
    pub fn redo(&mut self) -> Option<&S> {
        let next = self.cursor.map_or(0, |c| c + 1);
        let entry = self.entries.get(next)?;
        self.cursor = Some(next);
        Some(&entry.state)
    }

    /// Forget everything and start over from `initial`
    pub fn clear(&mut self, initial: S) {
        self.entries.clear();
        self.cursor = None;
        self.initial = initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modification::ModificationKind;

    fn m(name: &str) -> Modification {
        Modification::new(ModificationKind::Select {
            target: name.to_string(),
        })
    }

    fn names(history: &History<u32>) -> Vec<String> {
        history
            .modifications()
            .map(|m| match &m.kind {
                ModificationKind::Select { target } => target.clone(),
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_monotonic_index() {
        let mut history = History::new(0u32);
        assert_eq!(history.index(), -1);
        for i in 0..5 {
            history.push(m("a"), i);
            assert_eq!(history.index(), i as isize);
            assert_eq!(history.len(), i as usize + 1);
        }
    }

    #[test]
    fn test_redo_branch_truncation() {
        let mut history = History::new(0u32);
        history.push(m("A"), 1);
        history.push(m("B"), 2);
        history.push(m("C"), 3);
        assert_eq!(history.undo(), Some(&2));
        history.push(m("D"), 4);
        assert_eq!(names(&history), ["A", "B", "D"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_to_initial_and_redo() {
        let mut history = History::new(10u32);
        history.push(m("A"), 11);
        assert_eq!(history.undo(), Some(&10));
        assert_eq!(history.index(), -1);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&11));
        assert_eq!(history.redo(), None);
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::with_capacity(0u32, 2);
        history.push(m("A"), 1);
        history.push(m("B"), 2);
        history.push(m("C"), 3);
        assert_eq!(names(&history), ["B", "C"]);
        assert_eq!(history.index(), 1);
        history.undo();
        // Initial state is now the state after "A"
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_stamp_never_goes_backwards() {
        let mut history = History::new(0u32);
        let mut first = m("A");
        first.timestamp = history.stamp(100);
        history.push(first, 1);
        assert_eq!(history.stamp(50), 100);
        assert_eq!(history.stamp(150), 150);
    }
}
