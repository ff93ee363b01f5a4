use core::ptr::NonNull;

use alloc::vec::Vec;

use super::chain::Node;
use super::error::ListError;

/// Identifier of one cursor registered with a list.
///
/// A `CursorId` is a plain value: copying it does not duplicate the cursor
/// (`cursor_fork` does that), and it is meaningful only for the list that
/// issued it. Identifiers are drawn from a counter that never repeats
/// within a list's lifetime, so a released identifier cannot silently alias
/// a later cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CursorId(u64);

struct CursorEntry<T> {
    id: CursorId,
    node: NonNull<Node<T>>,
}

/// The cursor table: one entry per live cursor, ordered by identifier.
///
/// Identifiers increase monotonically and entries are appended, so the
/// vector is sorted by construction and lookup is a binary search. The
/// `node` field is a relation, never ownership; the removal protocol in
/// `list.rs` guarantees no entry outlives its target.
pub(super) struct CursorTable<T> {
    entries: Vec<CursorEntry<T>>,
    next_id: u64,
}

impl<T> CursorTable<T> {
    pub(super) const fn new() -> Self {
        CursorTable {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(super) fn with_capacity(capacity: usize) -> Self {
        CursorTable {
            entries: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a fresh cursor targeting `node` and returns its
    /// identifier.
    pub(super) fn allocate(&mut self, node: NonNull<Node<T>>) -> CursorId {
        let id = CursorId(self.next_id);
        self.next_id += 1;
        self.entries.push(CursorEntry { id, node });
        id
    }

    fn position(&self, id: CursorId) -> Result<usize, ListError> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .map_err(|_| ListError::InvalidCursor)
    }

    pub(super) fn target(&self, id: CursorId) -> Result<NonNull<Node<T>>, ListError> {
        self.position(id).map(|idx| self.entries[idx].node)
    }

    pub(super) fn set_target(
        &mut self,
        id: CursorId,
        node: NonNull<Node<T>>,
    ) -> Result<(), ListError> {
        let idx = self.position(id)?;
        self.entries[idx].node = node;
        Ok(())
    }

    /// Moves every entry aimed at `old` onto `new`.
    ///
    /// Must run before `old`'s memory is released and inside the same
    /// exclusive critical section as the removal itself.
    pub(super) fn retarget(&mut self, old: NonNull<Node<T>>, new: NonNull<Node<T>>) {
        for entry in &mut self.entries {
            if entry.node == old {
                entry.node = new;
            }
        }
    }

    /// Drops one entry, compacting the table. The surviving entries keep
    /// their identifiers and targets.
    pub(super) fn remove(&mut self, id: CursorId) -> Result<(), ListError> {
        let idx = self.position(id)?;
        self.entries.remove(idx);
        Ok(())
    }

    /// Discards every entry at once. Identifier issuance is not reset.
    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}
