//! # Cursored Doubly Linked List
//!
//! A thread-safe doubly linked list that owns its nodes and is iterated
//! through stable *cursor handles* instead of borrowing iterators. A cursor
//! is a plain [`CursorId`] value; it stays usable while the list is
//! mutated, because every structural edit retargets or invalidates the
//! outstanding cursors as part of the same critical section.
//!
//! ## Core components
//!
//! - [`list::CursoredList`]: the list itself, every operation locked behind
//!   one per-list reader-writer lock.
//! - [`traits::ElementOps`]: the capability seam through which the list
//!   duplicates, disposes of, compares and orders elements. One strategy is
//!   injected per list; [`traits::CloneOps`] is the default.
//! - [`error`]: the failure kinds plus the [`error::Advance`] and
//!   [`error::Removal`] outcome signals.
//!
//! ## Cursor validity
//!
//! Removing a node moves every cursor aimed at it to the node's successor,
//! or to its predecessor when the tail is removed. Removing the last
//! element invalidates all cursors, as does any cursor operation that
//! observes an empty list. Cursor identifiers are issued from a counter
//! that never repeats within a list's lifetime, so a released identifier
//! cannot come back to life aliasing a newer cursor.
//!
//! ## Safety
//!
//! Nodes are linked through raw pointers and the cursor table stores raw
//! node addresses. All of that state lives behind the list's lock: shared
//! access for shape reads, exclusive access for any edit of the chain or
//! the table. The lock is what keeps the stored addresses valid while they
//! are dereferenced.
//!
//! ```
//! use cursor_collections::linked_list::cursored::prelude::*;
//!
//! let list: CursoredList<i32> = CursoredList::new();
//! list.push_back(&1).unwrap();
//! list.push_back(&2).unwrap();
//! list.push_back(&3).unwrap();
//!
//! // A cursor is a plain identifier, not a borrow.
//! let cur = list.cursor().unwrap();
//! list.cursor_next(cur).unwrap();
//! assert_eq!(list.cursor_with(cur, |v| *v), Ok(2));
//!
//! // Structural mutation retargets it instead of leaving it dangling.
//! list.remove_by_key(&2).unwrap();
//! assert_eq!(list.cursor_with(cur, |v| *v), Ok(3));
//! ```

mod chain;
mod registry;

pub mod error;
pub mod list;
pub mod traits;

#[cfg(test)]
mod tests;

pub use error::{Advance, ListError, Removal};
pub use list::{CursoredList, CursoredListBuilder};
pub use registry::CursorId;
pub use traits::{CloneOps, ElementOps};

pub mod prelude {
    pub use super::error::{Advance, ListError, Removal};
    pub use super::list::{CursoredList, CursoredListBuilder};
    pub use super::registry::CursorId;
    pub use super::traits::{CloneOps, ElementOps};
}
