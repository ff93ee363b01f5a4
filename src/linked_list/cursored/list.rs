use core::fmt;
use core::ptr::NonNull;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crossbeam_utils::CachePadded;
use spin::RwLock;

use super::chain::{Chain, Node};
use super::error::{Advance, ListError, Removal};
use super::registry::{CursorId, CursorTable};
use super::traits::{CloneOps, ElementOps};

/// Everything the list lock guards: the node chain and the cursor table.
/// Keeping them in one guarded value is what makes a structural edit and
/// its cursor update a single observable step.
struct ListState<T> {
    chain: Chain<T>,
    cursors: CursorTable<T>,
}

impl<T> ListState<T> {
    const fn new() -> Self {
        ListState {
            chain: Chain::new(),
            cursors: CursorTable::new(),
        }
    }

    /// First node matching `pred`, scanning front to back.
    fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<NonNull<Node<T>>> {
        let mut current = self.chain.head();
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            if pred(&node_ref.element) {
                return Some(node);
            }
            current = node_ref.next;
        }
        None
    }

    /// Unlinks `node` and returns its element, after moving every cursor
    /// aimed at it: to the successor for a head or interior node, to the
    /// predecessor for the tail, or clearing the whole table when the list
    /// becomes empty. Runs once per removal, inside the caller's write
    /// guard.
    ///
    /// # Safety
    ///
    /// `node` must be linked in this state's chain.
    unsafe fn remove_node(&mut self, node: NonNull<Node<T>>) -> T {
        let replacement = {
            let node_ref = unsafe { node.as_ref() };
            if node_ref.next.is_some() {
                node_ref.next
            } else {
                node_ref.prev
            }
        };
        let boxed = unsafe { self.chain.unlink(node) };
        match replacement {
            Some(new) => self.cursors.retarget(node, new),
            None => self.cursors.clear(),
        }
        boxed.element
    }
}

/// A thread-safe doubly linked list addressed through stable cursors.
///
/// Elements enter the list as duplicates produced by the injected
/// [`ElementOps`] strategy and leave it through the strategy's `release`
/// hook. Iteration happens through [`CursorId`] handles that survive
/// structural mutation; see the module documentation for the retargeting
/// rules.
///
/// All operations take `&self`: the node chain, length and cursor table
/// live behind one reader-writer lock, acquired shared for shape reads and
/// exclusive for any edit of the chain or the table.
pub struct CursoredList<T, O: ElementOps<T> = CloneOps> {
    state: CachePadded<RwLock<ListState<T>>>,
    ops: O,
}

// The chain and table hold raw node pointers, so the auto traits bail out.
// The lock serializes every dereference; what remains is the element type's
// own thread affinity. `Sync` needs `T: Send` as well because a shared list
// moves elements in and out across threads.
unsafe impl<T: Send, O: ElementOps<T> + Send> Send for CursoredList<T, O> {}
unsafe impl<T: Send + Sync, O: ElementOps<T> + Sync> Sync for CursoredList<T, O> {}

impl<T, O: ElementOps<T> + Default> CursoredList<T, O> {
    /// Creates an empty list with the default element strategy.
    pub fn new() -> Self {
        Self::with_ops(O::default())
    }
}

impl<T, O: ElementOps<T> + Default> Default for CursoredList<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O: ElementOps<T>> CursoredList<T, O> {
    /// Creates an empty list around the given element strategy.
    pub fn with_ops(ops: O) -> Self {
        CursoredList {
            state: CachePadded::new(RwLock::new(ListState::new())),
            ops,
        }
    }

    /// Number of elements, under shared access.
    pub fn len(&self) -> usize {
        self.state.read().chain.len()
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live cursors.
    pub fn cursor_count(&self) -> usize {
        self.state.read().cursors.len()
    }

    /// Clears the cursor table of a list observed empty. Stale handles
    /// cannot target anything meaningful, so they are swept eagerly.
    fn invalidate(state: &mut ListState<T>) {
        if !state.cursors.is_empty() {
            log::warn!(
                "list is empty, invalidating {} outstanding cursor(s)",
                state.cursors.len()
            );
            state.cursors.clear();
        }
    }

    /// Runs `f` under shared access once the list is known non-empty.
    ///
    /// Observing an empty list must clear the cursor table, which is a
    /// mutation, so the empty case re-acquires the lock exclusively and
    /// re-checks before sweeping (the lock cannot upgrade in place).
    fn read_nonempty<R>(
        &self,
        f: impl FnOnce(&ListState<T>) -> Result<R, ListError>,
    ) -> Result<R, ListError> {
        let state = self.state.read();
        if !state.chain.is_empty() {
            return f(&state);
        }
        drop(state);
        let mut state = self.state.write();
        if state.chain.is_empty() {
            Self::invalidate(&mut state);
            return Err(ListError::Empty);
        }
        f(&state)
    }

    /// Exclusive-access analogue of [`Self::read_nonempty`] for cursor
    /// mutations.
    fn write_nonempty<R>(
        &self,
        f: impl FnOnce(&mut ListState<T>) -> Result<R, ListError>,
    ) -> Result<R, ListError> {
        let mut state = self.state.write();
        if state.chain.is_empty() {
            Self::invalidate(&mut state);
            return Err(ListError::Empty);
        }
        f(&mut state)
    }

    /// Appends a duplicate of `elem` at the back.
    pub fn push_back(&self, elem: &T) -> Result<(), ListError> {
        let dup = self.ops.duplicate(elem).ok_or(ListError::Alloc)?;
        self.state.write().chain.push_back(Node::new(dup));
        Ok(())
    }

    /// Prepends a duplicate of `elem` at the front.
    pub fn push_front(&self, elem: &T) -> Result<(), ListError> {
        let dup = self.ops.duplicate(elem).ok_or(ListError::Alloc)?;
        self.state.write().chain.push_front(Node::new(dup));
        Ok(())
    }

    /// Inserts a duplicate of `elem`, keeping the list ascending per
    /// `ElementOps::is_smaller`.
    ///
    /// Equal elements keep their insertion order, ties with the tail
    /// included. The guarantee is relative to prior `insert_sorted` calls
    /// only: a list also fed through the positional inserts has no global
    /// order for this to maintain.
    pub fn insert_sorted(&self, elem: &T) -> Result<(), ListError> {
        let dup = self.ops.duplicate(elem).ok_or(ListError::Alloc)?;
        let mut state = self.state.write();
        // New maximum: skip the scan entirely.
        let at_back = match state.chain.tail() {
            None => true,
            Some(tail) => self.ops.is_smaller(unsafe { &tail.as_ref().element }, elem),
        };
        if at_back {
            state.chain.push_back(Node::new(dup));
            return Ok(());
        }
        // Link before the first strictly greater node; appending when none
        // exists keeps ties stable.
        match state.find(|stored| self.ops.is_smaller(elem, stored)) {
            Some(at) => {
                unsafe { state.chain.link_before(at, Node::new(dup)) };
            }
            None => {
                state.chain.push_back(Node::new(dup));
            }
        }
        Ok(())
    }

    /// Splices a duplicate of `elem` before the first element matching
    /// `key`.
    pub fn insert_before(&self, elem: &T, key: &T) -> Result<(), ListError> {
        let dup = self.ops.duplicate(elem).ok_or(ListError::Alloc)?;
        let mut state = self.state.write();
        match state.find(|stored| self.ops.is_equal(key, stored)) {
            Some(at) => {
                unsafe { state.chain.link_before(at, Node::new(dup)) };
                Ok(())
            }
            None => {
                self.ops.release(dup);
                log::debug!("insert_before: no element matched the key");
                Err(ListError::KeyNotFound)
            }
        }
    }

    /// Splices a duplicate of `elem` after the first element matching
    /// `key`.
    pub fn insert_after(&self, elem: &T, key: &T) -> Result<(), ListError> {
        let dup = self.ops.duplicate(elem).ok_or(ListError::Alloc)?;
        let mut state = self.state.write();
        match state.find(|stored| self.ops.is_equal(key, stored)) {
            Some(at) => {
                unsafe { state.chain.link_after(at, Node::new(dup)) };
                Ok(())
            }
            None => {
                self.ops.release(dup);
                log::debug!("insert_after: no element matched the key");
                Err(ListError::KeyNotFound)
            }
        }
    }

    /// Returns a duplicate of the front element.
    ///
    /// On an empty list this clears any outstanding cursors and reports
    /// `Empty`.
    pub fn front(&self) -> Result<T, ListError> {
        self.read_nonempty(|state| {
            let head = state.chain.head().expect("non-empty chain has a head");
            self.ops
                .duplicate(unsafe { &head.as_ref().element })
                .ok_or(ListError::Alloc)
        })
    }

    /// Returns a duplicate of the back element; empty-list behavior as for
    /// [`Self::front`].
    pub fn back(&self) -> Result<T, ListError> {
        self.read_nonempty(|state| {
            let tail = state.chain.tail().expect("non-empty chain has a tail");
            self.ops
                .duplicate(unsafe { &tail.as_ref().element })
                .ok_or(ListError::Alloc)
        })
    }

    /// Runs `f` over the front element in place, without copying it.
    pub fn front_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, ListError> {
        self.read_nonempty(|state| {
            let head = state.chain.head().expect("non-empty chain has a head");
            Ok(f(unsafe { &head.as_ref().element }))
        })
    }

    /// Runs `f` over the back element in place, without copying it.
    pub fn back_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, ListError> {
        self.read_nonempty(|state| {
            let tail = state.chain.tail().expect("non-empty chain has a tail");
            Ok(f(unsafe { &tail.as_ref().element }))
        })
    }

    /// Mutates the first element matching `key` in place through `f`.
    pub fn edit<R>(&self, key: &T, f: impl FnOnce(&mut T) -> R) -> Result<R, ListError> {
        let mut state = self.state.write();
        match state.find(|stored| self.ops.is_equal(key, stored)) {
            Some(mut node) => Ok(f(unsafe { &mut node.as_mut().element })),
            None => Err(ListError::KeyNotFound),
        }
    }

    /// Removes the first element matching `key`.
    ///
    /// Cursors aimed at the removed node move to its successor (or the new
    /// tail when the tail goes); removing the last element clears every
    /// cursor.
    pub fn remove_by_key(&self, key: &T) -> Result<(), ListError> {
        let mut state = self.state.write();
        match state.find(|stored| self.ops.is_equal(key, stored)) {
            Some(node) => {
                let elem = unsafe { state.remove_node(node) };
                self.ops.release(elem);
                Ok(())
            }
            None => {
                log::debug!("remove_by_key: no element matched the key");
                Err(ListError::KeyNotFound)
            }
        }
    }

    /// Removes the front element; `Empty` on an empty list.
    pub fn remove_front(&self) -> Result<(), ListError> {
        let mut state = self.state.write();
        let head = state.chain.head().ok_or(ListError::Empty)?;
        let elem = unsafe { state.remove_node(head) };
        self.ops.release(elem);
        Ok(())
    }

    /// Removes the back element; `Empty` on an empty list.
    pub fn remove_back(&self) -> Result<(), ListError> {
        let mut state = self.state.write();
        let tail = state.chain.tail().ok_or(ListError::Empty)?;
        let elem = unsafe { state.remove_node(tail) };
        self.ops.release(elem);
        Ok(())
    }

    /// Copies every element of `self` into `dest`, front to back.
    ///
    /// `dest` must be empty (`DestinationNotEmpty`) and `self` must not be
    /// (`Empty`, with nothing done). The elements are duplicated under the
    /// source's shared lock, then spliced under the destination's
    /// exclusive lock; the two locks are never held together, so the
    /// mirror-image call cannot deadlock this one. If a duplication fails
    /// partway, no partial result is exposed: the duplicates made so far
    /// are released, `dest` is torn down, and `Alloc` is reported.
    pub fn copy_into(&self, dest: &Self) -> Result<(), ListError> {
        if !dest.is_empty() {
            return Err(ListError::DestinationNotEmpty);
        }
        let mut copies = Vec::new();
        {
            let state = self.state.read();
            if state.chain.is_empty() {
                return Err(ListError::Empty);
            }
            let mut current = state.chain.head();
            while let Some(node) = current {
                let node_ref = unsafe { node.as_ref() };
                match self.ops.duplicate(&node_ref.element) {
                    Some(copy) => copies.push(copy),
                    None => {
                        drop(state);
                        log::warn!("copy_into: duplication failed, tearing down the destination");
                        for copy in copies {
                            self.ops.release(copy);
                        }
                        dest.clear();
                        return Err(ListError::Alloc);
                    }
                }
                current = node_ref.next;
            }
        }
        let mut dstate = dest.state.write();
        if !dstate.chain.is_empty() {
            // Someone filled the destination between the precondition check
            // and here.
            drop(dstate);
            for copy in copies {
                dest.ops.release(copy);
            }
            return Err(ListError::DestinationNotEmpty);
        }
        for copy in copies {
            dstate.chain.push_back(Node::new(copy));
        }
        Ok(())
    }

    /// Splices every node of `other` onto the back of `self` in O(1) and
    /// consumes it.
    ///
    /// This is a destructive move, not a copy: the elements change owner
    /// without being duplicated, `other`'s cursors die with it, and the
    /// moved-from list cannot be touched again.
    pub fn append(&self, mut other: Self) {
        let mut state = self.state.write();
        let other_state = other.state.get_mut();
        state.chain.append(&mut other_state.chain);
        other_state.cursors.clear();
    }

    /// Removes every element and cursor; the list stays usable.
    pub fn clear(&self) {
        Self::drain(&self.ops, &mut self.state.write());
    }

    /// Tears down a state: detaches the whole chain, clears the table,
    /// then frees each node and hands its element to the strategy.
    fn drain(ops: &O, state: &mut ListState<T>) {
        let mut current = state.chain.reset();
        state.cursors.clear();
        while let Some(node) = current {
            let boxed = unsafe { Box::from_raw(node.as_ptr()) };
            current = boxed.next;
            ops.release(boxed.element);
        }
    }

    /// Registers a new cursor targeting the front element.
    ///
    /// On an empty list no handle is issued: the table is swept and
    /// `Empty` is reported.
    pub fn cursor(&self) -> Result<CursorId, ListError> {
        self.write_nonempty(|state| {
            let head = state.chain.head().expect("non-empty chain has a head");
            Ok(state.cursors.allocate(head))
        })
    }

    /// Retargets `id` to the front element.
    pub fn cursor_to_front(&self, id: CursorId) -> Result<(), ListError> {
        self.write_nonempty(|state| {
            let head = state.chain.head().expect("non-empty chain has a head");
            state.cursors.set_target(id, head)
        })
    }

    /// Retargets `id` to the back element.
    pub fn cursor_to_back(&self, id: CursorId) -> Result<(), ListError> {
        self.write_nonempty(|state| {
            let tail = state.chain.tail().expect("non-empty chain has a tail");
            state.cursors.set_target(id, tail)
        })
    }

    /// Moves `id` one element toward the tail.
    ///
    /// At the tail the target is left unchanged and `Advance::Boundary` is
    /// reported, so the call is idempotent at the end of the list.
    pub fn cursor_next(&self, id: CursorId) -> Result<Advance, ListError> {
        self.write_nonempty(|state| {
            let node = state.cursors.target(id)?;
            match unsafe { node.as_ref() }.next {
                Some(next) => {
                    state.cursors.set_target(id, next)?;
                    Ok(Advance::Moved)
                }
                None => Ok(Advance::Boundary),
            }
        })
    }

    /// Moves `id` one element toward the head; boundary behavior as for
    /// [`Self::cursor_next`].
    pub fn cursor_prev(&self, id: CursorId) -> Result<Advance, ListError> {
        self.write_nonempty(|state| {
            let node = state.cursors.target(id)?;
            match unsafe { node.as_ref() }.prev {
                Some(prev) => {
                    state.cursors.set_target(id, prev)?;
                    Ok(Advance::Moved)
                }
                None => Ok(Advance::Boundary),
            }
        })
    }

    /// Runs `f` over the element targeted by `id`.
    pub fn cursor_with<R>(&self, id: CursorId, f: impl FnOnce(&T) -> R) -> Result<R, ListError> {
        self.read_nonempty(|state| {
            let node = state.cursors.target(id)?;
            Ok(f(unsafe { &node.as_ref().element }))
        })
    }

    /// Registers a new cursor aliasing `src`'s target.
    ///
    /// The two cursors are independent entries that happen to share a
    /// target; advancing one leaves the other in place.
    pub fn cursor_fork(&self, src: CursorId) -> Result<CursorId, ListError> {
        self.write_nonempty(|state| {
            let node = state.cursors.target(src)?;
            Ok(state.cursors.allocate(node))
        })
    }

    /// Retargets the existing cursor `dest` onto `src`'s target.
    pub fn cursor_assign(&self, src: CursorId, dest: CursorId) -> Result<(), ListError> {
        self.write_nonempty(|state| {
            let node = state.cursors.target(src)?;
            state.cursors.set_target(dest, node)
        })
    }

    /// Removes the element targeted by `id`.
    ///
    /// Afterwards `id` targets what was the next element, or the new tail
    /// when the old tail was removed; any other cursor on the removed node
    /// follows the same rule. Removing the last element invalidates every
    /// cursor, `id` included, and reports `Removal::Emptied`.
    pub fn remove_at_cursor(&self, id: CursorId) -> Result<Removal, ListError> {
        let mut state = self.state.write();
        if state.chain.is_empty() {
            Self::invalidate(&mut state);
            return Err(ListError::Empty);
        }
        let node = state.cursors.target(id)?;
        let elem = unsafe { state.remove_node(node) };
        self.ops.release(elem);
        if state.chain.is_empty() {
            Ok(Removal::Emptied)
        } else {
            Ok(Removal::Remaining)
        }
    }

    /// Releases one cursor, compacting the table; every other cursor keeps
    /// its identifier and target.
    pub fn release_cursor(&self, id: CursorId) -> Result<(), ListError> {
        self.state.write().cursors.remove(id)
    }

    /// Releases every cursor at once.
    pub fn release_cursors(&self) {
        self.state.write().cursors.clear();
    }

    /// Visits every element front to back under shared access.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        let state = self.state.read();
        let mut current = state.chain.head();
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            f(&node_ref.element);
            current = node_ref.next;
        }
    }
}

impl<T, O: ElementOps<T>> Drop for CursoredList<T, O> {
    fn drop(&mut self) {
        Self::drain(&self.ops, self.state.get_mut());
    }
}

impl<T: fmt::Display, O: ElementOps<T>> fmt::Display for CursoredList<T, O> {
    /// Renders `a -> b -> c`; the alternate flag (`{:#}`) puts every
    /// element on its own `" -> "`-prefixed line instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut current = state.chain.head();
        let mut first = true;
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            if f.alternate() {
                if !first {
                    writeln!(f)?;
                }
                write!(f, " -> {}", node_ref.element)?;
            } else {
                if !first {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", node_ref.element)?;
            }
            first = false;
            current = node_ref.next;
        }
        Ok(())
    }
}

impl<T: fmt::Debug, O: ElementOps<T>> fmt::Debug for CursoredList<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut list = f.debug_list();
        let mut current = state.chain.head();
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            list.entry(&node_ref.element);
            current = node_ref.next;
        }
        list.finish()
    }
}

/// Builder for a list with custom settings.
pub struct CursoredListBuilder<O = CloneOps> {
    cursor_capacity: usize,
    ops: O,
}

impl CursoredListBuilder<CloneOps> {
    /// Starts a builder with the default element strategy.
    pub fn new() -> Self {
        CursoredListBuilder {
            cursor_capacity: 0,
            ops: CloneOps,
        }
    }
}

impl Default for CursoredListBuilder<CloneOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> CursoredListBuilder<O> {
    /// Pre-sizes the cursor table.
    pub fn with_cursor_capacity(mut self, capacity: usize) -> Self {
        self.cursor_capacity = capacity;
        self
    }

    /// Swaps in a custom element strategy.
    pub fn with_ops<P>(self, ops: P) -> CursoredListBuilder<P> {
        CursoredListBuilder {
            cursor_capacity: self.cursor_capacity,
            ops,
        }
    }

    /// Builds the list.
    pub fn build<T>(self) -> CursoredList<T, O>
    where
        O: ElementOps<T>,
    {
        CursoredList {
            state: CachePadded::new(RwLock::new(ListState {
                chain: Chain::new(),
                cursors: CursorTable::with_capacity(self.cursor_capacity),
            })),
            ops: self.ops,
        }
    }
}
