use thiserror::Error;

/// Failure kinds reported by list and cursor operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ListError {
    /// Duplicating an element failed (`ElementOps::duplicate` returned
    /// `None`). The list is left exactly as it was before the call.
    #[error("element duplication failed")]
    Alloc,
    /// A keyed scan reached the tail without a match.
    #[error("no element matched the key")]
    KeyNotFound,
    /// The operation needs at least one element. Cursor operations and
    /// boundary accessors that report this have also cleared every
    /// outstanding cursor: an empty list has no valid cursor targets.
    #[error("list is empty")]
    Empty,
    /// The cursor identifier is not registered with this list, either
    /// because it was released or because an emptying mutation invalidated
    /// it.
    #[error("cursor is not registered")]
    InvalidCursor,
    /// `copy_into` requires an empty destination.
    #[error("destination list is not empty")]
    DestinationNotEmpty,
}

/// Outcome of `cursor_next`/`cursor_prev`.
///
/// Running off the end of the list is normal sequence termination, not a
/// failure, so it is reported in the success value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved one element in the requested direction.
    Moved,
    /// The cursor already sat on the boundary. Its target is unchanged, so
    /// repeating the call keeps reporting `Boundary`.
    Boundary,
}

/// Outcome of `remove_at_cursor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The node was removed; the cursor now targets what was its successor
    /// (or the new tail when the old tail was removed).
    Remaining,
    /// The removal emptied the list and every cursor was invalidated, the
    /// invoking one included.
    Emptied,
}
