/// Capability strategies a list needs from its element type.
///
/// One implementation is injected per list instantiation, the way a hash
/// builder is injected into a hash map, and covers everything the list ever
/// does with an element: duplication on the way in, disposal on the way
/// out, keyed equality, and the strict order used by sorted insertion.
pub trait ElementOps<T> {
    /// Builds the owned copy the list will store.
    ///
    /// Returning `None` signals that the copy could not be produced; the
    /// calling operation reports `ListError::Alloc` and leaves the list
    /// untouched.
    fn duplicate(&self, elem: &T) -> Option<T>;

    /// Disposes of an element the list no longer owns.
    ///
    /// Every removal path routes the element through this hook exactly
    /// once. The default just drops it.
    fn release(&self, elem: T) {
        drop(elem);
    }

    /// Whether `key` identifies `elem` for the keyed operations.
    fn is_equal(&self, key: &T, elem: &T) -> bool;

    /// Strict `<` between elements.
    ///
    /// Must be transitive and irreflexive for sorted insertion to keep the
    /// chain ordered.
    fn is_smaller(&self, a: &T, b: &T) -> bool;
}

/// Default strategy: duplicate with `Clone`, compare with `PartialOrd`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloneOps;

impl<T: Clone + PartialOrd> ElementOps<T> for CloneOps {
    fn duplicate(&self, elem: &T) -> Option<T> {
        Some(elem.clone())
    }

    fn is_equal(&self, key: &T, elem: &T) -> bool {
        key == elem
    }

    fn is_smaller(&self, a: &T, b: &T) -> bool {
        a < b
    }
}
