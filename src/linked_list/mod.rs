//! Linked list implementations.
//!
//! [`cursored`] holds a doubly linked list that owns its nodes and exposes
//! iteration through stable cursor handles instead of borrowing iterators.
//! A cursor keeps resolving to a live element across arbitrary structural
//! mutation of the list; see the module documentation for the retargeting
//! rules.
pub mod cursored;
